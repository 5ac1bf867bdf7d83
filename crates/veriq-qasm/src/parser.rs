//! Parser for the `OpenQASM` 2.0 subset used for circuit interchange.
//!
//! The parser lowers straight into a [`Circuit`]: there is no separate AST,
//! because the interchange files carry no control flow and no parameters
//! that outlive a single statement.

use rustc_hash::FxHashMap;
use veriq_ir::{
    Circuit, ClbitId, CustomGate, GateKind, Instruction, QubitId, Rational, StandardGate,
};

use crate::error::{ParseError, ParseResult};
use crate::lexer::{SpannedToken, Token, tokenize};

/// Parse `OpenQASM` 2.0 source into a circuit.
pub fn parse(source: &str) -> ParseResult<Circuit> {
    let mut parser = Parser::new(source)?;
    parser.parse_program()?;
    Ok(parser.circuit)
}

/// A declared register: id of its first element and its size.
#[derive(Debug, Clone, Copy)]
struct RegisterSpan {
    start: u32,
    size: u32,
}

/// Signature of a `gate` or `opaque` declaration.
#[derive(Debug, Clone, Copy)]
struct GateSignature {
    num_params: usize,
    num_qubits: usize,
}

/// A gate argument: one element, or a whole register to broadcast over.
#[derive(Debug, Clone)]
enum Operand<T> {
    Single(T),
    Register(Vec<T>),
}

struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
    circuit: Circuit,
    qregs: FxHashMap<String, RegisterSpan>,
    cregs: FxHashMap<String, RegisterSpan>,
    declared_gates: FxHashMap<String, GateSignature>,
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
impl Parser {
    fn new(source: &str) -> ParseResult<Self> {
        let tokens =
            tokenize(source).map_err(|(line, text)| ParseError::LexerError { line, text })?;
        Ok(Self {
            tokens,
            pos: 0,
            circuit: Circuit::new("main"),
            qregs: FxHashMap::default(),
            cregs: FxHashMap::default(),
            declared_gates: FxHashMap::default(),
        })
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    /// Line of the current token, or of the last one at end of input.
    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos)?.token.clone();
        self.pos += 1;
        Some(token)
    }

    #[allow(clippy::needless_pass_by_value)]
    fn expect(&mut self, expected: Token) -> ParseResult<()> {
        let line = self.line();
        let found = self
            .advance()
            .ok_or_else(|| ParseError::UnexpectedEof(format!("expected {expected}")))?;

        if std::mem::discriminant(&found) != std::mem::discriminant(&expected) {
            return Err(ParseError::UnexpectedToken {
                line,
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }
        Ok(())
    }

    fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    fn consume(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_program(&mut self) -> ParseResult<()> {
        self.expect(Token::OpenQasm)?;
        let version = match self.advance() {
            Some(Token::FloatLiteral(v)) => v,
            Some(Token::IntLiteral(v)) => v as f64,
            Some(other) => return Err(ParseError::InvalidVersion(other.to_string())),
            None => return Err(ParseError::UnexpectedEof("version".into())),
        };
        if !(2.0..3.0).contains(&version) {
            return Err(ParseError::InvalidVersion(version.to_string()));
        }
        self.expect(Token::Semicolon)?;

        while !self.is_eof() {
            self.parse_statement()?;
        }
        Ok(())
    }

    fn parse_statement(&mut self) -> ParseResult<()> {
        let line = self.line();
        match self.advance() {
            Some(Token::Include) => {
                match self.advance() {
                    Some(Token::StringLiteral(_)) => {}
                    Some(other) => {
                        return Err(ParseError::UnexpectedToken {
                            line,
                            expected: "file name".into(),
                            found: other.to_string(),
                        });
                    }
                    None => return Err(ParseError::UnexpectedEof("file name".into())),
                }
                self.expect(Token::Semicolon)
            }
            Some(Token::Qreg) => self.parse_register_decl(true),
            Some(Token::Creg) => self.parse_register_decl(false),
            Some(Token::Gate) => self.parse_gate_decl(true),
            Some(Token::Opaque) => self.parse_gate_decl(false),
            Some(Token::Measure) => self.parse_measure(),
            Some(Token::Barrier) => self.parse_barrier(),
            Some(Token::Reset) => Err(ParseError::Unsupported {
                line,
                what: "reset".into(),
            }),
            Some(Token::If) => Err(ParseError::Unsupported {
                line,
                what: "classically controlled operation".into(),
            }),
            Some(Token::Identifier(name)) => self.parse_gate_call(name, line),
            Some(other) => Err(ParseError::UnexpectedToken {
                line,
                expected: "statement".into(),
                found: other.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof("statement".into())),
        }
    }

    fn parse_register_decl(&mut self, quantum: bool) -> ParseResult<()> {
        let name = self.parse_identifier()?;
        self.expect(Token::LBracket)?;
        let line = self.line();
        let size =
            u32::try_from(self.parse_int_literal()?).map_err(|_| ParseError::Unsupported {
                line,
                what: format!("size of register '{name}'"),
            })?;
        self.expect(Token::RBracket)?;
        self.expect(Token::Semicolon)?;

        if self.qregs.contains_key(&name) || self.cregs.contains_key(&name) {
            return Err(ParseError::DuplicateDeclaration(name));
        }
        if quantum {
            let start = self.circuit.num_qubits();
            self.circuit.add_qreg(&name, size)?;
            self.qregs.insert(name, RegisterSpan { start, size });
        } else {
            let start = self.circuit.num_clbits();
            self.circuit.add_creg(&name, size)?;
            self.cregs.insert(name, RegisterSpan { start, size });
        }
        Ok(())
    }

    /// Parse a `gate` or `opaque` declaration. Bodies are skipped: the gate
    /// is kept opaque and identified by name.
    fn parse_gate_decl(&mut self, has_body: bool) -> ParseResult<()> {
        let name = self.parse_identifier()?;
        let mut num_params = 0;
        if self.consume(&Token::LParen) {
            if !self.check(&Token::RParen) {
                num_params = self.parse_identifier_list()?.len();
            }
            self.expect(Token::RParen)?;
        }
        let num_qubits = self.parse_identifier_list()?.len();

        if has_body {
            self.expect(Token::LBrace)?;
            let mut depth = 1usize;
            while depth > 0 {
                match self.advance() {
                    Some(Token::LBrace) => depth += 1,
                    Some(Token::RBrace) => depth -= 1,
                    Some(_) => {}
                    None => return Err(ParseError::UnexpectedEof("gate body".into())),
                }
            }
        } else {
            self.expect(Token::Semicolon)?;
        }

        if self.declared_gates.contains_key(&name) {
            return Err(ParseError::DuplicateDeclaration(name));
        }
        self.declared_gates.insert(
            name,
            GateSignature {
                num_params,
                num_qubits,
            },
        );
        Ok(())
    }

    fn parse_measure(&mut self) -> ParseResult<()> {
        let line = self.line();
        let qubit = self.parse_qubit_operand()?;
        self.expect(Token::Arrow)?;
        let clbit = self.parse_clbit_operand()?;
        self.expect(Token::Semicolon)?;

        match (qubit, clbit) {
            (Operand::Single(q), Operand::Single(c)) => {
                self.circuit.measure(q, c)?;
            }
            (Operand::Register(qs), Operand::Register(cs)) if qs.len() == cs.len() => {
                for (q, c) in qs.into_iter().zip(cs) {
                    self.circuit.measure(q, c)?;
                }
            }
            _ => {
                return Err(ParseError::BroadcastMismatch {
                    gate: "measure".into(),
                    line,
                });
            }
        }
        Ok(())
    }

    fn parse_barrier(&mut self) -> ParseResult<()> {
        let mut qubits = Vec::new();
        loop {
            match self.parse_qubit_operand()? {
                Operand::Single(q) => qubits.push(q),
                Operand::Register(qs) => qubits.extend(qs),
            }
            if !self.consume(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::Semicolon)?;
        let mut seen = Vec::with_capacity(qubits.len());
        for q in qubits {
            if !seen.contains(&q) {
                seen.push(q);
            }
        }
        self.circuit.barrier(seen)?;
        Ok(())
    }

    fn parse_gate_call(&mut self, name: String, line: usize) -> ParseResult<()> {
        let mut params = Vec::new();
        if self.consume(&Token::LParen) {
            if !self.check(&Token::RParen) {
                params.push(self.parse_expression()?);
                while self.consume(&Token::Comma) {
                    params.push(self.parse_expression()?);
                }
            }
            self.expect(Token::RParen)?;
        }

        let mut operands = vec![self.parse_qubit_operand()?];
        while self.consume(&Token::Comma) {
            operands.push(self.parse_qubit_operand()?);
        }
        self.expect(Token::Semicolon)?;

        let kind: GateKind = match standard_gate(&name, &params, line)? {
            Some(gate) => gate.into(),
            None => match self.declared_gates.get(&name) {
                Some(sig) => {
                    if sig.num_params != params.len() {
                        return Err(ParseError::WrongParameterCount {
                            gate: name,
                            expected: sig.num_params,
                            got: params.len(),
                        });
                    }
                    CustomGate::new(&name, u32::try_from(sig.num_qubits).unwrap_or(u32::MAX))
                        .with_params(params)
                        .into()
                }
                None => return Err(ParseError::UnknownGate { line, name }),
            },
        };

        let expected = kind.num_qubits() as usize;
        if operands.len() != expected {
            return Err(ParseError::WrongQubitCount {
                gate: name,
                expected,
                got: operands.len(),
            });
        }

        for qubits in broadcast(&operands, &name, line)? {
            self.circuit.push(Instruction::gate(kind.clone(), qubits))?;
        }
        Ok(())
    }

    fn parse_qubit_operand(&mut self) -> ParseResult<Operand<QubitId>> {
        let line = self.line();
        let name = self.parse_identifier()?;
        let span = *self
            .qregs
            .get(&name)
            .ok_or_else(|| ParseError::UndefinedIdentifier {
                line,
                name: name.clone(),
            })?;
        Ok(match self.parse_index(&name, span)? {
            Some(i) => Operand::Single(QubitId(span.start + i)),
            None => Operand::Register((span.start..span.start + span.size).map(QubitId).collect()),
        })
    }

    fn parse_clbit_operand(&mut self) -> ParseResult<Operand<ClbitId>> {
        let line = self.line();
        let name = self.parse_identifier()?;
        let span = *self
            .cregs
            .get(&name)
            .ok_or_else(|| ParseError::UndefinedIdentifier {
                line,
                name: name.clone(),
            })?;
        Ok(match self.parse_index(&name, span)? {
            Some(i) => Operand::Single(ClbitId(span.start + i)),
            None => Operand::Register((span.start..span.start + span.size).map(ClbitId).collect()),
        })
    }

    fn parse_index(&mut self, register: &str, span: RegisterSpan) -> ParseResult<Option<u32>> {
        if !self.consume(&Token::LBracket) {
            return Ok(None);
        }
        let index = self.parse_int_literal()?;
        self.expect(Token::RBracket)?;
        match u32::try_from(index) {
            Ok(i) if i < span.size => Ok(Some(i)),
            _ => Err(ParseError::IndexOutOfBounds {
                register: register.to_string(),
                index,
                size: span.size,
            }),
        }
    }

    // Expressions evaluate eagerly to f64 with the usual precedence:
    // `+ -` < `* /` < unary minus < `^` (right associative).

    fn parse_expression(&mut self) -> ParseResult<f64> {
        let mut value = self.parse_term()?;
        loop {
            if self.consume(&Token::Plus) {
                value += self.parse_term()?;
            } else if self.consume(&Token::Minus) {
                value -= self.parse_term()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn parse_term(&mut self) -> ParseResult<f64> {
        let mut value = self.parse_unary()?;
        loop {
            if self.consume(&Token::Star) {
                value *= self.parse_unary()?;
            } else if self.consume(&Token::Slash) {
                let line = self.line();
                let divisor = self.parse_unary()?;
                if divisor == 0.0 {
                    return Err(ParseError::InvalidParameter {
                        line,
                        reason: "division by zero".into(),
                    });
                }
                value /= divisor;
            } else {
                return Ok(value);
            }
        }
    }

    fn parse_unary(&mut self) -> ParseResult<f64> {
        if self.consume(&Token::Minus) {
            return Ok(-self.parse_unary()?);
        }
        if self.consume(&Token::Plus) {
            return self.parse_unary();
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> ParseResult<f64> {
        let base = self.parse_primary()?;
        if self.consume(&Token::Caret) {
            let exponent = self.parse_unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> ParseResult<f64> {
        let line = self.line();
        match self.advance() {
            Some(Token::IntLiteral(v)) => Ok(v as f64),
            Some(Token::FloatLiteral(v)) => Ok(v),
            Some(Token::Pi) => Ok(std::f64::consts::PI),
            Some(Token::LParen) => {
                let value = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Ok(value)
            }
            Some(Token::Identifier(func)) => {
                self.expect(Token::LParen)?;
                let arg = self.parse_expression()?;
                self.expect(Token::RParen)?;
                let value = match func.as_str() {
                    "sin" => arg.sin(),
                    "cos" => arg.cos(),
                    "tan" => arg.tan(),
                    "exp" => arg.exp(),
                    "ln" => arg.ln(),
                    "sqrt" => arg.sqrt(),
                    _ => {
                        return Err(ParseError::InvalidParameter {
                            line,
                            reason: format!("unknown function '{func}'"),
                        });
                    }
                };
                if value.is_finite() {
                    Ok(value)
                } else {
                    Err(ParseError::InvalidParameter {
                        line,
                        reason: format!("{func} is not finite at {arg}"),
                    })
                }
            }
            Some(other) => Err(ParseError::UnexpectedToken {
                line,
                expected: "expression".into(),
                found: other.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof("expression".into())),
        }
    }

    fn parse_identifier_list(&mut self) -> ParseResult<Vec<String>> {
        let mut ids = vec![self.parse_identifier()?];
        while self.consume(&Token::Comma) {
            ids.push(self.parse_identifier()?);
        }
        Ok(ids)
    }

    fn parse_identifier(&mut self) -> ParseResult<String> {
        let line = self.line();
        match self.advance() {
            Some(Token::Identifier(s)) => Ok(s),
            Some(other) => Err(ParseError::UnexpectedToken {
                line,
                expected: "identifier".into(),
                found: other.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof("identifier".into())),
        }
    }

    fn parse_int_literal(&mut self) -> ParseResult<u64> {
        let line = self.line();
        match self.advance() {
            Some(Token::IntLiteral(v)) => Ok(v),
            Some(other) => Err(ParseError::UnexpectedToken {
                line,
                expected: "integer".into(),
                found: other.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof("integer".into())),
        }
    }
}

/// Expand register operands into one operand list per broadcast step.
fn broadcast(
    operands: &[Operand<QubitId>],
    gate: &str,
    line: usize,
) -> ParseResult<Vec<Vec<QubitId>>> {
    let mut width: Option<usize> = None;
    for op in operands {
        if let Operand::Register(qs) = op {
            match width {
                Some(w) if w != qs.len() => {
                    return Err(ParseError::BroadcastMismatch {
                        gate: gate.to_string(),
                        line,
                    });
                }
                _ => width = Some(qs.len()),
            }
        }
    }

    let steps = width.unwrap_or(1);
    Ok((0..steps)
        .map(|i| {
            operands
                .iter()
                .map(|op| match op {
                    Operand::Single(q) => *q,
                    Operand::Register(qs) => qs[i],
                })
                .collect()
        })
        .collect())
}

/// Resolve a built-in gate name. `Ok(None)` means the name is not built in.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn standard_gate(name: &str, params: &[f64], line: usize) -> ParseResult<Option<StandardGate>> {
    let arity = |expected: usize| -> ParseResult<()> {
        if params.len() == expected {
            Ok(())
        } else {
            Err(ParseError::WrongParameterCount {
                gate: name.to_string(),
                expected,
                got: params.len(),
            })
        }
    };

    let gate = match name {
        "id" | "i" => {
            arity(0)?;
            StandardGate::I
        }
        "x" => {
            arity(0)?;
            StandardGate::X
        }
        "y" => {
            arity(0)?;
            StandardGate::Y
        }
        "z" => {
            arity(0)?;
            StandardGate::Z
        }
        "h" => {
            arity(0)?;
            StandardGate::H
        }
        "s" => {
            arity(0)?;
            StandardGate::S
        }
        "sdg" => {
            arity(0)?;
            StandardGate::Sdg
        }
        "t" => {
            arity(0)?;
            StandardGate::T
        }
        "tdg" => {
            arity(0)?;
            StandardGate::Tdg
        }
        "sx" => {
            arity(0)?;
            StandardGate::SX
        }
        "sxdg" => {
            arity(0)?;
            StandardGate::SXdg
        }
        "rx" => {
            arity(1)?;
            StandardGate::Rx(params[0])
        }
        "ry" => {
            arity(1)?;
            StandardGate::Ry(params[0])
        }
        "rz" => {
            arity(1)?;
            StandardGate::Rz(params[0])
        }
        "rzq" => {
            arity(2)?;
            let (num, den) = (params[0], params[1]);
            if num.fract() != 0.0 || den.fract() != 0.0 {
                return Err(ParseError::InvalidParameter {
                    line,
                    reason: format!("rzq expects integers, got ({num}, {den})"),
                });
            }
            StandardGate::RzQ(Rational::new(num as i64, den as i64)?)
        }
        "u1" => {
            arity(1)?;
            StandardGate::U1(params[0])
        }
        "u2" => {
            arity(2)?;
            StandardGate::U2(params[0], params[1])
        }
        "u3" | "U" | "u" => {
            arity(3)?;
            StandardGate::U3(params[0], params[1], params[2])
        }
        "p" => {
            arity(1)?;
            StandardGate::P(params[0])
        }
        "cx" | "CX" => {
            arity(0)?;
            StandardGate::CX
        }
        "cy" => {
            arity(0)?;
            StandardGate::CY
        }
        "cz" => {
            arity(0)?;
            StandardGate::CZ
        }
        "ch" => {
            arity(0)?;
            StandardGate::CH
        }
        "swap" => {
            arity(0)?;
            StandardGate::Swap
        }
        "crz" => {
            arity(1)?;
            StandardGate::CRz(params[0])
        }
        "ccx" => {
            arity(0)?;
            StandardGate::CCX
        }
        "ccz" => {
            arity(0)?;
            StandardGate::CCZ
        }
        "cswap" => {
            arity(0)?;
            StandardGate::CSwap
        }
        _ => return Ok(None),
    };
    Ok(Some(gate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    use veriq_ir::InstructionKind;

    #[test]
    fn test_parse_bell_state() {
        let source = r#"
            OPENQASM 2.0;
            include "qelib1.inc";
            qreg q[2];
            creg c[2];
            h q[0];
            cx q[0], q[1];
            measure q -> c;
        "#;
        let circuit = parse(source).unwrap();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.num_clbits(), 2);
        assert_eq!(circuit.len(), 4);
        assert_eq!(circuit.instructions()[1].qubits, vec![QubitId(0), QubitId(1)]);
    }

    #[test]
    fn test_parse_parameters() {
        let source = "OPENQASM 2.0;\nqreg q[1];\nrz(-pi/4) q[0];\nu3(pi, 0, .5) q[0];\nrzq(3, 4) q[0];";
        let circuit = parse(source).unwrap();
        let gates: Vec<_> = circuit
            .instructions()
            .iter()
            .map(|i| *i.as_standard().unwrap())
            .collect();
        assert_eq!(gates[0], StandardGate::Rz(-PI / 4.0));
        assert_eq!(gates[1], StandardGate::U3(PI, 0.0, 0.5));
        assert_eq!(gates[2], StandardGate::RzQ(Rational::new(3, 4).unwrap()));
    }

    #[test]
    fn test_parse_multiple_registers() {
        let source = "OPENQASM 2.0;\nqreg a[2];\nqreg b[1];\ncx a[1], b[0];";
        let circuit = parse(source).unwrap();
        assert_eq!(circuit.qregs().len(), 2);
        assert_eq!(circuit.instructions()[0].qubits, vec![QubitId(1), QubitId(2)]);
    }

    #[test]
    fn test_broadcast() {
        let source = "OPENQASM 2.0;\nqreg a[3];\nqreg b[3];\nh a;\ncx a, b;";
        let circuit = parse(source).unwrap();
        assert_eq!(circuit.len(), 6);
        assert_eq!(circuit.instructions()[5].qubits, vec![QubitId(2), QubitId(5)]);
    }

    #[test]
    fn test_declared_gate_is_opaque() {
        let source = "OPENQASM 2.0;\nqreg q[2];\ngate foo a, b { cx a, b; h a; }\nfoo q[0], q[1];";
        let circuit = parse(source).unwrap();
        assert_eq!(circuit.len(), 1);
        match &circuit.instructions()[0].kind {
            InstructionKind::Gate(GateKind::Custom(g)) => assert_eq!(g.name, "foo"),
            other => panic!("expected custom gate, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_undefined() {
        let err = parse("OPENQASM 2.0;\nqreg q[1];\nh r[0];").unwrap_err();
        assert!(matches!(err, ParseError::UndefinedIdentifier { line: 3, .. }));
    }

    #[test]
    fn test_parse_error_unknown_gate() {
        let err = parse("OPENQASM 2.0;\nqreg q[1];\nfrob q[0];").unwrap_err();
        assert!(matches!(err, ParseError::UnknownGate { .. }));
    }

    #[test]
    fn test_parse_error_bounds() {
        let err = parse("OPENQASM 2.0;\nqreg q[1];\nx q[1];").unwrap_err();
        assert!(matches!(err, ParseError::IndexOutOfBounds { .. }));
    }

    #[test]
    fn test_wrong_version() {
        assert!(matches!(
            parse("OPENQASM 3.0;"),
            Err(ParseError::InvalidVersion(_))
        ));
    }

    #[test]
    fn test_reset_unsupported() {
        let err = parse("OPENQASM 2.0;\nqreg q[1];\nreset q[0];").unwrap_err();
        assert!(matches!(err, ParseError::Unsupported { .. }));
    }
}
