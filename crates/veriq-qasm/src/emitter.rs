//! QASM 2.0 emitter for serializing circuits.

use std::fmt::Write;

use rustc_hash::FxHashSet;
use veriq_ir::{Circuit, ClbitId, GateKind, Instruction, InstructionKind, QubitId, StandardGate};

/// Emit a circuit as `OpenQASM` 2.0 source.
///
/// Register declarations follow the circuit's own registers, so a parsed
/// file emits back with the same names. Opaque gates get an `opaque`
/// declaration so the output parses on its own.
pub fn emit(circuit: &Circuit) -> String {
    let mut emitter = Emitter::new(circuit);
    emitter.emit_circuit(circuit);
    emitter.output
}

struct Emitter {
    output: String,
    qubit_names: Vec<String>,
    clbit_names: Vec<String>,
}

impl Emitter {
    fn new(circuit: &Circuit) -> Self {
        let qubit_names = circuit
            .qubits()
            .iter()
            .map(|q| match (&q.register, q.index) {
                (Some(reg), Some(idx)) => format!("{reg}[{idx}]"),
                _ => format!("__anon{}[0]", q.id.0),
            })
            .collect();
        let clbit_names = circuit
            .clbits()
            .iter()
            .map(|c| match (&c.register, c.index) {
                (Some(reg), Some(idx)) => format!("{reg}[{idx}]"),
                _ => format!("__canon{}[0]", c.id.0),
            })
            .collect();
        Self {
            output: String::new(),
            qubit_names,
            clbit_names,
        }
    }

    fn writeln(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
    }

    fn emit_circuit(&mut self, circuit: &Circuit) {
        self.writeln("OPENQASM 2.0;");
        self.writeln("include \"qelib1.inc\";");

        for reg in circuit.qregs() {
            self.writeln(&format!("qreg {}[{}];", reg.name, reg.size));
        }
        let mut cregs: Vec<(String, u32)> = Vec::new();
        for clbit in circuit.clbits() {
            let name = clbit
                .register
                .clone()
                .unwrap_or_else(|| format!("__canon{}", clbit.id.0));
            match cregs.iter_mut().find(|(n, _)| *n == name) {
                Some((_, size)) => *size += 1,
                None => cregs.push((name, 1)),
            }
        }
        for (name, size) in cregs {
            self.writeln(&format!("creg {name}[{size}];"));
        }

        let mut declared = FxHashSet::default();
        for inst in circuit.instructions() {
            if let InstructionKind::Gate(GateKind::Custom(g)) = &inst.kind {
                if declared.insert(g.name.clone()) {
                    let params: Vec<String> = (0..g.params.len()).map(|i| format!("p{i}")).collect();
                    let args: Vec<String> = (0..g.num_qubits).map(|i| format!("a{i}")).collect();
                    if params.is_empty() {
                        self.writeln(&format!("opaque {} {};", g.name, args.join(",")));
                    } else {
                        self.writeln(&format!(
                            "opaque {}({}) {};",
                            g.name,
                            params.join(","),
                            args.join(",")
                        ));
                    }
                }
            }
        }

        for inst in circuit.instructions() {
            self.emit_instruction(inst);
        }
    }

    fn emit_instruction(&mut self, instruction: &Instruction) {
        let qubits = self.format_qubits(&instruction.qubits);
        match &instruction.kind {
            InstructionKind::Gate(kind) => {
                let params = gate_params(kind);
                if params.is_empty() {
                    self.writeln(&format!("{} {qubits};", kind.name()));
                } else {
                    self.writeln(&format!("{}({params}) {qubits};", kind.name()));
                }
            }
            InstructionKind::Measure => {
                let pairs: Vec<(QubitId, ClbitId)> = instruction
                    .qubits
                    .iter()
                    .copied()
                    .zip(instruction.clbits.iter().copied())
                    .collect();
                for (q, c) in pairs {
                    let line = format!(
                        "measure {} -> {};",
                        self.qubit_names[q.index()],
                        self.clbit_names[c.0 as usize]
                    );
                    self.writeln(&line);
                }
            }
            InstructionKind::Barrier => {
                self.writeln(&format!("barrier {qubits};"));
            }
        }
    }

    fn format_qubits(&self, qubits: &[QubitId]) -> String {
        qubits
            .iter()
            .map(|q| self.qubit_names[q.index()].as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn gate_params(kind: &GateKind) -> String {
    match kind {
        GateKind::Standard(StandardGate::RzQ(q)) => format!("{}, {}", q.num(), q.den()),
        GateKind::Standard(g) => join_angles(&g.parameters()),
        GateKind::Custom(g) => join_angles(&g.params),
    }
}

fn join_angles(values: &[f64]) -> String {
    values
        .iter()
        .map(|&v| format_angle(v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format an angle, using a `pi` fraction only when it parses back to the
/// exact same bits.
#[allow(clippy::cast_precision_loss, clippy::float_cmp)]
pub(crate) fn format_angle(value: f64) -> String {
    use std::f64::consts::PI;

    if value == 0.0 {
        return "0".to_string();
    }
    for den in [1_i64, 2, 4, 8, 16] {
        let k = (value * den as f64 / PI).round();
        if k == 0.0 || k.abs() > 64.0 {
            continue;
        }
        let magnitude = k.abs();
        // Mirror the parser's left-to-right evaluation of `k*pi/den`.
        let mut parsed = if magnitude == 1.0 { PI } else { magnitude * PI };
        if den != 1 {
            parsed /= den as f64;
        }
        let parsed = if k < 0.0 { -parsed } else { parsed };
        if parsed == value {
            let mut text = String::new();
            if k < 0.0 {
                text.push('-');
            }
            if magnitude != 1.0 {
                let _ = write!(text, "{magnitude}*");
            }
            text.push_str("pi");
            if den != 1 {
                let _ = write!(text, "/{den}");
            }
            return text;
        }
    }
    format!("{value:?}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use std::f64::consts::PI;
    use veriq_ir::Rational;

    #[test]
    fn test_emit_bell() {
        let mut circuit = Circuit::with_size("bell", 2, 2);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();

        let qasm = emit(&circuit);
        assert!(qasm.starts_with("OPENQASM 2.0;"));
        assert!(qasm.contains("qreg q[2];"));
        assert!(qasm.contains("creg c[2];"));
        assert!(qasm.contains("h q[0];"));
        assert!(qasm.contains("cx q[0], q[1];"));
        assert!(qasm.contains("measure q[0] -> c[0];"));
    }

    #[test]
    fn test_format_angle() {
        assert_eq!(format_angle(PI), "pi");
        assert_eq!(format_angle(-PI / 2.0), "-pi/2");
        assert_eq!(format_angle(3.0 * PI / 4.0), "3*pi/4");
        assert_eq!(format_angle(0.0), "0");
        assert_eq!(format_angle(0.3), "0.3");
    }

    #[test]
    fn test_rzq_emission() {
        let mut circuit = Circuit::with_size("rzq", 1, 0);
        circuit.rzq(Rational::new(7, 4).unwrap(), QubitId(0)).unwrap();
        assert!(emit(&circuit).contains("rzq(7, 4) q[0];"));
    }

    #[test]
    fn test_registers_survive() {
        let source = "OPENQASM 2.0;\nqreg a[1];\nqreg b[2];\ncx a[0], b[1];\n";
        let circuit = parse(source).unwrap();
        let text = emit(&circuit);
        assert!(text.contains("qreg a[1];"));
        assert!(text.contains("qreg b[2];"));
        assert!(text.contains("cx a[0], b[1];"));
    }
}
