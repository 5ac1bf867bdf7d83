//! `OpenQASM` 2.0 interchange for Veriq
//!
//! Circuits cross into the verification engine as text files. This crate
//! reads and writes the subset of `OpenQASM` 2.0 those files use.
//!
//! # Supported Features
//!
//! | Feature | Example |
//! |---------|---------|
//! | Version header | `OPENQASM 2.0;` |
//! | Includes (ignored) | `include "qelib1.inc";` |
//! | Registers | `qreg q[5];`, `creg c[5];` |
//! | Standard gates | `h q[0];`, `cx q[0], q[1];` |
//! | Parameter expressions | `rz(-3*pi/4) q[0];` |
//! | Rational rotations | `rzq(1, 4) q[0];` |
//! | Register broadcast | `h q;`, `measure q -> c;` |
//! | Opaque gate declarations | `gate g a, b { ... }` |
//! | Barriers | `barrier q;` |
//!
//! `reset` and `if` are rejected.
//!
//! # Example
//!
//! ```rust
//! use veriq_qasm::{emit, parse};
//!
//! let qasm = r#"
//!     OPENQASM 2.0;
//!     include "qelib1.inc";
//!     qreg q[2];
//!     h q[0];
//!     cx q[0], q[1];
//! "#;
//!
//! let circuit = parse(qasm).unwrap();
//! assert_eq!(circuit.num_qubits(), 2);
//!
//! let text = emit(&circuit);
//! assert!(text.contains("cx q[0], q[1];"));
//! ```

mod emitter;
mod error;
mod lexer;
mod parser;

pub use emitter::emit;
pub use error::{ParseError, ParseResult};
pub use parser::parse;
