//! Closed sets of engine operations, gate counters and topologies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A circuit-to-circuit transformation offered by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Transform {
    /// Rewrite Z-axis rotations with exact angles into `rzq`.
    ConvertToRzq,
    /// Rewrite into the IBM gate set {u1, u2, u3, cx}.
    ConvertToIbm,
    /// Decompose CCX, CCZ, CZ and SWAP into CX and single-qubit gates.
    DecomposeToCnot,
    /// Replace `rzq` with standard gates.
    ReplaceRzq,
    /// Merge runs of IBM single-qubit gates.
    Optimize1qGates,
    /// Cancel adjacent CX pairs.
    CxCancellation,
    /// IBM-style optimization.
    OptimizeIbm,
    /// Propagate X gates through CX targets and cancel them.
    NotPropagation,
    /// Hadamard gate reduction.
    HadamardReduction,
    /// Cancel adjacent inverse single-qubit gates.
    CancelSingleQubitGates,
    /// Cancel adjacent identical two-qubit gates.
    CancelTwoQubitGates,
    /// Merge Z-axis rotations.
    MergeRotations,
    /// Nam-style optimization.
    OptimizeNam,
    /// Full optimization.
    Optimize,
}

impl Transform {
    /// Every transformation, in a stable order.
    pub const ALL: [Transform; 14] = [
        Transform::ConvertToRzq,
        Transform::ConvertToIbm,
        Transform::DecomposeToCnot,
        Transform::ReplaceRzq,
        Transform::Optimize1qGates,
        Transform::CxCancellation,
        Transform::OptimizeIbm,
        Transform::NotPropagation,
        Transform::HadamardReduction,
        Transform::CancelSingleQubitGates,
        Transform::CancelTwoQubitGates,
        Transform::MergeRotations,
        Transform::OptimizeNam,
        Transform::Optimize,
    ];

    /// The canonical name.
    pub fn name(self) -> &'static str {
        match self {
            Transform::ConvertToRzq => "convert_to_rzq",
            Transform::ConvertToIbm => "convert_to_ibm",
            Transform::DecomposeToCnot => "decompose_to_cnot",
            Transform::ReplaceRzq => "replace_rzq",
            Transform::Optimize1qGates => "optimize_1q_gates",
            Transform::CxCancellation => "cx_cancellation",
            Transform::OptimizeIbm => "optimize_ibm",
            Transform::NotPropagation => "not_propagation",
            Transform::HadamardReduction => "hadamard_reduction",
            Transform::CancelSingleQubitGates => "cancel_single_qubit_gates",
            Transform::CancelTwoQubitGates => "cancel_two_qubit_gates",
            Transform::MergeRotations => "merge_rotations",
            Transform::OptimizeNam => "optimize_nam",
            Transform::Optimize => "optimize",
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Transform {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Transform::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| EngineError::UnknownTransform(s.to_string()))
    }
}

impl TryFrom<String> for Transform {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Transform> for String {
    fn from(value: Transform) -> Self {
        value.name().to_string()
    }
}

/// A gate kind the engine can count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GateCount {
    I,
    X,
    Y,
    Z,
    H,
    S,
    T,
    Sdg,
    Tdg,
    Rx,
    Ry,
    Rz,
    Rzq,
    U1,
    U2,
    U3,
    CX,
    CZ,
    Swap,
    CCX,
    CCZ,
}

impl GateCount {
    /// Every counter, in report order.
    pub const ALL: [GateCount; 21] = [
        GateCount::I,
        GateCount::X,
        GateCount::Y,
        GateCount::Z,
        GateCount::H,
        GateCount::S,
        GateCount::T,
        GateCount::Sdg,
        GateCount::Tdg,
        GateCount::Rx,
        GateCount::Ry,
        GateCount::Rz,
        GateCount::Rzq,
        GateCount::U1,
        GateCount::U2,
        GateCount::U3,
        GateCount::CX,
        GateCount::CZ,
        GateCount::Swap,
        GateCount::CCX,
        GateCount::CCZ,
    ];

    /// Report label.
    pub fn label(self) -> &'static str {
        match self {
            GateCount::I => "I",
            GateCount::X => "X",
            GateCount::Y => "Y",
            GateCount::Z => "Z",
            GateCount::H => "H",
            GateCount::S => "S",
            GateCount::T => "T",
            GateCount::Sdg => "Sdg",
            GateCount::Tdg => "Tdg",
            GateCount::Rx => "Rx",
            GateCount::Ry => "Ry",
            GateCount::Rz => "Rz",
            GateCount::Rzq => "Rzq",
            GateCount::U1 => "U1",
            GateCount::U2 => "U2",
            GateCount::U3 => "U3",
            GateCount::CX => "CX",
            GateCount::CZ => "CZ",
            GateCount::Swap => "SWAP",
            GateCount::CCX => "CCX",
            GateCount::CCZ => "CCZ",
        }
    }
}

impl fmt::Display for GateCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A named connectivity topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topology {
    /// The 5-qubit IBM Tenerife device.
    Tenerife,
    /// Linear nearest neighbour chain.
    Lnn(u32),
    /// Linear chain closed into a ring.
    LnnRing(u32),
    /// Rectangular grid, row-major.
    Grid { rows: u32, cols: u32 },
}

impl Topology {
    /// Number of physical qubits.
    pub fn num_qubits(self) -> u32 {
        match self {
            Topology::Tenerife => 5,
            Topology::Lnn(n) | Topology::LnnRing(n) => n,
            Topology::Grid { rows, cols } => rows * cols,
        }
    }

    /// Edge list of the topology.
    pub fn edges(self) -> Vec<(u32, u32)> {
        match self {
            Topology::Tenerife => vec![(1, 0), (2, 0), (2, 1), (3, 2), (3, 4), (4, 2)],
            Topology::Lnn(n) => (1..n).map(|i| (i - 1, i)).collect(),
            Topology::LnnRing(n) => {
                let mut edges: Vec<_> = (1..n).map(|i| (i - 1, i)).collect();
                if n > 2 {
                    edges.push((n - 1, 0));
                }
                edges
            }
            Topology::Grid { rows, cols } => {
                let mut edges = Vec::new();
                for r in 0..rows {
                    for c in 0..cols {
                        let q = r * cols + c;
                        if c + 1 < cols {
                            edges.push((q, q + 1));
                        }
                        if r + 1 < rows {
                            edges.push((q, q + cols));
                        }
                    }
                }
                edges
            }
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topology::Tenerife => write!(f, "tenerife"),
            Topology::Lnn(n) => write!(f, "lnn:{n}"),
            Topology::LnnRing(n) => write!(f, "ring:{n}"),
            Topology::Grid { rows, cols } => write!(f, "grid:{rows}x{cols}"),
        }
    }
}

impl FromStr for Topology {
    type Err = EngineError;

    /// Parse `tenerife`, `lnn:N`, `ring:N` or `grid:RxC`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || EngineError::UnknownTopology(s.to_string());
        let (kind, arg) = s.split_once(':').unwrap_or((s, ""));
        let size = |text: &str| text.parse::<u32>().ok().filter(|&n| n > 0).ok_or_else(unknown);
        match kind {
            "tenerife" if arg.is_empty() => Ok(Topology::Tenerife),
            "lnn" => Ok(Topology::Lnn(size(arg)?)),
            "ring" => Ok(Topology::LnnRing(size(arg)?)),
            "grid" => {
                let (rows, cols) = arg.split_once('x').ok_or_else(unknown)?;
                Ok(Topology::Grid {
                    rows: size(rows)?,
                    cols: size(cols)?,
                })
            }
            _ => Err(unknown()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_names_roundtrip() {
        for t in Transform::ALL {
            assert_eq!(t.name().parse::<Transform>().unwrap(), t);
        }
        assert!(matches!(
            "bogus".parse::<Transform>(),
            Err(EngineError::UnknownTransform(_))
        ));
    }

    #[test]
    fn test_topology_parse() {
        assert_eq!("tenerife".parse::<Topology>().unwrap(), Topology::Tenerife);
        assert_eq!("lnn:4".parse::<Topology>().unwrap(), Topology::Lnn(4));
        assert_eq!(
            "grid:2x3".parse::<Topology>().unwrap(),
            Topology::Grid { rows: 2, cols: 3 }
        );
        assert!("grid:2".parse::<Topology>().is_err());
        assert!("lnn:0".parse::<Topology>().is_err());
        assert!("star:3".parse::<Topology>().is_err());
    }

    #[test]
    fn test_topology_edges() {
        assert_eq!(Topology::Lnn(3).edges(), vec![(0, 1), (1, 2)]);
        assert_eq!(Topology::LnnRing(3).edges().len(), 3);
        assert_eq!(Topology::Grid { rows: 2, cols: 2 }.edges().len(), 4);
        assert_eq!(Topology::Tenerife.num_qubits(), 5);
    }
}
