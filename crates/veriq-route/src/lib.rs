//! Qubit placement and SWAP routing.
//!
//! This crate maps a logical circuit onto a device's coupling map:
//!
//! - [`exact_layout`] searches for a placement that needs no routing, within
//!   call and time limits.
//! - [`heuristic_layout`] runs one of `trivial`, `dense`, `noise_adaptive` or
//!   `sabre`.
//! - [`embed`] pads the circuit with ancillas and applies a placement,
//!   producing a [`RegisterLayout`].
//! - [`check_map`] finds the first gate off the coupling map.
//! - [`route`] inserts SWAPs with one of `basic`, `stochastic`, `lookahead` or
//!   `sabre`.
//!
//! The [`MappingSolver`] trait bundles these so that callers can substitute
//! their own solver.
//!
//! # Example
//!
//! ```
//! use veriq_ir::{Circuit, QubitId};
//! use veriq_route::{CouplingMap, HeuristicSolver, MappingSolver, RoutingMethod, SolverParams};
//!
//! let mut circuit = Circuit::with_size("ghz", 3, 0);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(2)).unwrap();
//!
//! let coupling = CouplingMap::linear(3);
//! let solver = HeuristicSolver::new();
//! assert_eq!(solver.check_map(&circuit, &coupling), Some((0, 2)));
//!
//! let params = SolverParams::default().with_seed(1);
//! let routed = solver.route(&circuit, &coupling, RoutingMethod::Basic, &params).unwrap();
//! assert_eq!(routed.swaps, 1);
//! assert_eq!(solver.check_map(&routed.circuit, &coupling), None);
//! ```

pub mod coupling;
pub mod device;
pub mod embed;
pub mod error;
pub mod exact;
pub mod heuristic;
pub mod layout;
pub mod methods;
pub mod route;
pub mod solver;

pub use coupling::CouplingMap;
pub use device::{DeviceProperties, EdgeError};
pub use embed::{check_map, embed};
pub use error::{RouteError, RouteResult};
pub use exact::exact_layout;
pub use heuristic::heuristic_layout;
pub use layout::{ANCILLA_REGISTER, Placement, RegisterInfo, RegisterLayout, VirtualBit};
pub use methods::{
    ExactLimits, ExactOutcome, ExactStatus, LayoutMethod, RoutingMethod, SolverParams,
};
pub use route::{RoutedCircuit, route, seeded_rng};
pub use solver::{HeuristicSolver, MappingSolver};
