//! Calibration data used by noise-aware placement.

use serde::{Deserialize, Serialize};

use crate::error::{RouteError, RouteResult};

/// Error rate of one coupler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeError {
    pub qubits: (u32, u32),
    pub error: f64,
}

/// Per-qubit and per-coupler error rates of a device.
///
/// Every table is optional. Missing entries read as `0.0`, so an empty
/// `DeviceProperties` makes every qubit and coupler look equally good.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceProperties {
    #[serde(default)]
    pub readout_error: Vec<f64>,
    #[serde(default)]
    pub single_qubit_error: Vec<f64>,
    #[serde(default)]
    pub two_qubit_error: Vec<EdgeError>,
}

impl DeviceProperties {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_readout_errors(mut self, errors: Vec<f64>) -> Self {
        self.readout_error = errors;
        self
    }

    #[must_use]
    pub fn with_single_qubit_errors(mut self, errors: Vec<f64>) -> Self {
        self.single_qubit_error = errors;
        self
    }

    #[must_use]
    pub fn with_edge_error(mut self, q1: u32, q2: u32, error: f64) -> Self {
        self.two_qubit_error.push(EdgeError {
            qubits: (q1, q2),
            error,
        });
        self
    }

    pub fn readout(&self, qubit: u32) -> f64 {
        self.readout_error.get(qubit as usize).copied().unwrap_or(0.0)
    }

    pub fn single_qubit(&self, qubit: u32) -> f64 {
        self.single_qubit_error
            .get(qubit as usize)
            .copied()
            .unwrap_or(0.0)
    }

    /// Two-qubit error of the coupler between `q1` and `q2`, in either direction.
    pub fn edge(&self, q1: u32, q2: u32) -> f64 {
        self.two_qubit_error
            .iter()
            .find(|e| e.qubits == (q1, q2) || e.qubits == (q2, q1))
            .map_or(0.0, |e| e.error)
    }

    /// Combined cost of measuring and driving a qubit.
    pub fn qubit_cost(&self, qubit: u32) -> f64 {
        self.readout(qubit) + self.single_qubit(qubit)
    }

    /// Check table sizes and that every rate lies in `[0, 1]`.
    pub fn validate(&self, num_qubits: u32) -> RouteResult<()> {
        let n = num_qubits as usize;
        if self.readout_error.len() > n || self.single_qubit_error.len() > n {
            return Err(RouteError::InvalidCouplingMap(format!(
                "error tables larger than the {num_qubits}-qubit device"
            )));
        }
        let rates = self
            .readout_error
            .iter()
            .chain(&self.single_qubit_error)
            .chain(self.two_qubit_error.iter().map(|e| &e.error));
        for &rate in rates {
            if !(0.0..=1.0).contains(&rate) {
                return Err(RouteError::InvalidCouplingMap(format!(
                    "error rate {rate} outside [0, 1]"
                )));
            }
        }
        for e in &self.two_qubit_error {
            if e.qubits.0 >= num_qubits || e.qubits.1 >= num_qubits {
                return Err(RouteError::InvalidCouplingMap(format!(
                    "error entry for coupler {:?} outside the device",
                    e.qubits
                )));
            }
        }
        Ok(())
    }
}
