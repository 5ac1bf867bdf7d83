//! Method names and solver parameters.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::RouteError;
use crate::layout::Placement;

/// Heuristic placement strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LayoutMethod {
    /// Virtual qubit `i` on physical qubit `i`.
    Trivial,
    /// The most connected region of the device.
    Dense,
    /// Lowest-error couplers for the most used qubit pairs.
    NoiseAdaptive,
    /// Forward/backward SABRE passes from a random start.
    Sabre,
}

impl LayoutMethod {
    pub const ALL: [LayoutMethod; 4] = [
        LayoutMethod::Trivial,
        LayoutMethod::Dense,
        LayoutMethod::NoiseAdaptive,
        LayoutMethod::Sabre,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LayoutMethod::Trivial => "trivial",
            LayoutMethod::Dense => "dense",
            LayoutMethod::NoiseAdaptive => "noise_adaptive",
            LayoutMethod::Sabre => "sabre",
        }
    }
}

/// SWAP routing strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RoutingMethod {
    /// Walk each blocked gate along a shortest path.
    Basic,
    /// Best of many randomized greedy trials per layer.
    Stochastic,
    /// Bounded depth/width search over SWAP sequences.
    Lookahead,
    /// SABRE scoring with decay and an extended set.
    Sabre,
}

impl RoutingMethod {
    pub const ALL: [RoutingMethod; 4] = [
        RoutingMethod::Basic,
        RoutingMethod::Stochastic,
        RoutingMethod::Lookahead,
        RoutingMethod::Sabre,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RoutingMethod::Basic => "basic",
            RoutingMethod::Stochastic => "stochastic",
            RoutingMethod::Lookahead => "lookahead",
            RoutingMethod::Sabre => "sabre",
        }
    }
}

macro_rules! named_method {
    ($ty:ident, $err:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $ty {
            type Err = RouteError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $ty::ALL
                    .into_iter()
                    .find(|m| m.name() == s)
                    .ok_or_else(|| RouteError::$err(s.to_string()))
            }
        }

        impl TryFrom<String> for $ty {
            type Error = RouteError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.name().to_string()
            }
        }
    };
}

named_method!(LayoutMethod, UnknownLayoutMethod);
named_method!(RoutingMethod, UnknownRoutingMethod);

/// Budgets and seed shared by the placement and routing heuristics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverParams {
    /// Seed for the randomized methods. `None` draws from OS entropy.
    pub seed: Option<u64>,
    pub exact_call_limit: u64,
    pub exact_time_limit_secs: u64,
    pub sabre_layout_iterations: u32,
    pub stochastic_trials: u32,
    pub lookahead_depth: u32,
    pub lookahead_width: u32,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            seed: None,
            exact_call_limit: 30_000_000,
            exact_time_limit_secs: 60,
            sabre_layout_iterations: 4,
            stochastic_trials: 200,
            lookahead_depth: 5,
            lookahead_width: 6,
        }
    }
}

impl SolverParams {
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn exact_limits(&self) -> ExactLimits {
        ExactLimits {
            call_limit: self.exact_call_limit,
            time_limit: Duration::from_secs(self.exact_time_limit_secs),
        }
    }
}

/// Bounds on the exact placement search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExactLimits {
    pub call_limit: u64,
    pub time_limit: Duration,
}

impl Default for ExactLimits {
    fn default() -> Self {
        SolverParams::default().exact_limits()
    }
}

/// How the exact placement search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExactStatus {
    SolutionFound,
    NoSolutionFound,
    CallLimitReached,
    TimeLimitReached,
}

impl fmt::Display for ExactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExactStatus::SolutionFound => "solution found",
            ExactStatus::NoSolutionFound => "no solution found",
            ExactStatus::CallLimitReached => "call limit reached",
            ExactStatus::TimeLimitReached => "time limit reached",
        };
        f.write_str(s)
    }
}

/// Result of the exact placement search. `placement` is set iff a solution
/// was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactOutcome {
    pub status: ExactStatus,
    pub placement: Option<Placement>,
}
