//! Pipeline configuration.
//!
//! A [`PipelineConfig`] is immutable once built. Every name in it is checked
//! against a closed set when the configuration is constructed, whether through
//! [`PipelineConfigBuilder`] or by deserializing a YAML or JSON file, and an
//! unknown name fails the same way on both routes.
//!
//! ```
//! use veriq_compile::PipelineConfig;
//!
//! let config = PipelineConfig::builder()
//!     .pre(["not_propagation", "cancel_single_qubit_gates"])
//!     .layout("dense")
//!     .routing("lookahead")
//!     .seed(7)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.pre().len(), 2);
//!
//! assert!(PipelineConfig::builder().layout("bogus").build().is_err());
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use veriq_engine::Transform;
use veriq_route::{LayoutMethod, RoutingMethod, SolverParams};

use crate::error::{CompileError, CompileResult};

/// A transformation the pipeline may be asked to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OptimizationName {
    OptimizeIbm,
    NotPropagation,
    HadamardReduction,
    CancelSingleQubitGates,
    CancelTwoQubitGates,
    MergeRotations,
    OptimizeNam,
    Optimize,
    /// Engine-side greedy routing; needs an established layout and graph.
    SimpleMap,
}

impl OptimizationName {
    pub const ALL: [OptimizationName; 9] = [
        OptimizationName::OptimizeIbm,
        OptimizationName::NotPropagation,
        OptimizationName::HadamardReduction,
        OptimizationName::CancelSingleQubitGates,
        OptimizationName::CancelTwoQubitGates,
        OptimizationName::MergeRotations,
        OptimizationName::OptimizeNam,
        OptimizationName::Optimize,
        OptimizationName::SimpleMap,
    ];

    pub fn name(self) -> &'static str {
        match self.transform() {
            Some(t) => t.name(),
            None => "simple_map",
        }
    }

    /// The engine transformation, or `None` for the routing-dependent step.
    pub fn transform(self) -> Option<Transform> {
        match self {
            OptimizationName::OptimizeIbm => Some(Transform::OptimizeIbm),
            OptimizationName::NotPropagation => Some(Transform::NotPropagation),
            OptimizationName::HadamardReduction => Some(Transform::HadamardReduction),
            OptimizationName::CancelSingleQubitGates => Some(Transform::CancelSingleQubitGates),
            OptimizationName::CancelTwoQubitGates => Some(Transform::CancelTwoQubitGates),
            OptimizationName::MergeRotations => Some(Transform::MergeRotations),
            OptimizationName::OptimizeNam => Some(Transform::OptimizeNam),
            OptimizationName::Optimize => Some(Transform::Optimize),
            OptimizationName::SimpleMap => None,
        }
    }
}

impl fmt::Display for OptimizationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OptimizationName {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OptimizationName::ALL
            .into_iter()
            .find(|o| o.name() == s)
            .ok_or_else(|| CompileError::InvalidConfiguration {
                kind: "optimization",
                name: s.to_string(),
            })
    }
}

impl TryFrom<String> for OptimizationName {
    type Error = CompileError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OptimizationName> for String {
    fn from(value: OptimizationName) -> Self {
        value.name().to_string()
    }
}

/// What the pipeline runs and with which budgets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPipelineConfig")]
pub struct PipelineConfig {
    pre: Vec<OptimizationName>,
    post: Vec<OptimizationName>,
    layout: LayoutMethod,
    routing: RoutingMethod,
    solver: SolverParams,
    deadline_ms: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pre: vec![],
            post: vec![OptimizationName::Optimize],
            layout: LayoutMethod::Sabre,
            routing: RoutingMethod::Sabre,
            solver: SolverParams::default(),
            deadline_ms: None,
        }
    }
}

/// A configuration file as written, with every name still a string.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawPipelineConfig {
    pre: Vec<String>,
    post: Option<Vec<String>>,
    layout: Option<String>,
    routing: Option<String>,
    solver: SolverParams,
    deadline_ms: Option<u64>,
}

impl TryFrom<RawPipelineConfig> for PipelineConfig {
    type Error = CompileError;

    fn try_from(raw: RawPipelineConfig) -> Result<Self, Self::Error> {
        PipelineConfigBuilder {
            pre: raw.pre,
            post: raw.post,
            layout: raw.layout,
            routing: raw.routing,
            solver: raw.solver,
            deadline: raw.deadline_ms.map(Duration::from_millis),
        }
        .build()
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Parse YAML. Malformed input is a [`CompileError::Config`]; an unknown
    /// name is a [`CompileError::InvalidConfiguration`], as from the builder.
    pub fn from_yaml_str(source: &str) -> CompileResult<Self> {
        serde_yaml_ng::from_str::<RawPipelineConfig>(source)
            .map_err(|e| CompileError::Config(e.to_string()))?
            .try_into()
    }

    pub fn from_json_str(source: &str) -> CompileResult<Self> {
        serde_json::from_str::<RawPipelineConfig>(source)
            .map_err(|e| CompileError::Config(e.to_string()))?
            .try_into()
    }

    /// Load a `.json` file as JSON and anything else as YAML.
    pub fn load(path: &Path) -> CompileResult<Self> {
        let source = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&source),
            _ => Self::from_yaml_str(&source),
        }
    }

    pub fn to_yaml(&self) -> CompileResult<String> {
        serde_yaml_ng::to_string(self).map_err(|e| CompileError::Config(e.to_string()))
    }

    pub fn pre(&self) -> &[OptimizationName] {
        &self.pre
    }

    pub fn post(&self) -> &[OptimizationName] {
        &self.post
    }

    pub fn layout(&self) -> LayoutMethod {
        self.layout
    }

    pub fn routing(&self) -> RoutingMethod {
        self.routing
    }

    pub fn solver(&self) -> &SolverParams {
        &self.solver
    }

    /// Wall-clock budget for a whole run, checked between passes.
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }

    /// A builder seeded with this configuration.
    pub fn to_builder(&self) -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            pre: self.pre.iter().map(ToString::to_string).collect(),
            post: Some(self.post.iter().map(ToString::to_string).collect()),
            layout: Some(self.layout.to_string()),
            routing: Some(self.routing.to_string()),
            solver: self.solver.clone(),
            deadline: self.deadline(),
        }
    }
}

/// Collects names as strings and checks them all in [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    pre: Vec<String>,
    post: Option<Vec<String>>,
    layout: Option<String>,
    routing: Option<String>,
    solver: SolverParams,
    deadline: Option<Duration>,
}

impl PipelineConfigBuilder {
    #[must_use]
    pub fn pre<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pre = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn post<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.post = Some(names.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn layout(mut self, name: impl Into<String>) -> Self {
        self.layout = Some(name.into());
        self
    }

    #[must_use]
    pub fn routing(mut self, name: impl Into<String>) -> Self {
        self.routing = Some(name.into());
        self
    }

    #[must_use]
    pub fn solver(mut self, params: SolverParams) -> Self {
        self.solver = params;
        self
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.solver.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn build(self) -> CompileResult<PipelineConfig> {
        let defaults = PipelineConfig::default();
        let parse_list = |names: Vec<String>| {
            names
                .iter()
                .map(|n| n.parse::<OptimizationName>())
                .collect::<CompileResult<Vec<_>>>()
        };
        let layout = match self.layout {
            Some(name) => name
                .parse()
                .map_err(|_| CompileError::InvalidConfiguration {
                    kind: "layout method",
                    name,
                })?,
            None => defaults.layout,
        };
        let routing = match self.routing {
            Some(name) => name
                .parse()
                .map_err(|_| CompileError::InvalidConfiguration {
                    kind: "routing method",
                    name,
                })?,
            None => defaults.routing,
        };
        Ok(PipelineConfig {
            pre: parse_list(self.pre)?,
            post: match self.post {
                Some(names) => parse_list(names)?,
                None => defaults.post,
            },
            layout,
            routing,
            solver: self.solver,
            deadline_ms: self
                .deadline
                .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
        })
    }
}
