//! Experience records
//!
//! Input arrives as loosely shaped JSON. [`Experience::from_value`] is the one
//! place where missing or mistyped fields get their defaults, so the learner
//! only ever sees fully populated records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Task type used when a record does not name one
pub const DEFAULT_TASK_TYPE: &str = "general";

/// Approach used when a record's strategy does not name one
pub const DEFAULT_APPROACH: &str = "default";

/// How a task was attempted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Strategy {
    /// Strategy identifier used as the statistics key
    pub approach: String,
    /// Any other strategy parameters, carried verbatim
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl Default for Strategy {
    fn default() -> Self {
        Self {
            approach: DEFAULT_APPROACH.to_string(),
            params: Map::new(),
        }
    }
}

/// How an attempt turned out
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Outcome {
    /// Numeric score, always finite
    pub score: f64,
    /// Any other outcome metrics, carried verbatim
    #[serde(flatten)]
    pub metrics: Map<String, Value>,
}

/// A single recorded experience
///
/// Deserialization goes through [`Experience::from_value`] and never fails on
/// shape: `{"outcome": "success"}` is accepted as a `general`/`default`
/// experience with score `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct Experience {
    pub task_type: String,
    pub strategy: Strategy,
    pub outcome: Outcome,
    /// Top-level fields other than the three above (inputs, outputs, notes)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Experience {
    /// Build a record from its three keys
    pub fn new(task_type: impl Into<String>, approach: impl Into<String>, score: f64) -> Self {
        Self {
            task_type: task_type.into(),
            strategy: Strategy {
                approach: approach.into(),
                params: Map::new(),
            },
            outcome: Outcome {
                score: finite_or_zero(score),
                metrics: Map::new(),
            },
            extra: Map::new(),
        }
    }

    /// Attach an extra top-level field such as `input` or `output`
    pub fn with_detail(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Normalize an arbitrary JSON value into an experience.
    ///
    /// Non-object input yields an all-default record. A `strategy` or
    /// `outcome` that is not an object counts as empty, and a score that is
    /// not a finite number counts as missing.
    pub fn from_value(value: Value) -> Self {
        let mut fields = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        let task_type = fields
            .remove("task_type")
            .and_then(identifier)
            .unwrap_or_else(|| DEFAULT_TASK_TYPE.to_string());

        let strategy = match fields.remove("strategy") {
            Some(Value::Object(mut params)) => {
                let approach = params
                    .remove("approach")
                    .and_then(identifier)
                    .unwrap_or_else(|| DEFAULT_APPROACH.to_string());
                Strategy { approach, params }
            }
            _ => Strategy::default(),
        };

        let outcome = match fields.remove("outcome") {
            Some(Value::Object(mut metrics)) => {
                let score = metrics
                    .remove("score")
                    .and_then(|s| s.as_f64())
                    .map(finite_or_zero)
                    .unwrap_or(0.0);
                Outcome { score, metrics }
            }
            _ => Outcome::default(),
        };

        Self {
            task_type,
            strategy,
            outcome,
            extra: fields,
        }
    }

    /// Strategy approach identifier
    pub fn approach(&self) -> &str {
        &self.strategy.approach
    }

    /// Outcome score
    pub fn score(&self) -> f64 {
        self.outcome.score
    }
}

impl From<Value> for Experience {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

/// Strings are used as-is, null means absent, other scalars use their JSON text.
fn identifier(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn finite_or_zero(score: f64) -> f64 {
    if score.is_finite() { score } else { 0.0 }
}
