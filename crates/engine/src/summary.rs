// JSON shapes printed on stdout.
//
//   grouped:  {"A": 10, "B": 5}
//   total:    {"total_sum": 15}
//   failure:  {"error": "column \"Value\" not found"}

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Number, Value};

pub const TOTAL_SUM_KEY: &str = "total_sum";

/// Largest magnitude at which every integer is exactly representable in f64.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Summary {
    /// Per-category sums, keys sorted.
    Grouped(BTreeMap<String, f64>),
    /// Sum over every row when no category column is used.
    Total(f64),
}

impl Summary {
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        match self {
            Summary::Grouped(groups) => {
                for (key, sum) in groups {
                    obj.insert(key.clone(), number_value(*sum));
                }
            }
            Summary::Total(total) => {
                obj.insert(TOTAL_SUM_KEY.to_string(), number_value(*total));
            }
        }
        Value::Object(obj)
    }
}

/// Whole sums render as JSON integers; anything else as a float.
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INT {
        // -0.0 prints as 0
        return Value::Number(Number::from(n as i64));
    }
    match Number::from_f64(n) {
        Some(num) => Value::Number(num),
        None => Value::Null,
    }
}

/// Failure-path document: `{"error": message}`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub error: String,
}

impl ErrorReport {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::json!({ "error": self.error })
    }
}
