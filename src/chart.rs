use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::data::Scalar;

/// Side-channel keys carried inside a series' `customdata` object.
pub const X_COLUMN_KEY: &str = "xColumn";
pub const Y_COLUMN_KEY: &str = "yColumn";

/// Recorded or inferred mapping from a series' axes to dataset columns.
///
/// Never trusted as-is: a binding must be re-validated against the live dataset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Binding {
    pub x_column: Option<String>,
    pub y_column: Option<String>,
}

impl Binding {
    pub fn new(x_column: impl Into<String>, y_column: impl Into<String>) -> Self {
        Self {
            x_column: Some(x_column.into()),
            y_column: Some(y_column.into()),
        }
    }

    pub fn is_absent(&self) -> bool {
        self.x_column.is_none() && self.y_column.is_none()
    }

    pub fn is_complete(&self) -> bool {
        self.x_column.is_some() && self.y_column.is_some()
    }
}

/// One plotted trace.
///
/// Only the data channels (`x`, `y`) and the binding side channel are modelled;
/// every other trace attribute is kept verbatim in `attributes`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Series {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<Vec<Scalar>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<Vec<Scalar>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customdata: Option<Value>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Series {
    pub fn new(x: Vec<Scalar>, y: Vec<Scalar>) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    pub fn with_binding(mut self, binding: &Binding) -> Self {
        self.attach_binding(binding);
        self
    }

    /// Read the binding out of `customdata`.
    ///
    /// Anything that is not a non-empty string counts as "not recorded".
    pub fn binding(&self) -> Binding {
        let obj = match &self.customdata {
            Some(Value::Object(obj)) => obj,
            _ => return Binding::default(),
        };
        let read = |key: &str| match obj.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        };
        Binding {
            x_column: read(X_COLUMN_KEY),
            y_column: read(Y_COLUMN_KEY),
        }
    }

    /// Merge the known axes of `binding` into `customdata`, keeping any other keys.
    /// Axes the binding leaves unset are not touched.
    pub fn attach_binding(&mut self, binding: &Binding) {
        if binding.is_absent() {
            return;
        }
        let mut obj = match self.customdata.take() {
            Some(Value::Object(obj)) => obj,
            Some(other) => {
                debug!(replaced = %other, "non-object customdata overwritten by binding");
                Map::new()
            }
            None => Map::new(),
        };
        if let Some(x) = &binding.x_column {
            obj.insert(X_COLUMN_KEY.to_string(), Value::String(x.clone()));
        }
        if let Some(y) = &binding.y_column {
            obj.insert(Y_COLUMN_KEY.to_string(), Value::String(y.clone()));
        }
        self.customdata = Some(Value::Object(obj));
    }
}

/// A chart: ordered series plus opaque layout configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Chart {
    #[serde(rename = "data", default)]
    pub series: Vec<Series>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub layout: Value,
}

impl Chart {
    pub fn new(series: Vec<Series>) -> Self {
        Self {
            series,
            layout: Value::Null,
        }
    }
}
