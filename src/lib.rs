// Library exports for chartsync

pub mod chart;
pub mod data;
pub mod error;
pub mod export;
pub mod ingest;
pub mod matcher;
pub mod notice;
pub mod rebuild;
pub mod reconcile;
pub mod resolve;

pub use chart::{Binding, Chart, Series};
pub use data::{Dataset, Row, Scalar};
pub use reconcile::{annotate, reconcile, Diagnostics, Reconciliation, UpdateSummary};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ExportOptions {
    #[serde(default = "default_filename")]
    pub filename: String,
}

fn default_filename() -> String { "export.csv".to_string() }

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            filename: default_filename(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_defaults() {
        let options: ExportOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.filename, "export.csv");

        let options: ExportOptions = serde_json::from_str(r#"{"filename":"q1.csv"}"#).unwrap();
        assert_eq!(options.filename, "q1.csv");
    }
}
