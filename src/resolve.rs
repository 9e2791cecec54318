use tracing::debug;

use crate::chart::{Binding, Series};
use crate::data::{Dataset, Scalar};
use crate::matcher::find_column;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Where an axis candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingSource {
    /// Read from the series' side-channel metadata.
    Stored,
    /// Recovered by matching the series' values against dataset columns.
    Inferred,
}

/// Both axes bound to columns present in the dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPair {
    pub x: String,
    pub y: String,
}

impl From<&ColumnPair> for Binding {
    fn from(pair: &ColumnPair) -> Self {
        Binding::new(pair.x.clone(), pair.y.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingOutcome {
    /// Both axes known and present in the dataset.
    Resolved(ColumnPair),
    /// No stored or inferable column for the listed axes.
    UnresolvableBinding { axes: Vec<Axis> },
    /// Stored metadata names columns the dataset no longer has.
    StaleBinding { columns: Vec<String> },
}

/// Candidate columns for a series plus the verdict on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBinding {
    pub binding: Binding,
    pub outcome: BindingOutcome,
}

#[derive(Debug, Clone)]
struct AxisCandidate {
    column: String,
    source: BindingSource,
}

/// Resolve both axes of `series` against `dataset`.
///
/// Stored metadata is taken verbatim when present; otherwise the axis values
/// are matched against the dataset's columns. Never mutates the series.
pub fn resolve_binding(series: &Series, dataset: &Dataset) -> ResolvedBinding {
    let stored = series.binding();

    // 1. Candidate per axis
    let x = resolve_axis(stored.x_column.as_deref(), series.x.as_deref(), dataset);
    let y = resolve_axis(stored.y_column.as_deref(), series.y.as_deref(), dataset);

    let binding = Binding {
        x_column: x.as_ref().map(|c| c.column.clone()),
        y_column: y.as_ref().map(|c| c.column.clone()),
    };

    // 2. Missing candidates make the series unresolvable
    let mut axes = Vec::new();
    if x.is_none() {
        axes.push(Axis::X);
    }
    if y.is_none() {
        axes.push(Axis::Y);
    }
    let (x, y) = match (x, y) {
        (Some(x), Some(y)) => (x, y),
        _ => {
            debug!(?axes, "series binding could not be inferred");
            return ResolvedBinding {
                binding,
                outcome: BindingOutcome::UnresolvableBinding { axes },
            };
        }
    };

    // 3. Stored candidates must still exist in the dataset
    let columns: Vec<String> = [&x, &y]
        .into_iter()
        .filter(|c| c.source == BindingSource::Stored && !dataset.has_column(&c.column))
        .map(|c| c.column.clone())
        .collect();
    if !columns.is_empty() {
        debug!(?columns, "series binding references dropped columns");
        return ResolvedBinding {
            binding,
            outcome: BindingOutcome::StaleBinding { columns },
        };
    }

    debug!(
        x = %x.column,
        y = %y.column,
        x_source = ?x.source,
        y_source = ?y.source,
        "series binding resolved"
    );
    ResolvedBinding {
        binding,
        outcome: BindingOutcome::Resolved(ColumnPair {
            x: x.column,
            y: y.column,
        }),
    }
}

/// Stored-or-inferred binding without validation.
///
/// Axes that can be neither read nor inferred stay unset.
pub fn infer_binding(series: &Series, dataset: &Dataset) -> Binding {
    let stored = series.binding();
    Binding {
        x_column: resolve_axis(stored.x_column.as_deref(), series.x.as_deref(), dataset)
            .map(|c| c.column),
        y_column: resolve_axis(stored.y_column.as_deref(), series.y.as_deref(), dataset)
            .map(|c| c.column),
    }
}

fn resolve_axis(
    stored: Option<&str>,
    values: Option<&[Scalar]>,
    dataset: &Dataset,
) -> Option<AxisCandidate> {
    if let Some(column) = stored {
        return Some(AxisCandidate {
            column: column.to_string(),
            source: BindingSource::Stored,
        });
    }
    find_column(values, dataset).map(|column| AxisCandidate {
        column: column.to_string(),
        source: BindingSource::Inferred,
    })
}
