use tracing::{info, warn};

use crate::chart::Chart;
use crate::data::Dataset;
use crate::error::ReconcileError;
use crate::rebuild::rebuild;
use crate::resolve::{infer_binding, resolve_binding, Axis, BindingOutcome};

/// Why a series was left with its previous arrays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesIssue {
    UnresolvableBinding { axes: Vec<Axis> },
    StaleBinding { columns: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesReport {
    pub index: usize,
    pub issue: SeriesIssue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateSummary {
    FullyUpdated,
    PartiallyUpdated,
    Unchanged,
}

/// Aggregated per-series outcomes of one reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Diagnostics {
    pub series_count: usize,
    /// Indices of series whose arrays were rebuilt.
    pub rebuilt: Vec<usize>,
    /// Series left untouched, in index order.
    pub issues: Vec<SeriesReport>,
}

impl Diagnostics {
    /// Some series lack a recoverable binding.
    pub fn has_unresolvable(&self) -> bool {
        self.issues
            .iter()
            .any(|r| matches!(r.issue, SeriesIssue::UnresolvableBinding { .. }))
    }

    /// Some bindings reference columns no longer in the dataset.
    pub fn has_stale(&self) -> bool {
        self.issues
            .iter()
            .any(|r| matches!(r.issue, SeriesIssue::StaleBinding { .. }))
    }

    pub fn affected_indices(&self) -> Vec<usize> {
        self.issues.iter().map(|r| r.index).collect()
    }

    pub fn summary(&self) -> UpdateSummary {
        if self.rebuilt.is_empty() {
            UpdateSummary::Unchanged
        } else if self.issues.is_empty() {
            UpdateSummary::FullyUpdated
        } else {
            UpdateSummary::PartiallyUpdated
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub chart: Chart,
    pub diagnostics: Diagnostics,
}

/// Re-derive every series of `chart` from `dataset`.
///
/// Series are handled independently: a series that cannot be resolved keeps
/// its arrays and is reported in the diagnostics. The only failure is a
/// missing dataset. The input chart is never mutated.
pub fn reconcile(chart: &Chart, dataset: Option<&Dataset>) -> Result<Reconciliation, ReconcileError> {
    let dataset = dataset.ok_or(ReconcileError::MissingDataset)?;

    let mut diagnostics = Diagnostics {
        series_count: chart.series.len(),
        ..Default::default()
    };
    let mut series = Vec::with_capacity(chart.series.len());

    for (index, current) in chart.series.iter().enumerate() {
        let resolved = resolve_binding(current, dataset);
        match resolved.outcome {
            BindingOutcome::Resolved(columns) => {
                series.push(rebuild(current, &columns, dataset));
                diagnostics.rebuilt.push(index);
            }
            BindingOutcome::UnresolvableBinding { axes } => {
                warn!(index, ?axes, "series has no recoverable binding");
                series.push(current.clone());
                diagnostics.issues.push(SeriesReport {
                    index,
                    issue: SeriesIssue::UnresolvableBinding { axes },
                });
            }
            BindingOutcome::StaleBinding { columns } => {
                warn!(index, ?columns, "series binding is stale");
                series.push(current.clone());
                diagnostics.issues.push(SeriesReport {
                    index,
                    issue: SeriesIssue::StaleBinding { columns },
                });
            }
        }
    }

    info!(
        series = diagnostics.series_count,
        rebuilt = diagnostics.rebuilt.len(),
        summary = ?diagnostics.summary(),
        "chart reconciled"
    );

    Ok(Reconciliation {
        chart: Chart {
            series,
            layout: chart.layout.clone(),
        },
        diagnostics,
    })
}

/// Attach whatever bindings can be inferred to a freshly loaded chart.
///
/// Stored axes are kept, missing axes are filled in when a matching column
/// exists, and the data arrays are left alone.
pub fn annotate(chart: &Chart, dataset: &Dataset) -> Chart {
    let series = chart
        .series
        .iter()
        .map(|current| {
            let mut annotated = current.clone();
            annotated.attach_binding(&infer_binding(current, dataset));
            annotated
        })
        .collect();

    Chart {
        series,
        layout: chart.layout.clone(),
    }
}
