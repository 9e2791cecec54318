//! User-facing wording for reconciliation results.
//!
//! The reconciliation core only reports flags; this is where they become one
//! message for the person who asked for the refresh.

use crate::reconcile::Diagnostics;

pub const UNRESOLVABLE_NOTICE: &str =
    "Some traces lack column metadata and could not be inferred. Regenerate the chart to enable full refresh.";
pub const STALE_NOTICE: &str = "Some chart columns no longer exist in the grid data.";
pub const MISSING_DATASET_NOTICE: &str = "No data available to refresh the chart";

/// One consolidated warning for the whole chart, or `None` when every series refreshed.
pub fn compose_warning(diagnostics: &Diagnostics) -> Option<String> {
    let parts: Vec<&str> = [
        (diagnostics.has_unresolvable(), UNRESOLVABLE_NOTICE),
        (diagnostics.has_stale(), STALE_NOTICE),
    ]
    .into_iter()
    .filter_map(|(present, text)| present.then_some(text))
    .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}
