//! Combining a filter's criteria into one inclusion decision per extension.
//!
//! Criteria fall in two groups. Primary criteria (ids, names, search text)
//! are OR'd together. Restrictive criteria (`InstallationTarget`,
//! `ExcludeWithFlags`) only narrow a result down. The evaluator runs a
//! two-stage pre-filter along those lines, then decides inclusion with a
//! final pass over the whole catalog:
//!
//! - any `ExcludeWithFlags` criterion that vetoes an extension removes it,
//! - otherwise any other matching criterion includes it.

use tracing::{debug, warn};

use stockroom_core::{Extension, FilterCriterion, FilterType, QueryFilter, SortBy, SortOrder};

use super::criterion::{self, ExtensionNamePolicy};
use super::sort::Direction;

/// Criteria that only restrict a result set.
pub fn is_restrictive(filter_type: FilterType) -> bool {
    matches!(
        filter_type,
        FilterType::ExcludeWithFlags | FilterType::InstallationTarget
    )
}

/// True when every criterion is restrictive, i.e. the query is an
/// unconstrained listing.
pub fn skip_first_stage(filter: &QueryFilter) -> bool {
    filter
        .criteria
        .iter()
        .all(|c| is_restrictive(c.filter_type))
}

/// Keep extensions matched by any primary criterion.
pub fn first_stage<'a>(
    filter: &QueryFilter,
    extensions: &'a [Extension],
    policy: ExtensionNamePolicy,
) -> Vec<&'a Extension> {
    extensions
        .iter()
        .filter(|ext| {
            filter
                .criteria
                .iter()
                .filter(|c| !is_restrictive(c.filter_type))
                .any(|c| criterion::matches(c, ext, policy))
        })
        .collect()
}

/// Keep extensions that pass every restrictive criterion.
pub fn second_stage<'a>(
    filter: &QueryFilter,
    candidates: Vec<&'a Extension>,
    policy: ExtensionNamePolicy,
) -> Vec<&'a Extension> {
    candidates
        .into_iter()
        .filter(|ext| {
            filter
                .criteria
                .iter()
                .filter(|c| is_restrictive(c.filter_type))
                .all(|c| criterion::matches(c, ext, policy))
        })
        .collect()
}

/// Final inclusion test for one extension.
pub fn includes(filter: &QueryFilter, ext: &Extension, policy: ExtensionNamePolicy) -> bool {
    if filter.criteria.iter().any(|c| criterion::excludes(c, ext)) {
        return false;
    }

    filter
        .criteria
        .iter()
        .filter(|c| c.filter_type != FilterType::ExcludeWithFlags)
        .any(|c| criterion::matches(c, ext, policy))
}

/// Extensions selected by `filter`, in catalog order.
pub fn evaluate<'a>(
    filter: &QueryFilter,
    extensions: &'a [Extension],
    policy: ExtensionNamePolicy,
) -> Vec<&'a Extension> {
    report_unsupported(&filter.criteria);

    let prefiltered = if skip_first_stage(filter) {
        second_stage(filter, extensions.iter().collect(), policy)
    } else {
        second_stage(filter, first_stage(filter, extensions, policy), policy)
    };

    let selected: Vec<&Extension> = extensions
        .iter()
        .filter(|ext| includes(filter, ext, policy))
        .collect();

    debug!(
        catalog = extensions.len(),
        prefiltered = prefiltered.len(),
        selected = selected.len(),
        "Filter evaluated"
    );
    for ext in &selected {
        debug!(extension = %ext.identity(), "Selected extension");
    }

    selected
}

/// Direction to sort in. A default order is inferred from the sort key.
pub fn resolve_direction(sort_by: SortBy, sort_order: SortOrder) -> Direction {
    match sort_order {
        SortOrder::Ascending => Direction::Ascending,
        SortOrder::Descending => Direction::Descending,
        SortOrder::Default | SortOrder::Unknown(_) => match sort_by {
            SortBy::Relevance
            | SortBy::LastUpdatedDate
            | SortBy::InstallCount
            | SortBy::PublishedDate
            | SortBy::AverageRating
            | SortBy::ReleaseDate
            | SortBy::TrendingDaily
            | SortBy::TrendingWeekly
            | SortBy::TrendingMonthly
            | SortBy::WeightedRating => Direction::Descending,
            SortBy::Title | SortBy::Publisher | SortBy::Author => Direction::Ascending,
            SortBy::Unknown(_) => Direction::Ascending,
        },
    }
}

/// Log each unimplemented filter type once for this evaluation.
fn report_unsupported(criteria: &[FilterCriterion]) {
    let mut seen: Vec<FilterType> = Vec::new();
    for c in criteria {
        if !criterion::is_implemented(c.filter_type) && !seen.contains(&c.filter_type) {
            warn!(
                filter_type = i32::from(c.filter_type),
                value = %c.value,
                "Unimplemented filter type"
            );
            seen.push(c.filter_type);
        }
        if c.filter_type == FilterType::ExcludeWithFlags && criterion::flag_mask(c).is_none() {
            warn!(value = %c.value, "ExcludeWithFlags value is not an integer mask, ignoring");
        }
    }
}
