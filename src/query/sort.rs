//! Ordering of matched extensions.

use std::cmp::Ordering;

use tracing::warn;

use stockroom_core::{Extension, SortBy};

/// Resolved sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Whether `compare` has a rule for this key. Other keys compare equal.
pub fn is_sortable(sort_by: SortBy) -> bool {
    !matches!(
        sort_by,
        SortBy::TrendingDaily | SortBy::TrendingWeekly | SortBy::TrendingMonthly | SortBy::Unknown(_)
    )
}

/// Compare two extensions by `sort_by`, ascending.
pub fn compare(a: &Extension, b: &Extension, sort_by: SortBy) -> Ordering {
    match sort_by {
        // Relevance ranking is not implemented; install count stands in.
        SortBy::Relevance | SortBy::InstallCount => statistic(a, b, "install"),
        SortBy::LastUpdatedDate => a.last_updated.cmp(&b.last_updated),
        SortBy::PublishedDate => a.published_date.cmp(&b.published_date),
        SortBy::ReleaseDate => a.release_date.cmp(&b.release_date),
        SortBy::Title => a.display_name.cmp(&b.display_name),
        SortBy::Publisher | SortBy::Author => a
            .publisher
            .publisher_name
            .cmp(&b.publisher.publisher_name),
        SortBy::AverageRating => statistic(a, b, "averagerating"),
        SortBy::WeightedRating => statistic(a, b, "weightedRating"),
        SortBy::TrendingDaily
        | SortBy::TrendingWeekly
        | SortBy::TrendingMonthly
        | SortBy::Unknown(_) => Ordering::Equal,
    }
}

/// Stable-sort ascending by `sort_by`, then reverse the whole sequence for
/// a descending direction.
pub fn sort(extensions: &mut [&Extension], sort_by: SortBy, direction: Direction) {
    if is_sortable(sort_by) {
        extensions.sort_by(|a, b| compare(a, b, sort_by));
    } else {
        warn!(sort_by = i32::from(sort_by), "Unsupported sort key, keeping catalog order");
    }

    if direction == Direction::Descending {
        extensions.reverse();
    }
}

fn statistic(a: &Extension, b: &Extension, name: &str) -> Ordering {
    a.statistic(name).total_cmp(&b.statistic(name))
}
