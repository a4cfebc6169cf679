//! Matching of a single criterion against a single extension.

use serde::{Deserialize, Serialize};

use stockroom_core::{Extension, FilterCriterion, FilterType};

/// What an `ExtensionName` criterion is compared against.
///
/// The upstream gallery has answered this both ways over time, so the
/// mirror lets the operator choose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtensionNamePolicy {
    /// Compare with the display name.
    #[default]
    DisplayName,
    /// Compare with `publisher.extension`.
    Identity,
}

/// Whether the matcher has a real rule for this filter type.
///
/// Everything else answers "no match".
pub fn is_implemented(filter_type: FilterType) -> bool {
    matches!(
        filter_type,
        FilterType::Id
            | FilterType::DisplayName
            | FilterType::Name
            | FilterType::ExtensionName
            | FilterType::PublisherName
            | FilterType::PublisherDisplayName
            | FilterType::InstallationTarget
            | FilterType::SearchText
            | FilterType::ExcludeWithFlags
    )
}

/// Decide whether `criterion` matches `ext`.
pub fn matches(criterion: &FilterCriterion, ext: &Extension, policy: ExtensionNamePolicy) -> bool {
    let value = criterion.value.as_str();
    match criterion.filter_type {
        FilterType::Id => ext.extension_id == value,
        FilterType::DisplayName => eq_fold(&ext.display_name, value),
        FilterType::Name => eq_fold(&ext.identity(), value),
        FilterType::ExtensionName => match policy {
            ExtensionNamePolicy::DisplayName => eq_fold(&ext.display_name, value),
            ExtensionNamePolicy::Identity => eq_fold(&ext.identity(), value),
        },
        FilterType::PublisherName => eq_fold(&ext.publisher.publisher_name, value),
        FilterType::PublisherDisplayName => eq_fold(&ext.publisher.display_name, value),
        // Target filtering is not implemented; every extension passes.
        FilterType::InstallationTarget => true,
        FilterType::SearchText => search_text(ext, value),
        // The exclusion itself is a veto applied by the evaluator, see `excludes`.
        FilterType::ExcludeWithFlags => true,
        FilterType::Tag
        | FilterType::Private
        | FilterType::Category
        | FilterType::ContributionType
        | FilterType::Featured
        | FilterType::FeaturedInCategory
        | FilterType::IncludeWithFlags
        | FilterType::Lcid
        | FilterType::InstallationTargetVersion
        | FilterType::InstallationTargetVersionRange
        | FilterType::VsixMetadata
        | FilterType::IncludeWithPublisherFlags
        | FilterType::OrganizationSharedWith
        | FilterType::ProductArchitecture
        | FilterType::TargetPlatform
        | FilterType::Unknown(_) => false,
    }
}

/// Integer mask carried by a flag criterion, if its value is one.
pub fn flag_mask(criterion: &FilterCriterion) -> Option<u32> {
    criterion.value.trim().parse().ok()
}

/// Whether an `ExcludeWithFlags` criterion vetoes `ext`.
///
/// The criterion value is an integer mask (usually `4096`, unpublished);
/// the extension is vetoed when it carries any of those flags.
pub fn excludes(criterion: &FilterCriterion, ext: &Extension) -> bool {
    if criterion.filter_type != FilterType::ExcludeWithFlags {
        return false;
    }
    match flag_mask(criterion) {
        Some(mask) => ext.flag_bits() & mask != 0,
        None => false,
    }
}

/// `*` and the empty string match everything; anything else is a
/// case-insensitive substring of the display name, extension name or
/// short description.
fn search_text(ext: &Extension, text: &str) -> bool {
    if text.is_empty() || text == "*" {
        return true;
    }

    let needle = text.to_lowercase();
    [&ext.display_name, &ext.extension_name, &ext.short_description]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

fn eq_fold(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}
