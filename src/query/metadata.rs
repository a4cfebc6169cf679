//! Result-set facets for the response envelope.

use std::collections::{BTreeMap, BTreeSet};

use stockroom_core::{Extension, MetadataItem, ResultMetadata};

pub const RESULT_COUNT: &str = "ResultCount";
pub const TOTAL_COUNT: &str = "TotalCount";
pub const CATEGORIES: &str = "Categories";
pub const TARGET_PLATFORMS: &str = "TargetPlatforms";

/// Facets over the full matched set, in the fixed order
/// `ResultCount`, `Categories`, `TargetPlatforms`.
pub fn aggregate(extensions: &[Extension]) -> Vec<ResultMetadata> {
    vec![
        ResultMetadata {
            metadata_type: RESULT_COUNT.to_string(),
            metadata_items: vec![MetadataItem {
                name: TOTAL_COUNT.to_string(),
                count: count(extensions.len()),
            }],
        },
        facet(CATEGORIES, extensions, |ext| {
            ext.categories.iter().map(|c| c.to_lowercase()).collect()
        }),
        facet(TARGET_PLATFORMS, extensions, |ext| {
            ext.versions
                .iter()
                .map(|v| v.target_platform.to_lowercase())
                .collect()
        }),
    ]
}

/// Number of extensions carrying each key. A key repeated within one
/// extension is counted once.
fn facet<F>(name: &str, extensions: &[Extension], keys: F) -> ResultMetadata
where
    F: Fn(&Extension) -> BTreeSet<String>,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for ext in extensions {
        for key in keys(ext) {
            *counts.entry(key).or_default() += 1;
        }
    }

    ResultMetadata {
        metadata_type: name.to_string(),
        metadata_items: counts
            .into_iter()
            .map(|(name, n)| MetadataItem {
                name,
                count: count(n),
            })
            .collect(),
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stockroom_core::ExtensionVersion;

    fn ext(categories: &[&str], platforms: &[&str]) -> Extension {
        Extension {
            categories: categories.iter().map(|c| c.to_string()).collect(),
            versions: platforms
                .iter()
                .map(|p| ExtensionVersion {
                    version: "1.0.0".into(),
                    target_platform: p.to_string(),
                    ..ExtensionVersion::default()
                })
                .collect(),
            ..Extension::default()
        }
    }

    fn items(group: &ResultMetadata) -> Vec<(&str, u32)> {
        group
            .metadata_items
            .iter()
            .map(|i| (i.name.as_str(), i.count))
            .collect()
    }

    #[test]
    fn groups_in_fixed_order() {
        let groups = aggregate(&[]);
        let types: Vec<&str> = groups.iter().map(|g| g.metadata_type.as_str()).collect();
        assert_eq!(types, vec!["ResultCount", "Categories", "TargetPlatforms"]);
        assert_eq!(items(&groups[0]), vec![("TotalCount", 0)]);
        assert!(groups[1].metadata_items.is_empty());
    }

    #[test]
    fn categories_counted_per_extension() {
        let extensions = [
            ext(&["Themes"], &[]),
            ext(&["Themes", "Linters"], &[]),
            ext(&["Linters"], &[]),
        ];
        let groups = aggregate(&extensions);
        assert_eq!(items(&groups[0]), vec![("TotalCount", 3)]);
        assert_eq!(items(&groups[1]), vec![("linters", 2), ("themes", 2)]);
    }

    #[test]
    fn duplicate_keys_within_extension_count_once() {
        let extensions = [
            ext(&["Themes", "THEMES"], &["linux-x64", "win32-x64", "linux-x64"]),
            ext(&["Other"], &["Linux-X64"]),
        ];
        let groups = aggregate(&extensions);
        assert_eq!(items(&groups[1]), vec![("other", 1), ("themes", 1)]);
        assert_eq!(items(&groups[2]), vec![("linux-x64", 2), ("win32-x64", 1)]);
    }

    #[test]
    fn universal_versions_count_under_empty_name() {
        let groups = aggregate(&[ext(&[], &[""])]);
        assert_eq!(items(&groups[2]), vec![("", 1)]);
    }
}
