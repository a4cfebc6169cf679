//! Gallery wire types for the stockroom marketplace mirror.
//!
//! This crate provides the data types spoken by the marketplace gallery
//! query endpoint. They are shared by the stockroom server and by clients
//! that talk to it (or to the upstream marketplace, which uses the same
//! schema).
//!
//! # Overview
//!
//! The main types are:
//!
//! - [`Extension`] - A catalog entry, with its [`Publisher`] and [`ExtensionVersion`]s
//! - [`QueryRequest`] - A gallery query, made of one or more [`QueryFilter`]s
//! - [`FilterCriterion`] - One `(filterType, value)` constraint inside a filter
//! - [`QueryResponse`] - Matched extensions plus [`ResultMetadata`] facets
//! - [`QueryResults`] - The `{"results": [...]}` envelope around a response
//!
//! # Example
//!
//! Querying a mirror for an extension by identity:
//!
//! ```ignore
//! use stockroom_core::{FilterCriterion, FilterType, QueryFilter, QueryFlags, QueryRequest, QueryResults};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let request = QueryRequest {
//!     filters: vec![QueryFilter {
//!         criteria: vec![FilterCriterion::new(FilterType::Name, "rust-lang.rust-analyzer")],
//!         page_size: 1,
//!         ..QueryFilter::default()
//!     }],
//!     flags: QueryFlags::INCLUDE_FILES | QueryFlags::INCLUDE_ASSET_URI,
//!     ..QueryRequest::default()
//! };
//!
//! let results: QueryResults = reqwest::Client::new()
//!     .post("http://localhost:8080/_apis/public/gallery/extensionquery")
//!     .json(&request)
//!     .send()
//!     .await?
//!     .json()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::ops::BitOr;

use serde::{Deserialize, Deserializer, Serialize};

/// Decodes `null` as the type's default value.
///
/// Catalog files fetched from the upstream service carry `null` for empty
/// lists, so every list field goes through this.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Declares an enum that travels as a bare integer on the wire.
///
/// Integers outside the known set are kept in an `Unknown` variant so that
/// an unrecognized tag round-trips instead of failing the whole request.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "i32", into = "i32")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// A value this crate does not know about.
            Unknown(i32),
        }

        impl From<i32> for $name {
            fn from(value: i32) -> Self {
                match value {
                    $( $value => $name::$variant, )+
                    other => $name::Unknown(other),
                }
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                match value {
                    $( $name::$variant => $value, )+
                    $name::Unknown(other) => other,
                }
            }
        }
    };
}

wire_enum! {
    /// The kind of constraint a [`FilterCriterion`] expresses.
    pub enum FilterType {
        /// Tag values, OR'd with each other.
        Tag = 1,
        /// Display name of the extension.
        DisplayName = 2,
        /// Scope tokens for private extensions.
        Private = 3,
        /// Extension id (a GUID string).
        Id = 4,
        /// Category name.
        Category = 5,
        /// Indexed contribution type.
        ContributionType = 6,
        /// `publisher.extension` identity.
        Name = 7,
        /// Target consumer, e.g. `Microsoft.VisualStudio.Code`.
        InstallationTarget = 8,
        /// Featured extensions; no value.
        Featured = 9,
        /// Free text typed by the user.
        SearchText = 10,
        /// Featured within the named category.
        FeaturedInCategory = 11,
        /// Integer flag mask; matching extensions are removed.
        ExcludeWithFlags = 12,
        /// Integer flag mask; matching extensions are included.
        IncludeWithFlags = 13,
        /// Locale id.
        Lcid = 14,
        /// Installation target version.
        InstallationTargetVersion = 15,
        /// Installation target version range, `low-high`.
        InstallationTargetVersionRange = 16,
        /// VSIX metadata key and value.
        VsixMetadata = 17,
        /// Publisher internal name.
        PublisherName = 18,
        /// Publisher display name.
        PublisherDisplayName = 19,
        /// Publisher flag mask.
        IncludeWithPublisherFlags = 20,
        /// Organization the extension is shared with.
        OrganizationSharedWith = 21,
        /// VS IDE product architecture.
        ProductArchitecture = 22,
        /// VS Code target platform, e.g. `linux-x64`.
        TargetPlatform = 23,
        /// Extension name.
        ExtensionName = 24,
    }
}

wire_enum! {
    /// The key results are ordered by.
    pub enum SortBy {
        Relevance = 0,
        LastUpdatedDate = 1,
        Title = 2,
        Publisher = 3,
        InstallCount = 4,
        PublishedDate = 5,
        AverageRating = 6,
        TrendingDaily = 7,
        TrendingWeekly = 8,
        TrendingMonthly = 9,
        ReleaseDate = 10,
        Author = 11,
        WeightedRating = 12,
    }
}

impl Default for SortBy {
    fn default() -> Self {
        SortBy::Relevance
    }
}

wire_enum! {
    /// Requested sort direction. `Default` lets the server pick one per key.
    pub enum SortOrder {
        Default = 0,
        Ascending = 1,
        Descending = 2,
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Default
    }
}

wire_enum! {
    /// Direction applied to a paging token.
    pub enum PagingDirection {
        Forward = 1,
        Backward = 2,
    }
}

/// Bit set describing which parts of an extension a query wants back.
///
/// # Example
///
/// ```
/// use stockroom_core::QueryFlags;
///
/// let flags = QueryFlags::INCLUDE_FILES | QueryFlags::INCLUDE_STATISTICS;
/// assert!(flags.contains(QueryFlags::INCLUDE_FILES));
/// assert!(!flags.is_empty());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryFlags(pub u32);

impl QueryFlags {
    pub const NONE: QueryFlags = QueryFlags(0x0);
    pub const INCLUDE_VERSIONS: QueryFlags = QueryFlags(0x1);
    pub const INCLUDE_FILES: QueryFlags = QueryFlags(0x2);
    pub const INCLUDE_CATEGORY_AND_TAGS: QueryFlags = QueryFlags(0x4);
    pub const INCLUDE_SHARED_ACCOUNTS: QueryFlags = QueryFlags(0x8);
    pub const INCLUDE_VERSION_PROPERTIES: QueryFlags = QueryFlags(0x10);
    pub const EXCLUDE_NON_VALIDATED: QueryFlags = QueryFlags(0x20);
    pub const INCLUDE_INSTALLATION_TARGETS: QueryFlags = QueryFlags(0x40);
    pub const INCLUDE_ASSET_URI: QueryFlags = QueryFlags(0x80);
    pub const INCLUDE_STATISTICS: QueryFlags = QueryFlags(0x100);
    pub const INCLUDE_LATEST_VERSION_ONLY: QueryFlags = QueryFlags(0x200);
    pub const USE_FALLBACK_ASSET_URI: QueryFlags = QueryFlags(0x400);
    pub const INCLUDE_METADATA: QueryFlags = QueryFlags(0x800);
    pub const UNPUBLISHED: QueryFlags = QueryFlags(0x1000);

    /// True when no flag is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when every bit of `other` is set in `self`.
    pub fn contains(self, other: QueryFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for QueryFlags {
    type Output = QueryFlags;

    fn bitor(self, rhs: QueryFlags) -> QueryFlags {
        QueryFlags(self.0 | rhs.0)
    }
}

/// Names and bits of the published-extension flags.
///
/// The catalog stores an extension's flags as a comma separated list of
/// these names (`"validated, public"`), while queries express flag masks as
/// integers (`"4096"`).
pub const PUBLISHED_EXTENSION_FLAGS: &[(&str, u32)] = &[
    ("none", 0),
    ("disabled", 1),
    ("builtin", 2),
    ("validated", 4),
    ("trusted", 8),
    ("paid", 16),
    ("public", 256),
    ("multiversion", 512),
    ("system", 1024),
    ("preview", 2048),
    ("unpublished", 4096),
    ("trial", 8192),
    ("locked", 16384),
    ("hidden", 32768),
];

/// Converts a flags string to its integer mask.
///
/// Accepts both the named form used by the catalog and a plain integer.
/// Unrecognized names contribute nothing.
///
/// ```
/// use stockroom_core::published_flag_bits;
///
/// assert_eq!(published_flag_bits("validated, public"), 260);
/// assert_eq!(published_flag_bits("4096"), 4096);
/// assert_eq!(published_flag_bits(""), 0);
/// ```
pub fn published_flag_bits(flags: &str) -> u32 {
    if let Ok(bits) = flags.trim().parse::<u32>() {
        return bits;
    }
    flags
        .split(',')
        .map(|name| name.trim().to_ascii_lowercase())
        .filter_map(|name| {
            PUBLISHED_EXTENSION_FLAGS
                .iter()
                .find(|(known, _)| *known == name)
                .map(|(_, bits)| *bits)
        })
        .fold(0, |mask, bits| mask | bits)
}

/// The publisher of an extension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publisher {
    /// Stable publisher id.
    #[serde(default, deserialize_with = "nullable")]
    pub publisher_id: String,
    /// Internal name, the first half of an extension identity.
    #[serde(default, deserialize_with = "nullable")]
    pub publisher_name: String,
    /// Human-readable name.
    #[serde(default, deserialize_with = "nullable")]
    pub display_name: String,
    /// Publisher flags, e.g. `"verified"`.
    #[serde(default, deserialize_with = "nullable")]
    pub flags: String,
    /// Verified domain, if any.
    #[serde(default, deserialize_with = "nullable")]
    pub domain: String,
    /// Whether `domain` has been verified.
    #[serde(default)]
    pub is_domain_verified: bool,
}

/// A named numeric statistic, e.g. `install` or `averagerating`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistic {
    #[serde(default, deserialize_with = "nullable")]
    pub statistic_name: String,
    #[serde(default)]
    pub value: f64,
}

/// A downloadable file belonging to one extension version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionFile {
    /// Asset type, e.g. `Microsoft.VisualStudio.Services.VSIXPackage`.
    #[serde(default, deserialize_with = "nullable")]
    pub asset_type: String,
    /// Where the file can be fetched from.
    #[serde(default, deserialize_with = "nullable")]
    pub source: String,
}

/// A key/value property attached to a version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtensionProperty {
    #[serde(default, deserialize_with = "nullable")]
    pub key: String,
    #[serde(default, deserialize_with = "nullable")]
    pub value: String,
}

/// One published version of an extension, for one target platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionVersion {
    /// Version string, e.g. `"1.2.3"`.
    #[serde(default, deserialize_with = "nullable")]
    pub version: String,
    /// Target platform, e.g. `"linux-x64"`. Empty means platform-independent.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub target_platform: String,
    #[serde(default, deserialize_with = "nullable")]
    pub flags: String,
    #[serde(default, deserialize_with = "nullable")]
    pub last_updated: String,
    #[serde(default, deserialize_with = "nullable")]
    pub files: Vec<ExtensionFile>,
    #[serde(default, deserialize_with = "nullable")]
    pub properties: Vec<ExtensionProperty>,
    /// Base locator of this version's assets.
    #[serde(default, deserialize_with = "nullable")]
    pub asset_uri: String,
    /// Alternate base locator.
    #[serde(default, deserialize_with = "nullable")]
    pub fallback_asset_uri: String,
}

/// A catalog entry.
///
/// `publisher.publisherName + "." + extensionName` identifies an extension
/// uniquely, compared case-insensitively. See [`Extension::identity`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    #[serde(default)]
    pub publisher: Publisher,
    /// Stable extension id.
    #[serde(default, deserialize_with = "nullable")]
    pub extension_id: String,
    /// Internal name, the second half of the identity.
    #[serde(default, deserialize_with = "nullable")]
    pub extension_name: String,
    /// Human-readable name.
    #[serde(default, deserialize_with = "nullable")]
    pub display_name: String,
    /// Published flags, e.g. `"validated, public"`.
    #[serde(default, deserialize_with = "nullable")]
    pub flags: String,
    /// ISO-8601 timestamp of the last update.
    #[serde(default, deserialize_with = "nullable")]
    pub last_updated: String,
    /// ISO-8601 timestamp of the first publication.
    #[serde(default, deserialize_with = "nullable")]
    pub published_date: String,
    /// ISO-8601 timestamp of the public release.
    #[serde(default, deserialize_with = "nullable")]
    pub release_date: String,
    #[serde(default, deserialize_with = "nullable")]
    pub short_description: String,
    /// Versions, newest first as delivered by the upstream service.
    #[serde(default, deserialize_with = "nullable")]
    pub versions: Vec<ExtensionVersion>,
    #[serde(default, deserialize_with = "nullable")]
    pub categories: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub statistics: Vec<Statistic>,
    #[serde(default)]
    pub deployment_type: i32,
}

impl Extension {
    /// Returns `publisher.extension`, the name-based identity.
    ///
    /// ```
    /// use stockroom_core::{Extension, Publisher};
    ///
    /// let ext = Extension {
    ///     publisher: Publisher { publisher_name: "rust-lang".into(), ..Publisher::default() },
    ///     extension_name: "rust-analyzer".into(),
    ///     ..Extension::default()
    /// };
    /// assert_eq!(ext.identity(), "rust-lang.rust-analyzer");
    /// ```
    pub fn identity(&self) -> String {
        format!("{}.{}", self.publisher.publisher_name, self.extension_name)
    }

    /// Looks up a statistic by name, ignoring case. Missing statistics are 0.
    pub fn statistic(&self, name: &str) -> f64 {
        self.statistics
            .iter()
            .find(|s| s.statistic_name.eq_ignore_ascii_case(name))
            .map(|s| s.value)
            .unwrap_or(0.0)
    }

    /// Integer mask of this extension's published flags.
    pub fn flag_bits(&self) -> u32 {
        published_flag_bits(&self.flags)
    }
}

/// One `(filterType, value)` constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriterion {
    pub filter_type: FilterType,
    /// Interpretation depends on `filter_type`.
    #[serde(default, deserialize_with = "nullable")]
    pub value: String,
}

impl FilterCriterion {
    /// Creates a criterion.
    pub fn new(filter_type: FilterType, value: impl Into<String>) -> Self {
        Self {
            filter_type,
            value: value.into(),
        }
    }
}

/// A set of criteria plus ordering and paging for one result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFilter {
    /// Constraints, applied according to their filter types.
    #[serde(default, deserialize_with = "nullable")]
    pub criteria: Vec<FilterCriterion>,
    /// Applied to `paging_token` when one is present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<PagingDirection>,
    /// Page number (1-indexed).
    #[serde(default = "default_page_number")]
    pub page_number: i32,
    /// Results per page. The server clamps this to `[1, 1000]`.
    #[serde(default)]
    pub page_size: i32,
    /// Continuation of a previous query. Accepted and ignored by the mirror.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging_token: Option<String>,
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub sort_order: SortOrder,
}

fn default_page_number() -> i32 {
    1
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self {
            criteria: Vec::new(),
            direction: None,
            page_number: default_page_number(),
            page_size: 0,
            paging_token: None,
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
        }
    }
}

/// Body of `POST /_apis/public/gallery/extensionquery`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// Filters to evaluate. Only the first one is evaluated.
    #[serde(default, deserialize_with = "nullable")]
    pub filters: Vec<QueryFilter>,
    #[serde(default, deserialize_with = "nullable")]
    pub asset_types: Vec<String>,
    #[serde(default)]
    pub flags: QueryFlags,
}

/// One `name → count` entry of a facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataItem {
    pub name: String,
    pub count: u32,
}

/// A named facet over a result set, e.g. `Categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    pub metadata_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub metadata_items: Vec<MetadataItem>,
}

/// Matched extensions for one filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub extensions: Vec<Extension>,
    #[serde(default)]
    pub paging_token: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub result_metadata: Vec<ResultMetadata>,
}

impl QueryResponse {
    /// Reads `ResultCount.TotalCount`, if present.
    pub fn total_count(&self) -> Option<u32> {
        self.result_metadata
            .iter()
            .filter(|group| group.metadata_type == "ResultCount")
            .flat_map(|group| &group.metadata_items)
            .find(|item| item.name == "TotalCount")
            .map(|item| item.count)
    }
}

/// The `{"results": [...]}` envelope returned by the query endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResults {
    #[serde(default, deserialize_with = "nullable")]
    pub results: Vec<QueryResponse>,
}

/// Installer build metadata served to the editor's update check.
///
/// Stored per platform and quality as `latest.json` (the newest build) and
/// `{commit}.json` (a specific build).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installer {
    #[serde(default)]
    pub name: String,
    /// Commit the build was made from.
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub product_version: String,
    /// Where the editor downloads the installer from.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub build: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default, rename = "sha256hash")]
    pub sha256_hash: String,
    #[serde(default)]
    pub supports_fast_update: bool,
    /// Mirror directory name, e.g. `win32-x64-user`.
    #[serde(default)]
    pub identity: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub architecture: String,
    #[serde(default, rename = "buildtype")]
    pub build_type: String,
    #[serde(default)]
    pub quality: String,
    #[serde(default)]
    pub checked_for_update: bool,
    /// Upstream download location the mirrored file came from.
    #[serde(default)]
    pub update_url: String,
}

impl Installer {
    /// Artifact-relative location of the mirrored installer file,
    /// `installers/{identity}/{quality}/vscode-{name}{ext}`.
    ///
    /// The extension is taken from the upstream file name and keeps a
    /// compound `.tar.gz`.
    ///
    /// ```
    /// use stockroom_core::Installer;
    ///
    /// let installer = Installer {
    ///     name: "1.95.0".into(),
    ///     identity: "linux-x64".into(),
    ///     quality: "stable".into(),
    ///     update_url: "https://update.example/stable/abc/code-stable-x64.tar.gz".into(),
    ///     ..Installer::default()
    /// };
    /// assert_eq!(installer.download_path(), "installers/linux-x64/stable/vscode-1.95.0.tar.gz");
    /// ```
    pub fn download_path(&self) -> String {
        let file_name = self.update_url.rsplit('/').next().unwrap_or_default();
        let extension = match file_name.strip_suffix(".gz") {
            Some(stem) => format!("{}.gz", extension_of(stem)),
            None => extension_of(file_name).to_string(),
        };
        format!(
            "installers/{}/{}/vscode-{}{}",
            self.identity, self.quality, self.name, extension
        )
    }
}

/// Trailing `.ext` of a file name, or `""` when it has none.
fn extension_of(file_name: &str) -> &str {
    file_name.rfind('.').map_or("", |i| &file_name[i..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_upstream_request() {
        let body = r#"{
            "filters": [{
                "criteria": [
                    {"filterType": 8, "value": "Microsoft.VisualStudio.Code"},
                    {"filterType": 10, "value": "python"},
                    {"filterType": 12, "value": "4096"}
                ],
                "pageNumber": 2,
                "pageSize": 50,
                "sortBy": 4,
                "sortOrder": 0
            }],
            "assetTypes": [],
            "flags": 950
        }"#;

        let request: QueryRequest = serde_json::from_str(body).unwrap();
        let filter = &request.filters[0];

        assert_eq!(request.flags, QueryFlags(950));
        assert_eq!(filter.criteria[0].filter_type, FilterType::InstallationTarget);
        assert_eq!(filter.criteria[1], FilterCriterion::new(FilterType::SearchText, "python"));
        assert_eq!(filter.criteria[2].filter_type, FilterType::ExcludeWithFlags);
        assert_eq!(filter.page_number, 2);
        assert_eq!(filter.page_size, 50);
        assert_eq!(filter.sort_by, SortBy::InstallCount);
        assert_eq!(filter.sort_order, SortOrder::Default);
    }

    #[test]
    fn unknown_tags_survive() {
        let criterion: FilterCriterion =
            serde_json::from_str(r#"{"filterType": 99, "value": "x"}"#).unwrap();
        assert_eq!(criterion.filter_type, FilterType::Unknown(99));
        assert_eq!(
            serde_json::to_value(&criterion).unwrap(),
            serde_json::json!({"filterType": 99, "value": "x"})
        );

        let sort: SortBy = serde_json::from_str("42").unwrap();
        assert_eq!(sort, SortBy::Unknown(42));
    }

    #[test]
    fn missing_paging_fields_use_defaults() {
        let filter: QueryFilter =
            serde_json::from_str(r#"{"criteria": [{"filterType": 4, "value": "id"}]}"#).unwrap();
        assert_eq!(filter.page_number, 1);
        assert_eq!(filter.page_size, 0);
        assert_eq!(filter.sort_by, SortBy::Relevance);
        assert_eq!(filter.paging_token, None);
    }

    #[test]
    fn null_lists_decode_empty() {
        let ext: Extension = serde_json::from_str(
            r#"{
                "publisher": {"publisherName": "acme", "displayName": "Acme"},
                "extensionName": "tool",
                "categories": null,
                "tags": null,
                "versions": [{"version": "1.0.0", "files": null, "targetPlatform": null}]
            }"#,
        )
        .unwrap();

        assert!(ext.categories.is_empty());
        assert!(ext.tags.is_empty());
        assert!(ext.versions[0].files.is_empty());
        assert_eq!(ext.versions[0].target_platform, "");
        assert_eq!(ext.identity(), "acme.tool");
    }

    #[test]
    fn empty_target_platform_is_omitted() {
        let version = ExtensionVersion {
            version: "1.0.0".into(),
            ..ExtensionVersion::default()
        };
        let value = serde_json::to_value(&version).unwrap();
        assert!(value.get("targetPlatform").is_none());
        assert_eq!(value["assetUri"], "");
    }

    #[test]
    fn statistics_lookup_ignores_case() {
        let ext = Extension {
            statistics: vec![
                Statistic { statistic_name: "install".into(), value: 12.0 },
                Statistic { statistic_name: "averagerating".into(), value: 4.5 },
            ],
            ..Extension::default()
        };
        assert_eq!(ext.statistic("install"), 12.0);
        assert_eq!(ext.statistic("averageRating"), 4.5);
        assert_eq!(ext.statistic("weightedRating"), 0.0);
    }

    #[test]
    fn flag_names_map_to_bits() {
        assert_eq!(published_flag_bits("validated, public, preview"), 4 | 256 | 2048);
        assert_eq!(published_flag_bits("Unpublished"), 4096);
        assert_eq!(published_flag_bits("validated, bogus"), 4);
    }

    #[test]
    fn total_count_reads_result_count_group() {
        let response = QueryResponse {
            result_metadata: vec![ResultMetadata {
                metadata_type: "ResultCount".into(),
                metadata_items: vec![MetadataItem { name: "TotalCount".into(), count: 7 }],
            }],
            ..QueryResponse::default()
        };
        assert_eq!(response.total_count(), Some(7));
        assert_eq!(QueryResponse::default().total_count(), None);
    }

    #[test]
    fn installer_download_path_keeps_upstream_extension() {
        let mut installer: Installer = serde_json::from_str(
            r#"{
                "name": "1.95.3",
                "version": "f1a4fb1",
                "url": "https://update.example/f1a4fb1/VSCodeUserSetup-x64-1.95.3.exe",
                "sha256hash": "00ff",
                "identity": "win32-x64-user",
                "platform": "win32",
                "buildtype": "user",
                "quality": "stable",
                "updateUrl": "https://update.example/f1a4fb1/VSCodeUserSetup-x64-1.95.3.exe"
            }"#,
        )
        .unwrap();
        assert_eq!(installer.sha256_hash, "00ff");
        assert_eq!(installer.build_type, "user");
        assert_eq!(
            installer.download_path(),
            "installers/win32-x64-user/stable/vscode-1.95.3.exe"
        );

        installer.update_url = "https://update.example/f1a4fb1/VSCode-darwin-universal".into();
        assert_eq!(
            installer.download_path(),
            "installers/win32-x64-user/stable/vscode-1.95.3"
        );
    }
}
