//! Pointing asset locators at the mirror instead of the upstream CDN.

use stockroom_core::{Extension, ExtensionVersion};

/// `{origin}/extensions/{publisher.extension}/{version}/{targetPlatform}`.
///
/// Empty segments are dropped, so platform-independent versions end at
/// `{version}`.
pub fn asset_locator(origin: &str, ext: &Extension, version: &ExtensionVersion) -> String {
    let identity = ext.identity();
    let segments = [
        "extensions",
        identity.as_str(),
        version.version.as_str(),
        version.target_platform.as_str(),
    ];

    let mut locator = origin.trim_end_matches('/').to_string();
    for segment in segments.iter().filter(|s| !s.is_empty()) {
        locator.push('/');
        locator.push_str(segment.trim_matches('/'));
    }
    locator
}

/// A copy of `ext` with every file source and asset URI rewritten.
pub fn rewrite(ext: &Extension, origin: &str) -> Extension {
    let mut copy = ext.clone();
    for version in &mut copy.versions {
        let locator = asset_locator(origin, ext, version);
        for file in &mut version.files {
            file.source = format!("{}/{}", locator, file.asset_type);
        }
        version.fallback_asset_uri = locator.clone();
        version.asset_uri = locator;
    }
    copy
}

/// Rewritten copies of every extension, in order.
pub fn rewrite_all(extensions: &[&Extension], origin: &str) -> Vec<Extension> {
    extensions.iter().map(|ext| rewrite(ext, origin)).collect()
}
