//! HTTP client example for stockroom
//!
//! Demonstrates how an editor talks to the mirror's gallery endpoint.
//!
//! Usage:
//!   cargo run -p api-client [--url http://localhost:8080] [--search text]

use stockroom_core::{
    FilterCriterion, FilterType, QueryFilter, QueryFlags, QueryRequest, QueryResults, SortBy,
    SortOrder,
};

const DEFAULT_URL: &str = "http://localhost:8080";

fn flag_value(name: &str) -> Option<String> {
    std::env::args().skip_while(|arg| arg != name).nth(1)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let base_url = flag_value("--url").unwrap_or_else(|| DEFAULT_URL.to_string());
    let search = flag_value("--search").unwrap_or_else(|| "*".to_string());

    println!("Stockroom API Client Demo");
    println!("=========================\n");
    println!("Connecting to: {}\n", base_url);

    let client = reqwest::Client::new();

    // 1. Search the gallery the way the editor does
    println!("1. Searching for '{}'...\n", search);
    let request = QueryRequest {
        filters: vec![QueryFilter {
            criteria: vec![
                FilterCriterion::new(FilterType::InstallationTarget, "Microsoft.VisualStudio.Code"),
                FilterCriterion::new(FilterType::SearchText, search),
                FilterCriterion::new(FilterType::ExcludeWithFlags, "4096"),
            ],
            page_number: 1,
            page_size: 10,
            sort_by: SortBy::InstallCount,
            sort_order: SortOrder::Default,
            ..QueryFilter::default()
        }],
        flags: QueryFlags::INCLUDE_FILES
            | QueryFlags::INCLUDE_CATEGORY_AND_TAGS
            | QueryFlags::INCLUDE_ASSET_URI
            | QueryFlags::INCLUDE_STATISTICS
            | QueryFlags::INCLUDE_LATEST_VERSION_ONLY,
        ..QueryRequest::default()
    };

    let results: QueryResults = client
        .post(format!("{}/_apis/public/gallery/extensionquery", base_url))
        .json(&request)
        .send()
        .await?
        .json()
        .await?;

    let Some(response) = results.results.first() else {
        println!("Empty response from server.");
        return Ok(());
    };

    println!(
        "   Found {} extension(s), showing {}:\n",
        response.total_count().unwrap_or_default(),
        response.extensions.len()
    );

    for ext in &response.extensions {
        println!("   - {} ({})", ext.identity(), ext.display_name);
        println!("     {}", ext.short_description);
        println!("     Installs: {}", ext.statistic("install"));
        println!();
    }

    for group in response.result_metadata.iter().skip(1) {
        let items: Vec<String> = group
            .metadata_items
            .iter()
            .map(|item| format!("{} ({})", item.name, item.count))
            .collect();
        println!("   {}: {}", group.metadata_type, items.join(", "));
    }
    println!();

    // Pick the first extension for further demo
    let Some(first) = response.extensions.first() else {
        println!("No extensions found in mirror.");
        return Ok(());
    };

    // 2. Fetch its latest metadata
    println!("2. Getting latest version of '{}'...\n", first.identity());
    let latest: stockroom_core::Extension = client
        .get(format!(
            "{}/_apis/public/gallery/vscode/{}/{}/latest",
            base_url, first.publisher.publisher_name, first.extension_name
        ))
        .send()
        .await?
        .json()
        .await?;

    for version in &latest.versions {
        println!("   - v{} {}", version.version, version.target_platform);
        println!("     Assets: {}", version.asset_uri);
        for file in &version.files {
            println!("       {}", file.source);
        }
    }

    println!("\nDemo complete!");

    Ok(())
}
