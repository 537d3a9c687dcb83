#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use anyhow::{Context, Result, ensure};
use reqwest::Client;

/// Rewrites a published spreadsheet link into its CSV export address.
///
/// `/pubhtml` links become `/pub?output=csv`; anything else gets
/// `output=csv` appended as a query parameter.
pub fn csv_export_url(url: &str) -> String {
    let url = url.trim();
    if url.contains("/pubhtml") {
        return url.replace("/pubhtml", "/pub?output=csv");
    }
    if url.contains('?') {
        format!("{url}&output=csv")
    } else {
        format!("{url}?output=csv")
    }
}

/// Downloads the CSV export of a published spreadsheet.
pub async fn fetch_sheet(client: &Client, url: &str) -> Result<String> {
    ensure!(!url.trim().is_empty(), "No spreadsheet URL given");
    let export = csv_export_url(url);
    tracing::info!("Fetching sheet data from {export}");

    let text = client
        .get(&export)
        .send()
        .await
        .with_context(|| format!("Cannot get url: {export}"))?
        .error_for_status()
        .with_context(|| format!("Spreadsheet at {export} refused the download"))?
        .text()
        .await
        .with_context(|| format!("Could not parse the response from {export} to text."))?;

    Ok(text)
}
