//! Headline retrieval from syndication feeds.

use crate::error::{NewswallError, Result};
use futures::future::join_all;
use std::collections::HashSet;
use std::time::Duration;

const FEED_TIMEOUT: Duration = Duration::from_secs(15);
const MAX_HEADLINES: usize = 100;

/// Fetches every feed concurrently and returns deduplicated headlines in
/// feed order, capped at 100. A failing feed contributes nothing and
/// never fails the run.
pub async fn fetch_headlines(client: &reqwest::Client, feeds: &[String]) -> Vec<String> {
    let fetches = feeds.iter().map(|url| fetch_feed(client, url));
    let results = join_all(fetches).await;

    let mut seen = HashSet::new();
    let mut headlines = Vec::new();
    for raw in results.into_iter().flatten() {
        let headline = raw.trim().to_string();
        if headline.is_empty() || !seen.insert(headline.clone()) {
            continue;
        }
        headlines.push(headline);
        if headlines.len() == MAX_HEADLINES {
            break;
        }
    }
    headlines
}

async fn fetch_feed(client: &reqwest::Client, url: &str) -> Vec<String> {
    match try_fetch_feed(client, url).await {
        Ok(titles) => titles,
        Err(e) => {
            tracing::warn!(%url, "feed fetch failed: {e}");
            Vec::new()
        }
    }
}

async fn try_fetch_feed(client: &reqwest::Client, url: &str) -> Result<Vec<String>> {
    let bytes = client
        .get(url)
        .timeout(FEED_TIMEOUT)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;

    let feed = feed_rs::parser::parse(bytes.as_ref())
        .map_err(|e| NewswallError::Decode(e.to_string()))?;

    // prefer the entry title; an entry with neither title nor summary is dropped
    Ok(feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            entry
                .title
                .map(|title| title.content)
                .filter(|title| !title.is_empty())
                .or_else(|| entry.summary.map(|summary| summary.content))
        })
        .collect())
}
