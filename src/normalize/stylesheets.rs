use futures::future::join_all;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

use crate::fetch::Fetcher;
use crate::utils::resolve_url;

/// Hard ceiling on external stylesheets fetched for one page
pub const MAX_STYLESHEETS: usize = 10;

static STYLESHEET_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"link[rel~="stylesheet"][href]"#)
        .expect("STYLESHEET_SELECTOR: hardcoded selector is valid")
});

/// Absolute http(s) stylesheet URLs linked by the page, in document order,
/// deduplicated and capped at `max` (never more than [`MAX_STYLESHEETS`])
pub fn stylesheet_links(html: &str, base: &Url, max: usize) -> Vec<String> {
    let max = max.min(MAX_STYLESHEETS);
    let document = Html::parse_document(html);
    let mut links: Vec<String> = Vec::new();

    for link in document.select(&STYLESHEET_SELECTOR) {
        if links.len() >= max {
            break;
        }
        let Some(href) = link.value().attr("href").and_then(|h| resolve_url(base, h)) else {
            continue;
        };
        if !(href.starts_with("http://") || href.starts_with("https://")) || links.contains(&href) {
            continue;
        }
        links.push(href);
    }

    links
}

/// Fetch all stylesheets concurrently, each bounded by `timeout`.
///
/// The result has one entry per link in link order; failed or slow fetches
/// contribute an empty string.
pub async fn fetch_stylesheets<F>(fetcher: &F, links: &[String], timeout: Duration) -> Vec<String>
where
    F: Fetcher + ?Sized,
{
    let fetches = links.iter().map(|link| async move {
        match tokio::time::timeout(timeout, fetcher.fetch_text(link)).await {
            Ok(Ok(css)) => css,
            Ok(Err(e)) => {
                log::warn!("Skipping stylesheet {}: {}", link, e);
                String::new()
            }
            Err(_) => {
                log::warn!("Skipping stylesheet {}: timed out after {:?}", link, timeout);
                String::new()
            }
        }
    });

    join_all(fetches).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LensError, Result};
    use crate::fetch::FetchedPage;
    use async_trait::async_trait;

    struct StubFetcher;

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedPage> {
            Err(LensError::UpstreamFailure(url.to_string()))
        }

        async fn fetch_text(&self, url: &str) -> Result<String> {
            if url.ends_with("slow.css") {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(".slow { color: red }".to_string())
            } else if url.ends_with("broken.css") {
                Err(LensError::UpstreamFailure("HTTP 500".to_string()))
            } else {
                Ok(".ok { color: green }".to_string())
            }
        }
    }

    #[test]
    fn test_stylesheet_links() {
        let html = r#"<head>
            <link rel="stylesheet" href="/a.css">
            <link rel="preload stylesheet" href="https://cdn.example.net/b.css">
            <link rel="stylesheet" href="/a.css">
            <link rel="icon" href="/favicon.ico">
            <link rel="stylesheet" href="data:text/css,.x{}">
        </head>"#;
        let base = Url::parse("https://example.com/page").unwrap();
        let links = stylesheet_links(html, &base, 10);

        assert_eq!(
            links,
            vec!["https://example.com/a.css", "https://cdn.example.net/b.css"]
        );
        assert_eq!(stylesheet_links(html, &base, 1).len(), 1);
    }

    #[test]
    fn test_stylesheet_links_are_capped() {
        let html: String = (0..25)
            .map(|i| format!(r#"<link rel="stylesheet" href="/s{}.css">"#, i))
            .collect();
        let base = Url::parse("https://example.com/").unwrap();

        assert_eq!(stylesheet_links(&html, &base, 50).len(), MAX_STYLESHEETS);
        assert_eq!(stylesheet_links(&html, &base, 3).len(), 3);
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let links = vec![
            "https://example.com/ok.css".to_string(),
            "https://example.com/broken.css".to_string(),
            "https://example.com/slow.css".to_string(),
        ];
        let sheets = fetch_stylesheets(&StubFetcher, &links, Duration::from_millis(50)).await;

        assert_eq!(sheets.len(), 3);
        assert_eq!(sheets[0], ".ok { color: green }");
        assert!(sheets[1].is_empty());
        assert!(sheets[2].is_empty());
    }
}
