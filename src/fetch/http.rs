use crate::config::AnalyzerOptions;
use crate::error::{LensError, Result};
use crate::fetch::{FetchedPage, Fetcher};
use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use url::Url;

/// reqwest-backed [`Fetcher`] with redirect, timeout and size limits
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_response_bytes: usize,
}

impl HttpFetcher {
    pub fn new(options: &AnalyzerOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(options.fetch_timeout_duration())
            .redirect(reqwest::redirect::Policy::limited(options.max_redirects))
            .user_agent(options.user_agent.as_str())
            .build()
            .map_err(|e| LensError::InvalidInput(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_response_bytes: options.max_response_bytes,
        })
    }

    /// Only absolute http(s) URLs are fetched
    pub fn validate_url(url: &str) -> Result<Url> {
        let parsed = Url::parse(url).map_err(|e| LensError::InvalidInput(format!("Invalid URL '{}': {}", url, e)))?;
        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            scheme => Err(LensError::InvalidInput(format!("Unsupported protocol: {}", scheme))),
        }
    }

    async fn get(&self, url: &str) -> Result<Response> {
        let url = Self::validate_url(url)?;
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(LensError::UpstreamFailure(format!(
                "Protected page ({}): {}",
                status.as_u16(),
                url
            )));
        }
        if !status.is_success() {
            return Err(LensError::UpstreamFailure(format!("HTTP {} for {}", status.as_u16(), url)));
        }

        Ok(response)
    }

    async fn read_body(&self, mut response: Response) -> Result<Vec<u8>> {
        let declared = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());
        if let Some(length) = declared {
            if length > self.max_response_bytes {
                return Err(LensError::PayloadTooLarge(format!(
                    "Response of {} bytes exceeds {} bytes",
                    length, self.max_response_bytes
                )));
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            body.extend_from_slice(&chunk);
            if body.len() > self.max_response_bytes {
                return Err(LensError::PayloadTooLarge(format!(
                    "Response exceeds {} bytes",
                    self.max_response_bytes
                )));
            }
        }
        Ok(body)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let response = self.get(url).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase());
        if let Some(content_type) = content_type {
            if !content_type.contains("text/html") && !content_type.contains("application/xhtml") {
                return Err(LensError::UnprocessableContent(format!(
                    "Expected HTML, got '{}'",
                    content_type
                )));
            }
        }

        let final_url = response.url().to_string();
        let status_code = response.status().as_u16();
        let body = self.read_body(response).await?;
        log::debug!("Fetched {} ({} bytes, status {})", final_url, body.len(), status_code);

        Ok(FetchedPage {
            content_length: body.len(),
            html: String::from_utf8_lossy(&body).into_owned(),
            final_url,
            status_code,
        })
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.get(url).await?;
        let body = self.read_body(response).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(HttpFetcher::validate_url("https://example.com").is_ok());
        assert!(matches!(
            HttpFetcher::validate_url("ftp://example.com/file"),
            Err(LensError::InvalidInput(_))
        ));
        assert!(matches!(
            HttpFetcher::validate_url("not a url"),
            Err(LensError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_new_fetcher() {
        let fetcher = HttpFetcher::new(&AnalyzerOptions::default()).unwrap();
        assert_eq!(fetcher.max_response_bytes, 5 * 1024 * 1024);
    }
}
