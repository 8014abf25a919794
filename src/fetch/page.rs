// src/fetch/page.rs

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;
use url::Url;

/// GET `url` and return the raw body. Non-success statuses are errors.
pub async fn fetch(client: &Client, url: &Url) -> Result<Vec<u8>> {
    debug!("Fetching {}", url);
    let body = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {} failed", url))?
        .error_for_status()
        .with_context(|| format!("Non-success status {}", url))?
        .bytes()
        .await
        .with_context(|| format!("Reading body from {}", url))?;
    debug!(bytes = body.len(), "fetched {}", url);
    Ok(body.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list"))
            .and(query_param("value", "Form W-2"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<table></table>"))
            .mount(&server)
            .await;

        let mut url = Url::parse(&format!("{}/list", server.uri())).unwrap();
        url.query_pairs_mut().append_pair("value", "Form W-2");

        let body = fetch(&Client::new(), &url).await.unwrap();
        assert_eq!(body, b"<table></table>");
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/list", server.uri())).unwrap();
        let err = fetch(&Client::new(), &url).await.unwrap_err();
        assert!(err.to_string().contains("Non-success status"));
    }
}
