//! Retrieval of the raw calendar feed.

use std::path::PathBuf;

use reqwest::Client;

use crate::error::{ServiceError, ServiceResult};

/// Where the feed text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    /// `http://` or `https://` URL.
    Http(String),
    /// `file://` URL or plain filesystem path.
    File(PathBuf),
}

impl FeedSource {
    /// Classifies a configured feed location.
    #[must_use]
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        let lower = location.to_ascii_lowercase();

        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Http(location.to_string())
        } else if lower.starts_with("file://") {
            Self::File(PathBuf::from(&location["file://".len()..]))
        } else {
            Self::File(PathBuf::from(location))
        }
    }
}

/// ## Summary
/// Fetches the calendar text from `location`.
///
/// HTTP responses with a non-success status are errors. The body is
/// returned as-is, without any charset or MIME checks.
///
/// ## Errors
///
/// Returns `ServiceError::FetchError` for network or HTTP status failures
/// and `ServiceError::IoError` when a local file cannot be read.
#[tracing::instrument(skip(user_agent))]
pub async fn fetch_feed(location: &str, user_agent: &str) -> ServiceResult<String> {
    match FeedSource::parse(location) {
        FeedSource::Http(url) => {
            let client = Client::builder().user_agent(user_agent).build()?;
            let response = client.get(&url).send().await?.error_for_status()?;
            tracing::debug!(status = %response.status(), "Feed response received");

            let body = response.text().await?;
            tracing::debug!(bytes = body.len(), "Fetched calendar feed");
            Ok(body)
        }
        FeedSource::File(path) => {
            let body = tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| ServiceError::IoError {
                    path: path.clone(),
                    source,
                })?;
            tracing::debug!(path = %path.display(), bytes = body.len(), "Read calendar feed");
            Ok(body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn classifies_sources() {
        assert_eq!(
            FeedSource::parse("https://outlook.example.com/calendar.ics"),
            FeedSource::Http("https://outlook.example.com/calendar.ics".to_string())
        );
        assert_eq!(
            FeedSource::parse("file:///tmp/calendar.ics"),
            FeedSource::File(PathBuf::from("/tmp/calendar.ics"))
        );
        assert_eq!(
            FeedSource::parse("calendar.ics"),
            FeedSource::File(PathBuf::from("calendar.ics"))
        );
    }

    #[test_log::test(tokio::test)]
    async fn fetches_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendar.ics"))
            .and(header("user-agent", "calorg-test"))
            .respond_with(ResponseTemplate::new(200).set_body_string("BEGIN:VCALENDAR\r\n"))
            .mount(&server)
            .await;

        let body = fetch_feed(&format!("{}/calendar.ics", server.uri()), "calorg-test")
            .await
            .unwrap();
        assert_eq!(body, "BEGIN:VCALENDAR\r\n");
    }

    #[test_log::test(tokio::test)]
    async fn http_error_status_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = fetch_feed(&format!("{}/missing.ics", server.uri()), "calorg-test")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::FetchError(_)));
    }

    #[test_log::test(tokio::test)]
    async fn reads_local_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("calendar.ics");
        std::fs::write(&file, "BEGIN:VCALENDAR\r\n").unwrap();

        let body = fetch_feed(&format!("file://{}", file.display()), "calorg-test")
            .await
            .unwrap();
        assert_eq!(body, "BEGIN:VCALENDAR\r\n");

        let missing = dir.path().join("missing.ics");
        let err = fetch_feed(&missing.display().to_string(), "calorg-test")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::IoError { .. }));
    }
}
