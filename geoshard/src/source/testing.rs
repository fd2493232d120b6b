//! HTTP test doubles shared by unit and integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::http::AsyncHttpClient;
use super::types::SourceError;

/// Client that answers every request with the same response.
#[derive(Clone)]
pub struct MockAsyncHttpClient {
    pub response: Result<Vec<u8>, SourceError>,
}

impl AsyncHttpClient for MockAsyncHttpClient {
    async fn get(&self, _url: &str) -> Result<Vec<u8>, SourceError> {
        self.response.clone()
    }

    async fn post_form(
        &self,
        _url: &str,
        _fields: &[(&str, &str)],
    ) -> Result<Vec<u8>, SourceError> {
        self.response.clone()
    }
}

/// A request seen by [`ScriptedHttpClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub url: String,
    pub fields: Vec<(String, String)>,
}

/// Client that answers by URL prefix and records every request in order.
///
/// The first registered prefix matching the request URL wins; unmatched
/// requests get the fallback response.
pub struct ScriptedHttpClient {
    routes: Vec<(String, Result<Vec<u8>, SourceError>)>,
    fallback: Result<Vec<u8>, SourceError>,
    requests: Mutex<Vec<RecordedRequest>>,
    calls: AtomicUsize,
}

impl ScriptedHttpClient {
    /// A client whose unmatched requests fail with a transport error.
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            fallback: Err(SourceError::Transport("no scripted response".to_string())),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn route(
        mut self,
        prefix: impl Into<String>,
        response: Result<Vec<u8>, SourceError>,
    ) -> Self {
        self.routes.push((prefix.into(), response));
        self
    }

    pub fn fallback(mut self, response: Result<Vec<u8>, SourceError>) -> Self {
        self.fallback = response;
        self
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn respond(&self, url: &str, fields: &[(&str, &str)]) -> Result<Vec<u8>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(RecordedRequest {
            url: url.to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });

        self.routes
            .iter()
            .find(|(prefix, _)| url.starts_with(prefix.as_str()))
            .map_or_else(|| self.fallback.clone(), |(_, response)| response.clone())
    }
}

impl Default for ScriptedHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AsyncHttpClient for ScriptedHttpClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        self.respond(url, &[])
    }

    async fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> Result<Vec<u8>, SourceError> {
        self.respond(url, fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_client_replays_response() {
        let mock = MockAsyncHttpClient {
            response: Ok(vec![1, 2, 3, 4]),
        };
        assert_eq!(mock.get("http://example.com").await.unwrap(), vec![1, 2, 3, 4]);

        let failing = MockAsyncHttpClient {
            response: Err(SourceError::Transport("Test error".to_string())),
        };
        assert!(failing.post_form("http://example.com", &[]).await.is_err());
    }

    #[tokio::test]
    async fn test_scripted_client_routes_by_prefix() {
        let client = ScriptedHttpClient::new()
            .route("https://a.example", Ok(b"a".to_vec()))
            .route("https://b.example", Err(SourceError::Transport("down".into())));

        assert_eq!(client.get("https://a.example/x").await.unwrap(), b"a".to_vec());
        assert!(client.get("https://b.example/x").await.is_err());
        assert!(client.get("https://c.example/x").await.is_err());

        assert_eq!(client.call_count(), 3);
        let urls: Vec<_> = client.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec!["https://a.example/x", "https://b.example/x", "https://c.example/x"]
        );
    }

    #[tokio::test]
    async fn test_scripted_client_records_form_fields() {
        let client = ScriptedHttpClient::new().fallback(Ok(Vec::new()));
        client
            .post_form("https://a.example", &[("data", "[out:json];")])
            .await
            .unwrap();

        let request = &client.requests()[0];
        assert_eq!(request.fields, vec![("data".to_string(), "[out:json];".to_string())]);
    }
}
