use log::{debug, warn};
use reqwest::{header::CONTENT_TYPE, Client, Method, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;

use crate::models::{Comment, CommentQuery, NewComment, NewShow, SearchQuery, Show, UserRecord};

#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-success HTTP status. `body` is whatever text the server sent back.
    #[error("{code} {reason} - {body}")]
    Status { code: u16, reason: String, body: String },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    /// The response did not match the expected schema.
    #[error("malformed response from {path}: {reason}")]
    Malformed { path: String, reason: String },
    #[error("invalid api base url {0}")]
    BaseUrl(String),
}

/// A successful response body: JSON when the server labelled it so, raw text
/// otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
}

impl Payload {
    fn decode<T: DeserializeOwned>(self, path: &str) -> Result<T, ClientError> {
        match self {
            Payload::Json(value) => serde_json::from_value(value)
                .map_err(|e| ClientError::Malformed { path: path.to_string(), reason: e.to_string() }),
            Payload::Text(text) => Err(ClientError::Malformed {
                path: path.to_string(),
                reason: format!("expected json, got text: {}", truncate(&text, 80)),
            }),
        }
    }
}

/// Thin wrapper over the board REST API. One attempt per call, no timeout.
#[derive(Clone, Debug)]
pub struct BoardClient {
    base: Url,
    http: Client,
}

impl BoardClient {
    pub fn new(api_base: &str) -> Result<Self, ClientError> {
        let trimmed = api_base.trim().trim_end_matches('/');
        let base = Url::parse(trimmed).map_err(|e| ClientError::BaseUrl(format!("{trimmed}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::BaseUrl(trimmed.to_string()));
        }
        Ok(Self { base, http: Client::new() })
    }

    /// Build an endpoint URL. Each segment is percent-encoded on its own.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::BaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn call(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<Payload, ClientError> {
        let url = self.endpoint(segments)?;
        let path = url.path().to_string();
        debug!("{method} {url}");

        let mut req = self.http.request(method.clone(), url);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }

        let resp = req.send().await.map_err(|e| {
            warn!("{method} {path} transport error: {e}");
            ClientError::Transport(e)
        })?;
        let status = resp.status();
        if !status.is_success() {
            // best effort: a body that fails to read becomes empty
            let body = resp.text().await.unwrap_or_default();
            warn!("{method} {path} status={}", status.as_u16());
            return Err(ClientError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }

        let is_json = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false);
        let text = resp.text().await?;
        if is_json {
            serde_json::from_str(&text)
                .map(Payload::Json)
                .map_err(|e| ClientError::Malformed { path, reason: e.to_string() })
        } else {
            Ok(Payload::Text(text))
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<T, ClientError> {
        let path = segments.join("/");
        self.call(method, segments, query, body).await?.decode(&path)
    }

    pub async fn register(&self, user_name: &str) -> Result<UserRecord, ClientError> {
        self.fetch(Method::POST, &["users", "register"], &[], Some(json!({ "user_name": user_name }))).await
    }

    pub async fn user(&self, user_id: &str) -> Result<UserRecord, ClientError> {
        self.fetch(Method::GET, &["users", user_id], &[], None).await
    }

    pub async fn users_by_name(&self, user_name: &str) -> Result<Vec<UserRecord>, ClientError> {
        self.fetch(Method::GET, &["users", "by-name"], &[("user_name", user_name.to_string())], None).await
    }

    pub async fn list_shows(&self) -> Result<Vec<Show>, ClientError> {
        self.fetch(Method::GET, &["shows"], &[], None).await
    }

    pub async fn create_show(&self, show: &NewShow) -> Result<Show, ClientError> {
        let body = serde_json::to_value(show)
            .map_err(|e| ClientError::Malformed { path: "shows".into(), reason: e.to_string() })?;
        self.fetch(Method::POST, &["shows"], &[], Some(body)).await
    }

    pub async fn search_shows(&self, query: &SearchQuery) -> Result<Vec<Show>, ClientError> {
        self.fetch(Method::GET, &["shows", "search"], &query.to_pairs(), None).await
    }

    pub async fn list_comments(&self, show_id: u64, viewer: &CommentQuery) -> Result<Vec<Comment>, ClientError> {
        let id = show_id.to_string();
        self.fetch(Method::GET, &["shows", &id, "comments"], &viewer.to_pairs(), None).await
    }

    /// The response body is not used by the board; it is returned as received.
    pub async fn post_comment(&self, show_id: u64, comment: &NewComment) -> Result<Payload, ClientError> {
        let id = show_id.to_string();
        let body = serde_json::to_value(comment)
            .map_err(|e| ClientError::Malformed { path: format!("shows/{id}/comments"), reason: e.to_string() })?;
        self.call(Method::POST, &["shows", &id, "comments"], &[], Some(body)).await
    }

    pub async fn health(&self) -> Result<Payload, ClientError> {
        self.call(Method::GET, &["healthz"], &[], None).await
    }
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_segments_under_base_path() {
        let client = BoardClient::new("http://127.0.0.1:9943/api/").unwrap();
        let url = client.endpoint(&["shows", "7", "comments"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9943/api/shows/7/comments");
    }

    #[test]
    fn endpoint_encodes_user_supplied_segments() {
        let client = BoardClient::new("http://localhost/api").unwrap();
        let url = client.endpoint(&["users", "a b/c"]).unwrap();
        assert_eq!(url.path(), "/api/users/a%20b%2Fc");
    }

    #[test]
    fn rejects_unusable_base() {
        assert!(matches!(BoardClient::new("not a url"), Err(ClientError::BaseUrl(_))));
        assert!(matches!(BoardClient::new("mailto:someone@example.com"), Err(ClientError::BaseUrl(_))));
    }

    #[test]
    fn status_error_reads_like_code_reason_body() {
        let err = ClientError::Status { code: 404, reason: "Not Found".into(), body: "{\"detail\":\"x\"}".into() };
        assert_eq!(err.to_string(), "404 Not Found - {\"detail\":\"x\"}");
    }

    #[test]
    fn text_payload_where_json_expected_is_malformed() {
        let err = Payload::Text("<html>".into()).decode::<Vec<Show>>("shows").unwrap_err();
        assert!(matches!(err, ClientError::Malformed { ref path, .. } if path == "shows"));
    }

    #[test]
    fn json_payload_with_wrong_shape_is_malformed() {
        let err = Payload::Json(serde_json::json!({ "shows": [] })).decode::<Vec<Show>>("shows").unwrap_err();
        assert!(matches!(err, ClientError::Malformed { .. }));
    }
}
