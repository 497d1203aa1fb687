//! REST transport.
//!
//! [`ApiClient`] is the single choke point for outbound calls. It attaches the
//! bearer token, encodes bodies, and maps every non-2xx answer to one
//! [`Error`]. A 401 additionally publishes [`SessionEvent::Unauthorized`];
//! what happens to the session is decided by whoever subscribes.

use crate::auth::{AuthStore, SessionEvent};
use crate::config::ClientConfig;
use crate::entity::NormalizeContext;
use crate::error::{Error, Result};
use crate::filter::Filters;
use crate::form::FormPayload;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 16;
const JSON: &str = "application/json";

/// Request body variants.
enum Body {
    Empty,
    Json(Value),
    Multipart(FormPayload),
}

/// HTTP client bound to one backend.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    origin: String,
    auth: AuthStore,
    events: broadcast::Sender<SessionEvent>,
}

impl ApiClient {
    /// Build a client whose requests are bounded by `config.timeout`.
    ///
    /// # Errors
    /// Returns `Error::Config` if the underlying client cannot be built.
    pub fn new(config: &ClientConfig, auth: AuthStore) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        info!(
            "API client targeting {} (timeout {:?})",
            config.api_base_url(),
            config.timeout
        );

        Ok(ApiClient {
            http,
            base_url: config.api_base_url(),
            origin: config.backend_origin.trim_end_matches('/').to_string(),
            auth,
            events,
        })
    }

    /// Listen for session events published by this client and its services.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Publish a session event. Having no listener is not an error.
    pub fn publish(&self, event: SessionEvent) {
        if self.events.send(event.clone()).is_err() {
            debug!("No session listener for {:?}", event);
        }
    }

    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Context for rewriting relative image paths in responses.
    pub fn normalize_context(&self) -> NormalizeContext {
        NormalizeContext::new(self.origin.clone())
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET with the cleaned filters as query parameters.
    pub async fn get(&self, path: &str, filters: &Filters) -> Result<Value> {
        let query = filters.to_query();
        self.send(Method::GET, path, &query, Body::Empty).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        self.send(Method::POST, path, &[], Body::Json(to_json(body)?))
            .await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        self.send(Method::PUT, path, &[], Body::Json(to_json(body)?))
            .await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        self.send(Method::PATCH, path, &[], Body::Json(to_json(body)?))
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.send(Method::DELETE, path, &[], Body::Empty).await
    }

    /// POST a multipart form. The content type (with its boundary) is set by
    /// the transport, never by [`build_headers`].
    pub async fn post_multipart(&self, path: &str, form: FormPayload) -> Result<Value> {
        self.send(Method::POST, path, &[], Body::Multipart(form))
            .await
    }

    pub async fn put_multipart(&self, path: &str, form: FormPayload) -> Result<Value> {
        self.send(Method::PUT, path, &[], Body::Multipart(form))
            .await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Body,
    ) -> Result<Value> {
        let url = self.url(path);
        let token = self.auth.token();
        let headers = build_headers(token.as_deref(), matches!(body, Body::Multipart(_)))?;

        debug!("{} {}", method, url);

        let mut request = self.http.request(method.clone(), &url).headers(headers);
        if !query.is_empty() {
            request = request.query(query);
        }
        request = match body {
            Body::Empty => request,
            Body::Json(value) => request.body(value.to_string()),
            Body::Multipart(form) => request.multipart(form.into_multipart()?),
        };

        let response = request.send().await.map_err(|e| {
            warn!("{} {} failed: {}", method, url, e);
            Error::from(e)
        })?;

        let status = response.status();
        let text = response.text().await?;

        if status == StatusCode::UNAUTHORIZED {
            warn!("{} {} answered 401", method, url);
            self.publish(SessionEvent::Unauthorized);
            return Err(Error::Unauthenticated(error_message(status, &text)));
        }

        if !status.is_success() {
            let message = error_message(status, &text);
            debug!("{} {} answered {}: {}", method, url, status.as_u16(), message);
            return Err(Error::Http {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            Error::Deserialization(format!("{} {} returned invalid JSON: {}", method, url, e))
        })
    }
}

/// Request headers for a call.
///
/// `Accept: application/json` always; `Content-Type: application/json` unless
/// the body is multipart; `Authorization: Bearer <token>` when signed in.
///
/// # Errors
/// Returns `Error::Config` if the token is not a valid header value.
pub fn build_headers(token: Option<&str>, multipart: bool) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(JSON));
    if !multipart {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
    }
    if let Some(token) = token {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| Error::Config(format!("invalid auth token: {}", e)))?;
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}

/// Message for a failed response: the JSON `message` or `error` field, else
/// the plain text body, else the status reason.
pub fn error_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();

    match serde_json::from_str::<Value>(body) {
        Ok(json) => {
            let field = json
                .get("message")
                .or_else(|| json.get("error"))
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty());
            if let Some(message) = field {
                return message.to_string();
            }
        }
        Err(_) if !body.is_empty() => return body.to_string(),
        Err(_) => {}
    }

    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<Value> {
    serde_json::to_value(body).map_err(|e| Error::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_json_with_token() {
        let headers = build_headers(Some("abc"), false).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer abc");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers[ACCEPT], "application/json");
    }

    #[test]
    fn test_headers_multipart_omit_content_type() {
        let headers = build_headers(None, true).unwrap();
        assert!(headers.get(CONTENT_TYPE).is_none());
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_invalid_token_rejected() {
        let err = build_headers(Some("bad\ntoken"), false).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_error_message_precedence() {
        let status = StatusCode::BAD_REQUEST;
        assert_eq!(error_message(status, r#"{"message":"Stock must be positive"}"#), "Stock must be positive");
        assert_eq!(error_message(status, r#"{"error":"Duplicate code"}"#), "Duplicate code");
        assert_eq!(error_message(status, "upstream exploded"), "upstream exploded");
        assert_eq!(error_message(status, r#"{"ok":false}"#), "Bad Request");
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, ""), "Bad Gateway");
    }

    #[test]
    fn test_url_joining() {
        let auth = AuthStore::new(std::sync::Arc::new(crate::storage::InMemoryStore::new()));
        let client = ApiClient::new(&ClientConfig::new("https://api.example.com/"), auth).unwrap();
        assert_eq!(client.base_url(), "https://api.example.com/api");
        assert_eq!(client.url("/customers/7"), "https://api.example.com/api/customers/7");
        assert_eq!(
            client.normalize_context().backend_origin,
            "https://api.example.com"
        );
    }
}
