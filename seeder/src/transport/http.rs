use super::{ApiRequest, Method, Transport, TransportError};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// `reqwest`-backed transport against a fixed base URL.
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tasmai-seeder/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest<'_>) -> Result<Value, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
        }
        .header(CONTENT_TYPE, "application/json");

        if let Some(token) = request.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if status.is_success() {
            return Ok(decode_body(&bytes));
        }

        Err(TransportError::Status {
            status: status.as_u16(),
            message: error_message(status, &bytes),
        })
    }
}

/// Empty body → `null`; non-JSON text is kept as a JSON string.
fn decode_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).trim().to_string()))
}

/// Prefers the API's `error` (then `message`) field over the raw body.
fn error_message(status: StatusCode, bytes: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(bytes) {
        for key in ["error", "message"] {
            match value.get(key) {
                Some(Value::String(s)) => return s.clone(),
                Some(other) if !other.is_null() => return other.to_string(),
                _ => {}
            }
        }
    }

    let text = String::from_utf8_lossy(bytes).trim().to_string();
    if text.is_empty() {
        status.canonical_reason().unwrap_or("").to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_success_body_is_null() {
        assert_eq!(decode_body(b""), Value::Null);
        assert_eq!(decode_body(b"  \n"), Value::Null);
    }

    #[test]
    fn plain_text_success_body_is_kept() {
        assert_eq!(decode_body(b"OK\n"), json!("OK"));
        assert_eq!(decode_body(br#"{"token":"x"}"#), json!({ "token": "x" }));
    }

    #[test]
    fn error_message_prefers_error_field() {
        let msg = error_message(
            StatusCode::BAD_REQUEST,
            br#"{"error":"userName taken","message":"ignored"}"#,
        );
        assert_eq!(msg, "userName taken");

        let msg = error_message(StatusCode::BAD_REQUEST, br#"{"message":"bad body"}"#);
        assert_eq!(msg, "bad body");
    }

    #[test]
    fn error_message_falls_back_to_text_then_reason() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, b"upstream down"),
            "upstream down"
        );
        assert_eq!(
            error_message(StatusCode::UNAUTHORIZED, b""),
            "Unauthorized"
        );
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let t = ReqwestTransport::new("http://localhost:3000/", Duration::from_secs(1)).unwrap();
        assert_eq!(t.base_url(), "http://localhost:3000");
    }
}
