use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Errors returned by [`WaitlistClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status and an `error` message.
    #[error("service returned {status}: {message}")]
    Api { status: u16, message: String },
}

impl ClientError {
    /// HTTP status for API errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

/// Body of a 200 from `/signup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupReply {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub duplicate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_signups: u64,
}

/// A stored signup as returned by the admin listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signup {
    pub email: String,
    /// RFC 3339 timestamp.
    pub created_at: String,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSignups {
    pub signups: Vec<Signup>,
    pub total: usize,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

#[derive(Serialize)]
struct SignupRequest<'a> {
    email: &'a str,
}

/// Client for a running waitlist service.
#[derive(Clone)]
pub struct WaitlistClient {
    client: Client,
    base_url: String,
}

impl WaitlistClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Use a preconfigured `reqwest::Client` (proxies, timeouts, pooling).
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Submit an email to `/signup`.
    ///
    /// A duplicate is not an error: it comes back with `duplicate: true`.
    pub async fn subscribe(&self, email: &str) -> Result<SignupReply, ClientError> {
        let resp = self
            .client
            .post(self.url("/signup"))
            .json(&SignupRequest { email })
            .send()
            .await?;
        decode(resp).await
    }

    /// Like [`subscribe`](Self::subscribe), reporting the client address
    /// through `X-Forwarded-For` as an edge proxy would.
    pub async fn subscribe_from(
        &self,
        email: &str,
        client_address: &str,
    ) -> Result<SignupReply, ClientError> {
        let resp = self
            .client
            .post(self.url("/signup"))
            .header("X-Forwarded-For", client_address)
            .json(&SignupRequest { email })
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn stats(&self) -> Result<Stats, ClientError> {
        let resp = self.client.get(self.url("/stats")).send().await?;
        decode(resp).await
    }

    /// List every signup, newest first. Requires the admin password.
    pub async fn admin_signups(&self, password: &str) -> Result<AdminSignups, ClientError> {
        let resp = self
            .client
            .get(self.url("/admin-signups"))
            .bearer_auth(password)
            .send()
            .await?;
        decode(resp).await
    }

    /// Raw health payload.
    pub async fn health(&self) -> Result<serde_json::Value, ClientError> {
        let resp = self.client.get(self.url("/health")).send().await?;
        decode(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let status = resp.status();
    if status == StatusCode::OK {
        return Ok(resp.json().await?);
    }

    let text = resp.text().await?;
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.error.or(body.message))
        .unwrap_or(text);

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = WaitlistClient::new("http://localhost:8080/");
        assert_eq!(client.url("/stats"), "http://localhost:8080/stats");
    }

    #[test]
    fn test_reply_without_duplicate_flag() {
        let reply: SignupReply =
            serde_json::from_str(r#"{"success":true,"message":"Thank you for subscribing!"}"#)
                .unwrap();
        assert!(reply.success);
        assert!(!reply.duplicate);
    }

    #[test]
    fn test_error_status() {
        let err = ClientError::Api {
            status: 429,
            message: "slow down".into(),
        };
        assert_eq!(err.status(), Some(429));
        assert_eq!(err.to_string(), "service returned 429: slow down");
    }
}
