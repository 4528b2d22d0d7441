//! PostgREST (Supabase) signup store.
//!
//! Talks to `{url}/{rest_path}/{table}` with the service key in both the
//! `apikey` header and the bearer token. Conditional inserts rely on a unique
//! constraint on `email` (see `migrations/`), combined with
//! `on_conflict=email` and `resolution=ignore-duplicates`: an ignored row
//! comes back as an empty representation.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use url::Url;

use crate::config::StoreConfig;
use crate::signups::types::{InsertOutcome, NewSignup, SignupRecord};
use crate::store::{SignupStore, StoreError, StoreResult};

const PREFER: &str = "Prefer";
const MAX_ERROR_BODY: usize = 512;

/// Store backed by a PostgREST table.
#[derive(Clone)]
pub struct PostgrestStore {
    client: Client,
    endpoint: Url,
}

impl PostgrestStore {
    /// Create a store for `table` under `base_url`/`rest_path`.
    pub fn new(
        base_url: &str,
        api_key: &str,
        rest_path: &str,
        table: &str,
        timeout: Duration,
    ) -> StoreResult<Self> {
        let endpoint = table_endpoint(base_url, rest_path, table)?;

        let key = HeaderValue::from_str(api_key)
            .map_err(|_| StoreError::Config("api key is not a valid header value".into()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| StoreError::Config("api key is not a valid header value".into()))?;

        let mut headers = HeaderMap::new();
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        tracing::info!(endpoint = %endpoint, "PostgREST signup store configured");
        Ok(Self { client, endpoint })
    }

    pub fn from_config(config: &StoreConfig, timeout: Duration) -> StoreResult<Self> {
        let url = config
            .url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| StoreError::Config("store.url is required".into()))?;
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| StoreError::Config("store.api_key is required".into()))?;

        Self::new(url, api_key, &config.rest_path, &config.table, timeout)
    }

    /// Fully resolved table URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn url_with(&self, pairs: &[(&str, &str)]) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            for (k, v) in pairs {
                query.append_pair(k, v);
            }
        }
        url
    }
}

#[async_trait]
impl SignupStore for PostgrestStore {
    fn backend_tag(&self) -> &'static str {
        "postgrest"
    }

    async fn insert_if_absent(&self, signup: NewSignup) -> StoreResult<InsertOutcome> {
        let response = self
            .client
            .post(self.url_with(&[("on_conflict", "email")]))
            .header(PREFER, "resolution=ignore-duplicates,return=representation")
            .json(&[&signup])
            .send()
            .await?;

        // Without `on_conflict` support the unique constraint surfaces as 409.
        if response.status() == StatusCode::CONFLICT {
            return Ok(InsertOutcome::Duplicate);
        }
        let response = ensure_success(response).await?;

        let rows: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        Ok(if rows.is_empty() {
            InsertOutcome::Duplicate
        } else {
            InsertOutcome::Inserted
        })
    }

    async fn count(&self) -> StoreResult<u64> {
        let response = self
            .client
            .head(self.url_with(&[("select", "email")]))
            .header(PREFER, "count=exact")
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let header = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| StoreError::Decode("missing Content-Range header".into()))?;

        parse_content_range_total(header)
    }

    async fn list_recent(&self) -> StoreResult<Vec<SignupRecord>> {
        let response = self
            .client
            .get(self.url_with(&[
                ("select", "email,created_at,ip_address"),
                ("order", "created_at.desc"),
            ]))
            .send()
            .await?;
        let response = ensure_success(response).await?;

        response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn health_check(&self) -> StoreResult<()> {
        let response = self
            .client
            .get(self.url_with(&[("select", "email"), ("limit", "1")]))
            .send()
            .await?;
        ensure_success(response).await.map(|_| ())
    }
}

async fn ensure_success(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Resolve `{base}/{rest_path}/{table}`, tolerating stray slashes.
pub fn table_endpoint(base: &str, rest_path: &str, table: &str) -> StoreResult<Url> {
    let mut base =
        Url::parse(base).map_err(|e| StoreError::Config(format!("invalid store url: {}", e)))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    let rest = rest_path.trim_matches('/');
    let table = table.trim_matches('/');
    let relative = if rest.is_empty() {
        table.to_string()
    } else {
        format!("{}/{}", rest, table)
    };

    base.join(&relative)
        .map_err(|e| StoreError::Config(format!("invalid table path: {}", e)))
}

/// Extract the total from a `Content-Range` value such as `0-24/3573` or `*/0`.
pub fn parse_content_range_total(value: &str) -> StoreResult<u64> {
    value
        .rsplit_once('/')
        .and_then(|(_, total)| total.trim().parse().ok())
        .ok_or_else(|| StoreError::Decode(format!("unusable Content-Range '{}'", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_endpoint() {
        let url = table_endpoint("https://abc.supabase.co", "rest/v1", "signups").unwrap();
        assert_eq!(url.as_str(), "https://abc.supabase.co/rest/v1/signups");

        let url = table_endpoint("http://localhost:3000/api", "/", "signups").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/signups");

        let url = table_endpoint("https://abc.supabase.co/", "/rest/v1/", "signups").unwrap();
        assert_eq!(url.as_str(), "https://abc.supabase.co/rest/v1/signups");
    }

    #[test]
    fn test_table_endpoint_rejects_garbage() {
        assert!(matches!(
            table_endpoint("not a url", "rest/v1", "signups"),
            Err(StoreError::Config(_))
        ));
    }

    #[test]
    fn test_parse_content_range_total() {
        assert_eq!(parse_content_range_total("0-24/3573").unwrap(), 3573);
        assert_eq!(parse_content_range_total("*/0").unwrap(), 0);
        assert!(parse_content_range_total("0-24/*").is_err());
        assert!(parse_content_range_total("garbage").is_err());
    }

    #[test]
    fn test_query_is_appended() {
        let store = PostgrestStore::new(
            "https://abc.supabase.co",
            "key",
            "rest/v1",
            "signups",
            Duration::from_secs(1),
        )
        .unwrap();
        let url = store.url_with(&[("on_conflict", "email")]);
        assert_eq!(
            url.as_str(),
            "https://abc.supabase.co/rest/v1/signups?on_conflict=email"
        );
    }
}
