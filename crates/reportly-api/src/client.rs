// Hand-crafted async HTTP client for the reporting resource API.
//
// Base path: /api/v1/<resource>
// Bulk fetch: GET /all, single fetch and delete: /ids/<id>

use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::resource::{RecordId, Resource};
use crate::transport::TransportConfig;

// ── Error response shape from the resource API ───────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async CRUD client for one resource type.
///
/// Cheap to clone: the underlying `reqwest::Client` is reference counted,
/// so one HTTP connection pool can serve every resource of a session.
pub struct ResourceClient<R> {
    http: reqwest::Client,
    base_url: Url,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceClient<R> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> ResourceClient<R> {
    // ── Constructors ─────────────────────────────────────────────────

    /// Wrap an existing `reqwest::Client` (caller manages headers and TLS).
    pub fn new(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url)?,
            _resource: PhantomData,
        })
    }

    /// Build a dedicated HTTP client from a transport config.
    pub fn from_transport(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        Self::new(base_url, transport.build_client()?)
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn url(&self, suffix: &str) -> Result<Url, Error> {
        let path = if suffix.is_empty() {
            R::PATH.to_owned()
        } else {
            format!("{}/{suffix}", R::PATH)
        };
        Ok(self.base_url.join(&path)?)
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// `POST /api/v1/<resource>`; the server assigns id and version.
    pub async fn create(&self, record: &R) -> Result<R, Error> {
        let url = self.url("")?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(record).send().await?;
        handle_response(resp).await
    }

    /// `GET /api/v1/<resource>/ids/<id>`.
    pub async fn get(&self, id: RecordId) -> Result<R, Error> {
        let url = self.url(&format!("ids/{id}"))?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        handle_response(resp).await
    }

    /// `GET /api/v1/<resource>/all`, filters passed as query parameters.
    pub async fn list<Q: Serialize + ?Sized>(&self, filters: &Q) -> Result<Vec<R>, Error> {
        let url = self.url("all")?;
        debug!("GET {url}");

        let resp = self.http.get(url).query(filters).send().await?;
        handle_response(resp).await
    }

    /// `PUT /api/v1/<resource>` with the full record, id included.
    pub async fn update(&self, record: &R) -> Result<R, Error> {
        let url = self.url("")?;
        debug!("PUT {url}");

        let resp = self.http.put(url).json(record).send().await?;
        handle_response(resp).await
    }

    /// `DELETE /api/v1/<resource>/ids/<id>`; returns the deleted row count.
    pub async fn delete(&self, id: RecordId) -> Result<u64, Error> {
        let url = self.url(&format!("ids/{id}"))?;
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        handle_response(resp).await
    }
}

/// Build the base URL ending in `/api/v1/`.
///
/// `https://host` and `https://host/reporter/` gain the `/api/v1/` suffix;
/// a URL already ending in `/api/v1` is kept as is.
fn normalize_base_url(raw: &str) -> Result<Url, Error> {
    let mut url = Url::parse(raw)?;

    let path = url.path().trim_end_matches('/').to_owned();
    if path.ends_with("/api/v1") {
        url.set_path(&format!("{path}/"));
    } else {
        url.set_path(&format!("{path}/api/v1/"));
    }

    Ok(url)
}

// ── Response handling ────────────────────────────────────────────────

async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    if status.is_success() {
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    } else {
        Err(parse_error(status, resp).await)
    }
}

async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
    let raw = resp.text().await.unwrap_or_default();

    let message = match serde_json::from_str::<ErrorResponse>(&raw) {
        Ok(err) => err
            .message
            .or(err.error)
            .unwrap_or_else(|| status.to_string()),
        Err(_) if raw.is_empty() => status.to_string(),
        Err(_) => raw,
    };

    Error::Status {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_gains_api_prefix() {
        let url = normalize_base_url("http://reporter.example.org").unwrap();
        assert_eq!(url.as_str(), "http://reporter.example.org/api/v1/");
    }

    #[test]
    fn path_prefix_is_preserved() {
        let url = normalize_base_url("https://example.org/reporting/").unwrap();
        assert_eq!(url.as_str(), "https://example.org/reporting/api/v1/");
    }

    #[test]
    fn existing_api_prefix_is_not_doubled() {
        let url = normalize_base_url("https://example.org/api/v1").unwrap();
        assert_eq!(url.as_str(), "https://example.org/api/v1/");
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            normalize_base_url("not a url"),
            Err(Error::InvalidUrl(_))
        ));
    }
}
