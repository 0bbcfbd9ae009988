//! HTTP conventions shared by all clients
//!
//! One `reqwest::Client` per service, identifying headers on every request,
//! an explicit per-request timeout and a single place that turns responses
//! into typed errors.

use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Request, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::error::{ApiError, truncate_body};

/// Settings applied to every HTTP client
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout: Duration,
    /// Sent as `X-Client`
    pub client_name: String,
    /// Sent as `X-Kontaktperson` when set
    pub contact: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            client_name: format!("nvdb-cli/{}", env!("CARGO_PKG_VERSION")),
            contact: None,
        }
    }
}

impl HttpSettings {
    /// Build a reqwest client carrying the identifying headers
    pub fn build_client(&self) -> Result<reqwest::Client, ApiError> {
        let mut headers = HeaderMap::new();
        insert_header(&mut headers, "x-client", &self.client_name);
        if let Some(contact) = &self.contact {
            insert_header(&mut headers, "x-kontaktperson", contact);
        }

        reqwest::Client::builder()
            .timeout(self.timeout)
            .default_headers(headers)
            .build()
            .map_err(|source| ApiError::Transport {
                url: String::new(),
                source,
            })
    }
}

fn insert_header(headers: &mut HeaderMap, name: &'static str, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(HeaderName::from_static(name), value);
        }
        Err(_) => warn!("Ignoring invalid value for header {}: {:?}", name, value),
    }
}

/// Send a request and map non-success responses to [`ApiError`]
pub async fn send(request: RequestBuilder, url: &str) -> Result<Response, ApiError> {
    let transport = |source| ApiError::Transport {
        url: url.to_string(),
        source,
    };
    let (client, request) = request.build_split();
    let request = request.map_err(transport)?;
    debug!("{}", request_line(&request));

    let response = client.execute(request).await.map_err(transport)?;
    check_status(response, url).await
}

/// `METHOD url`, as logged for every request
pub fn request_line(request: &Request) -> String {
    format!("{} {}", request.method(), request.url())
}

/// Turn a non-success status into the matching error variant
pub async fn check_status(response: Response, url: &str) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let body = truncate_body(&body);
    debug!("HTTP {} from {}: {}", status.as_u16(), url, body);

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Err(ApiError::AuthenticationFailure {
            url: url.to_string(),
            status: Some(status.as_u16()),
            reason: format!("HTTP {} {}", status.as_u16(), body),
        })
    } else {
        Err(ApiError::UnreachableService {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}

/// Read and decode a JSON body
pub async fn read_json<T: DeserializeOwned>(response: Response, url: &str) -> Result<T, ApiError> {
    let text = response.text().await.map_err(|source| ApiError::Transport {
        url: url.to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}

/// Join a base URL and a relative path with exactly one slash between them
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("https://example.org/api/", "/status"),
            "https://example.org/api/status"
        );
        assert_eq!(
            join_url("https://example.org/api", "contract/abc"),
            "https://example.org/api/contract/abc"
        );
    }

    #[test]
    fn test_default_client_name() {
        let settings = HttpSettings::default();
        assert!(settings.client_name.starts_with("nvdb-cli/"));
        assert!(settings.build_client().is_ok());
    }

    #[test]
    fn test_request_line_names_method_and_url() {
        let client = HttpSettings::default().build_client().unwrap();
        let request = client
            .patch("https://example.org/kontrakter/k1/filer/godkjenn")
            .query(&[("destination", "NVDB")])
            .build()
            .unwrap();
        assert_eq!(
            request_line(&request),
            "PATCH https://example.org/kontrakter/k1/filer/godkjenn?destination=NVDB"
        );
    }
}
