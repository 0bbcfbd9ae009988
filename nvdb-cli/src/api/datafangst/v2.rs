//! Datafangst 2.0 client (bearer token from NVDB auth)

use log::info;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::http::{self, HttpSettings};
use crate::api::models::Credentials;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    brukernavn: &'a str,
    brukertype: &'a str,
    passord: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    id_token: String,
}

/// Client for one Datafangst 2.0 deployment
#[derive(Debug, Clone)]
pub struct Df20Client {
    http: reqwest::Client,
    /// e.g. `https://datafangst-api-gateway.test.atlas.vegvesen.no/api/v2/`
    api_url: String,
    /// e.g. `https://nvdbauth.test.atlas.vegvesen.no/api/v1/auth/autentiser`
    auth_url: String,
    user_type: String,
    token: Option<String>,
}

impl Df20Client {
    pub fn new(
        api_url: impl Into<String>,
        auth_url: impl Into<String>,
        user_type: impl Into<String>,
        settings: &HttpSettings,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            http: settings.build_client()?,
            api_url: api_url.into(),
            auth_url: auth_url.into(),
            user_type: user_type.into(),
            token: None,
        })
    }

    /// Log in and keep the token for the rest of the run
    pub async fn login(&mut self, credentials: &Credentials) -> Result<(), ApiError> {
        let body = LoginRequest {
            brukernavn: &credentials.username,
            brukertype: &self.user_type,
            passord: &credentials.password,
        };
        let request = self.http.post(&self.auth_url).json(&body);

        let response = match http::send(request, &self.auth_url).await {
            Ok(response) => response,
            Err(ApiError::UnreachableService { url, status, body }) => {
                return Err(ApiError::AuthenticationFailure {
                    url,
                    status: Some(status),
                    reason: format!("HTTP {} {}", status, body),
                });
            }
            Err(e) => return Err(e),
        };

        let login: LoginResponse = http::read_json(response, &self.auth_url).await?;
        self.token = Some(login.id_token);
        info!("Logged in to {} as {}", self.auth_url, credentials.username);
        Ok(())
    }

    fn bearer(&self) -> Result<String, ApiError> {
        self.token
            .as_ref()
            .map(|token| format!("Bearer {}", token))
            .ok_or_else(|| ApiError::AuthenticationFailure {
                url: self.auth_url.clone(),
                status: None,
                reason: "not logged in".to_string(),
            })
    }

    fn files_url(&self, contract_id: &str, rest: &str) -> String {
        http::join_url(
            &self.api_url,
            &format!("kontrakter/{}/filer/{}", urlencoding::encode(contract_id), rest),
        )
    }

    /// Upload a GeoJSON document as a named file on a contract
    pub async fn upload_file(
        &self,
        contract_id: &str,
        file_name: &str,
        geojson: &str,
        destination: &str,
    ) -> Result<(), ApiError> {
        let url = self.files_url(contract_id, "kropp");
        let request = self
            .http
            .post(&url)
            .header(AUTHORIZATION, self.bearer()?)
            .header(CONTENT_TYPE, "application/geojson")
            .header("X-FILNAVN", file_name)
            .query(&[("destination", destination)])
            .body(geojson.to_string());

        http::send(request, &url).await?;
        info!("File {} uploaded to contract {}", file_name, contract_id);
        Ok(())
    }

    /// Approve one or more previously uploaded files
    pub async fn approve_files(&self, contract_id: &str, file_names: &[String]) -> Result<(), ApiError> {
        let url = self.files_url(contract_id, "godkjenn");
        let request = self
            .http
            .patch(&url)
            .header(AUTHORIZATION, self.bearer()?)
            .json(file_names);

        http::send(request, &url).await?;
        info!(
            "Approved {} on contract {}",
            file_names.join(", "),
            contract_id
        );
        Ok(())
    }
}

/// Split a comma-separated list of file names, dropping blanks
pub fn split_file_names(names: &str) -> Vec<String> {
    names
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CONTRACT: &str = "k-42";

    fn client(server: &MockServer) -> Df20Client {
        Df20Client::new(
            format!("{}/api/v2/", server.uri()),
            format!("{}/api/v1/auth/autentiser", server.uri()),
            "ANSATT",
            &HttpSettings::default(),
        )
        .unwrap()
    }

    async fn mount_login(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/autentiser"))
            .and(body_json(json!({ "brukernavn": "jajens", "brukertype": "ANSATT", "passord": "pw" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id_token": "tok-123" })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_login_then_upload_with_bearer_token() {
        let server = MockServer::start().await;
        mount_login(&server).await;

        Mock::given(method("POST"))
            .and(path("/api/v2/kontrakter/k-42/filer/kropp"))
            .and(header("authorization", "Bearer tok-123"))
            .and(header("x-filnavn", "bomst.geojson"))
            .and(header("content-type", "application/geojson"))
            .and(query_param("destination", "NVDB"))
            .and(body_string(r#"{"type":"FeatureCollection","features":[]}"#))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let mut df = client(&server);
        df.login(&Credentials::new("jajens", "pw")).await.unwrap();

        df.upload_file(
            CONTRACT,
            "bomst.geojson",
            r#"{"type":"FeatureCollection","features":[]}"#,
            "NVDB",
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_rejected_login_is_authentication_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/auth/autentiser"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Feil brukernavn eller passord"))
            .mount(&server)
            .await;

        let mut df = client(&server);
        let err = df
            .login(&Credentials::new("jajens", "feil"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApiError::AuthenticationFailure { status: Some(400), .. }
        ));
        assert!(df.bearer().is_err());
    }

    #[tokio::test]
    async fn test_calls_before_login_fail() {
        let server = MockServer::start().await;
        let df = client(&server);

        let err = df
            .approve_files(CONTRACT, &["a.geojson".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::AuthenticationFailure { status: None, .. }));
    }

    #[tokio::test]
    async fn test_approve_sends_file_names_as_json_array() {
        let server = MockServer::start().await;
        mount_login(&server).await;

        Mock::given(method("PATCH"))
            .and(path("/api/v2/kontrakter/k-42/filer/godkjenn"))
            .and(body_json(json!(["a.geojson", "b.geojson"])))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mut df = client(&server);
        df.login(&Credentials::new("jajens", "pw")).await.unwrap();
        df.approve_files(CONTRACT, &split_file_names("a.geojson, b.geojson,"))
            .await
            .unwrap();
    }

    #[test]
    fn test_split_file_names() {
        assert_eq!(split_file_names(" a.geojson ,,b.geojson "), vec!["a.geojson", "b.geojson"]);
        assert!(split_file_names("").is_empty());
    }
}
