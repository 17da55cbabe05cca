// This file is part of the terraform-provider-meshstack project
//
// Copyright (C) ANEO, 2024-2024. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License")
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! meshStack API client
//!
//! [`MeshStackClient`] authenticates with an API key and exposes one set of
//! methods per meshObject kind (see the submodules).
//! Every meshObject kind is versioned through its media type.

use std::fmt::Debug;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use reqwest::{header, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tf_provider::Diagnostics;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub mod binding;
pub mod building_block;
pub mod integration;
pub mod platform;
pub mod project;
pub mod tag_definition;
pub mod tenant;
pub mod workspace;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Tokens are refreshed that long before they expire
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

/// Errors returned by the meshStack API client
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid meshStack endpoint `{endpoint}`: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("{method} {url} failed: {source}")]
    Transport {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: Method,
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("could not decode the response of {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("authentication against meshStack failed: {0}")]
    Auth(String),
}

/// Connection settings of the client
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub endpoint: String,
    pub api_key: String,
    pub api_secret: String,
}

impl Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key)
            .finish_non_exhaustive()
    }
}

struct Token {
    bearer: String,
    refresh_at: Instant,
}

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

pub struct MeshStackClient {
    base_url: Url,
    http: reqwest::Client,
    api_key: String,
    api_secret: String,
    token: Mutex<Option<Token>>,
}

impl Debug for MeshStackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshStackClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key)
            .finish_non_exhaustive()
    }
}

impl MeshStackClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let base_url = validate_endpoint(&config.endpoint)?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(
                "terraform-provider-meshstack/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|err| ClientError::InvalidEndpoint {
                endpoint: config.endpoint.clone(),
                reason: err.to_string(),
            })?;

        Ok(Self {
            base_url,
            http,
            api_key: config.api_key,
            api_secret: config.api_secret,
            token: Mutex::new(None),
        })
    }

    pub fn endpoint(&self) -> &str {
        self.base_url.as_str()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    async fn bearer(&self) -> Result<String, ClientError> {
        let mut token = self.token.lock().await;
        if let Some(token) = token.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.bearer.clone());
            }
        }

        let url = self.url("/api/login");
        info!(%url, "logging in to meshStack");
        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.api_key.as_str()),
                ("client_secret", self.api_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                method: Method::POST,
                url: url.clone(),
                source,
            })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ClientError::Transport {
                method: Method::POST,
                url: url.clone(),
                source,
            })?;
        if !status.is_success() {
            return Err(ClientError::Auth(format!("login returned {status}: {body}")));
        }
        let login: LoginResponse =
            serde_json::from_str(&body).map_err(|source| ClientError::Decode { url, source })?;

        let lifetime = Duration::from_secs(login.expires_in.unwrap_or(300));
        let bearer = format!("Bearer {}", login.access_token);
        *token = Some(Token {
            bearer: bearer.clone(),
            refresh_at: Instant::now() + lifetime.saturating_sub(TOKEN_EXPIRY_MARGIN),
        });
        Ok(bearer)
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        media_type: &str,
    ) -> Result<(RequestBuilder, String), ClientError> {
        let url = self.url(path);
        debug!(%method, %url, "building request");
        let bearer = self.bearer().await?;
        let builder = self
            .http
            .request(method, &url)
            .header(header::AUTHORIZATION, bearer)
            .header(header::ACCEPT, media_type);
        Ok((builder, url))
    }

    /// Send a request and return the status with the body
    async fn send(
        &self,
        method: Method,
        url: String,
        builder: RequestBuilder,
    ) -> Result<(StatusCode, String), ClientError> {
        let response = builder
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                method: method.clone(),
                url: url.clone(),
                source,
            })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ClientError::Transport {
                method: method.clone(),
                url: url.clone(),
                source,
            })?;
        debug!(%method, %url, %status, "received response");
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok((status, body))
        } else {
            Err(ClientError::Status {
                method,
                url,
                status,
                body,
            })
        }
    }

    /// Get an object, `None` if it does not exist
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        media_type: &str,
    ) -> Result<Option<T>, ClientError> {
        let (builder, url) = self.request(Method::GET, path, media_type).await?;
        match self.send(Method::GET, url.clone(), builder).await? {
            (StatusCode::NOT_FOUND, _) => Ok(None),
            (_, body) => decode(&url, &body).map(Some),
        }
    }

    pub(crate) async fn post<B, T>(
        &self,
        path: &str,
        media_type: &str,
        body: &B,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::POST, path, media_type, body).await
    }

    pub(crate) async fn put<B, T>(
        &self,
        path: &str,
        media_type: &str,
        body: &B,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::PUT, path, media_type, body).await
    }

    async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        media_type: &str,
        body: &B,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (builder, url) = self.request(method.clone(), path, media_type).await?;
        let builder = builder
            .header(header::CONTENT_TYPE, media_type)
            .json(body);
        match self.send(method.clone(), url.clone(), builder).await? {
            (StatusCode::NOT_FOUND, body) => Err(ClientError::Status {
                method,
                url,
                status: StatusCode::NOT_FOUND,
                body,
            }),
            (_, body) => decode(&url, &body),
        }
    }

    /// Delete an object, deleting a missing object is not an error
    pub(crate) async fn delete(&self, path: &str, media_type: &str) -> Result<(), ClientError> {
        let (builder, url) = self.request(Method::DELETE, path, media_type).await?;
        let (status, _) = self.send(Method::DELETE, url.clone(), builder).await?;
        if status == StatusCode::NOT_FOUND {
            debug!(%url, "object was already deleted");
        }
        Ok(())
    }

    /// Get all the objects of a paginated collection
    pub(crate) async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        media_type: &str,
        embedded_key: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, ClientError> {
        let mut items = Vec::new();
        let mut page_number = 0u32;
        loop {
            let (builder, url) = self.request(Method::GET, path, media_type).await?;
            let page = page_number.to_string();
            let builder = builder.query(query).query(&[("page", page.as_str())]);
            let body = match self.send(Method::GET, url.clone(), builder).await? {
                (StatusCode::NOT_FOUND, _) => break,
                (_, body) => body,
            };
            let page: HalPage = decode(&url, &body)?;
            let (page_items, has_next) = page.into_items(embedded_key, page_number);
            for item in page_items {
                items.push(
                    serde_json::from_value(item)
                        .map_err(|source| ClientError::Decode { url: url.clone(), source })?,
                );
            }
            if !has_next {
                break;
            }
            page_number += 1;
        }
        Ok(items)
    }
}

fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|source| ClientError::Decode {
        url: url.to_owned(),
        source,
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    number: u32,
    total_pages: u32,
}

/// HAL collection page
#[derive(Debug, Default, Deserialize)]
struct HalPage {
    #[serde(rename = "_embedded", default)]
    embedded: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    page: Option<PageInfo>,
}

impl HalPage {
    fn into_items(mut self, embedded_key: &str, requested: u32) -> (Vec<serde_json::Value>, bool) {
        let items = match self.embedded.remove(embedded_key) {
            Some(serde_json::Value::Array(items)) => items,
            _ => Vec::new(),
        };
        let has_next = match &self.page {
            Some(page) => page.number.max(requested) + 1 < page.total_pages,
            None => false,
        } && !items.is_empty();
        (items, has_next)
    }
}

/// Check the endpoint is a usable base URL
///
/// Plain http is only accepted for local development hosts.
pub fn validate_endpoint(endpoint: &str) -> Result<Url, ClientError> {
    let invalid = |reason: &str| ClientError::InvalidEndpoint {
        endpoint: endpoint.to_owned(),
        reason: reason.to_owned(),
    };
    let url = Url::parse(endpoint).map_err(|err| invalid(&err.to_string()))?;
    let host = url.host_str().ok_or_else(|| invalid("missing host"))?;

    if LOCALHOST_DOMAINS
        .iter()
        .any(|allowed| host.eq_ignore_ascii_case(allowed))
    {
        return Ok(url);
    }
    if url.scheme() != "https" {
        return Err(invalid("https is required for non local hosts"));
    }
    Ok(url)
}

/// Client handle shared by the provider with its resources and data sources
///
/// Resources are built before the provider is configured:
/// they get the handle at construction, and the client is set once by `configure`.
#[derive(Debug, Clone, Default)]
pub struct SharedClient(Arc<OnceLock<Arc<MeshStackClient>>>);

impl SharedClient {
    /// Set the client, returns `false` if it was already set
    pub fn configure(&self, client: MeshStackClient) -> bool {
        self.0.set(Arc::new(client)).is_ok()
    }

    pub fn get(&self, diags: &mut Diagnostics) -> Option<Arc<MeshStackClient>> {
        match self.0.get() {
            Some(client) => Some(client.clone()),
            None => {
                diags.root_error(
                    "Provider is not configured",
                    "The meshstack provider must be configured before its resources are used",
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn config(endpoint: &str) -> ClientConfig {
        ClientConfig {
            endpoint: endpoint.to_owned(),
            api_key: "key".to_owned(),
            api_secret: "secret".to_owned(),
        }
    }

    #[test]
    fn endpoints_must_be_secure_outside_localhost() {
        assert!(validate_endpoint("https://federation.meshcloud.io").is_ok());
        assert!(validate_endpoint("http://localhost:8080").is_ok());
        assert!(validate_endpoint("http://127.0.0.1").is_ok());
        assert!(matches!(
            validate_endpoint("http://federation.meshcloud.io"),
            Err(ClientError::InvalidEndpoint { .. })
        ));
        assert!(validate_endpoint("not a url").is_err());
    }

    #[tokio::test]
    async fn truncated_login_responses_are_transport_errors() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0; 4096];
            let _ = socket.read(&mut request).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 100\r\n\r\n{\"access")
                .await
                .unwrap();
        });

        let client = MeshStackClient::new(config(&endpoint)).unwrap();
        match client.bearer().await {
            Err(ClientError::Transport { method, url, .. }) => {
                assert_eq!(method, Method::POST);
                assert_eq!(url, format!("{endpoint}/api/login"));
            }
            other => panic!("expected a transport error, got {other:?}"),
        }
    }

    #[test]
    fn urls_are_built_from_the_base() {
        let client = MeshStackClient::new(config("https://meshstack.example.com/")).unwrap();
        assert_eq!(
            client.url("/api/meshobjects/meshprojects"),
            "https://meshstack.example.com/api/meshobjects/meshprojects"
        );
    }

    #[test]
    fn debug_output_hides_the_secret() {
        let client = MeshStackClient::new(config("https://meshstack.example.com")).unwrap();
        assert!(!format!("{client:?}").contains("secret"));
        assert!(!format!("{:?}", config("https://x.io")).contains("secret"));
    }

    #[test]
    fn hal_pages_report_following_pages() {
        let page: HalPage = serde_json::from_value(json!({
            "_embedded": {"meshProjects": [{"a": 1}, {"a": 2}]},
            "page": {"size": 2, "totalElements": 3, "totalPages": 2, "number": 0}
        }))
        .unwrap();
        let (items, has_next) = page.into_items("meshProjects", 0);
        assert_eq!(items.len(), 2);
        assert!(has_next);

        let last: HalPage = serde_json::from_value(json!({
            "_embedded": {"meshProjects": [{"a": 3}]},
            "page": {"size": 2, "totalElements": 3, "totalPages": 2, "number": 1}
        }))
        .unwrap();
        assert!(!last.into_items("meshProjects", 1).1);
    }

    #[test]
    fn empty_collections_have_no_embedded_items() {
        let page: HalPage = serde_json::from_value(json!({
            "page": {"size": 20, "totalElements": 0, "totalPages": 0, "number": 0}
        }))
        .unwrap();
        assert_eq!(page.into_items("meshProjects", 0), (vec![], false));
    }

    #[test]
    fn shared_client_is_configured_once() {
        let shared = SharedClient::default();
        let mut diags = Diagnostics::default();
        assert!(shared.get(&mut diags).is_none());
        assert_eq!(diags.errors.len(), 1);

        let handle = shared.clone();
        assert!(shared.configure(MeshStackClient::new(config("https://a.io")).unwrap()));
        assert!(!shared.configure(MeshStackClient::new(config("https://b.io")).unwrap()));

        let mut diags = Diagnostics::default();
        let client = handle.get(&mut diags).unwrap();
        assert_eq!(client.endpoint(), "https://a.io/");
        assert!(diags.errors.is_empty());
    }
}
