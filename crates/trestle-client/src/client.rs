//! The HTTP client.

use crate::error::{ClientError, ClientResult};
use crate::response::{unpack, Unpacked};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Adds `http://` when `host` has no scheme and drops trailing slashes.
///
/// ```
/// use trestle_client::normalize_base_uri;
///
/// assert_eq!(normalize_base_uri("api.example.com/"), "http://api.example.com");
/// assert_eq!(normalize_base_uri("https://api.example.com"), "https://api.example.com");
/// ```
#[must_use]
pub fn normalize_base_uri(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

/// Builder for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    api_host: String,
    version: Option<u32>,
    endpoint: Option<String>,
    timeout: Duration,
}

impl ClientBuilder {
    /// Sets the API version prefixed to every endpoint.
    #[must_use]
    pub fn version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    /// Sets the endpoint path below the version.
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Request`] if the HTTP client cannot be created.
    pub fn build(self) -> ClientResult<ApiClient> {
        let http = Client::builder().timeout(self.timeout).build()?;
        Ok(ApiClient {
            http,
            base_uri: normalize_base_uri(&self.api_host),
            version: self.version,
            endpoint: self.endpoint,
        })
    }
}

/// A client for one versioned endpoint of a Trestle API.
///
/// Requests go to `{api_host}/{version}/{endpoint}/{path}`; the version and
/// endpoint segments are skipped when unset. Responses are decoded with
/// [`unpack`].
///
/// ```no_run
/// use serde::Deserialize;
/// use trestle_client::ApiClient;
///
/// #[derive(Deserialize)]
/// struct User {
///     name: String,
/// }
///
/// # async fn run() -> Result<(), trestle_client::ClientError> {
/// let users = ApiClient::builder("api.example.com").version(1).endpoint("users").build()?;
/// let page = users.get::<User>("", &[("page", "2")]).await?;
/// for user in page.into_items() {
///     println!("{}", user.name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_uri: String,
    version: Option<u32>,
    endpoint: Option<String>,
}

impl ApiClient {
    /// Starts a builder for the API at `api_host`.
    pub fn builder(api_host: impl Into<String>) -> ClientBuilder {
        ClientBuilder {
            api_host: api_host.into(),
            version: None,
            endpoint: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// The normalized base URI.
    #[must_use]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// The version-prefixed endpoint path, without leading slash.
    #[must_use]
    pub fn endpoint_path(&self) -> String {
        let mut segments: Vec<String> = Vec::new();
        if let Some(version) = self.version {
            segments.push(version.to_string());
        }
        if let Some(endpoint) = &self.endpoint {
            segments.push(endpoint.trim_matches('/').to_string());
        }
        segments.retain(|segment| !segment.is_empty());
        segments.join("/")
    }

    /// The absolute URL for `path` below the endpoint.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        let mut url = self.base_uri.clone();
        for segment in [self.endpoint_path().as_str(), path.trim_matches('/')] {
            if !segment.is_empty() {
                url.push('/');
                url.push_str(segment);
            }
        }
        url
    }

    /// `GET`s `path` with `query` parameters.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ClientResult<Unpacked<T>> {
        let request = self.http.get(self.url_for(path)).query(query);
        self.send(Method::GET, path, request).await
    }

    /// `POST`s `body` as JSON to `path`.
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<Unpacked<T>> {
        let request = self.http.post(self.url_for(path)).json(body);
        self.send(Method::POST, path, request).await
    }

    /// `PUT`s `body` as JSON to `path`.
    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<Unpacked<T>> {
        let request = self.http.put(self.url_for(path)).json(body);
        self.send(Method::PUT, path, request).await
    }

    /// `DELETE`s `path`.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<Unpacked<T>> {
        let request = self.http.delete(self.url_for(path));
        self.send(Method::DELETE, path, request).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> ClientResult<Unpacked<T>> {
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(
            http.method = %method,
            endpoint = %self.endpoint_path(),
            path,
            http.status_code = status.as_u16(),
            "api response"
        );

        let bytes = response.bytes().await?;
        let body: Value =
            serde_json::from_slice(&bytes).map_err(|_| ClientError::UnsupportedFormat)?;
        unpack(body)
    }
}
