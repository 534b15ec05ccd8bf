// Authenticated HTTP client shared by every sub-client.
//
// Owns the `reqwest::Client` (with the Authorization default header) and
// the endpoint table. Sub-clients pass a service name and a path; this
// module turns that into a URL, sends the request and classifies the
// response.

use reqwest::header::{AUTHORIZATION, HeaderMap};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::{Credentials, resolve_auth_header};
use crate::endpoint::EndpointBuilder;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Authenticated client for every Qwilt CDN service.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    endpoints: EndpointBuilder,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Authenticate once and build the client.
    ///
    /// With an API token no request is made; with a username/password the
    /// login service is called and the session token is used from then on.
    /// There is no token refresh.
    pub async fn connect(
        endpoints: EndpointBuilder,
        credentials: &Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let auth = resolve_auth_header(&endpoints, credentials, transport).await?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth.to_header_value()?);
        let http = transport.build_client_with_headers(headers)?;

        Ok(Self { http, endpoints })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn with_client(http: reqwest::Client, endpoints: EndpointBuilder) -> Self {
        Self { http, endpoints }
    }

    pub fn endpoints(&self) -> &EndpointBuilder {
        &self.endpoints
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn url(&self, service: &str, path: &str) -> String {
        format!("{}{path}", self.endpoints.build(service))
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        service: &str,
        path: &str,
    ) -> Result<T, Error> {
        self.get_with_params(service, path, &[]).await
    }

    pub(crate) async fn get_with_params<T: DeserializeOwned>(
        &self,
        service: &str,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(service, path);
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        service: &str,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(service, path);
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    /// POST with no request body, ignoring the response body.
    pub(crate) async fn post_no_response(&self, service: &str, path: &str) -> Result<(), Error> {
        let url = self.url(service, path);
        debug!("POST {url}");

        let resp = self.http.post(url).send().await?;
        self.handle_empty(resp).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        service: &str,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(service, path);
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn delete(&self, service: &str, path: &str) -> Result<(), Error> {
        self.delete_with_params(service, path, &[]).await
    }

    pub(crate) async fn delete_with_params(
        &self,
        service: &str,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<(), Error> {
        let url = self.url(service, path);
        debug!("DELETE {url} params={params:?}");

        let resp = self.http.delete(url).query(params).send().await?;
        self.handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
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
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::Unauthorized;
        }

        let body = resp.text().await.unwrap_or_default();
        Error::Api {
            status: status.as_u16(),
            body,
        }
    }
}
