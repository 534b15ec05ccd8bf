// Authentication for the Qwilt CDN APIs.
//
// Two flows: a long-lived API token sent as `Authorization: X-API-KEY <t>`,
// or a session token obtained once from the login service and then sent as
// `Authorization: Bearer <t>`. The choice is made at client construction.

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::endpoint::{EndpointBuilder, LOGIN_SERVICE};
use crate::error::Error;
use crate::transport::TransportConfig;

/// Name of the cookie carrying the session token after login.
pub const LOGIN_COOKIE: &str = "cqloudLoginToken";

/// Credentials for the Qwilt CDN APIs.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Preferred: an API token generated in the QC services portal.
    ApiKey { token: SecretString },
    /// Username/password exchanged for a session token at startup.
    Login {
        username: String,
        password: SecretString,
    },
}

/// Resolved `Authorization` header material.
#[derive(Debug, Clone)]
pub(crate) enum AuthHeader {
    ApiKey(SecretString),
    Bearer(SecretString),
}

impl AuthHeader {
    pub(crate) fn to_header_value(&self) -> Result<HeaderValue, Error> {
        let raw = match self {
            Self::ApiKey(token) => format!("X-API-KEY {}", token.expose_secret()),
            Self::Bearer(token) => format!("Bearer {}", token.expose_secret()),
        };
        let mut value = HeaderValue::from_str(&raw).map_err(|e| Error::Authentication {
            message: format!("invalid {AUTHORIZATION} header value: {e}"),
        })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

/// Exchange `credentials` for the header every API request carries.
///
/// API tokens are used as-is; a login pair triggers exactly one call to
/// the login service.
pub(crate) async fn resolve_auth_header(
    endpoints: &EndpointBuilder,
    credentials: &Credentials,
    transport: &TransportConfig,
) -> Result<AuthHeader, Error> {
    match credentials {
        Credentials::ApiKey { token } => Ok(AuthHeader::ApiKey(token.clone())),
        Credentials::Login { username, password } => {
            let http = transport.build_login_client()?;
            let token = sign_in(&http, endpoints, username, password).await?;
            Ok(AuthHeader::Bearer(token))
        }
    }
}

/// Sign in against the login service and return the session token.
///
/// The login endpoint answers `302 Found` and sets the
/// [`LOGIN_COOKIE`] cookie; any other status is an authentication failure.
pub async fn sign_in(
    http: &reqwest::Client,
    endpoints: &EndpointBuilder,
    username: &str,
    password: &SecretString,
) -> Result<SecretString, Error> {
    let url = format!("{}/login", endpoints.build(LOGIN_SERVICE));
    debug!("logging in at {url}");

    let body = json!({
        "username": username,
        "password": password.expose_secret(),
    });

    let resp = http
        .get(&url)
        .basic_auth(username, Some(password.expose_secret()))
        .json(&body)
        .send()
        .await?;

    let status = resp.status();
    if status != StatusCode::FOUND {
        return Err(Error::Authentication {
            message: format!("status: {}", status.as_u16()),
        });
    }

    let mut cookies = resp.cookies().peekable();
    if cookies.peek().is_none() {
        return Err(Error::Authentication {
            message: "no Set-Cookie header found in the response".into(),
        });
    }

    let token = cookies
        .find(|c| c.name() == LOGIN_COOKIE)
        .map(|c| c.value().to_owned())
        .unwrap_or_default();
    if token.is_empty() {
        return Err(Error::Authentication {
            message: format!("{LOGIN_COOKIE} cookie has an empty value"),
        });
    }

    debug!("login successful");
    Ok(SecretString::from(token))
}
