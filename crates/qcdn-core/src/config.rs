// ── Runtime client configuration ──
//
// These types describe *how* to reach the Qwilt CDN APIs. They carry
// credential data and polling tuning, but never touch disk or the
// environment. The CLI resolves a profile into a `ClientConfig` once and
// hands it in.

use std::path::PathBuf;
use std::time::Duration;

use qcdn_api::{Credentials, EndpointBuilder, EnvType, TransportConfig};
use secrecy::SecretString;
use url::Url;

/// How to authenticate with the QC services.
#[derive(Debug, Clone)]
pub enum AuthCredentials {
    /// API token (preferred).
    ApiKey(SecretString),
    /// Username/password exchanged for a session token at startup.
    Login {
        username: String,
        password: SecretString,
    },
}

impl From<&AuthCredentials> for Credentials {
    fn from(auth: &AuthCredentials) -> Self {
        match auth {
            AuthCredentials::ApiKey(token) => Credentials::ApiKey {
                token: token.clone(),
            },
            AuthCredentials::Login { username, password } => Credentials::Login {
                username: username.clone(),
                password: password.clone(),
            },
        }
    }
}

/// Configuration for one client session.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Logical environment selecting the endpoint table.
    pub env: EnvType,
    pub auth: AuthCredentials,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
    /// Route every service to this URL instead of the environment table.
    pub endpoint_override: Option<Url>,
    /// How long to wait for a publish to leave `Pending`.
    pub acceptance_timeout: Duration,
    /// Delay between acceptance polls.
    pub poll_interval: Duration,
    /// Extra root certificate (PEM) trusted for every service.
    pub ca_cert: Option<PathBuf>,
}

impl ClientConfig {
    pub const DEFAULT_ACCEPTANCE_TIMEOUT: Duration = Duration::from_secs(180);
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

    pub fn new(env: EnvType, auth: AuthCredentials) -> Self {
        Self {
            env,
            auth,
            timeout: TransportConfig::default().timeout,
            endpoint_override: None,
            acceptance_timeout: Self::DEFAULT_ACCEPTANCE_TIMEOUT,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            ca_cert: None,
        }
    }

    pub fn endpoints(&self) -> EndpointBuilder {
        match &self.endpoint_override {
            Some(url) => EndpointBuilder::fixed(url.as_str()),
            None => EndpointBuilder::for_env(self.env),
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            timeout: self.timeout,
            ca_cert: self.ca_cert.clone(),
        }
    }
}
