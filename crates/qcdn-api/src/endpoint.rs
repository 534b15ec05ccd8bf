// Endpoint resolution: logical environment + service name → base URL.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Service hosting sites, configurations, publishing operations and
/// site-certificate links.
pub const SITES_SERVICE: &str = "media-sites";
/// Service hosting certificates, templates and CSRs.
pub const CERT_MANAGER_SERVICE: &str = "cert-manager";
/// Service hosting the origin allow-list.
pub const DEVICE_IP_SERVICE: &str = "device-ip";
/// Session login service.
pub const LOGIN_SERVICE: &str = "login";

/// Logical QC services environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvType {
    #[default]
    Prod,
    Stage,
    Prestg,
    Dev,
}

impl EnvType {
    fn domain(self) -> &'static str {
        match self {
            Self::Prod => "cqloud.com",
            Self::Stage => "stage.cqloud.com",
            Self::Prestg => "prestg.cqloud.com",
            Self::Dev => "rnd.cqloud.com",
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Self::Prod => "",
            Self::Stage => "stage-",
            Self::Prestg => "prestg-",
            Self::Dev => "kan11-",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prod => "prod",
            Self::Stage => "stage",
            Self::Prestg => "prestg",
            Self::Dev => "dev",
        }
    }
}

impl fmt::Display for EnvType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnvType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prod" => Ok(Self::Prod),
            "stage" => Ok(Self::Stage),
            "prestg" => Ok(Self::Prestg),
            "dev" => Ok(Self::Dev),
            other => Err(format!(
                "expected 'prod', 'stage', 'prestg' or 'dev', got '{other}'"
            )),
        }
    }
}

/// Maps a service name to the base URL that hosts it.
///
/// Either the fixed domain/prefix table of an [`EnvType`], or a single
/// override URL shared by every service (proxies, tests).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointBuilder {
    Env(EnvType),
    Fixed(String),
}

impl EndpointBuilder {
    pub fn for_env(env: EnvType) -> Self {
        Self::Env(env)
    }

    /// Route every service to `base` (trailing slashes are dropped).
    pub fn fixed(base: impl Into<String>) -> Self {
        Self::Fixed(base.into().trim_end_matches('/').to_owned())
    }

    /// Base URL for `service`, without a trailing slash.
    pub fn build(&self, service: &str) -> String {
        match self {
            Self::Env(env) => format!("https://{}{service}.{}", env.prefix(), env.domain()),
            Self::Fixed(base) => base.clone(),
        }
    }
}
