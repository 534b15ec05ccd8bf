use thiserror::Error;

/// Top-level error type for the `qcdn-api` crate.
///
/// Covers every failure mode of the REST surface: login, transport,
/// non-2xx responses and body decoding. `qcdn-core` maps these into
/// user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Session login failed (wrong credentials, missing cookie, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The API answered 401. No automatic re-login is attempted.
    #[error("401 Unauthorized -- please re-authenticate")]
    Unauthorized,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or client builder error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Any other non-2xx answer, with the raw body for context.
    #[error("API command failed - status: {status}, body: {body}")]
    Api { status: u16, body: String },

    /// Required identifiers were empty; the request was never sent.
    #[error("Invalid input, {message}")]
    InvalidInput { message: String },

    /// The site exists but is soft-deleted.
    #[error("Site {site_id} was found but marked for deletion")]
    SiteDeleted { site_id: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if re-authenticating might resolve this error.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::Authentication { .. })
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Reject empty identifiers before a request is built.
///
/// `fields` is a list of `(name, value)` pairs; the error message lists
/// all of them, e.g. `siteId=abc revisionId=`.
pub(crate) fn require(fields: &[(&str, &str)]) -> Result<(), Error> {
    if fields.iter().all(|(_, value)| !value.is_empty()) {
        return Ok(());
    }
    let message = fields
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join(" ");
    Err(Error::InvalidInput { message })
}
