// ── Core error types ──
//
// User-facing errors from qcdn-core. Transport failures arrive as
// `qcdn_api::Error` and are translated by the `From` impl below; the
// activation workflow adds its own precondition and acceptance failures.

use std::time::Duration;

use qcdn_api::models::ChallengeDelegations;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("401 Unauthorized -- please re-authenticate")]
    Unauthorized,

    #[error("Request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Site {site_id} was found but marked for deletion")]
    SiteDeleted { site_id: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    // ── Precondition errors ──────────────────────────────────────────
    #[error("'{first}' and '{second}' are mutually exclusive; set at most one")]
    MutuallyExclusive {
        first: &'static str,
        second: &'static str,
    },

    #[error(
        "Certificate template {template_id} is pending verification. Please make sure to have \
         the CNAMEs list configured correctly:\n{delegations}"
    )]
    TemplatePendingVerification {
        template_id: i64,
        delegations: ChallengeDelegations,
    },

    #[error("Certificate template {template_id} has no certificate; please upload one")]
    TemplateMissingCertificate { template_id: i64 },

    #[error("Invalid input, {message}")]
    InvalidInput { message: String },

    #[error("Unexpected import identifier {id:?}; expected {expected}")]
    InvalidImportId { id: String, expected: &'static str },

    // ── Activation errors ────────────────────────────────────────────
    #[error(
        "Publish operation timed out after {}s waiting for acceptance status for \
         siteId={site_id} publishId={publish_id}",
        elapsed.as_secs()
    )]
    AcceptanceTimeout {
        site_id: String,
        publish_id: String,
        elapsed: Duration,
    },

    #[error(
        "Publish failed for Qwilt CDN site {site_id}. Acceptance status: {acceptance_status}. \
         Err: {details}. Status line: {status_line}"
    )]
    PublishRejected {
        site_id: String,
        publish_id: String,
        acceptance_status: String,
        details: String,
        status_line: String,
    },

    // ── API errors (wrapped) ─────────────────────────────────────────
    #[error("API command failed - status: {status}, body: {body}")]
    Api { status: u16, body: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::SiteDeleted { .. } | Self::Api { status: 404, .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<qcdn_api::Error> for CoreError {
    fn from(err: qcdn_api::Error) -> Self {
        match err {
            qcdn_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            qcdn_api::Error::Unauthorized => CoreError::Unauthorized,
            qcdn_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        status: e.status().map_or(0, |s| s.as_u16()),
                        body: e.to_string(),
                    }
                }
            }
            qcdn_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            qcdn_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            qcdn_api::Error::Api { status: 404, body } => CoreError::NotFound { message: body },
            qcdn_api::Error::Api { status, body } => CoreError::Api { status, body },
            qcdn_api::Error::InvalidInput { message } => CoreError::InvalidInput { message },
            qcdn_api::Error::SiteDeleted { site_id } => CoreError::SiteDeleted { site_id },
            qcdn_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
