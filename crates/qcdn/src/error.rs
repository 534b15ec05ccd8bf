//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a distinct exit code per failure class.

use miette::Diagnostic;
use thiserror::Error;

use qcdn_config::ConfigError;
use qcdn_core::{ApiError, CoreError};

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PENDING: i32 = 5;
    pub const REJECTED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the Qwilt CDN at {url}")]
    #[diagnostic(
        code(qcdn::connection_failed),
        help(
            "Check network access and the environment type (--env).\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(qcdn::auth_failed),
        help(
            "Verify your API token or username/password.\n\
             Run: qcdn config set-token --profile {profile}"
        )
    )]
    AuthFailed { profile: String, message: String },

    #[error("No usable credentials: {message}")]
    #[diagnostic(
        code(qcdn::no_credentials),
        help(
            "Configure credentials with: qcdn config init\n\
             Or set QCDN_XAPI_TOKEN (preferred) or QCDN_USERNAME/QCDN_PASSWORD."
        )
    )]
    NoCredentials { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Not found: {message}")]
    #[diagnostic(code(qcdn::not_found), help("Run: qcdn sites list to see available sites"))]
    NotFound { message: String },

    // ── Activation ───────────────────────────────────────────────────
    #[error("Certificate template {template_id} is pending domain verification")]
    #[diagnostic(
        code(qcdn::template_pending),
        help(
            "Create these CNAME records, then retry once the certificate is issued:\n\
             {delegations}"
        )
    )]
    TemplatePending {
        template_id: i64,
        delegations: String,
    },

    #[error("Certificate template {template_id} has no certificate")]
    #[diagnostic(
        code(qcdn::template_missing_certificate),
        help("Upload a certificate for this template, or pass --certificate-id instead.")
    )]
    TemplateMissingCertificate { template_id: i64 },

    #[error("Site {site_id}: publish {publish_id} was rejected ({acceptance_status})")]
    #[diagnostic(
        code(qcdn::publish_rejected),
        help("Validator details: {details}\nStatus line: {status_line}")
    )]
    PublishRejected {
        site_id: String,
        publish_id: String,
        acceptance_status: String,
        details: String,
        status_line: String,
    },

    #[error("Site {site_id}: publish {publish_id} still Pending after {seconds}s")]
    #[diagnostic(
        code(qcdn::acceptance_timeout),
        help(
            "The operation may still be accepted later.\n\
             Check with: qcdn activation wait {site_id} {publish_id}"
        )
    )]
    AcceptanceTimeout {
        site_id: String,
        publish_id: String,
        seconds: u64,
    },

    #[error("Request timed out")]
    #[diagnostic(
        code(qcdn::timeout),
        help("Increase timeout with --timeout or retry later.")
    )]
    Timeout,

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({status}): {message}")]
    #[diagnostic(code(qcdn::api_error))]
    ApiError { status: u16, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(qcdn::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(qcdn::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: qcdn config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(qcdn::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(qcdn::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(qcdn::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::TemplatePending { .. } | Self::TemplateMissingCertificate { .. } => {
                exit_code::PENDING
            }
            Self::PublishRejected { .. } => exit_code::REJECTED,
            Self::AcceptanceTimeout { .. } | Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::ProfileNotFound { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                profile: "current".into(),
                message,
            },

            CoreError::Unauthorized => CliError::AuthFailed {
                profile: "current".into(),
                message: "401 Unauthorized".into(),
            },

            CoreError::Timeout => CliError::Timeout,

            CoreError::SiteDeleted { site_id } => CliError::NotFound {
                message: format!("site {site_id} is marked for deletion"),
            },

            CoreError::NotFound { message } => CliError::NotFound { message },

            CoreError::MutuallyExclusive { first, second } => CliError::Validation {
                field: format!("{first}/{second}"),
                reason: "set at most one".into(),
            },

            CoreError::TemplatePendingVerification {
                template_id,
                delegations,
            } => CliError::TemplatePending {
                template_id,
                delegations: delegations.to_string(),
            },

            CoreError::TemplateMissingCertificate { template_id } => {
                CliError::TemplateMissingCertificate { template_id }
            }

            CoreError::InvalidInput { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::InvalidImportId { id, expected } => CliError::Validation {
                field: "id".into(),
                reason: format!("{id:?} does not match {expected}"),
            },

            CoreError::AcceptanceTimeout {
                site_id,
                publish_id,
                elapsed,
            } => CliError::AcceptanceTimeout {
                site_id,
                publish_id,
                seconds: elapsed.as_secs(),
            },

            CoreError::PublishRejected {
                site_id,
                publish_id,
                acceptance_status,
                details,
                status_line,
            } => CliError::PublishRejected {
                site_id,
                publish_id,
                acceptance_status,
                details,
                status_line,
            },

            CoreError::Api { status, body } => CliError::ApiError {
                status,
                message: body,
            },

            CoreError::Config { message } | CoreError::Internal(message) => {
                CliError::Config { message }
            }
        }
    }
}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        CoreError::from(err).into()
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            e @ ConfigError::MissingCredential { .. } => CliError::NoCredentials {
                message: e.to_string(),
            },
            ConfigError::UnknownProfile { profile } => CliError::ProfileNotFound {
                name: profile,
                available: String::new(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
