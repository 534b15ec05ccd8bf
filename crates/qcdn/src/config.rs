//! CLI configuration: thin wrapper around `qcdn_config`.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--env, --token, --timeout, ...).

use qcdn_config::{EnvDefaults, KeyringStore, Overrides};
use qcdn_core::ClientConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use qcdn_config::{Config, Profile, config_path, load_config_or_default, save_config};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    qcdn_config::active_profile_name(global.profile.as_deref(), config)
}

fn overrides(global: &GlobalOpts) -> Overrides {
    Overrides {
        env_type: global.env_type.clone(),
        api_token: global.token.clone(),
        endpoint: global.endpoint.clone(),
        timeout: global.timeout,
    }
}

/// Build a `ClientConfig` from the config file, profile, keyring, `QCDN_*`
/// environment and CLI overrides.
pub fn build_client_config(global: &GlobalOpts) -> Result<ClientConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);
    let env = EnvDefaults::from_env()?;

    qcdn_config::resolve(&cfg, &profile_name, &overrides(global), &env, &KeyringStore).map_err(
        |e| match CliError::from(e) {
            CliError::ProfileNotFound { name, .. } => {
                let mut names: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
                names.sort_unstable();
                CliError::ProfileNotFound {
                    name,
                    available: if names.is_empty() {
                        "(none)".into()
                    } else {
                        names.join(", ")
                    },
                }
            }
            other => other,
        },
    )
}
