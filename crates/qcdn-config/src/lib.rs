//! Shared configuration for the qcdn tools.
//!
//! TOML profiles, `QCDN_*` environment defaults, credential resolution
//! (flag > profile > keyring > environment) and translation to
//! `qcdn_core::ClientConfig`. Resolution happens once, at the process
//! boundary; nothing below the CLI reads the environment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use qcdn_core::{AuthCredentials, ClientConfig, EnvType};

/// Keyring service name shared by every profile.
pub const KEYRING_SERVICE: &str = "qcdn";

/// Keyring entry suffix for the API token.
pub const TOKEN_KEY: &str = "api-token";

/// Keyring entry suffix for the login password.
pub const PASSWORD_KEY: &str = "password";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error(
        "unknown QC services {field}; set it in the profile or use the {env_var} environment variable"
    )]
    MissingCredential {
        field: &'static str,
        env_var: &'static str,
    },

    #[error("profile '{profile}' not found in config")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds to wait for a publish to leave `Pending`.
    #[serde(default = "default_acceptance_timeout")]
    pub acceptance_timeout: u64,

    /// Seconds between acceptance polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            acceptance_timeout: default_acceptance_timeout(),
            poll_interval: default_poll_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    40
}
fn default_acceptance_timeout() -> u64 {
    ClientConfig::DEFAULT_ACCEPTANCE_TIMEOUT.as_secs()
}
fn default_poll_interval() -> u64 {
    ClientConfig::DEFAULT_POLL_INTERVAL.as_secs()
}

/// A named profile. Every field is optional; unset fields fall back to
/// the keyring and then to the `QCDN_*` environment variables.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Environment type: prod, stage, prestg or dev.
    pub env_type: Option<String>,

    /// API token (plaintext; prefer the keyring or `QCDN_XAPI_TOKEN`).
    pub api_token: Option<String>,

    /// Username for session login.
    pub username: Option<String>,

    /// Password for session login (plaintext; prefer the keyring).
    pub password: Option<String>,

    /// Single base URL used for every service instead of the env table.
    pub endpoint: Option<String>,

    /// Path to an extra CA certificate.
    pub ca_cert: Option<PathBuf>,

    pub timeout: Option<u64>,
    pub acceptance_timeout: Option<u64>,
    pub poll_interval: Option<u64>,
}

// ── Environment defaults ────────────────────────────────────────────

/// Values read from `QCDN_ENVTYPE`, `QCDN_USERNAME`, `QCDN_PASSWORD` and
/// `QCDN_XAPI_TOKEN`. Explicit profile values override them.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct EnvDefaults {
    pub envtype: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub xapi_token: Option<String>,
}

impl EnvDefaults {
    pub fn from_env() -> Result<Self, ConfigError> {
        let env = Env::prefixed("QCDN_").only(&["envtype", "username", "password", "xapi_token"]);
        Ok(Figment::from(env).extract()?)
    }
}

// ── Secret store ────────────────────────────────────────────────────

/// Lookup of per-profile secrets.
pub trait SecretStore {
    fn get(&self, profile: &str, key: &str) -> Option<SecretString>;
}

/// System keyring, entries named `{profile}/{key}` under [`KEYRING_SERVICE`].
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringStore;

impl KeyringStore {
    pub fn set(&self, profile: &str, key: &str, secret: &str) -> Result<(), ConfigError> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile}/{key}"))?;
        entry.set_password(secret)?;
        Ok(())
    }

    pub fn delete(&self, profile: &str, key: &str) -> Result<(), ConfigError> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile}/{key}"))?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl SecretStore for KeyringStore {
    fn get(&self, profile: &str, key: &str) -> Option<SecretString> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile}/{key}")).ok()?;
        entry.get_password().ok().map(SecretString::from)
    }
}

/// A store that never has anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSecrets;

impl SecretStore for NoSecrets {
    fn get(&self, _profile: &str, _key: &str) -> Option<SecretString> {
        None
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "qwilt", "qcdn").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("qcdn");
    p
}

// ── Config loading / saving ─────────────────────────────────────────

/// Load the config file at the canonical path.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load a config file; a missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .extract()?;
    Ok(config)
}

/// Load config, returning a default if the file is unreadable.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Resolution ──────────────────────────────────────────────────────

/// Values given on the command line. They beat everything else.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub env_type: Option<String>,
    pub api_token: Option<String>,
    pub endpoint: Option<String>,
    pub timeout: Option<u64>,
}

/// Credentials and environment after merging every source.
#[derive(Debug, Default)]
pub struct Settings {
    pub env_type: Option<String>,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub api_token: Option<SecretString>,
}

impl Settings {
    /// Merge one profile with its sources: flag > profile > keyring > env.
    pub fn merge(
        profile: &Profile,
        profile_name: &str,
        overrides: &Overrides,
        env: &EnvDefaults,
        secrets: &dyn SecretStore,
    ) -> Self {
        let api_token = non_empty(overrides.api_token.as_ref())
            .or_else(|| non_empty(profile.api_token.as_ref()))
            .map(|t| SecretString::from(t.clone()))
            .or_else(|| secrets.get(profile_name, TOKEN_KEY))
            .or_else(|| non_empty(env.xapi_token.as_ref()).map(|t| SecretString::from(t.clone())));

        let password = non_empty(profile.password.as_ref())
            .map(|p| SecretString::from(p.clone()))
            .or_else(|| secrets.get(profile_name, PASSWORD_KEY))
            .or_else(|| non_empty(env.password.as_ref()).map(|p| SecretString::from(p.clone())));

        Self {
            env_type: non_empty(overrides.env_type.as_ref())
                .or_else(|| non_empty(profile.env_type.as_ref()))
                .or_else(|| non_empty(env.envtype.as_ref()))
                .cloned(),
            username: non_empty(profile.username.as_ref())
                .or_else(|| non_empty(env.username.as_ref()))
                .cloned(),
            password: password.filter(|p| !p.expose_secret().is_empty()),
            api_token: api_token.filter(|t| !t.expose_secret().is_empty()),
        }
    }

    /// Check that the merged values can authenticate.
    ///
    /// The token is the preferred method; without one a username and
    /// password are required, and an internal (`qwilt.com`) username also
    /// needs an explicit environment type.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_token.is_some() {
            return Ok(());
        }
        warn!(
            "no API token configured; the token is the preferred authentication method \
             (set it in the profile or use QCDN_XAPI_TOKEN)"
        );

        let Some(username) = self.username.as_deref() else {
            return Err(ConfigError::MissingCredential {
                field: "username",
                env_var: "QCDN_USERNAME",
            });
        };
        if self.password.is_none() {
            return Err(ConfigError::MissingCredential {
                field: "password",
                env_var: "QCDN_PASSWORD",
            });
        }
        if username.contains("qwilt.com") && self.env_type.is_none() {
            return Err(ConfigError::MissingCredential {
                field: "env_type",
                env_var: "QCDN_ENVTYPE",
            });
        }
        Ok(())
    }

    pub fn env_type(&self) -> Result<EnvType, ConfigError> {
        self.env_type
            .as_deref()
            .map_or(Ok(EnvType::Prod), EnvType::from_str)
            .map_err(|reason| ConfigError::Validation {
                field: "env_type".into(),
                reason,
            })
    }

    pub fn auth(&self) -> Result<AuthCredentials, ConfigError> {
        if let Some(token) = &self.api_token {
            return Ok(AuthCredentials::ApiKey(token.clone()));
        }
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Ok(AuthCredentials::Login {
                username: username.clone(),
                password: password.clone(),
            }),
            (None, _) => Err(ConfigError::MissingCredential {
                field: "username",
                env_var: "QCDN_USERNAME",
            }),
            (Some(_), None) => Err(ConfigError::MissingCredential {
                field: "password",
                env_var: "QCDN_PASSWORD",
            }),
        }
    }
}

fn non_empty(value: Option<&String>) -> Option<&String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Resolve the active profile name: flag, then `default_profile`.
pub fn active_profile_name(flag: Option<&str>, config: &Config) -> String {
    flag.map(str::to_owned)
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `ClientConfig` for one profile.
///
/// The `default` profile may be absent from the file, in which case the
/// environment alone must supply credentials.
pub fn resolve(
    config: &Config,
    profile_name: &str,
    overrides: &Overrides,
    env: &EnvDefaults,
    secrets: &dyn SecretStore,
) -> Result<ClientConfig, ConfigError> {
    let empty = Profile::default();
    let profile = match config.profiles.get(profile_name) {
        Some(p) => p,
        None if profile_name == "default" => &empty,
        None => {
            return Err(ConfigError::UnknownProfile {
                profile: profile_name.into(),
            });
        }
    };

    let settings = Settings::merge(profile, profile_name, overrides, env, secrets);
    settings.validate()?;

    let mut client = ClientConfig::new(settings.env_type()?, settings.auth()?);

    let defaults = &config.defaults;
    client.timeout = Duration::from_secs(
        overrides
            .timeout
            .or(profile.timeout)
            .unwrap_or(defaults.timeout),
    );
    client.acceptance_timeout = Duration::from_secs(
        profile
            .acceptance_timeout
            .unwrap_or(defaults.acceptance_timeout),
    );
    client.poll_interval =
        Duration::from_secs(profile.poll_interval.unwrap_or(defaults.poll_interval));
    client.ca_cert.clone_from(&profile.ca_cert);

    if let Some(raw) = non_empty(overrides.endpoint.as_ref()).or(non_empty(profile.endpoint.as_ref()))
    {
        let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
            field: "endpoint".into(),
            reason: format!("invalid URL: {raw}"),
        })?;
        client.endpoint_override = Some(url);
    }

    if client.poll_interval.is_zero() {
        return Err(ConfigError::Validation {
            field: "poll_interval".into(),
            reason: "must be at least one second".into(),
        });
    }

    debug!(profile = profile_name, env = %client.env, "resolved client config");
    Ok(client)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct MapStore(HashMap<String, String>);

    impl SecretStore for MapStore {
        fn get(&self, profile: &str, key: &str) -> Option<SecretString> {
            self.0
                .get(&format!("{profile}/{key}"))
                .map(|s| SecretString::from(s.clone()))
        }
    }

    fn token_of(cfg: &ClientConfig) -> String {
        match &cfg.auth {
            AuthCredentials::ApiKey(t) => t.expose_secret().to_owned(),
            AuthCredentials::Login { .. } => panic!("expected token auth"),
        }
    }

    #[test]
    fn env_alone_is_enough_for_default_profile() {
        let env = EnvDefaults {
            xapi_token: Some("env-token".into()),
            ..Default::default()
        };
        let cfg = resolve(&Config::default(), "default", &Overrides::default(), &env, &NoSecrets)
            .unwrap();
        assert_eq!(token_of(&cfg), "env-token");
        assert_eq!(cfg.env, EnvType::Prod);
        assert_eq!(cfg.poll_interval, Duration::from_secs(3));
        assert_eq!(cfg.acceptance_timeout, Duration::from_secs(180));
    }

    #[test]
    fn profile_overrides_env_and_flag_overrides_profile() {
        let mut config = Config::default();
        config.profiles.insert(
            "default".into(),
            Profile {
                env_type: Some("stage".into()),
                api_token: Some("profile-token".into()),
                ..Default::default()
            },
        );
        let env = EnvDefaults {
            envtype: Some("dev".into()),
            xapi_token: Some("env-token".into()),
            ..Default::default()
        };

        let cfg = resolve(&config, "default", &Overrides::default(), &env, &NoSecrets).unwrap();
        assert_eq!(token_of(&cfg), "profile-token");
        assert_eq!(cfg.env, EnvType::Stage);

        let flags = Overrides {
            api_token: Some("flag-token".into()),
            env_type: Some("prestg".into()),
            ..Default::default()
        };
        let cfg = resolve(&config, "default", &flags, &env, &NoSecrets).unwrap();
        assert_eq!(token_of(&cfg), "flag-token");
        assert_eq!(cfg.env, EnvType::Prestg);
    }

    #[test]
    fn keyring_sits_between_profile_and_env() {
        let mut store = MapStore::default();
        store.0.insert("work/api-token".into(), "ring-token".into());
        let mut config = Config::default();
        config.profiles.insert("work".into(), Profile::default());
        let env = EnvDefaults {
            xapi_token: Some("env-token".into()),
            ..Default::default()
        };

        let cfg = resolve(&config, "work", &Overrides::default(), &env, &store).unwrap();
        assert_eq!(token_of(&cfg), "ring-token");
    }

    #[test]
    fn login_requires_username_then_password() {
        let env = EnvDefaults::default();
        let err = resolve(&Config::default(), "default", &Overrides::default(), &env, &NoSecrets)
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential { field: "username", .. }));

        let env = EnvDefaults {
            username: Some("ops@example.com".into()),
            ..Default::default()
        };
        let err = resolve(&Config::default(), "default", &Overrides::default(), &env, &NoSecrets)
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential { field: "password", .. }));
        assert!(err.to_string().contains("QCDN_PASSWORD"));
    }

    #[test]
    fn internal_username_needs_env_type() {
        let env = EnvDefaults {
            username: Some("dev@qwilt.com".into()),
            password: Some("pw".into()),
            ..Default::default()
        };
        let err = resolve(&Config::default(), "default", &Overrides::default(), &env, &NoSecrets)
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential { field: "env_type", .. }));

        let env = EnvDefaults {
            envtype: Some("dev".into()),
            ..env
        };
        let cfg = resolve(&Config::default(), "default", &Overrides::default(), &env, &NoSecrets)
            .unwrap();
        assert_eq!(cfg.env, EnvType::Dev);
        assert!(matches!(cfg.auth, AuthCredentials::Login { ref username, .. } if username == "dev@qwilt.com"));
    }

    #[test]
    fn empty_values_count_as_unset() {
        let env = EnvDefaults {
            xapi_token: Some(String::new()),
            username: Some("ops@example.com".into()),
            password: Some("pw".into()),
            ..Default::default()
        };
        let cfg = resolve(&Config::default(), "default", &Overrides::default(), &env, &NoSecrets)
            .unwrap();
        assert!(matches!(cfg.auth, AuthCredentials::Login { .. }));
    }

    #[test]
    fn unknown_env_type_is_rejected() {
        let env = EnvDefaults {
            envtype: Some("qa".into()),
            xapi_token: Some("t".into()),
            ..Default::default()
        };
        let err = resolve(&Config::default(), "default", &Overrides::default(), &env, &NoSecrets)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "env_type"));
    }

    #[test]
    fn unknown_named_profile_is_an_error() {
        let err = resolve(
            &Config::default(),
            "missing",
            &Overrides::default(),
            &EnvDefaults::default(),
            &NoSecrets,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProfile { .. }));
    }

    #[test]
    fn endpoint_and_timeouts_flow_through() {
        let mut config = Config::default();
        config.profiles.insert(
            "default".into(),
            Profile {
                api_token: Some("t".into()),
                endpoint: Some("http://localhost:8080".into()),
                timeout: Some(10),
                acceptance_timeout: Some(60),
                poll_interval: Some(1),
                ..Default::default()
            },
        );
        let flags = Overrides {
            timeout: Some(5),
            ..Default::default()
        };
        let cfg = resolve(&config, "default", &flags, &EnvDefaults::default(), &NoSecrets).unwrap();
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert_eq!(cfg.acceptance_timeout, Duration::from_secs(60));
        assert_eq!(cfg.poll_interval, Duration::from_secs(1));
        assert_eq!(
            cfg.endpoint_override.unwrap().as_str(),
            "http://localhost:8080/"
        );
    }

    #[test]
    fn env_defaults_read_qcdn_variables() {
        Jail::expect_with(|jail| {
            jail.set_env("QCDN_ENVTYPE", "stage");
            jail.set_env("QCDN_XAPI_TOKEN", "abc");
            jail.set_env("QCDN_UNRELATED", "ignored");
            let env = EnvDefaults::from_env().unwrap();
            assert_eq!(env.envtype.as_deref(), Some("stage"));
            assert_eq!(env.xapi_token.as_deref(), Some("abc"));
            assert_eq!(env.username, None);
            Ok(())
        });
    }

    #[test]
    fn load_merges_file_over_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                default_profile = "work"

                [defaults]
                output = "json"

                [profiles.work]
                env_type = "stage"
                username = "ops@example.com"
                "#,
            )?;
            let cfg = load_config_from(Path::new("config.toml")).unwrap();
            assert_eq!(cfg.default_profile.as_deref(), Some("work"));
            assert_eq!(cfg.defaults.output, "json");
            assert_eq!(cfg.defaults.poll_interval, 3);
            assert_eq!(cfg.profiles["work"].env_type.as_deref(), Some("stage"));
            Ok(())
        });
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                env_type: Some("dev".into()),
                ..Default::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profiles["default"].env_type.as_deref(), Some("dev"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert!(cfg.profiles.is_empty());
    }
}
