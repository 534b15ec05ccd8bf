//! Config subcommand handlers.

use std::collections::HashMap;

use dialoguer::{Input, Password, Select};
use secrecy::{ExposeSecret, SecretString};

use qcdn_config::{KeyringStore, PASSWORD_KEY, TOKEN_KEY};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_secret(prompt: &str) -> Result<SecretString, CliError> {
    let value = Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(prompt_err)?;
    if value.is_empty() {
        return Err(CliError::Validation {
            field: prompt.to_lowercase(),
            reason: "cannot be empty".into(),
        });
    }
    Ok(SecretString::from(value))
}

/// Copy of the config with plaintext secrets masked.
fn masked(cfg: &Config) -> Config {
    let mask = |v: &Option<String>| v.as_ref().map(|_| "********".to_owned());
    Config {
        default_profile: cfg.default_profile.clone(),
        defaults: cfg.defaults.clone(),
        profiles: cfg
            .profiles
            .iter()
            .map(|(name, p)| {
                let p = Profile {
                    api_token: mask(&p.api_token),
                    password: mask(&p.password),
                    ..p.clone()
                };
                (name.clone(), p)
            })
            .collect::<HashMap<_, _>>(),
    }
}

fn store_secret(profile: &str, key: &str, secret: &SecretString) -> Result<(), CliError> {
    KeyringStore.set(profile, key, secret.expose_secret())?;
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global),

        ConfigCommand::Show => {
            let cfg = masked(&config::load_config_or_default());
            let out = match global.output {
                OutputFormat::Json => serde_json::to_string_pretty(&cfg)?,
                OutputFormat::JsonCompact => serde_json::to_string(&cfg)?,
                OutputFormat::Yaml => serde_yaml::to_string(&cfg)?,
                OutputFormat::Table | OutputFormat::Plain => {
                    toml::to_string_pretty(&cfg).map_err(|e| CliError::Config {
                        message: e.to_string(),
                    })?
                }
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let active = config::active_profile_name(global, &cfg);
            let mut names: Vec<&String> = cfg.profiles.keys().collect();
            names.sort();
            let lines: Vec<String> = names
                .into_iter()
                .map(|n| {
                    if *n == active {
                        format!("* {n}")
                    } else {
                        format!("  {n}")
                    }
                })
                .collect();
            output::print_output(&lines.join("\n"), global.quiet);
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
                available.sort_unstable();
                return Err(CliError::ProfileNotFound {
                    name,
                    available: available.join(", "),
                });
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            output::notice(&format!("Default profile set to '{name}'"), global.quiet);
            Ok(())
        }

        ConfigCommand::SetToken => {
            let cfg = config::load_config_or_default();
            let profile = config::active_profile_name(global, &cfg);
            let token = match &global.token {
                Some(t) => SecretString::from(t.clone()),
                None => prompt_secret("API token")?,
            };
            store_secret(&profile, TOKEN_KEY, &token)?;
            output::notice(
                &format!("API token for profile '{profile}' stored in the system keyring"),
                global.quiet,
            );
            Ok(())
        }

        ConfigCommand::SetPassword => {
            let cfg = config::load_config_or_default();
            let profile = config::active_profile_name(global, &cfg);
            let password = prompt_secret("Password")?;
            store_secret(&profile, PASSWORD_KEY, &password)?;
            output::notice(
                &format!("Password for profile '{profile}' stored in the system keyring"),
                global.quiet,
            );
            Ok(())
        }
    }
}

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("qcdn configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let envs = &["prod", "stage", "prestg", "dev"];
    let env_idx = Select::new()
        .with_prompt("Environment")
        .items(envs)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    let env_type = envs.get(env_idx).map(|e| (*e).to_owned());

    let auth_choices = &["API token (recommended)", "Username/Password"];
    let auth_selection = Select::new()
        .with_prompt("Authentication method")
        .items(auth_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let mut profile = Profile {
        env_type,
        ..Profile::default()
    };

    if auth_selection == 0 {
        let token = prompt_secret("API token")?;
        store_secret(&profile_name, TOKEN_KEY, &token)?;
        KeyringStore.delete(&profile_name, PASSWORD_KEY)?;
        eprintln!("   API token stored in system keyring");
    } else {
        let user: String = Input::new()
            .with_prompt("Username")
            .interact_text()
            .map_err(prompt_err)?;
        let password = prompt_secret("Password")?;
        store_secret(&profile_name, PASSWORD_KEY, &password)?;
        // A leftover token would take precedence over the new login.
        KeyringStore.delete(&profile_name, TOKEN_KEY)?;
        eprintln!("   Password stored in system keyring");
        profile.username = Some(user);
    }

    let mut cfg = config::load_config_or_default();
    cfg.profiles.insert(profile_name.clone(), profile);
    if cfg.profiles.len() == 1 {
        cfg.default_profile = Some(profile_name.clone());
    }
    config::save_config(&cfg)?;

    output::notice(
        &format!("Profile '{profile_name}' saved to {}", config_path.display()),
        global.quiet,
    );
    Ok(())
}
