//! Shared configuration for Rise Garden clients.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `risegarden_core::ClientConfig`. One profile is one
//! account; an application picks a profile and builds a `GardenRegistry`
//! from the resulting config.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use risegarden_api::{DEFAULT_BASE_URL, TlsMode};
use risegarden_core::{ClientConfig, Credentials};

const KEYRING_SERVICE: &str = "risegarden";
const ENV_PREFIX: &str = "RISEGARDEN_";
const EMAIL_ENV: &str = "RISEGARDEN_EMAIL";
const PASSWORD_ENV: &str = "RISEGARDEN_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no profile named '{profile}'")]
    UnknownProfile { profile: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

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
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when the caller does not name one.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// The profile name to use when none is given.
    pub fn default_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }

    /// Look up a profile by name, falling back to the default profile.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = name.unwrap_or_else(|| self.default_profile_name());
        self.profiles
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_timeout() -> u64 {
    20
}

/// A named account profile.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Account email. Without one the caller must log in explicitly.
    pub email: Option<String>,

    /// Password (plaintext, prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Override the API base URL (e.g. a staging deployment).
    pub base_url: Option<String>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Path to a custom CA certificate (for TLS-intercepting proxies).
    pub ca_cert: Option<PathBuf>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "risegarden", "risegarden").map_or_else(
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
    p.push("risegarden");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
///
/// A missing file is not an error; defaults and environment still apply.
/// Nested keys use a double underscore, e.g. `RISEGARDEN_DEFAULTS__TIMEOUT`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(
            Env::prefixed(ENV_PREFIX)
                .ignore(&["email", "password"])
                .split("__"),
        );

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it can't be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    debug!(path = %path.display(), "config saved");
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &SecretString) -> Result<(), ConfigError> {
    use secrecy::ExposeSecret;

    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name))?;
    entry.set_password(password.expose_secret())?;
    Ok(())
}

fn keyring_user(profile_name: &str) -> String {
    format!("{profile_name}/password")
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn keyring_password(profile_name: &str) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name))
        .and_then(|entry| entry.get_password())
        .ok()
}

/// Resolve a profile's password from the credential chain.
///
/// Order: the profile's `password_env` variable, `RISEGARDEN_PASSWORD`,
/// the system keyring, then plaintext in the config.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    password_from_chain(profile, profile_name, env_var, keyring_password).ok_or_else(|| {
        ConfigError::NoCredentials {
            profile: profile_name.into(),
        }
    })
}

fn password_from_chain(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Option<SecretString> {
    if let Some(pw) = profile.password_env.as_deref().and_then(&env) {
        debug!(profile = profile_name, "password from profile env var");
        return Some(SecretString::from(pw));
    }
    if let Some(pw) = env(PASSWORD_ENV) {
        debug!(profile = profile_name, "password from {PASSWORD_ENV}");
        return Some(SecretString::from(pw));
    }
    if let Some(pw) = keyring(profile_name) {
        debug!(profile = profile_name, "password from keyring");
        return Some(SecretString::from(pw));
    }
    profile.password.clone().map(SecretString::from)
}

/// Resolve a profile's account credentials.
///
/// `Ok(None)` when the profile names no email (and `RISEGARDEN_EMAIL` is
/// unset); an email without any password source is an error.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<Option<Credentials>, ConfigError> {
    let Some(email) = profile.email.clone().or_else(|| env_var(EMAIL_ENV)) else {
        return Ok(None);
    };
    let password = resolve_password(profile, profile_name)?;
    Ok(Some(Credentials::new(email, password)))
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `ClientConfig` for a named profile (or the default one).
pub fn profile_to_client_config(
    config: &Config,
    profile_name: Option<&str>,
) -> Result<ClientConfig, ConfigError> {
    let (name, profile) = config.profile(profile_name)?;
    let credentials = resolve_credentials(profile, name)?;
    build_client_config(&config.defaults, profile, credentials)
}

fn build_client_config(
    defaults: &Defaults,
    profile: &Profile,
    credentials: Option<Credentials>,
) -> Result<ClientConfig, ConfigError> {
    let raw_url = profile.base_url.as_deref().unwrap_or(&defaults.base_url);
    let base_url: url::Url = raw_url.parse().map_err(|_| ConfigError::Validation {
        field: "base_url".into(),
        reason: format!("invalid URL: {raw_url}"),
    })?;

    let timeout = profile.timeout.unwrap_or(defaults.timeout);
    if timeout == 0 {
        return Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    let tls = profile
        .ca_cert
        .clone()
        .map_or(TlsMode::System, TlsMode::CustomCa);

    Ok(ClientConfig {
        base_url,
        credentials,
        timeout: Duration::from_secs(timeout),
        tls,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn write(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.default_profile_name(), "default");
        assert_eq!(config.defaults.base_url, "https://prod-api.risegds.com/v2");
        assert_eq!(config.defaults.timeout, 20);
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn profiles_are_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            r#"
default_profile = "home"

[defaults]
timeout = 15

[profiles.home]
email = "grower@example.com"
password_env = "HOME_GARDEN_PW"

[profiles.staging]
email = "qa@example.com"
base_url = "https://staging.example.com/v2"
ca_cert = "/etc/ssl/proxy.pem"
"#,
        );

        let config = load_config_from(&path).unwrap();
        let (name, home) = config.profile(None).unwrap();

        assert_eq!(name, "home");
        assert_eq!(home.email.as_deref(), Some("grower@example.com"));
        assert_eq!(home.password_env.as_deref(), Some("HOME_GARDEN_PW"));
        assert_eq!(config.defaults.timeout, 15);
        assert_eq!(
            config.defaults.base_url,
            "https://prod-api.risegds.com/v2",
            "unset default keeps its value"
        );
        assert_eq!(config.profiles.len(), 2);
    }

    #[test]
    fn env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "config.toml",
                "default_profile = \"home\"\n[defaults]\ntimeout = 15\n",
            )?;
            jail.set_env("RISEGARDEN_DEFAULTS__TIMEOUT", "7");
            jail.set_env("RISEGARDEN_DEFAULT_PROFILE", "work");

            let config = load_config_from(Path::new("config.toml")).unwrap();

            assert_eq!(config.defaults.timeout, 7);
            assert_eq!(config.default_profile_name(), "work");
            Ok(())
        });
    }

    #[test]
    fn credential_env_vars_stay_out_of_config() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env(EMAIL_ENV, "grower@example.com");
            jail.set_env(PASSWORD_ENV, "hunter2");

            let config = load_config_from(Path::new("absent.toml")).unwrap();

            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn credentials_from_profile_and_env() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            let anonymous = Profile::default();
            assert!(matches!(
                resolve_credentials(&anonymous, "risegarden-test-anon"),
                Ok(None)
            ));

            let no_password = Profile {
                email: Some("grower@example.com".into()),
                ..Profile::default()
            };
            assert!(matches!(
                resolve_credentials(&no_password, "risegarden-test-nopw"),
                Err(ConfigError::NoCredentials { profile }) if profile == "risegarden-test-nopw"
            ));

            jail.set_env(EMAIL_ENV, "env@example.com");
            jail.set_env("GARDEN_PW", "from-env");
            let env_only = Profile {
                password_env: Some("GARDEN_PW".into()),
                ..Profile::default()
            };
            let creds = resolve_credentials(&env_only, "risegarden-test-env")
                .unwrap()
                .unwrap();
            assert_eq!(creds.email, "env@example.com");
            assert_eq!(creds.password.expose_secret(), "from-env");
            Ok(())
        });
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let config = Config::default();
        assert!(matches!(
            config.profile(Some("nope")),
            Err(ConfigError::UnknownProfile { profile }) if profile == "nope"
        ));
    }

    #[test]
    fn save_then_load_preserves_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.profiles.insert(
            "default".into(),
            Profile {
                email: Some("grower@example.com".into()),
                timeout: Some(30),
                ca_cert: Some("/etc/ssl/proxy.pem".into()),
                ..Profile::default()
            },
        );

        save_config_to(&config, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn password_chain_order() {
        let profile = Profile {
            password: Some("plain".into()),
            password_env: Some("MY_PW".into()),
            ..Profile::default()
        };
        let none = |_: &str| None;
        let secret = |s: Option<SecretString>| s.map(|s| s.expose_secret().to_owned());

        let all_env = |k: &str| match k {
            "MY_PW" => Some("from-profile-env".into()),
            PASSWORD_ENV => Some("from-global-env".into()),
            _ => None,
        };
        let global_env = |k: &str| (k == PASSWORD_ENV).then(|| "from-global-env".to_owned());
        let keyring = |p: &str| (p == "home").then(|| "from-keyring".to_owned());

        assert_eq!(
            secret(password_from_chain(&profile, "home", all_env, keyring)),
            Some("from-profile-env".into())
        );
        assert_eq!(
            secret(password_from_chain(&profile, "home", global_env, keyring)),
            Some("from-global-env".into())
        );
        assert_eq!(
            secret(password_from_chain(&profile, "home", none, keyring)),
            Some("from-keyring".into())
        );
        assert_eq!(
            secret(password_from_chain(&profile, "home", none, none)),
            Some("plain".into())
        );
        assert_eq!(
            secret(password_from_chain(&Profile::default(), "home", none, none)),
            None
        );
    }

    #[test]
    fn client_config_uses_defaults_and_overrides() {
        let defaults = Defaults::default();

        let config = build_client_config(&defaults, &Profile::default(), None).unwrap();
        assert_eq!(config.base_url.as_str(), "https://prod-api.risegds.com/v2");
        assert_eq!(config.timeout, Duration::from_secs(20));
        assert_eq!(config.tls, TlsMode::System);
        assert!(config.credentials.is_none());

        let profile = Profile {
            base_url: Some("https://staging.example.com/v2".into()),
            timeout: Some(5),
            ca_cert: Some("/etc/ssl/proxy.pem".into()),
            ..Profile::default()
        };
        let creds = Credentials::new("grower@example.com", "pw");
        let config = build_client_config(&defaults, &profile, Some(creds)).unwrap();
        assert_eq!(config.base_url.as_str(), "https://staging.example.com/v2");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.tls, TlsMode::CustomCa("/etc/ssl/proxy.pem".into()));
        assert_eq!(
            config.credentials.map(|c| c.email).as_deref(),
            Some("grower@example.com")
        );
    }

    #[test]
    fn client_config_rejects_bad_values() {
        let defaults = Defaults::default();
        let bad_url = Profile {
            base_url: Some("not a url".into()),
            ..Profile::default()
        };
        let zero_timeout = Profile {
            timeout: Some(0),
            ..Profile::default()
        };

        assert!(matches!(
            build_client_config(&defaults, &bad_url, None),
            Err(ConfigError::Validation { field, .. }) if field == "base_url"
        ));
        assert!(matches!(
            build_client_config(&defaults, &zero_timeout, None),
            Err(ConfigError::Validation { field, .. }) if field == "timeout"
        ));
    }
}
