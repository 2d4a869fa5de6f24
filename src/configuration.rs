use chrono::{DateTime, Utc};
use config::{Config, ConfigError, File};
use derive_getters::Getters;
use secrecy::{ExposeSecret, Secret};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

/// Retrive the configuration for the application.
///
/// Values are layered: `configuration/base.yaml`, then the file for the
/// environment selected by `APP_ENVIRONMENT`, then `APP_`-prefixed
/// environment variables (e.g. `APP_APPLICATION__PORT=8080`).
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| ConfigError::Foreign(Box::new(e)))?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    Config::builder()
        .add_source(File::from(configuration_directory.join("base.yaml")))
        .add_source(File::from(configuration_directory.join(environment_filename)))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?
        .try_deserialize()
}

#[derive(Debug, Clone, serde::Deserialize, Getters)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub site: SiteSettings,
}

#[derive(Debug, Clone, serde::Deserialize, Getters)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, serde::Deserialize, Getters)]
pub struct DatabaseSettings {
    username: String,
    password: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    port: u16,
    host: String,
    pub name: String,
    require_ssl: bool,
}

impl DatabaseSettings {
    /// Connection options for the server itself, without selecting a database.
    pub fn without_db(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };

        PgConnectOptions::new()
            .host(&self.host)
            .username(&self.username)
            .password(self.password.expose_secret())
            .port(self.port)
            .ssl_mode(ssl_mode)
    }

    pub fn with_db(&self) -> PgConnectOptions {
        self.without_db().database(&self.name)
    }
}

/// Branding and launch details served to the landing page.
#[derive(Debug, Clone, serde::Deserialize, Getters)]
pub struct SiteSettings {
    name: String,
    tagline: String,
    launch_date: DateTime<Utc>,
    contact_email: String,
    address: String,
    #[serde(default)]
    socials: Vec<SocialLink>,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize, Getters, utoipa::ToSchema)]
pub struct SocialLink {
    label: String,
    url: String,
}

/// The runtime environment of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{other} is not a supported environment. Use either `local` or `production`."
            )),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_site_settings() -> SiteSettings {
    serde_json::from_value(serde_json::json!({
        "name": "NT TECH INNOVATION",
        "tagline": "WHERE INNOVATION KNOWS NO LIMITS",
        "launch_date": "2025-12-01T00:00:00Z",
        "contact_email": "hello@nttechinnovation.com",
        "address": "Rajshahi, Bangladesh.",
        "socials": [
            { "label": "Instagram", "url": "https://www.instagram.com/nttechinnovation/" },
            { "label": "Facebook", "url": "" },
        ],
    }))
    .expect("Failed to build sample site settings")
}
