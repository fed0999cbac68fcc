use std::time::Duration;

use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub hyperbrowser: HyperbrowserSettings,
    pub pangram: PangramSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HyperbrowserSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub poll_interval_millis: u64,
}

impl HyperbrowserSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_millis)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PangramSettings {
    pub api_key: Option<String>,
    pub base_url: String,
}

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
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

/// Reads settings once at process start.
///
/// Sources, lowest precedence first: built-in defaults, `configuration/base.yaml`,
/// `configuration/{APP_ENVIRONMENT}.yaml`, `APP_`-prefixed variables
/// (`APP_PANGRAM__BASE_URL`), and the bare `HYPERBROWSER_API_KEY` /
/// `PANGRAM_API_KEY` variables. A `.env` file in the working directory is loaded
/// into the environment first.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    // Missing .env is the normal case outside development
    let _ = dotenvy::dotenv();

    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("Failed to read current dir: {}", e)))?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;

    let settings = config::Config::builder()
        .set_default("application.host", "127.0.0.1")?
        .set_default("application.port", 8000)?
        .set_default("hyperbrowser.base_url", "https://app.hyperbrowser.ai")?
        .set_default("hyperbrowser.poll_interval_millis", 2000)?
        .set_default("pangram.base_url", "https://text.api.pangramlabs.com")?
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(false))
        .add_source(
            config::File::from(
                configuration_directory.join(format!("{}.yaml", environment.as_str())),
            )
            .required(false),
        )
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option(
            "hyperbrowser.api_key",
            non_empty_var("HYPERBROWSER_API_KEY"),
        )?
        .set_override_option("pangram.api_key", non_empty_var("PANGRAM_API_KEY"))?
        .build()?;

    settings.try_deserialize::<Settings>()
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
