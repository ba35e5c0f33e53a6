use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub extraction: ExtractionSettings,
    pub google: GoogleSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ExtractionSettings {
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct GoogleSettings {
    /// Service account key file contents, as downloaded from the cloud console.
    pub credentials_json: Option<String>,
    pub sheet_name: String,
    pub sheets_base_url: String,
    pub drive_base_url: String,
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

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(
            config::File::from(configuration_directory.join(environment_filename)).required(false),
        )
        // E.g. `APP_APPLICATION__PORT=5001` sets `Settings.application.port`
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        // Variable names the hosting platform already provides
        .set_override_option("application.port", std::env::var("PORT").ok())?
        .set_override_option("extraction.api_key", std::env::var("GEMINI_API_KEY").ok())?
        .set_override_option(
            "google.credentials_json",
            std::env::var("GOOGLE_CREDENTIALS_JSON").ok(),
        )?
        .set_override_option("google.sheet_name", std::env::var("GOOGLE_SHEET_NAME").ok())?
        .build()?;

    settings.try_deserialize::<Settings>()
}
