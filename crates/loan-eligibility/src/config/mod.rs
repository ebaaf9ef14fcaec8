use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Selects which backend the eligibility engine uses to resolve crime grades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraderBackend {
    /// Graceful-degradation chain: scraper, geocode heuristic, terminal default.
    #[default]
    Resolver,
    /// Chat-completion agent; malformed model output is a hard failure.
    Agent,
    /// Reference-dataset lookup only; requires an imported dataset.
    Dataset,
}

impl GraderBackend {
    fn from_str(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "resolver" => Ok(Self::Resolver),
            "agent" => Ok(Self::Agent),
            "dataset" => Ok(Self::Dataset),
            other => Err(ConfigError::InvalidGraderBackend {
                value: other.to_string(),
            }),
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub security: SecurityConfig,
    pub crime: CrimeSourcesConfig,
    pub openai: OpenAiConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let api_key = env::var("API_KEY").unwrap_or_else(|_| "loan-api-key-atlas".to_string());

        let grader = GraderBackend::from_str(&env::var("APP_CRIME_GRADER").unwrap_or_default())?;

        let crimegrade_base_url = env::var("CRIMEGRADE_BASE_URL")
            .unwrap_or_else(|_| "https://www.crimegrade.org".to_string());
        let geocoder_base_url = env::var("GEOCODER_BASE_URL")
            .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string());

        let files_path = env::var("FILES_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("files"));
        let dataset_filename =
            env::var("CRIMEGRADE_FILENAME").unwrap_or_else(|_| "crime-grade.csv".to_string());

        let openai_api_key = env::var("OPENAI_API_KEY").ok().filter(|key| !key.is_empty());
        let openai_model = env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let openai_base_url = env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            security: SecurityConfig { api_key },
            crime: CrimeSourcesConfig {
                grader,
                crimegrade_base_url,
                geocoder_base_url,
                files_path,
                dataset_filename,
            },
            openai: OpenAiConfig {
                api_key: openai_api_key,
                model: openai_model,
                base_url: openai_base_url,
            },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// API-key secret checked by the HTTP boundary middleware.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub api_key: String,
}

/// Outbound crime-data sources and the reference dataset location.
#[derive(Debug, Clone)]
pub struct CrimeSourcesConfig {
    pub grader: GraderBackend,
    pub crimegrade_base_url: String,
    pub geocoder_base_url: String,
    pub files_path: PathBuf,
    pub dataset_filename: String,
}

impl CrimeSourcesConfig {
    pub fn dataset_path(&self) -> PathBuf {
        self.files_path.join(&self.dataset_filename)
    }
}

/// Chat-completion endpoint credentials and model selection.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidGraderBackend { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidGraderBackend { value } => {
                write!(
                    f,
                    "APP_CRIME_GRADER must be 'resolver', 'agent', or 'dataset', got '{value}'"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidGraderBackend { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
