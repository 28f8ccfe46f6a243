use serde::Deserialize;
use std::{env, path::Path, path::PathBuf, time::Duration};
use thiserror::Error;

use lexcheck_client::{ClientError, ClientOptions, RetryPolicy, parse_endpoint};
use lexcheck_types::{AnalysisDomain, DomainParseError, UiOptions};

/// Environment variable that overrides `[server] endpoint`.
pub const ENDPOINT_ENV: &str = "LEXCHECK_ENDPOINT";

/// Directory results are saved to when `--save` is given without a path.
pub const DEFAULT_SAVE_DIR: &str = "analysis_output";

#[derive(Debug, Default, Deserialize)]
pub struct LexcheckConfig {
    pub server: Option<ServerConfig>,
    pub retry: Option<RetryConfig>,
    pub analysis: Option<AnalysisConfig>,
    pub output: Option<OutputConfig>,
    pub app: Option<AppConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error(transparent)]
    Domain(#[from] DomainParseError),
    #[error(transparent)]
    Endpoint(#[from] ClientError),
}

/// Analysis server connection.
///
/// ```toml
/// [server]
/// endpoint = "http://127.0.0.1:5000/analyze"
/// connect_timeout_secs = 5
/// request_timeout_secs = 120
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct ServerConfig {
    pub endpoint: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first. Default: 3.
    pub max_attempts: Option<u32>,
    /// Delay between attempts in milliseconds. Default: 1000.
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalysisConfig {
    pub domain: Option<String>,
    /// Ask the backend to consult its professional knowledge base.
    #[serde(default)]
    pub professional_kb: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct OutputConfig {
    /// Always save raw results here, even without `--save`.
    pub save_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Use ASCII-only glyphs for tags, bullets and the spinner.
    #[serde(default)]
    pub ascii_only: bool,
    /// Enable a high-contrast color palette.
    #[serde(default)]
    pub high_contrast: bool,
}

/// Expand `${VAR}` references; unset variables expand to nothing.
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let var = &rest[start + 2..start + 2 + len];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &rest[start + 2 + len + 1..];
    }

    out.push_str(rest);
    out
}

impl LexcheckConfig {
    /// Load `~/.lexcheck/config.toml`. A missing file yields `Ok(None)`.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|source| {
            tracing::warn!("Failed to read config at {:?}: {}", path, source);
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(source) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, source);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".lexcheck").join("config.toml"))
}

/// Values given on the command line. `None` means "not given".
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub domain: Option<AnalysisDomain>,
    pub professional_kb: Option<bool>,
    pub save_dir: Option<PathBuf>,
    pub ascii_only: Option<bool>,
}

/// Effective settings after layering config file, environment and flags.
#[derive(Debug, Clone)]
pub struct Settings {
    pub client: ClientOptions,
    pub domain: AnalysisDomain,
    pub professional_kb: bool,
    pub save_dir: Option<PathBuf>,
    pub ui: UiOptions,
}

impl Settings {
    /// Precedence: flags, then `env_endpoint`, then the config file, then defaults.
    pub fn resolve(
        config: Option<&LexcheckConfig>,
        env_endpoint: Option<String>,
        overrides: &Overrides,
    ) -> Result<Self, ConfigError> {
        let server = config.and_then(|c| c.server.as_ref());
        let retry = config.and_then(|c| c.retry.as_ref());
        let analysis = config.and_then(|c| c.analysis.as_ref());
        let output = config.and_then(|c| c.output.as_ref());
        let app = config.and_then(|c| c.app.as_ref());

        let mut client = ClientOptions::default();

        let endpoint = overrides
            .endpoint
            .clone()
            .or(env_endpoint.filter(|v| !v.trim().is_empty()))
            .or_else(|| server.and_then(|s| s.endpoint.as_deref()).map(expand_env_vars));
        if let Some(endpoint) = endpoint {
            client.endpoint = parse_endpoint(&endpoint)?;
        }
        if let Some(secs) = server.and_then(|s| s.connect_timeout_secs) {
            client.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = server.and_then(|s| s.request_timeout_secs) {
            client.request_timeout = Duration::from_secs(secs);
        }

        let defaults = RetryPolicy::default();
        client.retry = RetryPolicy {
            max_attempts: retry
                .and_then(|r| r.max_attempts)
                .unwrap_or(defaults.max_attempts),
            delay: retry
                .and_then(|r| r.delay_ms)
                .map_or(defaults.delay, Duration::from_millis),
        };

        let domain = match overrides.domain {
            Some(domain) => domain,
            None => match analysis.and_then(|a| a.domain.as_deref()) {
                Some(raw) => expand_env_vars(raw).parse()?,
                None => AnalysisDomain::default(),
            },
        };

        let professional_kb = overrides
            .professional_kb
            .unwrap_or_else(|| analysis.is_some_and(|a| a.professional_kb));

        let save_dir = overrides.save_dir.clone().or_else(|| {
            output
                .and_then(|o| o.save_dir.as_deref())
                .map(|dir| PathBuf::from(expand_env_vars(dir)))
        });

        let ui = UiOptions {
            ascii_only: overrides
                .ascii_only
                .unwrap_or_else(|| app.is_some_and(|a| a.ascii_only)),
            high_contrast: app.is_some_and(|a| a.high_contrast),
        };

        Ok(Self {
            client,
            domain,
            professional_kb,
            save_dir,
            ui,
        })
    }
}
