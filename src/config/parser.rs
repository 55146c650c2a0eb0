use crate::config::types::Config;
use crate::config::validation::{validate, validate_renderer_config};
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use pagescribe::config::load_config;
///
/// let config = load_config(Path::new("pagescribe.toml")).unwrap();
/// println!("Output directory: {}", config.output.directory);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Loads the configuration file if one is given, defaults otherwise
///
/// The `WEBDRIVER_URL` environment variable, when set and non-empty,
/// overrides the configured WebDriver endpoint. The override is validated
/// like the file value.
pub fn load_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config = match path {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };

    apply_webdriver_override(config, std::env::var("WEBDRIVER_URL").ok())
}

fn apply_webdriver_override(
    mut config: Config,
    webdriver_url: Option<String>,
) -> Result<Config, ConfigError> {
    if let Some(webdriver_url) = webdriver_url.filter(|url| !url.is_empty()) {
        config.renderer.webdriver_url = webdriver_url;
        validate_renderer_config(&config.renderer)?;
    }
    Ok(config)
}
