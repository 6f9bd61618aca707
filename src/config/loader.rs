//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::BpaConfig;
use crate::config::secret_string;
use crate::domain::errors::BpaError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into BpaConfig
/// 4. Applies environment variable overrides (BPAGEN_* prefix)
/// 5. Validates the configuration
///
/// # Examples
///
/// ```no_run
/// use bpagen::config::loader::load_config;
///
/// let config = load_config("bpagen.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<BpaConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(BpaError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        BpaError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration text, applying substitution, overrides and validation
pub fn parse_config(contents: &str) -> Result<BpaConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: BpaConfig = toml::from_str(&contents)
        .map_err(|e| BpaError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        BpaError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied untouched. Every missing variable is reported
/// in a single error.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| BpaError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for (i, line) in input.lines().enumerate() {
        if i > 0 {
            result.push('\n');
        }

        if line.trim_start().starts_with('#') {
            result.push_str(line);
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(BpaError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env_bool(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Applies environment variable overrides using the BPAGEN_* prefix
///
/// Variables follow the pattern `BPAGEN_<SECTION>_<KEY>`, for example
/// `BPAGEN_STAGING_CONNECTION_STRING` or `BPAGEN_OUTPUT_DIRECTORY`.
/// Values that fail to parse are ignored.
fn apply_env_overrides(config: &mut BpaConfig) {
    if let Ok(val) = std::env::var("BPAGEN_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env_bool("BPAGEN_APPLICATION_DRY_RUN") {
        config.application.dry_run = val;
    }

    if let Ok(val) = std::env::var("BPAGEN_STAGING_CONNECTION_STRING") {
        config.staging.connection_string = secret_string(val);
    }
    if let Some(val) = env_parse("BPAGEN_STAGING_MAX_CONNECTIONS") {
        config.staging.max_connections = val;
    }
    if let Some(val) = env_parse("BPAGEN_STAGING_STATEMENT_TIMEOUT_SECONDS") {
        config.staging.statement_timeout_seconds = val;
    }

    if let Ok(val) = std::env::var("BPAGEN_SUBMISSION_RESPONSIBLE_NAME") {
        config.submission.responsible_name = val;
    }
    if let Ok(val) = std::env::var("BPAGEN_SUBMISSION_RESPONSIBLE_ACRONYM") {
        config.submission.responsible_acronym = val;
    }
    if let Ok(val) = std::env::var("BPAGEN_SUBMISSION_RESPONSIBLE_DOCUMENT") {
        config.submission.responsible_document = val;
    }
    if let Ok(val) = std::env::var("BPAGEN_SUBMISSION_DESTINATION_NAME") {
        config.submission.destination_name = val;
    }
    if let Ok(val) = std::env::var("BPAGEN_SUBMISSION_DESTINATION_INDICATOR") {
        config.submission.destination_indicator = val;
    }

    if let Ok(val) = std::env::var("BPAGEN_OUTPUT_DIRECTORY") {
        config.output.directory = val;
    }

    if let Some(val) = env_bool("BPAGEN_ADDRESS_REPAIR_DURING_GENERATION") {
        config.address.repair_during_generation = val;
    }
    if let Some(val) = env_parse("BPAGEN_ADDRESS_REQUEST_TIMEOUT_MS") {
        config.address.request_timeout_ms = val;
    }
    if let Ok(val) = std::env::var("BPAGEN_ADDRESS_HOME_MUNICIPALITY_CODE") {
        config.address.home_municipality_code = val;
    }
    let providers = [
        ("OPENCEP", &mut config.address.providers.opencep),
        ("VIACEP", &mut config.address.providers.viacep),
        ("APICEP", &mut config.address.providers.apicep),
    ];
    for (name, provider) in providers {
        if let Some(val) = env_bool(&format!("BPAGEN_ADDRESS_PROVIDERS_{name}_ENABLED")) {
            provider.enabled = val;
        }
        if let Ok(val) = std::env::var(format!("BPAGEN_ADDRESS_PROVIDERS_{name}_BASE_URL")) {
            provider.base_url = Some(val);
        }
    }

    if let Some(val) = env_bool("BPAGEN_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val;
    }
    if let Ok(val) = std::env::var("BPAGEN_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
