use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Upstream base URL is an http(s) URL
/// - Path templates keep their placeholders
/// - Fetch sizes are positive
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    let base_url = config.upstream.base_url.trim();
    if base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "upstream.base_url cannot be empty".to_string(),
        ));
    }
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::ValidationError(format!(
            "upstream.base_url must be an http(s) URL, got '{}'",
            base_url
        )));
    }

    let paths = &config.upstream.paths;
    for (field, template, placeholder) in [
        ("item", &paths.item, "{id}"),
        ("species", &paths.species, "{id}"),
        ("category", &paths.category, "{name}"),
    ] {
        if !template.contains(placeholder) {
            return Err(ConfigError::ValidationError(format!(
                "upstream.paths.{} must contain {}",
                field, placeholder
            )));
        }
    }

    if config.fetch.batch_size == 0 {
        return Err(ConfigError::ValidationError(
            "fetch.batch_size cannot be 0".to_string(),
        ));
    }
    if config.fetch.page_size == 0 {
        return Err(ConfigError::ValidationError(
            "fetch.page_size cannot be 0".to_string(),
        ));
    }
    if config.fetch.category_member_cap == 0 {
        return Err(ConfigError::ValidationError(
            "fetch.category_member_cap cannot be 0".to_string(),
        ));
    }

    Ok(())
}
