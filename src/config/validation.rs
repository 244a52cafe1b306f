use crate::config::types::{Config, QueueConfig, ScraperConfig, StoreConfig};
use crate::scraper::MAX_ADMISSION_SLOTS;
use crate::{ConfigError, ConfigResult};

/// Upper bound on configurable meta-refresh hops
const MAX_REDIRECTS_LIMIT: u32 = 20;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_queue_config(&config.queue)?;
    validate_store_config(&config.store)?;
    validate_scraper_config(&config.scraper)?;
    Ok(())
}

/// Validates queue configuration
fn validate_queue_config(config: &QueueConfig) -> ConfigResult<()> {
    if config.host.is_empty() {
        return Err(ConfigError::Validation("queue host cannot be empty".to_string()));
    }

    if config.key.is_empty() {
        return Err(ConfigError::Validation("queue key cannot be empty".to_string()));
    }

    // BLPOP treats 0 as "block forever", which would disable idle shutdown
    if config.idle_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "idle_timeout must be >= 1s, got {}s",
            config.idle_timeout
        )));
    }

    if config.db < 0 {
        return Err(ConfigError::Validation(format!(
            "queue db must be >= 0, got {}",
            config.db
        )));
    }

    Ok(())
}

/// Validates store configuration
fn validate_store_config(config: &StoreConfig) -> ConfigResult<()> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates scraper configuration
fn validate_scraper_config(config: &ScraperConfig) -> ConfigResult<()> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.connect_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "connect_timeout must be >= 1s, got {}s",
            config.connect_timeout
        )));
    }

    if config.request_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout must be >= 1s, got {}s",
            config.request_timeout
        )));
    }

    if config.max_redirects > MAX_REDIRECTS_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_redirects must be <= {}, got {}",
            MAX_REDIRECTS_LIMIT, config.max_redirects
        )));
    }

    if let Some(jobs) = config.max_concurrent_jobs {
        if jobs == 0 || jobs > MAX_ADMISSION_SLOTS {
            return Err(ConfigError::Validation(format!(
                "max_concurrent_jobs must be between 1 and {} when set, got {}",
                MAX_ADMISSION_SLOTS, jobs
            )));
        }
    }

    Ok(())
}
