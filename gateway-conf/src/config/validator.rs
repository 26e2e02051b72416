//! Checks run once the whole file has been read

use super::schema::Config;
use crate::error::{ConfigError, Result};
use tracing::error;

pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a fully parsed configuration. Every missing mandatory
    /// setting is reported before the error is returned.
    pub fn validate(config: &Config) -> Result<()> {
        Self::check_httpd_credentials(config)?;
        Self::check_mandatory(config)
    }

    /// An HTTP daemon user name is useless without a password
    pub fn check_httpd_credentials(config: &Config) -> Result<()> {
        if config.httpd_username.is_some() && config.httpd_password.is_none() {
            error!("HTTPDUserName requires a HTTPDPassword to be set.");
            return Err(ConfigError::MissingHttpdPassword);
        }
        Ok(())
    }

    fn check_mandatory(config: &Config) -> Result<()> {
        let mut missing = Vec::new();

        if config.gateway_interface.is_none() {
            missing.push("GatewayInterface");
        }
        if config.auth_servers.is_empty() {
            missing.push("AuthServer");
        }

        if missing.is_empty() {
            return Ok(());
        }

        for name in &missing {
            error!("{} is not set", name);
        }
        error!("Configuration is not complete, exiting...");
        Err(ConfigError::Incomplete { missing })
    }
}
