use crate::error::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub auth: AuthSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }

    /// Server URL without a database, for creating databases
    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// Longest accepted token lifetime (ten years)
pub const MAX_TOKEN_TTL_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

/// Token signing and transport settings
#[derive(serde::Deserialize, Clone)]
pub struct AuthSettings {
    pub access_token_secret: String,
    pub access_token_expiry: i64,   // seconds (e.g., 900 for 15 minutes)
    pub refresh_token_secret: String,
    pub refresh_token_expiry: i64,  // seconds (e.g., 864000 for 10 days)
    pub issuer: String,
    #[serde(default)]
    pub cookie: CookieSettings,
}

impl AuthSettings {
    /// Reject settings that would make every token unusable or forgeable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_token_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("auth.access_token_secret".to_string()));
        }
        if self.refresh_token_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("auth.refresh_token_secret".to_string()));
        }
        if self.issuer.trim().is_empty() {
            return Err(ConfigError::MissingRequired("auth.issuer".to_string()));
        }
        check_ttl("auth.access_token_expiry", self.access_token_expiry)?;
        check_ttl("auth.refresh_token_expiry", self.refresh_token_expiry)?;
        Ok(())
    }
}

fn check_ttl(key: &str, seconds: i64) -> Result<(), ConfigError> {
    if seconds <= 0 || seconds > MAX_TOKEN_TTL_SECONDS {
        return Err(ConfigError::InvalidValue(format!(
            "{} must be between 1 and {} seconds",
            key, MAX_TOKEN_TTL_SECONDS
        )));
    }
    Ok(())
}

#[derive(serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SameSitePolicy {
    Strict,
    #[default]
    Lax,
    None,
}

/// Names and attributes of the two credential cookies
#[derive(serde::Deserialize, Clone, Debug)]
#[serde(default)]
pub struct CookieSettings {
    pub access_token_name: String,
    pub refresh_token_name: String,
    pub secure: bool,
    pub same_site: SameSitePolicy,
    pub path: String,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            access_token_name: "accessToken".to_string(),
            refresh_token_name: "refreshToken".to_string(),
            secure: true,
            same_site: SameSitePolicy::Lax,
            path: "/".to_string(),
        }
    }
}

/// Load settings from `configuration.yaml` (optional) overlaid by
/// `APP_`-prefixed environment variables, e.g. `APP_AUTH__ACCESS_TOKEN_SECRET`.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AuthSettings {
        AuthSettings {
            access_token_secret: "a".to_string(),
            access_token_expiry: 900,
            refresh_token_secret: "r".to_string(),
            refresh_token_expiry: 864_000,
            issuer: "session_auth".to_string(),
            cookie: CookieSettings::default(),
        }
    }

    #[test]
    fn test_valid_settings() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_empty_secret_rejected() {
        let mut settings = valid();
        settings.refresh_token_secret = "  ".to_string();

        assert!(matches!(settings.validate(), Err(ConfigError::MissingRequired(_))));
    }

    #[test]
    fn test_non_positive_ttl_rejected() {
        let mut settings = valid();
        settings.access_token_expiry = 0;

        assert!(matches!(settings.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_oversized_ttl_rejected() {
        let mut settings = valid();
        settings.refresh_token_expiry = i64::MAX;
        assert!(matches!(settings.validate(), Err(ConfigError::InvalidValue(_))));

        let mut settings = valid();
        settings.access_token_expiry = MAX_TOKEN_TTL_SECONDS + 1;
        assert!(matches!(settings.validate(), Err(ConfigError::InvalidValue(_))));

        let mut settings = valid();
        settings.refresh_token_expiry = MAX_TOKEN_TTL_SECONDS;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_cookie_defaults() {
        let cookie: CookieSettings = serde_json::from_str("{}").unwrap();

        assert_eq!(cookie.access_token_name, "accessToken");
        assert_eq!(cookie.refresh_token_name, "refreshToken");
        assert!(cookie.secure);
        assert_eq!(cookie.same_site, SameSitePolicy::Lax);
    }

    #[test]
    fn test_same_site_parses_lowercase() {
        let cookie: CookieSettings =
            serde_json::from_str(r#"{"same_site": "strict", "secure": false}"#).unwrap();

        assert_eq!(cookie.same_site, SameSitePolicy::Strict);
        assert!(!cookie.secure);
    }
}
