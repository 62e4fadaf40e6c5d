use anyhow::{Context, Result, anyhow};
use storage::models::DescriptionPolicy;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub api_keys: String,
    pub jwt_secret: String,
    pub description_policy: DescriptionPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let description_policy = match var("WORKOUT_BLANK_DESCRIPTION") {
            Some(value) => value
                .parse::<DescriptionPolicy>()
                .map_err(|e| anyhow!("Invalid WORKOUT_BLANK_DESCRIPTION: {e}"))?,
            None => DescriptionPolicy::default(),
        };

        Ok(Self {
            host: var("HOST").context("Cannot load HOST env variable")?,
            port: var("PORT")
                .context("Cannot load PORT env variable")?
                .parse::<u16>()
                .context("PORT must be a number")?,
            database_url: var("DATABASE_URL").context("Cannot load DATABASE_URL env variable")?,
            api_keys: var("API_KEYS").unwrap_or_default(),
            jwt_secret: var("JWT_SECRET")
                .filter(|s| !s.is_empty())
                .context("Cannot load JWT_SECRET env variable")?,
            description_policy,
        })
    }
}
