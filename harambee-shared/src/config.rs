use serde::Deserialize;

const DEVELOPMENT_JWT_SECRET: &str = "development-secret-change-in-production";

/// Token settings every service shares: `HARAMBEE_JWT_SECRET`, `HARAMBEE_ENV`.
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    #[serde(default = "default_env")]
    pub env: String,
}

fn default_env() -> String { "development".into() }

impl AuthConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("HARAMBEE"))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// The verification secret. Only development may run without one.
    pub fn jwt_secret(&self) -> anyhow::Result<String> {
        match self.jwt_secret.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(secret) => Ok(secret.to_string()),
            None if self.env.eq_ignore_ascii_case("development") => {
                tracing::warn!("HARAMBEE_JWT_SECRET not set, using the development secret");
                Ok(DEVELOPMENT_JWT_SECRET.to_string())
            }
            None => anyhow::bail!("HARAMBEE_JWT_SECRET must be set when HARAMBEE_ENV={}", self.env),
        }
    }
}
