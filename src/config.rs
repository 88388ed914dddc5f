use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Unset means the process keeps users in memory.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    /// Optional JSON file overriding entries of the message catalog.
    pub messages_path: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").ok().filter(|u| !u.is_empty());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "hotchat".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "hotchat-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
        };
        let messages_path = std::env::var("MESSAGES_PATH").ok().filter(|p| !p.is_empty());
        Ok(Self {
            database_url,
            jwt,
            messages_path,
        })
    }
}
