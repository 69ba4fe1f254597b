//! Process configuration, read from the environment once at startup.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;

const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    pub token_ttl: Duration,
    /// How often the alert stream re-runs the aggregation without a trigger.
    pub alert_refresh: Duration,
    /// Bootstrap DG account, created when both are set.
    pub seed_director: Option<SeedAccount>,
}

#[derive(Debug, Clone)]
pub struct SeedAccount {
    pub email: String,
    pub password: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            token_ttl: Duration::from_secs(480 * 60),
            alert_refresh: Duration::from_secs(30),
            seed_director: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with an injectable lookup (tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                defaults.jwt_secret
            }
        };

        let bind_addr = match lookup("BIND_ADDR") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("BIND_ADDR is not a socket address: {raw}"))?,
            None => defaults.bind_addr,
        };

        let token_ttl = match lookup("TOKEN_TTL_MINUTES") {
            Some(raw) => Duration::from_secs(parse_positive("TOKEN_TTL_MINUTES", &raw)? * 60),
            None => defaults.token_ttl,
        };

        let alert_refresh = match lookup("ALERT_REFRESH_SECS") {
            Some(raw) => Duration::from_secs(parse_positive("ALERT_REFRESH_SECS", &raw)?),
            None => defaults.alert_refresh,
        };

        let seed_director = match (lookup("SEED_DG_EMAIL"), lookup("SEED_DG_PASSWORD")) {
            (Some(email), Some(password)) => Some(SeedAccount { email, password }),
            (None, None) => None,
            _ => anyhow::bail!("SEED_DG_EMAIL and SEED_DG_PASSWORD must be set together"),
        };

        Ok(Self {
            jwt_secret,
            bind_addr,
            token_ttl,
            alert_refresh,
            seed_director,
        })
    }
}

fn parse_positive(key: &str, raw: &str) -> anyhow::Result<u64> {
    let value: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a whole number, got {raw:?}"))?;
    anyhow::ensure!(value > 0, "{key} must be greater than zero");
    Ok(value)
}
