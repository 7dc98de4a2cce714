use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use time::{Duration as TimeDuration, OffsetDateTime};

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub listen_addr: SocketAddr,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let max_connections = match std::env::var("DB_MAX_CONNECTIONS") {
            Ok(v) => v
                .parse::<u32>()
                .with_context(|| format!("invalid DB_MAX_CONNECTIONS {v:?}"))?,
            Err(_) => 10,
        };

        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = std::env::var("APP_PORT")
            .or_else(|_| std::env::var("PORT"))
            .unwrap_or_else(|_| "5000".into());
        let listen_addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {host}:{port}"))?;

        let expires_in = std::env::var("JWT_EXPIRES_IN").unwrap_or_else(|_| "1d".into());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "expense-tracker".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "expense-tracker-users".into()),
            ttl: parse_ttl(&expires_in)
                .with_context(|| format!("invalid JWT_EXPIRES_IN {expires_in:?}"))?,
        };

        Ok(Self {
            database_url,
            max_connections,
            listen_addr,
            jwt,
        })
    }
}

/// Parses token lifetimes such as `90`, `45s`, `30m`, `12h`, `1d` or `2w`.
/// A bare number is seconds. Lifetimes whose expiry would fall outside the
/// representable date range are rejected.
pub fn parse_ttl(raw: &str) -> anyhow::Result<Duration> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);
    anyhow::ensure!(!digits.is_empty(), "missing amount");

    let amount: u64 = digits.parse()?;
    let multiplier = match unit.trim() {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 60 * 60 * 24,
        "w" => 60 * 60 * 24 * 7,
        other => anyhow::bail!("unknown unit {other:?}"),
    };
    anyhow::ensure!(amount > 0, "lifetime must be positive");

    let secs = amount
        .checked_mul(multiplier)
        .ok_or_else(|| anyhow::anyhow!("lifetime overflows"))?;
    let signed = i64::try_from(secs).context("lifetime overflows")?;
    anyhow::ensure!(
        OffsetDateTime::now_utc()
            .checked_add(TimeDuration::seconds(signed))
            .is_some(),
        "lifetime reaches past the last representable date"
    );
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_units() {
        assert_eq!(parse_ttl("90").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_ttl("45s").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_ttl("30m").unwrap(), Duration::from_secs(1800));
        assert_eq!(parse_ttl("12h").unwrap(), Duration::from_secs(12 * 3600));
        assert_eq!(parse_ttl("1d").unwrap(), Duration::from_secs(86_400));
        assert_eq!(parse_ttl("2w").unwrap(), Duration::from_secs(14 * 86_400));
        assert_eq!(parse_ttl(" 7d ").unwrap(), Duration::from_secs(7 * 86_400));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_ttl("").is_err());
        assert!(parse_ttl("d").is_err());
        assert!(parse_ttl("10y").is_err());
        assert!(parse_ttl("0h").is_err());
        assert!(parse_ttl("-5m").is_err());
        assert!(parse_ttl("100000000w").is_err());
        assert!(parse_ttl("18446744073709551615").is_err());
        assert!(parse_ttl("99999999999999999999d").is_err());
    }

    #[test]
    fn accepts_long_but_representable_lifetimes() {
        assert_eq!(
            parse_ttl("520w").unwrap(),
            Duration::from_secs(520 * 7 * 86_400)
        );
    }
}
