use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 10;

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub lookup_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let lookup_timeout_secs: u64 = lookup("ADMIN_LOOKUP_TIMEOUT_SECS")
            .unwrap_or_else(|| DEFAULT_LOOKUP_TIMEOUT_SECS.to_string())
            .parse()
            .context("ADMIN_LOOKUP_TIMEOUT_SECS must be a whole number of seconds")?;

        Ok(Self {
            supabase_url: lookup("SUPABASE_URL").context("SUPABASE_URL must be set")?,
            supabase_anon_key: lookup("SUPABASE_ANON_KEY")
                .context("SUPABASE_ANON_KEY must be set")?,
            lookup_timeout: timeout_from_secs(lookup_timeout_secs)
                .context("Invalid ADMIN_LOOKUP_TIMEOUT_SECS")?,
        })
    }

    /// Replace the lookup timeout (e.g. from a command-line flag)
    pub fn set_lookup_timeout_secs(&mut self, secs: u64) -> Result<()> {
        self.lookup_timeout = timeout_from_secs(secs)?;
        Ok(())
    }
}

// A zero timeout fails every lookup that is not ready on its first poll.
fn timeout_from_secs(secs: u64) -> Result<Duration> {
    if secs == 0 {
        bail!("lookup timeout must be greater than zero");
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_timeout() {
        let env = vars(&[
            ("SUPABASE_URL", "https://project.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]);
        let config = Config::from_lookup(|k| env.get(k).cloned()).unwrap();

        assert_eq!(config.supabase_url, "https://project.supabase.co");
        assert_eq!(config.lookup_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_reads_timeout_override() {
        let env = vars(&[
            ("SUPABASE_URL", "https://project.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("ADMIN_LOOKUP_TIMEOUT_SECS", "3"),
        ]);
        let config = Config::from_lookup(|k| env.get(k).cloned()).unwrap();

        assert_eq!(config.lookup_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_missing_url_is_error() {
        let env = vars(&[("SUPABASE_ANON_KEY", "anon")]);
        let err = Config::from_lookup(|k| env.get(k).cloned()).unwrap_err();

        assert!(err.to_string().contains("SUPABASE_URL must be set"));
    }

    #[test]
    fn test_bad_timeout_is_error() {
        let env = vars(&[
            ("SUPABASE_URL", "https://project.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("ADMIN_LOOKUP_TIMEOUT_SECS", "soon"),
        ]);

        assert!(Config::from_lookup(|k| env.get(k).cloned()).is_err());
    }

    #[test]
    fn test_zero_timeout_is_error() {
        let env = vars(&[
            ("SUPABASE_URL", "https://project.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("ADMIN_LOOKUP_TIMEOUT_SECS", "0"),
        ]);
        let err = Config::from_lookup(|k| env.get(k).cloned()).unwrap_err();

        assert!(format!("{:#}", err).contains("greater than zero"));
    }

    #[test]
    fn test_set_lookup_timeout_secs() {
        let env = vars(&[
            ("SUPABASE_URL", "https://project.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]);
        let mut config = Config::from_lookup(|k| env.get(k).cloned()).unwrap();

        config.set_lookup_timeout_secs(2).unwrap();
        assert_eq!(config.lookup_timeout, Duration::from_secs(2));

        assert!(config.set_lookup_timeout_secs(0).is_err());
        assert_eq!(config.lookup_timeout, Duration::from_secs(2));
    }
}
