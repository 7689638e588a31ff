use std::fmt;
use std::time::Duration;

use crate::error::{ListingError, Result};

/// Environment variable holding the store endpoint
pub const URL_VAR: &str = "SUPABASE_URL";
/// Environment variable holding the store's public access key
pub const KEY_VAR: &str = "SUPABASE_ANON_KEY";

// Names used by the web front end's build tooling, accepted as fallbacks
const URL_FALLBACK_VAR: &str = "VITE_SUPABASE_URL";
const KEY_FALLBACK_VAR: &str = "VITE_SUPABASE_ANON_KEY";

/// Request timeout for every store round trip
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection parameters for the hosted store
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub url: String,
    pub anon_key: String,
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("anon_key", &"[redacted]")
            .finish()
    }
}

impl StoreConfig {
    /// Load from the process environment, reading `.env` first if present
    pub fn load() -> Result<Self> {
        // A missing .env file is fine
        _ = dotenvy::dotenv();

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve the parameters through `lookup`, which maps a variable name to its value
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let read = |primary: &str, fallback: &str| {
            [primary, fallback]
                .into_iter()
                .filter_map(|name| lookup(name))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
                .ok_or_else(|| ListingError::Configuration(format!("{primary} is not set")))
        };

        let url = read(URL_VAR, URL_FALLBACK_VAR)?;
        let anon_key = read(KEY_VAR, KEY_FALLBACK_VAR)?;

        Ok(Self { url, anon_key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use testresult::TestResult;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn reads_primary_variables() -> TestResult {
        let vars = env(&[(URL_VAR, "https://abc.supabase.co"), (KEY_VAR, "anon")]);

        let config = StoreConfig::from_lookup(|name| vars.get(name).cloned())?;

        assert_eq!(config.url, "https://abc.supabase.co");
        assert_eq!(config.anon_key, "anon");

        Ok(())
    }

    #[test]
    fn falls_back_to_front_end_names() -> TestResult {
        let vars = env(&[
            (URL_VAR, "   "),
            ("VITE_SUPABASE_URL", "https://vite.supabase.co"),
            ("VITE_SUPABASE_ANON_KEY", "vite-key"),
        ]);

        let config = StoreConfig::from_lookup(|name| vars.get(name).cloned())?;

        assert_eq!(config.url, "https://vite.supabase.co");
        assert_eq!(config.anon_key, "vite-key");

        Ok(())
    }

    #[test]
    fn missing_key_is_a_configuration_error() {
        let vars = env(&[(URL_VAR, "https://abc.supabase.co")]);

        let result = StoreConfig::from_lookup(|name| vars.get(name).cloned());

        let Err(ListingError::Configuration(msg)) = &result else {
            panic!("expected a configuration error, got {result:?}");
        };
        assert_eq!(msg, "SUPABASE_ANON_KEY is not set");
    }

    #[test]
    fn debug_output_hides_the_key() {
        let config = StoreConfig {
            url: "https://abc.supabase.co".to_string(),
            anon_key: "secret".to_string(),
        };

        assert!(!format!("{config:?}").contains("secret"));
    }
}
