// Adapter configuration: point-of-sale identity, backend endpoint and the
// phrases the backend uses to say "no trips" instead of failing.

use crate::error::ClientError;
use serde::{Deserialize, Deserializer};

pub const DEFAULT_ENDPOINT_URL: &str = "https://rezmax.ro/Services/Ticketing.aspx";

const ENV_PREFIX: &str = "REZMAX";
const PHRASE_SEPARATOR: &str = "|";

/// Loaded from `REZMAX_*` variables through [`AdapterConfig::from_env`].
/// Short variable names (`REZMAX_ID`, `REZMAX_URL`, ...) map onto the fields
/// through serde aliases.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    #[serde(alias = "url")]
    pub endpoint_url: String,
    #[serde(alias = "agent")]
    pub agent_sine: String,
    #[serde(alias = "id")]
    pub requestor_id: String,
    #[serde(alias = "pass")]
    pub requestor_pass: String,
    pub city: String,
    #[serde(alias = "country")]
    pub iso_country: String,
    #[serde(alias = "currency")]
    pub iso_currency: String,
    pub language: String,
    /// Applied by the HTTP transport only. `None` leaves the client default.
    pub timeout_ms: Option<u64>,
    /// Matched case-insensitively as substrings of backend warning texts.
    #[serde(alias = "empty_phrases", deserialize_with = "phrase_list")]
    pub empty_result_phrases: Vec<String>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            agent_sine: "JetCab".to_string(),
            requestor_id: String::new(),
            requestor_pass: String::new(),
            city: "Brasov".to_string(),
            iso_country: "RO".to_string(),
            iso_currency: "RON".to_string(),
            language: "RO".to_string(),
            timeout_ms: None,
            empty_result_phrases: vec![
                "nu exista curse".to_string(),
                "nu au fost gasite".to_string(),
                "no routes".to_string(),
                "no trips found".to_string(),
            ],
        }
    }
}

impl AdapterConfig {
    /// Loads the configuration from `REZMAX_*` variables.
    ///
    /// `REZMAX_ID` and `REZMAX_PASS` are required, everything else falls back
    /// to the defaults. `REZMAX_EMPTY_PHRASES` is a `|` separated list.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::load(None)
    }

    /// Same as [`AdapterConfig::from_env`] over an explicit variable map.
    pub fn from_vars(vars: config::Map<String, String>) -> Result<Self, ClientError> {
        Self::load(Some(vars))
    }

    fn load(vars: Option<config::Map<String, String>>) -> Result<Self, ClientError> {
        let settings = config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .list_separator(PHRASE_SEPARATOR)
                    .with_list_parse_key("empty_phrases")
                    .source(vars),
            )
            .build()
            .map_err(|e| ClientError::ConfigError(e.to_string()))?;

        let config: AdapterConfig = settings
            .try_deserialize()
            .map_err(|e| ClientError::ConfigError(e.to_string()))?;

        if config.requestor_id.trim().is_empty() {
            return Err(missing("REZMAX_ID"));
        }
        if config.requestor_pass.is_empty() {
            return Err(missing("REZMAX_PASS"));
        }
        Ok(config)
    }

    pub fn is_empty_result_message(&self, message: &str) -> bool {
        let message = message.to_lowercase();
        self.empty_result_phrases
            .iter()
            .any(|phrase| message.contains(&phrase.to_lowercase()))
    }
}

// Accepts a parsed list or a single `|` joined string
fn phrase_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Phrases {
        List(Vec<String>),
        Joined(String),
    }

    let phrases = match Phrases::deserialize(deserializer)? {
        Phrases::List(list) => list,
        Phrases::Joined(joined) => joined
            .split(PHRASE_SEPARATOR)
            .map(str::to_string)
            .collect(),
    };

    Ok(phrases
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect())
}

fn missing(key: &str) -> ClientError {
    ClientError::ConfigError(format!("missing environment variable {}", key))
}
