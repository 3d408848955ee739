use std::env;

use secrecy::SecretString;

use crate::errors::{AppError, AppResult};

const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub games_collection: String,
    pub questions_collection: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub openai_api_key: SecretString,
    pub openai_api_base: Option<String>,
    pub openai_model: String,
    pub llm_timeout_secs: u64,
    pub generation_attempts: u32,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    /// A missing or blank `OPENAI_API_KEY` is a startup error.
    pub fn from_source<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let openai_api_key = lookup("OPENAI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AppError::ConfigurationError(
                    "OPENAI_API_KEY must be set to reach the model provider".to_string(),
                )
            })?;

        Ok(Self {
            mongo_conn_string: var("MONGO_CONN_STRING", "mongodb://localhost:27017"),
            mongo_db_name: var("MONGO_DB_NAME", "examinator-local"),
            games_collection: var("GAMES_COLLECTION", "games"),
            questions_collection: var("QUESTIONS_COLLECTION", "questions"),
            web_server_host: var("WEB_SERVER_HOST", "localhost"),
            web_server_port: lookup("WEB_SERVER_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            openai_api_key: SecretString::from(openai_api_key),
            openai_api_base: lookup("OPENAI_API_BASE").filter(|base| !base.trim().is_empty()),
            openai_model: var("OPENAI_MODEL", DEFAULT_MODEL),
            llm_timeout_secs: lookup("LLM_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(60),
            generation_attempts: lookup("GENERATION_ATTEMPTS")
                .and_then(|n| n.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(2),
        })
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "examinator-test".to_string(),
            games_collection: "games".to_string(),
            questions_collection: "questions".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            openai_api_key: SecretString::from("sk-test".to_string()),
            openai_api_base: None,
            openai_model: DEFAULT_MODEL.to_string(),
            llm_timeout_secs: 5,
            generation_attempts: 1,
        }
    }
}
