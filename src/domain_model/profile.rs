use serde::{Deserialize, Serialize};

/// A named pair of LLM deployment and database connection settings,
/// persisted by the profile registry.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    pub name: String,
    pub llm: LlmProfile,
    pub db: DbProfile,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct LlmProfile {
    pub deployment: String,
    pub endpoint: String,
    pub api_version: String,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct DbProfile {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub ssl_mode: String,
}
