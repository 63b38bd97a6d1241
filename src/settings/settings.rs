use anyhow::{Result, anyhow};
use config::{Config, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub auth: Auth,
    pub agent: Agent,
    pub graph: Graph,
    pub credentials: Credentials,
    pub profiles: Profiles,
    pub http: Http,
    pub log: Log,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub backend: String, // "fake" or "real"
    pub authority: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scopes: String,
}

#[derive(Debug, Deserialize)]
pub struct Agent {
    pub backend: String, // "fake"; the hosted runtime is out of scope
}

#[derive(Debug, Deserialize)]
pub struct Graph {
    pub backend: String, // "fake" or "real"
    pub base_url: String,
    pub default_site_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    /// When false, expired records are still returned on lookup and the
    /// downstream API gets to reject them with a 401.
    pub enforce_expiry: bool,
}

#[derive(Debug, Deserialize)]
pub struct Profiles {
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}
