use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use url::Url;

pub const CONFIG_FILE: &str = "records.toml";
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
pub const DEFAULT_ARTIFACT_PATH: &str = "build/contracts/StudentTeacherManagement.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Wallet endpoint. `None` when explicitly disabled with an empty value.
    pub rpc_url: Option<Url>,
    /// Contract gateway; falls back to the wallet endpoint.
    pub gateway_url: Url,
    pub artifact_path: PathBuf,
}

/// Values given on the command line. They win over every other layer.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub rpc_url: Option<String>,
    pub gateway_url: Option<String>,
    pub artifact_path: Option<PathBuf>,
}

#[derive(Debug)]
struct RawSettings {
    rpc_url: String,
    gateway_url: Option<String>,
    artifact_path: String,
}

impl Default for RawSettings {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.into(),
            gateway_url: None,
            artifact_path: DEFAULT_ARTIFACT_PATH.into(),
        }
    }
}

impl RawSettings {
    fn apply_file(&mut self, raw: &str) -> Result<()> {
        let file_cfg = toml::from_str::<HashMap<String, String>>(raw)?;
        if let Some(v) = file_cfg.get("rpc_url") {
            self.rpc_url = v.clone();
        }
        if let Some(v) = file_cfg.get("gateway_url") {
            self.gateway_url = Some(v.clone());
        }
        if let Some(v) = file_cfg.get("artifact_path") {
            self.artifact_path = v.clone();
        }
        Ok(())
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("RECORDS_RPC_URL") {
            self.rpc_url = v;
        }
        if let Some(v) = var("APP__RPC_URL") {
            self.rpc_url = v;
        }

        if let Some(v) = var("RECORDS_GATEWAY_URL") {
            self.gateway_url = Some(v);
        }
        if let Some(v) = var("APP__GATEWAY_URL") {
            self.gateway_url = Some(v);
        }

        if let Some(v) = var("RECORDS_ARTIFACT_PATH") {
            self.artifact_path = v;
        }
        if let Some(v) = var("APP__ARTIFACT_PATH") {
            self.artifact_path = v;
        }
    }

    fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(v) = &overrides.rpc_url {
            self.rpc_url = v.clone();
        }
        if let Some(v) = &overrides.gateway_url {
            self.gateway_url = Some(v.clone());
        }
        if let Some(v) = &overrides.artifact_path {
            self.artifact_path = v.display().to_string();
        }
    }

    fn resolve(self) -> Result<Settings> {
        let rpc_url = match self.rpc_url.trim() {
            "" => None,
            raw => Some(parse_url("rpc_url", raw)?),
        };
        let gateway_url = match self.gateway_url.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => parse_url("gateway_url", raw)?,
            _ => match &rpc_url {
                Some(url) => url.clone(),
                None => parse_url("gateway_url", DEFAULT_RPC_URL)?,
            },
        };
        let artifact_path = match self.artifact_path.trim() {
            "" => PathBuf::from(DEFAULT_ARTIFACT_PATH),
            raw => PathBuf::from(raw),
        };
        Ok(Settings {
            rpc_url,
            gateway_url,
            artifact_path,
        })
    }
}

fn parse_url(key: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("invalid {key}: {raw}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("invalid {key}: {raw} (expected an http or https URL)");
    }
    Ok(url)
}

/// Defaults, then the config file if it exists, then environment, then CLI.
pub fn load_settings(config_path: &Path, overrides: &Overrides) -> Result<Settings> {
    let mut raw = RawSettings::default();

    if let Ok(text) = fs::read_to_string(config_path) {
        raw.apply_file(&text)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;
    }
    raw.apply_env(|key| std::env::var(key).ok());
    raw.apply_overrides(overrides);

    raw.resolve()
}
