use crate::schema::PubsubConfig;
use anyhow::{anyhow, Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Jsonc,
    Json,
    Yaml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;

        match ext {
            "jsonc" => Some(Self::Jsonc),
            "json" => Some(Self::Json),
            "yml" | "yaml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: PubsubConfig,
    pub path: Option<PathBuf>,
    pub format: Option<ConfigFormat>,
}

/// Loads the config at `config_path`, or the first one found on the search
/// path. Falls back to defaults when nothing is found.
pub fn load_config(config_path: Option<&Path>) -> Result<PubsubConfig> {
    resolve_config(config_path).map(|r| r.config)
}

pub fn resolve_config(config_path: Option<&Path>) -> Result<ResolvedConfig> {
    match config_path.map(Path::to_path_buf).or_else(find_config_file) {
        Some(path) => load_config_from_file(&path),
        None => Ok(ResolvedConfig {
            config: PubsubConfig::default(),
            path: None,
            format: None,
        }),
    }
}

pub fn load_config_from_file(path: &Path) -> Result<ResolvedConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| anyhow!("Unknown config format for: {}", path.display()))?;

    let config = parse_config_content(&content, format)
        .with_context(|| format!("Invalid config file: {}", path.display()))?;

    Ok(ResolvedConfig {
        config: expand_env_vars(config),
        path: Some(path.to_path_buf()),
        format: Some(format),
    })
}

fn parse_config_content(content: &str, format: ConfigFormat) -> Result<PubsubConfig> {
    match format {
        ConfigFormat::Jsonc => json5::from_str(content).context("Failed to parse JSONC"),
        ConfigFormat::Json => serde_json::from_str(content).context("Failed to parse JSON"),
        ConfigFormat::Yaml => serde_yaml_ng::from_str(content).context("Failed to parse YAML"),
    }
}

const CONFIG_CANDIDATES: &[&str] = &[
    "pubsub.jsonc",
    "pubsub.json",
    "pubsub.yml",
    "pubsub.yaml",
    ".pubsub.jsonc",
    ".pubsub.json",
    ".pubsub.yml",
    ".pubsub.yaml",
];

fn global_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("pubsub"))
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = CONFIG_CANDIDATES.iter().map(PathBuf::from).collect();
    if let Some(dir) = global_config_dir() {
        paths.extend(CONFIG_CANDIDATES.iter().map(|c| dir.join(c)));
    }
    paths
}

fn find_config_file() -> Option<PathBuf> {
    candidate_paths().into_iter().find(|p| p.exists())
}

fn expand_env_vars(mut config: PubsubConfig) -> PubsubConfig {
    config.events = config
        .events
        .iter()
        .map(|name| expand_env_string(name))
        .collect();
    config.telemetry.level = expand_env_string(&config.telemetry.level);
    config
}

/// Substitutes `${VAR}` and `$VAR` from the environment. Unset variables and
/// malformed references are kept verbatim.
fn expand_env_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(dollar) = rest.find('$') {
        out.push_str(&rest[..dollar]);
        let after = &rest[dollar + 1..];

        let (name, consumed) = match after.strip_prefix('{') {
            Some(body) => match body.find('}') {
                Some(close) => (&body[..close], close + 2),
                None => ("", after.len()),
            },
            None => {
                let end = after
                    .find(|c: char| !(c.is_alphanumeric() || c == '_'))
                    .unwrap_or(after.len());
                (&after[..end], end)
            }
        };

        match env::var(name) {
            Ok(value) if !name.is_empty() => out.push_str(&value),
            _ => out.push_str(&rest[dollar..dollar + 1 + consumed]),
        }
        rest = &after[consumed..];
    }

    out.push_str(rest);
    out
}
