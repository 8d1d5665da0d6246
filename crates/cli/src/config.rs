use agentlint_graph::CheckOptions;
use agentlint_protocol::Severity;
use anyhow::{anyhow, Context, Result};
use globset::Glob;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "agentlint.toml";

/// Contents of `agentlint.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Extra agent names that resolve without a file
    #[serde(default)]
    pub builtin_agents: Vec<String>,

    #[serde(default)]
    pub checks: ChecksConfig,

    /// Lowest severity that fails the run
    #[serde(default = "default_fail_on")]
    pub fail_on: String,

    /// Relative-path globs skipped during discovery
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChecksConfig {
    #[serde(default = "enabled")]
    pub cycles: bool,
    #[serde(default = "enabled")]
    pub orphans: bool,
    #[serde(default = "enabled")]
    pub allowed_tools: bool,
    #[serde(default = "enabled")]
    pub fake_flags: bool,
}

fn enabled() -> bool {
    true
}

fn default_fail_on() -> String {
    Severity::Error.as_str().to_string()
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            cycles: true,
            orphans: true,
            allowed_tools: true,
            fake_flags: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            builtin_agents: Vec::new(),
            checks: ChecksConfig::default(),
            fail_on: default_fail_on(),
            exclude: Vec::new(),
        }
    }
}

impl Config {
    /// Load `explicit` if given, otherwise `<root>/agentlint.toml` when present, otherwise defaults.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = root.join(CONFIG_FILE_NAME);
                if !candidate.is_file() {
                    log::debug!("No {CONFIG_FILE_NAME} under {}, using defaults", root.display());
                    return Ok(Self::default());
                }
                candidate
            }
        };

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.fail_on()?;

        for (idx, name) in self.builtin_agents.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(anyhow!("builtin_agents[{idx}] must not be empty"));
            }
        }
        for (idx, pattern) in self.exclude.iter().enumerate() {
            Glob::new(pattern)
                .map_err(|err| anyhow!("exclude[{idx}] is not a valid glob '{pattern}': {err}"))?;
        }
        Ok(())
    }

    pub fn fail_on(&self) -> Result<Severity> {
        self.fail_on
            .parse::<Severity>()
            .map_err(|err| anyhow!("fail_on: {err}"))
    }

    pub fn check_options(&self) -> CheckOptions {
        CheckOptions {
            cycles: self.checks.cycles,
            orphans: self.checks.orphans,
            allowed_tools: self.checks.allowed_tools,
            fake_flags: self.checks.fake_flags,
        }
    }
}
