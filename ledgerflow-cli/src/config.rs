use anyhow::{Context, Result};
use ledgerflow_finance::{AggregateOptions, RulePrecedence};
use ledgerflow_ingest::IngestOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "ledgerflow.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub inputs: InputsSection,
    #[serde(default)]
    pub rules: RulesSection,
    #[serde(default)]
    pub ingest: IngestOptions,
    #[serde(default)]
    pub aggregate: AggregateOptions,
    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputsSection {
    pub alipay_dir: PathBuf,
    pub wechat_dir: PathBuf,
    pub jd_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesSection {
    pub categories: PathBuf,
    pub family_accounts: PathBuf,
    pub precedence: RulePrecedence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub dir: PathBuf,
}

impl Default for InputsSection {
    fn default() -> Self {
        Self {
            alipay_dir: PathBuf::from("alipay_files"),
            wechat_dir: PathBuf::from("wechat_files"),
            jd_dir: PathBuf::from("jd_files"),
        }
    }
}

impl Default for RulesSection {
    fn default() -> Self {
        Self {
            categories: PathBuf::from("categories.txt"),
            family_accounts: PathBuf::from("family_accounts.txt"),
            precedence: RulePrecedence::LastMatch,
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("report"),
        }
    }
}

/// Load `path`, falling back to defaults when it does not exist.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn save_config(path: &Path, cfg: &Config) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        println!("Config already exists: {}", path.display());
        return Ok(());
    }
    save_config(path, &Config::default())?;
    println!("Wrote {}", path.display());
    Ok(())
}
