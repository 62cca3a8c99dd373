use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub store: StoreConfig,
    pub audit: AuditConfig,
    pub report: ReportConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreConfig {
    pub namespace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_file: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditConfig {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportConfig {
    pub include_resolved: bool,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                namespace: "fixwatch".to_string(),
                state_file: None,
            },
            audit: AuditConfig {
                enabled: false,
                log_dir: None,
            },
            report: ReportConfig {
                include_resolved: true,
            },
            config_path: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    store: Option<RawStoreConfig>,
    audit: Option<RawAuditConfig>,
    report: Option<RawReportConfig>,
}

#[derive(Debug, Deserialize)]
struct RawStoreConfig {
    namespace: Option<String>,
    state_file: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAuditConfig {
    enabled: Option<bool>,
    log_dir: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawReportConfig {
    include_resolved: Option<bool>,
}

pub fn default_config_path(home_dir: &Path) -> PathBuf {
    home_dir.join(".config/fixwatch/config.toml")
}

pub fn load(config_path: Option<&Path>, home_dir: &Path) -> Result<EffectiveConfig> {
    let mut cfg = EffectiveConfig::default();

    let path = config_path
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| default_config_path(home_dir));

    if path.exists() {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let raw: RawConfig = toml::from_str(&s).context("failed to parse config file (TOML)")?;
        apply_raw_config(&mut cfg, raw);
        cfg.config_path = Some(path.display().to_string());
    }

    apply_env_overrides_from(&mut cfg, |name| std::env::var(name).ok())?;

    Ok(cfg)
}

fn apply_raw_config(cfg: &mut EffectiveConfig, raw: RawConfig) {
    if let Some(store) = raw.store {
        if let Some(namespace) = store.namespace {
            cfg.store.namespace = namespace;
        }
        if let Some(state_file) = store.state_file {
            cfg.store.state_file = Some(state_file);
        }
    }

    if let Some(audit) = raw.audit {
        if let Some(enabled) = audit.enabled {
            cfg.audit.enabled = enabled;
        }
        if let Some(log_dir) = audit.log_dir {
            cfg.audit.log_dir = Some(log_dir);
        }
    }

    if let Some(report) = raw.report {
        if let Some(include_resolved) = report.include_resolved {
            cfg.report.include_resolved = include_resolved;
        }
    }
}

fn apply_env_overrides_from(
    cfg: &mut EffectiveConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(v) = lookup("FIXWATCH_STORE_NAMESPACE") {
        let v = v.trim();
        if !v.is_empty() {
            cfg.store.namespace = v.to_string();
        }
    }
    if let Some(v) = lookup("FIXWATCH_STORE_STATE_FILE") {
        let v = v.trim();
        if !v.is_empty() {
            cfg.store.state_file = Some(v.to_string());
        }
    }
    if let Some(v) = lookup("FIXWATCH_AUDIT_ENABLED") {
        cfg.audit.enabled = parse_bool(&v).with_context(|| "FIXWATCH_AUDIT_ENABLED")?;
    }
    if let Some(v) = lookup("FIXWATCH_AUDIT_LOG_DIR") {
        let v = v.trim();
        if !v.is_empty() {
            cfg.audit.log_dir = Some(v.to_string());
        }
    }
    if let Some(v) = lookup("FIXWATCH_REPORT_INCLUDE_RESOLVED") {
        cfg.report.include_resolved =
            parse_bool(&v).with_context(|| "FIXWATCH_REPORT_INCLUDE_RESOLVED")?;
    }

    Ok(())
}

fn parse_bool(s: &str) -> Result<bool> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow::anyhow!(
            "invalid boolean: {s} (expected true|false|1|0|yes|no|on|off)"
        )),
    }
}
