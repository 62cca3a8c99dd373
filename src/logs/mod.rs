use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::core::ScanReport;
use crate::matcher::FixPairing;

#[derive(Debug, Serialize)]
struct ScanLog {
    schema_version: &'static str,
    tool_version: String,
    command: &'static str,
    started_at: String,
    finished_at: String,
    status: String,
    scan_id: String,
    active: usize,
    backend_fixed: usize,
    new: usize,
    existing: usize,
    reappeared: usize,
    resolved: usize,
    true_detector_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fixed_pairings: Vec<FixPairing>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ResetLog {
    schema_version: &'static str,
    tool_version: String,
    command: &'static str,
    started_at: String,
    finished_at: String,
    status: String,
    previous_ledger_len: usize,
    cleared_keys: Vec<String>,
}

pub fn write_scan_log(
    dir: &Path,
    started_at: OffsetDateTime,
    finished_at: OffsetDateTime,
    report: &ScanReport,
    pairings: &[FixPairing],
) -> Result<PathBuf> {
    let status = if report.warnings.is_empty() {
        "ok".to_string()
    } else {
        "degraded".to_string()
    };

    let log = ScanLog {
        schema_version: "1.0",
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        command: "scan",
        started_at: format_ts(started_at),
        finished_at: format_ts(finished_at),
        status,
        scan_id: report.scan_id.clone(),
        active: report.active_findings.len(),
        backend_fixed: report.backend_fixed_findings.len(),
        new: report.new_count,
        existing: report.existing_count,
        reappeared: report.reappeared_count,
        resolved: report.resolved_count,
        true_detector_count: report.true_detector_count,
        fixed_pairings: pairings.to_vec(),
        warnings: report.warnings.iter().map(ToString::to_string).collect(),
    };

    write_log(dir, "scan", finished_at, &log)
}

pub fn write_reset_log(
    dir: &Path,
    started_at: OffsetDateTime,
    finished_at: OffsetDateTime,
    previous_ledger_len: usize,
    cleared_keys: &[String],
) -> Result<PathBuf> {
    let log = ResetLog {
        schema_version: "1.0",
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        command: "reset",
        started_at: format_ts(started_at),
        finished_at: format_ts(finished_at),
        status: "ok".to_string(),
        previous_ledger_len,
        cleared_keys: cleared_keys.to_vec(),
    };

    write_log(dir, "reset", finished_at, &log)
}

fn write_log(
    dir: &Path,
    command: &str,
    finished_at: OffsetDateTime,
    log: &impl Serialize,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory: {}", dir.display()))?;

    let pid = std::process::id();
    let ts = finished_at.unix_timestamp_nanos();
    let path = dir.join(format!("{command}-{pid}-{ts}.json"));

    let buf = serde_json::to_vec_pretty(log).context("failed to serialize log (JSON)")?;
    std::fs::write(&path, buf)
        .with_context(|| format!("failed to write log: {}", path.display()))?;
    Ok(path)
}

fn format_ts(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn make_temp_log_dir() -> PathBuf {
        static SEQ: AtomicU64 = AtomicU64::new(0);

        let seq = SEQ.fetch_add(1, Ordering::Relaxed);
        let uniq = format!("fixwatch-logs-test-{}-{seq}", std::process::id());
        let dir = std::env::temp_dir().join(uniq);
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn empty_report() -> ScanReport {
        ScanReport {
            schema_version: "1.0".to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            scan_id: "scan-test-1".to_string(),
            generated_at: "2026-01-01T00:00:00Z".to_string(),
            active_findings: Vec::new(),
            backend_fixed_findings: Vec::new(),
            resolved_findings: Vec::new(),
            new_count: 0,
            existing_count: 0,
            reappeared_count: 0,
            resolved_count: 0,
            true_detector_count: 0,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn scan_and_reset_logs_are_distinguishable_by_command() {
        let dir = make_temp_log_dir();
        let now = OffsetDateTime::now_utc();

        let scan_path = write_scan_log(&dir, now, now, &empty_report(), &[]).unwrap();
        let reset_path =
            write_reset_log(&dir, now, now, 3, &["t:ledger".to_string()]).unwrap();

        let scan: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&scan_path).unwrap()).unwrap();
        let reset: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&reset_path).unwrap()).unwrap();

        assert_eq!(scan["command"], "scan");
        assert_eq!(scan["status"], "ok");
        assert_eq!(reset["command"], "reset");
        assert_eq!(reset["previous_ledger_len"], 3);
        assert_eq!(reset["cleared_keys"][0], "t:ledger");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
