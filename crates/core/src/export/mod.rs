//! One-row CSV export of a risk report.

use crate::domain::report::{FormattedReport, RiskReport};
use crate::error::RiskError;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const HEADER: [&str; 7] = [
    "VaR (95%)",
    "CVaR (95%)",
    "Volatility",
    "Sharpe Ratio",
    "Sortino Ratio",
    "Max Drawdown",
    "Decision",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ExportRow {
    #[serde(rename = "VaR (95%)")]
    var_95: String,
    #[serde(rename = "CVaR (95%)")]
    cvar_95: String,
    #[serde(rename = "Volatility")]
    volatility: String,
    #[serde(rename = "Sharpe Ratio")]
    sharpe_ratio: String,
    #[serde(rename = "Sortino Ratio")]
    sortino_ratio: String,
    #[serde(rename = "Max Drawdown")]
    max_drawdown: String,
    #[serde(rename = "Decision")]
    decision: String,
}

impl From<FormattedReport> for ExportRow {
    fn from(f: FormattedReport) -> Self {
        Self {
            var_95: f.var_95,
            cvar_95: f.cvar_95,
            volatility: f.volatility,
            sharpe_ratio: f.sharpe_ratio,
            sortino_ratio: f.sortino_ratio,
            max_drawdown: f.max_drawdown,
            decision: f.decision,
        }
    }
}

impl From<ExportRow> for FormattedReport {
    fn from(r: ExportRow) -> Self {
        Self {
            var_95: r.var_95,
            cvar_95: r.cvar_95,
            volatility: r.volatility,
            sharpe_ratio: r.sharpe_ratio,
            sortino_ratio: r.sortino_ratio,
            max_drawdown: r.max_drawdown,
            decision: r.decision,
        }
    }
}

fn export_err(context: &str, err: impl std::fmt::Display) -> RiskError {
    RiskError::ExportFailure(format!("{context}: {err}"))
}

/// Append `.csv` when the destination has no extension.
pub fn resolve_destination(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension("csv")
    }
}

pub fn write_report<W: Write>(writer: W, report: &RiskReport) -> Result<(), RiskError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.serialize(ExportRow::from(report.formatted()))
        .map_err(|e| export_err("failed to encode report row", e))?;
    wtr.flush()
        .map_err(|e| export_err("failed to flush report", e))?;
    Ok(())
}

pub fn report_to_string(report: &RiskReport) -> Result<String, RiskError> {
    let mut buf = Vec::new();
    write_report(&mut buf, report)?;
    String::from_utf8(buf).map_err(|e| export_err("report is not valid UTF-8", e))
}

/// Write the report to `path` (with `.csv` appended if needed) and return the final path.
pub fn save_report(path: &Path, report: &RiskReport) -> Result<PathBuf, RiskError> {
    let dest = resolve_destination(path);
    let file = std::fs::File::create(&dest)
        .map_err(|e| export_err(&format!("cannot write {}", dest.display()), e))?;
    write_report(file, report)?;
    tracing::info!(path = %dest.display(), "saved risk report");
    Ok(dest)
}

pub fn read_report<R: Read>(reader: R) -> Result<FormattedReport, RiskError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|e| export_err("failed to read header", e))?
        .clone();
    if headers.iter().ne(HEADER.iter().copied()) {
        return Err(RiskError::ExportFailure(format!(
            "unexpected header: {}",
            headers.iter().collect::<Vec<_>>().join(",")
        )));
    }

    let mut rows = rdr.deserialize::<ExportRow>();
    let row = rows
        .next()
        .ok_or_else(|| RiskError::ExportFailure("export has no data row".to_string()))?
        .map_err(|e| export_err("failed to decode report row", e))?;
    if rows.next().is_some() {
        return Err(RiskError::ExportFailure(
            "export has more than one data row".to_string(),
        ));
    }
    Ok(row.into())
}

pub fn load_report(path: &Path) -> Result<FormattedReport, RiskError> {
    let file = std::fs::File::open(path)
        .map_err(|e| export_err(&format!("cannot read {}", path.display()), e))?;
    read_report(file)
}
