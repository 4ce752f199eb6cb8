use std::str::FromStr;

use crate::domain::{FieldMap, ScrapeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "scraped_data.csv",
            ExportFormat::Json => "scraped_data.json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Unsupported export format: {0}. Use csv or json")]
    UnknownFormat(String),
    #[error("Failed to write csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to write json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Header row of the CSV export: identity, profile fields, then status.
pub fn csv_header() -> Vec<&'static str> {
    let mut header = vec!["id", "source_url"];
    header.extend(FieldMap::KEYS);
    header.extend(["status", "error_message", "origin", "timestamp"]);
    header
}

pub fn export(format: ExportFormat, results: &[ScrapeResult]) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Csv => export_csv(results),
        ExportFormat::Json => Ok(serde_json::to_vec_pretty(results)?),
    }
}

fn export_csv(results: &[ScrapeResult]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(csv_header())?;

    let empty = FieldMap::default();
    for result in results {
        let fields = result.fields().unwrap_or(&empty);
        let id = result.id.to_string();
        let timestamp = result.timestamp.to_rfc3339();

        let mut row: Vec<&str> = vec![id.as_str(), result.source_url.as_str()];
        row.extend(FieldMap::KEYS.iter().map(|k| fields.get(k).unwrap_or("")));
        row.extend([
            result.status().as_str(),
            result.error_message().unwrap_or(""),
            result.origin.as_str(),
            timestamp.as_str(),
        ]);
        writer.write_record(&row)?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(csv::Error::from(e.into_error())))
}
