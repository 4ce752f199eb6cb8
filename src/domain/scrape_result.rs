use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Startup profile fields pulled out of a page. Every field is optional; a map
/// with at least one populated field counts as a successful extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMap {
    pub name: Option<String>,
    pub domain: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub contact_number: Option<String>,
    pub mobile_number: Option<String>,
    pub stage: Option<String>,
    pub focus_industry: Option<String>,
    pub focus_sector: Option<String>,
    pub service_area: Option<String>,
    pub location: Option<String>,
    pub active_years: Option<String>,
    pub engagement_level: Option<String>,
    pub active_on_portal: Option<String>,
    pub about_company: Option<String>,
}

impl FieldMap {
    /// Column order shared by the JSON and CSV representations.
    pub const KEYS: [&'static str; 15] = [
        "name",
        "domain",
        "website",
        "email",
        "contact_number",
        "mobile_number",
        "stage",
        "focus_industry",
        "focus_sector",
        "service_area",
        "location",
        "active_years",
        "engagement_level",
        "active_on_portal",
        "about_company",
    ];

    pub fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            "name" => &self.name,
            "domain" => &self.domain,
            "website" => &self.website,
            "email" => &self.email,
            "contact_number" => &self.contact_number,
            "mobile_number" => &self.mobile_number,
            "stage" => &self.stage,
            "focus_industry" => &self.focus_industry,
            "focus_sector" => &self.focus_sector,
            "service_area" => &self.service_area,
            "location" => &self.location,
            "active_years" => &self.active_years,
            "engagement_level" => &self.engagement_level,
            "active_on_portal" => &self.active_on_portal,
            "about_company" => &self.about_company,
            _ => return None,
        };
        value.as_deref()
    }

    fn slot(&mut self, key: &str) -> Option<&mut Option<String>> {
        let slot = match key {
            "name" => &mut self.name,
            "domain" => &mut self.domain,
            "website" => &mut self.website,
            "email" => &mut self.email,
            "contact_number" => &mut self.contact_number,
            "mobile_number" => &mut self.mobile_number,
            "stage" => &mut self.stage,
            "focus_industry" => &mut self.focus_industry,
            "focus_sector" => &mut self.focus_sector,
            "service_area" => &mut self.service_area,
            "location" => &mut self.location,
            "active_years" => &mut self.active_years,
            "engagement_level" => &mut self.engagement_level,
            "active_on_portal" => &mut self.active_on_portal,
            "about_company" => &mut self.about_company,
            _ => return None,
        };
        Some(slot)
    }

    /// Sets `key` unless it already holds a value. Blank values are ignored.
    /// Returns whether the field was written.
    pub fn fill(&mut self, key: &str, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }
        match self.slot(key) {
            Some(slot) if slot.is_none() => {
                *slot = Some(value.to_string());
                true
            }
            _ => false,
        }
    }

    /// Copies every field of `other` that is missing here.
    pub fn merge_missing(&mut self, other: FieldMap) {
        for key in Self::KEYS {
            if let Some(value) = other.get(key) {
                self.fill(key, value);
            }
        }
    }

    pub fn populated(&self) -> usize {
        Self::KEYS.iter().filter(|k| self.get(k).is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.populated() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Success,
    Failed,
}

impl ResultStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultStatus::Success => "success",
            ResultStatus::Failed => "failed",
        }
    }
}

/// How a result was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Single,
    Bulk,
    Api,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Single => "single",
            Origin::Bulk => "bulk",
            Origin::Api => "api",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Origin {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(Origin::Single),
            "bulk" => Ok(Origin::Bulk),
            "api" => Ok(Origin::Api),
            other => Err(RecordError::UnknownOrigin(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(FieldMap),
    Failed(String),
}

/// One row of the result log. Built once by the scrape executor and never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "ResultRecord", try_from = "ResultRecord")]
pub struct ScrapeResult {
    pub id: Uuid,
    pub source_url: String,
    pub outcome: Outcome,
    pub origin: Origin,
    pub timestamp: DateTime<Utc>,
}

impl ScrapeResult {
    pub fn success(source_url: &str, fields: FieldMap, origin: Origin) -> Self {
        Self::new(source_url, Outcome::Success(fields), origin)
    }

    pub fn failed(source_url: &str, reason: impl Into<String>, origin: Origin) -> Self {
        Self::new(source_url, Outcome::Failed(reason.into()), origin)
    }

    fn new(source_url: &str, outcome: Outcome, origin: Origin) -> Self {
        ScrapeResult {
            id: Uuid::new_v4(),
            source_url: source_url.to_string(),
            outcome,
            origin,
            timestamp: Utc::now(),
        }
    }

    pub fn status(&self) -> ResultStatus {
        match self.outcome {
            Outcome::Success(_) => ResultStatus::Success,
            Outcome::Failed(_) => ResultStatus::Failed,
        }
    }

    pub fn fields(&self) -> Option<&FieldMap> {
        match &self.outcome {
            Outcome::Success(fields) => Some(fields),
            Outcome::Failed(_) => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success(_) => None,
            Outcome::Failed(reason) => Some(reason),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status() == ResultStatus::Success
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("failed result without an error message")]
    MissingReason,
    #[error("successful result carries an error message")]
    UnexpectedReason,
    #[error("unknown status: {0}")]
    UnknownStatus(String),
    #[error("unknown origin: {0}")]
    UnknownOrigin(String),
}

/// Flat wire shape of a result, shared by the API, the JSON export and the
/// database rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
    pub id: Uuid,
    pub source_url: String,
    #[serde(flatten)]
    pub fields: FieldMap,
    pub status: ResultStatus,
    pub error_message: Option<String>,
    pub origin: Origin,
    pub timestamp: DateTime<Utc>,
}

impl From<ScrapeResult> for ResultRecord {
    fn from(result: ScrapeResult) -> Self {
        let status = result.status();
        let (fields, error_message) = match result.outcome {
            Outcome::Success(fields) => (fields, None),
            Outcome::Failed(reason) => (FieldMap::default(), Some(reason)),
        };

        ResultRecord {
            id: result.id,
            source_url: result.source_url,
            fields,
            status,
            error_message,
            origin: result.origin,
            timestamp: result.timestamp,
        }
    }
}

impl TryFrom<ResultRecord> for ScrapeResult {
    type Error = RecordError;

    fn try_from(record: ResultRecord) -> Result<Self, Self::Error> {
        let reason = record.error_message.filter(|m| !m.trim().is_empty());
        let outcome = match (record.status, reason) {
            (ResultStatus::Success, None) => Outcome::Success(record.fields),
            (ResultStatus::Success, Some(_)) => return Err(RecordError::UnexpectedReason),
            (ResultStatus::Failed, Some(reason)) => Outcome::Failed(reason),
            (ResultStatus::Failed, None) => return Err(RecordError::MissingReason),
        };

        Ok(ScrapeResult {
            id: record.id,
            source_url: record.source_url,
            outcome,
            origin: record.origin,
            timestamp: record.timestamp,
        })
    }
}

/// Aggregate counts over the whole result log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultStats {
    pub total: u64,
    pub success: u64,
    pub failed: u64,
}

impl ResultStats {
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a ScrapeResult>) -> Self {
        results
            .into_iter()
            .fold(ResultStats::default(), |mut stats, result| {
                stats.total += 1;
                match result.status() {
                    ResultStatus::Success => stats.success += 1,
                    ResultStatus::Failed => stats.failed += 1,
                }
                stats
            })
    }
}
