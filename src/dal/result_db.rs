use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{FieldMap, RecordError, ResultRecord, ResultStats, ResultStatus, ScrapeResult};

use super::{ResultStore, StoreError};

const SELECT_RESULT: &str = r"
    select
        id, source_url, name, domain, website, email, contact_number, mobile_number,
        stage, focus_industry, focus_sector, service_area, location, active_years,
        engagement_level, active_on_portal, about_company, status, error_message,
        origin, created_at
    from
        scrape_result
";

const INSERT_RESULT: &str = r"
    insert into scrape_result
        (id, source_url, name, domain, website, email, contact_number, mobile_number,
         stage, focus_industry, focus_sector, service_area, location, active_years,
         engagement_level, active_on_portal, about_company, status, error_message,
         origin, created_at)
    values
        ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
         $18, $19, $20, $21)
";

#[derive(sqlx::FromRow)]
struct ResultRow {
    id: Uuid,
    source_url: String,
    name: Option<String>,
    domain: Option<String>,
    website: Option<String>,
    email: Option<String>,
    contact_number: Option<String>,
    mobile_number: Option<String>,
    stage: Option<String>,
    focus_industry: Option<String>,
    focus_sector: Option<String>,
    service_area: Option<String>,
    location: Option<String>,
    active_years: Option<String>,
    engagement_level: Option<String>,
    active_on_portal: Option<String>,
    about_company: Option<String>,
    status: String,
    error_message: Option<String>,
    origin: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ResultRow> for ScrapeResult {
    type Error = RecordError;

    fn try_from(row: ResultRow) -> Result<Self, Self::Error> {
        let status = match row.status.as_str() {
            "success" => ResultStatus::Success,
            "failed" => ResultStatus::Failed,
            other => return Err(RecordError::UnknownStatus(other.to_string())),
        };

        ResultRecord {
            id: row.id,
            source_url: row.source_url,
            fields: FieldMap {
                name: row.name,
                domain: row.domain,
                website: row.website,
                email: row.email,
                contact_number: row.contact_number,
                mobile_number: row.mobile_number,
                stage: row.stage,
                focus_industry: row.focus_industry,
                focus_sector: row.focus_sector,
                service_area: row.service_area,
                location: row.location,
                active_years: row.active_years,
                engagement_level: row.engagement_level,
                active_on_portal: row.active_on_portal,
                about_company: row.about_company,
            },
            status,
            error_message: row.error_message,
            origin: row.origin.parse()?,
            timestamp: row.created_at,
        }
        .try_into()
    }
}

fn into_results(rows: Vec<ResultRow>) -> Result<Vec<ScrapeResult>, StoreError> {
    rows.into_iter()
        .map(|row| ScrapeResult::try_from(row).map_err(StoreError::from))
        .collect()
}

pub struct PgResultStore {
    pool: PgPool,
}

impl PgResultStore {
    pub fn new(pool: PgPool) -> Self {
        PgResultStore { pool }
    }
}

#[async_trait]
impl ResultStore for PgResultStore {
    async fn append(&self, result: &ScrapeResult) -> Result<(), StoreError> {
        let empty = FieldMap::default();
        let fields = result.fields().unwrap_or(&empty);

        sqlx::query(INSERT_RESULT)
        .bind(result.id)
        .bind(&result.source_url)
        .bind(&fields.name)
        .bind(&fields.domain)
        .bind(&fields.website)
        .bind(&fields.email)
        .bind(&fields.contact_number)
        .bind(&fields.mobile_number)
        .bind(&fields.stage)
        .bind(&fields.focus_industry)
        .bind(&fields.focus_sector)
        .bind(&fields.service_area)
        .bind(&fields.location)
        .bind(&fields.active_years)
        .bind(&fields.engagement_level)
        .bind(&fields.active_on_portal)
        .bind(&fields.about_company)
        .bind(result.status().as_str())
        .bind(result.error_message())
        .bind(result.origin.as_str())
        .bind(result.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self, limit: usize, skip: usize) -> Result<Vec<ScrapeResult>, StoreError> {
        let rows = sqlx::query_as::<_, ResultRow>(&format!(
            "{} order by created_at desc, seq desc limit $1 offset $2",
            SELECT_RESULT
        ))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .bind(i64::try_from(skip).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        into_results(rows)
    }

    async fn all(&self) -> Result<Vec<ScrapeResult>, StoreError> {
        let rows = sqlx::query_as::<_, ResultRow>(&format!(
            "{} order by created_at desc, seq desc",
            SELECT_RESULT
        ))
        .fetch_all(&self.pool)
        .await?;

        into_results(rows)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ScrapeResult>, StoreError> {
        let row = sqlx::query_as::<_, ResultRow>(&format!("{} where id = $1", SELECT_RESULT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(ScrapeResult::try_from).transpose()?)
    }

    async fn stats(&self) -> Result<ResultStats, StoreError> {
        let (total, success, failed): (i64, i64, i64) = sqlx::query_as(
            r"
            select
                count(*),
                count(*) filter (where status = 'success'),
                count(*) filter (where status = 'failed')
            from
                scrape_result
            ",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(ResultStats {
            total: total as u64,
            success: success as u64,
            failed: failed as u64,
        })
    }
}
