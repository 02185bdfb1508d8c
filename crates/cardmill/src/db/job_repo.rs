//! Job repository: CRUD operations for the `jobs` table.

use rusqlite::{params, Row};

use super::{Database, DatabaseError};

/// A raw job row from the database. Typed conversion lives in the store.
#[derive(Debug, Clone)]
pub struct JobRow {
    pub id: String,
    pub source_filename: String,
    pub mime_type: Option<String>,
    pub status: String,
    pub stage: String,
    pub progress: f64,
    pub options: String,
    pub est_words: Option<u32>,
    pub est_pages: Option<u32>,
    pub final_cards: Option<u32>,
    pub final_mcqs: Option<u32>,
    pub deck_id: Option<String>,
    pub error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl JobRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            source_filename: row.get("source_filename")?,
            mime_type: row.get("mime_type")?,
            status: row.get("status")?,
            stage: row.get("stage")?,
            progress: row.get("progress")?,
            options: row.get("options")?,
            est_words: row.get("est_words")?,
            est_pages: row.get("est_pages")?,
            final_cards: row.get("final_cards")?,
            final_mcqs: row.get("final_mcqs")?,
            deck_id: row.get("deck_id")?,
            error: row.get("error")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Query filter parameters for job listing.
#[derive(Debug, Default, Clone)]
pub struct JobFilter {
    pub status: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Inserts a new job row.
pub fn insert(db: &Database, job: &JobRow) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO jobs (id, source_filename, mime_type, status, stage, progress, options,
             est_words, est_pages, final_cards, final_mcqs, deck_id, error, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                job.id,
                job.source_filename,
                job.mime_type,
                job.status,
                job.stage,
                job.progress,
                job.options,
                job.est_words,
                job.est_pages,
                job.final_cards,
                job.final_mcqs,
                job.deck_id,
                job.error,
                job.created_at,
                job.updated_at,
            ],
        )?;
        Ok(())
    })
}

/// Updates an existing job row. All fields except `id`, `source_filename`,
/// `options` and `created_at` are overwritten.
pub fn update(db: &Database, job: &JobRow) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "UPDATE jobs SET mime_type=?2, status=?3, stage=?4, progress=?5,
             est_words=?6, est_pages=?7, final_cards=?8, final_mcqs=?9,
             deck_id=?10, error=?11, updated_at=?12
             WHERE id=?1",
            params![
                job.id,
                job.mime_type,
                job.status,
                job.stage,
                job.progress,
                job.est_words,
                job.est_pages,
                job.final_cards,
                job.final_mcqs,
                job.deck_id,
                job.error,
                job.updated_at,
            ],
        )?;
        Ok(())
    })
}

/// Finds a job by its ID.
pub fn find_by_id(db: &Database, id: &str) -> Result<Option<JobRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM jobs WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], JobRow::from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// Queries jobs with filters, returning (rows, total_count).
pub fn query(db: &Database, filter: &JobFilter) -> Result<(Vec<JobRow>, u64), DatabaseError> {
    db.with_conn(|conn| {
        let (where_clause, status_param) = match &filter.status {
            Some(status) => ("WHERE status = ?1".to_string(), Some(status.clone())),
            None => (String::new(), None),
        };

        let count_sql = format!("SELECT COUNT(*) FROM jobs {}", where_clause);
        let total: u64 = match &status_param {
            Some(s) => conn.query_row(&count_sql, params![s], |r| r.get(0))?,
            None => conn.query_row(&count_sql, [], |r| r.get(0))?,
        };

        let limit = filter.limit.unwrap_or(100) as i64;
        let offset = filter.offset.unwrap_or(0) as i64;
        let query_sql = format!(
            "SELECT * FROM jobs {} ORDER BY created_at DESC LIMIT {} OFFSET {}",
            where_clause, limit, offset
        );

        let mut stmt = conn.prepare(&query_sql)?;
        let rows: Vec<JobRow> = match &status_param {
            Some(s) => stmt
                .query_map(params![s], JobRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?,
            None => stmt
                .query_map([], JobRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?,
        };

        Ok((rows, total))
    })
}

/// Counts jobs with the given status.
pub fn count_by_status(db: &Database, status: &str) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM jobs WHERE status = ?1",
            params![status],
            |r| r.get(0),
        )?;
        Ok(count)
    })
}

/// Marks every non-terminal job as failed with the given message.
/// Returns the number of jobs swept. Used at startup: an interrupted
/// pipeline is never resumed.
pub fn fail_non_terminal(
    db: &Database,
    message: &str,
    updated_at: &str,
) -> Result<usize, DatabaseError> {
    db.with_conn(|conn| {
        let swept = conn.execute(
            "UPDATE jobs SET status = 'error', error = ?1, updated_at = ?2
             WHERE status NOT IN ('done', 'error')",
            params![message, updated_at],
        )?;
        Ok(swept)
    })
}
