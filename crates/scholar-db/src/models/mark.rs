//! Mark rows.
//!
//! Marks are append-only: there is no update path.

use chrono::{DateTime, Utc};
use scholar_core::{Mark, MarksFilter, Percentage, Period, Pid, Subject, Term};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};

use crate::error::{DbError, DbResult};
use crate::models::student::push_page;

const MARK_COLUMNS: &str = r#"
    SELECT m.id, m.student_pid, m.subject_id, s.engage_code AS subject_code,
           s.name AS subject_name, m.teacher, m.percentage, m.academic_year,
           m.term, m.importance, m.created_at
    FROM marks m
    JOIN subjects s ON s.id = m.subject_id
"#;

/// A row of the `marks` table joined with its subject.
#[derive(Debug, Clone, FromRow)]
pub struct MarkRow {
    pub id: i64,
    pub student_pid: i64,
    pub subject_id: i64,
    pub subject_code: String,
    pub subject_name: String,
    pub teacher: String,
    pub percentage: i64,
    pub academic_year: i64,
    pub term: String,
    pub importance: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<MarkRow> for Mark {
    type Error = DbError;

    fn try_from(row: MarkRow) -> DbResult<Self> {
        let invalid = |e: scholar_core::ScholarError| {
            DbError::validation(format!("mark {}: {}", row.id, e.message()))
        };
        let percentage = Percentage::try_from(row.percentage).map_err(invalid)?;
        let term = row.term.parse::<Term>().map_err(invalid)?;
        let academic_year = i32::try_from(row.academic_year)
            .map_err(|e| DbError::validation(format!("mark {}: academic year: {e}", row.id)))?;

        Ok(Mark {
            id: Some(row.id),
            student_pid: Pid::new(row.student_pid),
            subject: Subject {
                id: Some(row.subject_id),
                engage_code: row.subject_code,
                name: row.subject_name,
            },
            teacher: row.teacher,
            percentage,
            period: Period::full(academic_year, term, row.importance),
            created_at: Some(row.created_at),
        })
    }
}

impl MarkRow {
    /// Stored marks matching `filter`, oldest first.
    ///
    /// Each filter period matches the marks it contains, so a partial period
    /// selects every column of its year or term.
    pub async fn find(conn: &mut SqliteConnection, filter: &MarksFilter) -> DbResult<Vec<Mark>> {
        let mut qb = QueryBuilder::<Sqlite>::new(MARK_COLUMNS);
        qb.push(" WHERE 1 = 1");

        if let Some(id) = filter.id {
            qb.push(" AND m.id = ").push_bind(id);
        }
        if let Some(pid) = filter.pid {
            qb.push(" AND m.student_pid = ").push_bind(pid.get());
        }
        if let Some(subject_id) = filter.subject_id {
            qb.push(" AND m.subject_id = ").push_bind(subject_id);
        }
        if !filter.periods.is_empty() {
            qb.push(" AND (");
            for (i, period) in filter.periods.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                qb.push("(m.academic_year = ").push_bind(period.academic_year);
                if let Some(term) = period.term {
                    qb.push(" AND m.term = ").push_bind(term.as_str());
                }
                if let Some(importance) = &period.importance {
                    qb.push(" AND m.importance = ").push_bind(importance.clone());
                }
                qb.push(")");
            }
            qb.push(")");
        }
        qb.push(" ORDER BY m.id");
        push_page(&mut qb, filter.limit, filter.offset);

        let rows: Vec<Self> = qb.build_query_as().fetch_all(&mut *conn).await?;
        rows.into_iter().map(Mark::try_from).collect()
    }

    pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> DbResult<Mark> {
        Self::find(conn, &MarksFilter::by_id(id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found(format!("mark {id}")))
    }

    /// Insert a new mark. The subject must already be stored.
    pub async fn create(conn: &mut SqliteConnection, mark: &Mark) -> DbResult<Mark> {
        mark.validate()
            .map_err(|e| DbError::validation(e.message()))?;

        let subject_id = mark.subject.id.ok_or_else(|| {
            DbError::validation(format!("mark subject {:?} is not stored", mark.subject.name))
        })?;
        let (Some(term), Some(importance)) = (mark.period.term, mark.period.importance.as_deref())
        else {
            return Err(DbError::validation("mark period is not full"));
        };

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO marks (
                student_pid, subject_id, teacher, percentage,
                academic_year, term, importance, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(mark.student_pid.get())
        .bind(subject_id)
        .bind(&mark.teacher)
        .bind(i64::from(mark.percentage))
        .bind(mark.period.academic_year)
        .bind(term.as_str())
        .bind(importance)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;

        Self::find_by_id(conn, id).await
    }

    pub async fn delete(conn: &mut SqliteConnection, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM marks WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(format!("mark {id}")));
        }
        Ok(())
    }
}
