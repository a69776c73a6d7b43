//! Subject rows and the links between students and subjects.

use scholar_core::{Pid, Subject};
use sqlx::{FromRow, SqliteConnection};

use crate::error::{DbError, DbResult};

/// A row of the `subjects` table.
#[derive(Debug, Clone, FromRow)]
pub struct SubjectRow {
    pub id: i64,
    pub engage_code: String,
    pub name: String,
}

impl From<SubjectRow> for Subject {
    fn from(row: SubjectRow) -> Self {
        Subject {
            id: Some(row.id),
            engage_code: row.engage_code,
            name: row.name,
        }
    }
}

impl SubjectRow {
    pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> DbResult<Subject> {
        sqlx::query_as::<_, Self>("SELECT id, engage_code, name FROM subjects WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .map(Subject::from)
            .ok_or_else(|| DbError::not_found(format!("subject {id}")))
    }

    pub async fn find_by_code(conn: &mut SqliteConnection, code: &str) -> DbResult<Subject> {
        sqlx::query_as::<_, Self>(
            "SELECT id, engage_code, name FROM subjects WHERE engage_code = ?",
        )
        .bind(code)
        .fetch_optional(&mut *conn)
        .await?
        .map(Subject::from)
        .ok_or_else(|| DbError::not_found(format!("subject with code {code:?}")))
    }

    /// Subjects are not unique by name; the oldest one wins.
    pub async fn find_by_name(conn: &mut SqliteConnection, name: &str) -> DbResult<Subject> {
        sqlx::query_as::<_, Self>(
            "SELECT id, engage_code, name FROM subjects WHERE name = ? ORDER BY id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?
        .map(Subject::from)
        .ok_or_else(|| DbError::not_found(format!("subject named {name:?}")))
    }

    /// Resolve a subject by whichever key it carries: id, then code, then name.
    pub async fn resolve(conn: &mut SqliteConnection, subject: &Subject) -> DbResult<Subject> {
        if let Some(id) = subject.id {
            Self::find_by_id(conn, id).await
        } else if !subject.engage_code.is_empty() {
            Self::find_by_code(conn, &subject.engage_code).await
        } else if !subject.name.is_empty() {
            Self::find_by_name(conn, &subject.name).await
        } else {
            Err(DbError::validation("subject has no id, code or name"))
        }
    }

    /// Insert the subject unless its engage code is already known.
    pub async fn upsert(conn: &mut SqliteConnection, subject: &Subject) -> DbResult<Subject> {
        if subject.engage_code.is_empty() {
            return Err(DbError::validation(format!(
                "subject {:?} has no engage code",
                subject.name
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO subjects (engage_code, name)
            VALUES (?, ?)
            ON CONFLICT (engage_code) DO NOTHING
            "#,
        )
        .bind(&subject.engage_code)
        .bind(&subject.name)
        .execute(&mut *conn)
        .await?;

        Self::find_by_code(conn, &subject.engage_code).await
    }

    /// Subjects a student takes, in the order they were first stored.
    pub async fn for_student(conn: &mut SqliteConnection, pid: Pid) -> DbResult<Vec<Subject>> {
        let rows = sqlx::query_as::<_, Self>(
            r#"
            SELECT s.id, s.engage_code, s.name
            FROM subjects s
            JOIN student_subjects ss ON ss.subject_id = s.id
            WHERE ss.student_pid = ?
            ORDER BY s.id
            "#,
        )
        .bind(pid.get())
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows.into_iter().map(Subject::from).collect())
    }

    /// Link a subject to a student. Returns false if already linked.
    pub async fn link(conn: &mut SqliteConnection, pid: Pid, subject_id: i64) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO student_subjects (student_pid, subject_id)
            VALUES (?, ?)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(pid.get())
        .bind(subject_id)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
