//! Student rows.

use chrono::{DateTime, Utc};
use scholar_core::{Pid, Student, StudentFilter, Subject};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};
use std::collections::HashSet;

use crate::error::{DbError, DbResult};
use crate::models::subject::SubjectRow;

const STUDENT_COLUMNS: &str =
    "SELECT pid, name, current_year, attends_school, created_at, updated_at FROM students";

/// A row of the `students` table.
#[derive(Debug, Clone, FromRow)]
pub struct StudentRow {
    pub pid: i64,
    pub name: String,
    pub current_year: Option<i64>,
    pub attends_school: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudentRow {
    fn into_student(self, subjects: Vec<Subject>) -> DbResult<Student> {
        let current_year = self
            .current_year
            .map(i32::try_from)
            .transpose()
            .map_err(|e| DbError::validation(format!("student {}: current year: {e}", self.pid)))?;

        Ok(Student {
            pid: Pid::new(self.pid),
            name: self.name,
            current_year,
            attends_school: self.attends_school,
            subjects,
            marks: Vec::new(),
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        })
    }

    /// Stored students matching `filter`, with their subjects.
    pub async fn find(
        conn: &mut SqliteConnection,
        filter: &StudentFilter,
    ) -> DbResult<Vec<Student>> {
        let mut qb = QueryBuilder::<Sqlite>::new(STUDENT_COLUMNS);
        qb.push(" WHERE 1 = 1");

        if let Some(pid) = filter.pid {
            qb.push(" AND pid = ").push_bind(pid.get());
        }
        if let Some(year) = filter.year {
            qb.push(" AND current_year = ").push_bind(year);
        }
        if let Some(attends) = filter.attends_school {
            qb.push(" AND attends_school = ").push_bind(attends);
        }
        if let Some(subject_id) = filter.subject_id {
            qb.push(" AND pid IN (SELECT student_pid FROM student_subjects WHERE subject_id = ")
                .push_bind(subject_id)
                .push(")");
        }
        qb.push(" ORDER BY pid");
        push_page(&mut qb, filter.limit, filter.offset);

        let rows: Vec<Self> = qb.build_query_as().fetch_all(&mut *conn).await?;

        let mut students = Vec::with_capacity(rows.len());
        for row in rows {
            let subjects = SubjectRow::for_student(conn, Pid::new(row.pid)).await?;
            students.push(row.into_student(subjects)?);
        }
        Ok(students)
    }

    pub async fn find_by_pid(conn: &mut SqliteConnection, pid: Pid) -> DbResult<Student> {
        Self::find(conn, &StudentFilter::by_pid(pid))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found(format!("student {pid}")))
    }

    /// Like [`Self::find_by_pid`], but absence is a valid answer.
    pub async fn find_optional(
        conn: &mut SqliteConnection,
        pid: Pid,
    ) -> DbResult<Option<Student>> {
        match Self::find_by_pid(conn, pid).await {
            Ok(student) => Ok(Some(student)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Insert a student and link its subjects, storing unknown subjects by code.
    pub async fn create(conn: &mut SqliteConnection, student: &Student) -> DbResult<Student> {
        student
            .validate()
            .map_err(|e| DbError::validation(e.message()))?;

        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO students (pid, name, current_year, attends_school, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(student.pid.get())
        .bind(&student.name)
        .bind(student.current_year)
        .bind(student.attends_school)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        for subject in &student.subjects {
            let stored = SubjectRow::upsert(conn, subject).await?;
            if let Some(id) = stored.id {
                SubjectRow::link(conn, student.pid, id).await?;
            }
        }

        Self::find_by_pid(conn, student.pid).await
    }

    /// Bring `prev` in line with `next`.
    ///
    /// Year and attendance are overwritten; subjects in `next` whose engage
    /// code `prev` lacks are appended and none are removed. Nothing is
    /// written when nothing differs. Returns whether a write happened.
    pub async fn update(
        conn: &mut SqliteConnection,
        prev: &Student,
        next: &Student,
    ) -> DbResult<bool> {
        next.validate()
            .map_err(|e| DbError::validation(e.message()))?;

        let known: HashSet<&str> = prev.subjects.iter().map(|s| s.engage_code.as_str()).collect();
        let mut seen = HashSet::new();
        let added: Vec<&Subject> = next
            .subjects
            .iter()
            .filter(|s| !known.contains(s.engage_code.as_str()))
            .filter(|s| seen.insert(s.engage_code.as_str()))
            .collect();

        for subject in &added {
            let stored = SubjectRow::upsert(conn, subject).await?;
            if let Some(id) = stored.id {
                SubjectRow::link(conn, prev.pid, id).await?;
            }
        }

        let fields_changed =
            prev.current_year != next.current_year || prev.attends_school != next.attends_school;
        if !fields_changed && added.is_empty() {
            return Ok(false);
        }

        sqlx::query(
            r#"
            UPDATE students SET
                current_year = ?,
                attends_school = ?,
                updated_at = ?
            WHERE pid = ?
            "#,
        )
        .bind(next.current_year)
        .bind(next.attends_school)
        .bind(Utc::now())
        .bind(prev.pid.get())
        .execute(&mut *conn)
        .await?;

        Ok(true)
    }

    /// Delete a student; subject links and marks go with it.
    pub async fn delete(conn: &mut SqliteConnection, pid: Pid) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM students WHERE pid = ?")
            .bind(pid.get())
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(format!("student {pid}")));
        }
        Ok(())
    }
}

/// Append `LIMIT`/`OFFSET`. SQLite needs a `LIMIT` for an `OFFSET`.
pub(crate) fn push_page(
    qb: &mut QueryBuilder<'_, Sqlite>,
    limit: Option<i64>,
    offset: Option<i64>,
) {
    if limit.is_none() && offset.is_none() {
        return;
    }
    qb.push(" LIMIT ").push_bind(limit.unwrap_or(-1));
    if let Some(offset) = offset {
        qb.push(" OFFSET ").push_bind(offset);
    }
}
