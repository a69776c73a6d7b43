//! Assembly of domain records from Engage calls.

use scholar_core::{Mark, Period, PeriodService, Pid, ScholarError, Student, Subject};
use scholar_engage::{
    current_year_from_render, marks_from_render, name_from_render, EngageApi, EngageResult,
    RenderQuery,
};
use tracing::debug;

/// Fetch a pupil from Engage.
///
/// The pupil attends school iff Engage lists `current_academic_year` among
/// their academic years; the year in program is then read from the render.
pub async fn fetch_student(
    api: &dyn EngageApi,
    pid: Pid,
    current_academic_year: i32,
) -> EngageResult<Student> {
    let academic_years = api.academic_years(pid).await?;
    let attends_school = academic_years.contains(&current_academic_year);

    let reporting_periods = api.reporting_periods(pid, &academic_years).await?;
    let subjects = api
        .reporting_subjects(pid, &academic_years, &reporting_periods)
        .await?;
    let columns = api
        .columns_for_subjects(pid, &academic_years, &reporting_periods, &subjects)
        .await?;

    let query = RenderQuery {
        academic_years,
        reporting_periods,
        columns,
        subjects,
    };
    let render = api.marksheet_render(pid, &query).await?;

    let (name, _) = name_from_render(&render)?;
    let mut student = Student::new(pid, name).with_subjects(query.subjects);
    if attends_school {
        let (year, _) = current_year_from_render(&render)?;
        student = student.attending(year);
    }

    debug!(pid = %pid, attends_school, "Fetched student from Engage");
    Ok(student)
}

/// Fetch a pupil's marks for one full period from Engage.
///
/// Engage answering with no data means there are no marks yet.
pub async fn fetch_period_marks(
    api: &dyn EngageApi,
    periods: &dyn PeriodService,
    pid: Pid,
    period: &Period,
) -> scholar_core::Result<Vec<Mark>> {
    let Some(importance) = period.importance.clone().filter(|_| period.is_full()) else {
        return Err(ScholarError::invalid(format!(
            "engage marks need a full period, got {period}"
        )));
    };
    let engage_term = periods.period_to_engage_term(pid, period).await?;

    let query = RenderQuery {
        academic_years: vec![period.academic_year],
        reporting_periods: vec![engage_term],
        columns: vec![importance],
        subjects: Vec::new(),
    };
    let render = match api.marksheet_render(pid, &query).await {
        Ok(render) => render,
        Err(e) if e.is_not_found() => return Ok(Vec::new()),
        Err(e) => return Err(ScholarError::from(e).context(format!("marks of {pid} in {period}"))),
    };

    let marks = marks_from_render(&render)
        .map_err(|e| ScholarError::from(e).context(format!("marks of {pid} in {period}")))?
        .into_iter()
        .map(|parsed| Mark {
            id: None,
            student_pid: pid,
            subject: Subject::named(parsed.subject),
            teacher: parsed.teacher,
            percentage: parsed.percentage,
            period: period.clone(),
            created_at: None,
        })
        .collect::<Vec<_>>();

    debug!(pid = %pid, period = %period, count = marks.len(), "Fetched marks from Engage");
    Ok(marks)
}
