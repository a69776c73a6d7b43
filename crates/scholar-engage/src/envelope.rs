//! Wire types shared by every Engage endpoint.
//!
//! Requests carry a flat context object whose list fields are comma-joined
//! strings. Responses wrap their payload in a `d` array.

use scholar_core::{Pid, Subject};
use serde::{Deserialize, Serialize};

/// Separator Engage expects between marksheet columns.
pub const COLUMN_SEPARATOR: &str = "|||";

/// Request body of the list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngageContext {
    #[serde(rename = "Text", skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(rename = "NumberOfItems", skip_serializing_if = "is_zero")]
    pub number_of_items: u32,
    #[serde(rename = "academicYears", skip_serializing_if = "String::is_empty")]
    pub academic_years: String,
    #[serde(rename = "reportingPeriods", skip_serializing_if = "String::is_empty")]
    pub reporting_periods: String,
    #[serde(rename = "yearGroupList", skip_serializing_if = "String::is_empty")]
    pub year_group_list: String,
    #[serde(rename = "subjectList", skip_serializing_if = "String::is_empty")]
    pub subject_list: String,
    #[serde(rename = "divisionList", skip_serializing_if = "String::is_empty")]
    pub division_list: String,
    #[serde(rename = "batchList", skip_serializing_if = "String::is_empty")]
    pub batch_list: String,
    #[serde(rename = "pupilIDs")]
    pub pupil_ids: String,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(n: &u32) -> bool {
    *n == 0
}

impl EngageContext {
    #[must_use]
    pub fn for_pupil(pid: Pid) -> Self {
        Self {
            pupil_ids: pid.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn academic_years(mut self, years: &[i32]) -> Self {
        self.academic_years = join_years(years);
        self
    }

    #[must_use]
    pub fn reporting_periods(mut self, periods: &[String]) -> Self {
        self.reporting_periods = periods.join(",");
        self
    }

    #[must_use]
    pub fn subjects(mut self, subjects: &[Subject]) -> Self {
        self.subject_list = join_subjects(subjects);
        self
    }
}

/// Request body of `RenderPupilMarksheet`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub academic_year: String,
    pub reporting_period_list: String,
    pub year_group_list: String,
    pub subject_list: String,
    pub division_list: String,
    pub batch_list: String,
    pub column_list: String,
    #[serde(rename = "pupilIDs")]
    pub pupil_ids: String,
    #[serde(rename = "uniqueID")]
    pub unique_id: String,
    pub set_as_preference: bool,
    pub default_reporting_period: String,
    pub page_index: String,
    pub sort_field: String,
    pub sort_direction: String,
    pub sortable: bool,
    pub show_pupil_name: bool,
    pub allow_collapse_marksheet_columns: String,
    pub enable_frozen_headings: bool,
    pub filter_search: bool,
    pub page: u32,
    pub page_size: u32,
}

/// What to render: one pupil over some years, periods, columns and subjects.
///
/// Empty `subjects` renders every subject the pupil takes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderQuery {
    pub academic_years: Vec<i32>,
    pub reporting_periods: Vec<String>,
    pub columns: Vec<String>,
    pub subjects: Vec<Subject>,
}

impl RenderRequest {
    #[must_use]
    pub fn new(pid: Pid, query: &RenderQuery) -> Self {
        Self {
            academic_year: join_years(&query.academic_years),
            reporting_period_list: query.reporting_periods.join(","),
            year_group_list: String::new(),
            subject_list: join_subjects(&query.subjects),
            division_list: String::new(),
            batch_list: String::new(),
            column_list: query.columns.join(COLUMN_SEPARATOR),
            pupil_ids: pid.to_string(),
            unique_id: "Portal_PupilDetails".to_string(),
            set_as_preference: true,
            default_reporting_period: String::new(),
            page_index: "0".to_string(),
            sort_field: "Surname".to_string(),
            sort_direction: "ASC".to_string(),
            sortable: true,
            show_pupil_name: true,
            allow_collapse_marksheet_columns: "true".to_string(),
            enable_frozen_headings: false,
            filter_search: true,
            page: 1,
            page_size: 500,
        }
    }
}

/// Response of every endpoint: `{"d": [...]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct EngageResponse<T> {
    #[serde(default = "Vec::new")]
    pub d: Vec<T>,
}

/// One entry of a list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EngageItem {
    #[serde(rename = "__type", default)]
    pub type_name: String,
    #[serde(rename = "Text", default)]
    pub text: String,
    #[serde(rename = "Value", default)]
    pub value: String,
    #[serde(rename = "Enabled", default)]
    pub enabled: bool,
    #[serde(rename = "Attributes", default)]
    pub attributes: EngageItemAttributes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EngageItemAttributes {
    #[serde(rename = "Checked", default)]
    pub checked: bool,
    #[serde(rename = "IsReporting", default)]
    pub is_reporting: bool,
    #[serde(rename = "ColumnType", default)]
    pub column_type: String,
}

/// Body Engage sends with a non-success status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngageErrorBody {
    #[serde(rename = "Message", default)]
    pub message: String,
    #[serde(rename = "StackTrace", default)]
    pub stack_trace: String,
    #[serde(rename = "ExceptionType", default)]
    pub exception_type: String,
}

fn join_years(years: &[i32]) -> String {
    years
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn join_subjects(subjects: &[Subject]) -> String {
    subjects
        .iter()
        .map(|s| s.engage_code.as_str())
        .collect::<Vec<_>>()
        .join(",")
}
