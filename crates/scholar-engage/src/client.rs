//! Engage HTTP client (reqwest-based).

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use scholar_core::{ErrorKind, Pid, Subject};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::api::EngageApi;
use crate::config::EngageConfig;
use crate::envelope::{
    EngageContext, EngageErrorBody, EngageItem, EngageResponse, RenderQuery, RenderRequest,
};
use crate::error::{EngageError, EngageResult};

const ACADEMIC_YEARS: &str = "GetMarksheetAcademicYears";
const REPORTING_PERIODS: &str = "GetReportingPeriods";
const REPORTING_SUBJECTS: &str = "GetPupilMarksheetSubjects";
const COLUMNS_FOR_SUBJECTS: &str = "GetColumnsForSubjects";
const MARKSHEET_RENDER: &str = "RenderPupilMarksheet";

/// Client for the Engage report comment service.
#[derive(Debug, Clone)]
pub struct EngageClient {
    /// Base URL without a trailing slash.
    base_url: String,
    token: String,
    http_client: Client,
}

impl EngageClient {
    /// Create a new Engage client.
    pub fn new(config: &EngageConfig) -> EngageResult<Self> {
        if config.token.is_empty() {
            return Err(EngageError::InvalidConfig(
                "engage token must not be empty".to_string(),
            ));
        }

        let mut builder = Client::builder().user_agent("scholar-engage/0.1");
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().map_err(|e| {
            EngageError::InvalidConfig(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self::with_http_client(
            config.base_url.clone(),
            config.token.clone(),
            http_client,
        ))
    }

    /// Create a client with a pre-built `reqwest::Client` (for testing).
    #[must_use]
    pub fn with_http_client(base_url: String, token: String, http_client: Client) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            token,
            http_client,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `body` to `endpoint` and unwrap the `d` envelope.
    ///
    /// An empty `d` is how Engage reports an unknown pupil.
    async fn post<B, T>(&self, endpoint: &str, pid: Pid, body: &B) -> EngageResult<Vec<T>>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(endpoint, pid = %pid, "Engage request");

        let response = self
            .http_client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .json(body)
            .send()
            .await?;

        let envelope: EngageResponse<T> = self.handle_response(response).await?;
        if envelope.d.is_empty() {
            debug!(endpoint, pid = %pid, "Engage returned no data");
            return Err(EngageError::NotFound {
                pid: pid.to_string(),
            });
        }
        Ok(envelope.d)
    }

    async fn post_context(
        &self,
        endpoint: &str,
        ctx: &EngageContext,
        pid: Pid,
    ) -> EngageResult<Vec<EngageItem>> {
        self.post(endpoint, pid, ctx).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> EngageResult<T> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body)
                .map_err(|e| EngageError::Parse(format!("Failed to parse response: {e}")))
        } else {
            self.handle_error_response(response).await
        }
    }

    async fn handle_error_response<T>(&self, response: reqwest::Response) -> EngageResult<T> {
        let status = response.status();
        let kind = ErrorKind::from_status(status);
        let body = response.text().await.unwrap_or_default();

        warn!(status = status.as_u16(), %kind, "Engage request failed");

        if body.is_empty() {
            return Err(EngageError::Status {
                kind,
                status: status.as_u16(),
                detail: "error body empty".to_string(),
            });
        }

        match serde_json::from_str::<EngageErrorBody>(&body) {
            Ok(err) => Err(EngageError::Upstream {
                kind,
                status: status.as_u16(),
                message: err.message,
                stack_trace: err.stack_trace,
                exception_type: err.exception_type,
            }),
            Err(_) => Err(EngageError::Status {
                kind,
                status: status.as_u16(),
                detail: "couldnt decode error body".to_string(),
            }),
        }
    }
}

#[async_trait]
impl EngageApi for EngageClient {
    async fn academic_years(&self, pid: Pid) -> EngageResult<Vec<i32>> {
        let items = self
            .post_context(ACADEMIC_YEARS, &EngageContext::for_pupil(pid), pid)
            .await?;

        items
            .iter()
            .map(|item| {
                item.value.trim().parse::<i32>().map_err(|e| {
                    EngageError::Parse(format!("invalid academic year {:?}: {e}", item.value))
                })
            })
            .collect()
    }

    async fn reporting_periods(
        &self,
        pid: Pid,
        academic_years: &[i32],
    ) -> EngageResult<Vec<String>> {
        let ctx = EngageContext::for_pupil(pid).academic_years(academic_years);
        let items = self.post_context(REPORTING_PERIODS, &ctx, pid).await?;
        Ok(items.into_iter().map(|item| item.value).collect())
    }

    async fn reporting_subjects(
        &self,
        pid: Pid,
        academic_years: &[i32],
        reporting_periods: &[String],
    ) -> EngageResult<Vec<Subject>> {
        let ctx = EngageContext::for_pupil(pid)
            .academic_years(academic_years)
            .reporting_periods(reporting_periods);
        let items = self.post_context(REPORTING_SUBJECTS, &ctx, pid).await?;
        Ok(items
            .into_iter()
            .map(|item| Subject::upstream(item.value, item.text))
            .collect())
    }

    async fn columns_for_subjects(
        &self,
        pid: Pid,
        academic_years: &[i32],
        reporting_periods: &[String],
        subjects: &[Subject],
    ) -> EngageResult<Vec<String>> {
        let ctx = EngageContext::for_pupil(pid)
            .academic_years(academic_years)
            .reporting_periods(reporting_periods)
            .subjects(subjects);
        let items = self.post_context(COLUMNS_FOR_SUBJECTS, &ctx, pid).await?;
        Ok(items.into_iter().map(|item| item.value).collect())
    }

    async fn marksheet_render(&self, pid: Pid, query: &RenderQuery) -> EngageResult<String> {
        let request = RenderRequest::new(pid, query);
        let fragments: Vec<String> = self.post(MARKSHEET_RENDER, pid, &request).await?;
        Ok(fragments.concat())
    }
}
