//! Prompt management DTOs.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::scheduling::models::{NewScheduledPrompt, ScheduledPrompt, UpdateScheduledPrompt};
use crate::scheduling::types::{ExecutionStatus, Frequency};

fn parse_execution_time(value: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| AppError::Validation {
            field: "execution_time".to_string(),
            reason: format!("'{}' is not a valid HH:MM time", value),
        })
}

fn validate_timezone(value: &str) -> AppResult<()> {
    jiff::tz::TimeZone::get(value)
        .map(|_| ())
        .map_err(|_| AppError::Validation {
            field: "timezone".to_string(),
            reason: format!("unknown IANA timezone '{}'", value),
        })
}

// ============================================================================
// Request DTOs
// ============================================================================

/// Request body for creating a scheduled prompt.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[schema(example = json!({
    "title": "Daily revenue digest",
    "content": "Summarize yesterday's store revenue and flag anomalies.",
    "provider": "openai",
    "model": "gpt-4o-mini",
    "is_scheduled": true,
    "frequency": "daily",
    "execution_time": "09:00",
    "timezone": "America/New_York",
    "deliver_ai_chat": true,
    "deliver_email": true,
    "target_user_ids": [3, 7]
}))]
pub struct CreatePromptRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,

    pub description: Option<String>,

    #[validate(length(min = 1, message = "Prompt content must not be empty"))]
    pub content: String,

    #[validate(length(min = 1, max = 50, message = "Provider must be between 1 and 50 characters"))]
    #[schema(example = "openai")]
    pub provider: String,

    #[validate(length(min = 1, max = 100, message = "Model must be between 1 and 100 characters"))]
    #[schema(example = "gpt-4o-mini")]
    pub model: String,

    #[serde(default)]
    pub is_scheduled: bool,

    pub frequency: Frequency,

    /// Local wall-clock execution time, HH:MM
    #[schema(example = "09:00")]
    pub execution_time: String,

    /// IANA timezone name the schedule is evaluated in
    #[schema(example = "America/New_York")]
    pub timezone: String,

    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,

    #[validate(range(min = 1, message = "Hourly interval must be at least 1"))]
    pub hourly_interval: Option<i32>,
    pub weekdays: Option<Vec<i32>>,
    #[validate(range(min = 1, max = 31, message = "Day of month must be 1-31"))]
    pub day_of_month: Option<i32>,
    #[validate(range(min = 1, max = 12, message = "Start month must be 1-12"))]
    pub start_month: Option<i32>,
    #[validate(range(min = 1, max = 12, message = "End month must be 1-12"))]
    pub end_month: Option<i32>,
    pub year_filter: Option<i32>,
    pub specific_dates: Option<Vec<NaiveDate>>,

    #[serde(default)]
    pub deliver_ai_chat: bool,
    #[serde(default)]
    pub deliver_chat: bool,
    #[serde(default)]
    pub deliver_notifier: bool,
    #[serde(default)]
    pub deliver_email: bool,

    pub target_user_ids: Option<Vec<i32>>,
    #[serde(default)]
    pub target_all_users: bool,
}

impl CreatePromptRequest {
    pub fn into_new_prompt(self, user_id: i32) -> AppResult<NewScheduledPrompt> {
        validate_timezone(&self.timezone)?;
        let execution_time = parse_execution_time(&self.execution_time)?;

        Ok(NewScheduledPrompt {
            user_id,
            title: self.title,
            description: self.description,
            content: self.content,
            provider: self.provider,
            model: self.model,
            is_scheduled: self.is_scheduled,
            frequency: self.frequency,
            execution_time,
            timezone: self.timezone,
            start_date: self.start_date,
            end_date: self.end_date,
            hourly_interval: self.hourly_interval,
            weekdays: self.weekdays,
            day_of_month: self.day_of_month,
            start_month: self.start_month,
            end_month: self.end_month,
            year_filter: self.year_filter,
            specific_dates: self.specific_dates,
            deliver_ai_chat: self.deliver_ai_chat,
            deliver_chat: self.deliver_chat,
            deliver_notifier: self.deliver_notifier,
            deliver_email: self.deliver_email,
            target_user_ids: self.target_user_ids,
            target_all_users: self.target_all_users,
        })
    }
}

/// Request body for updating a scheduled prompt. Absent fields are left
/// unchanged; execution state is owned by the executor and not settable.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdatePromptRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub is_scheduled: Option<bool>,
    pub frequency: Option<Frequency>,
    pub execution_time: Option<String>,
    pub timezone: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(range(min = 1))]
    pub hourly_interval: Option<i32>,
    pub weekdays: Option<Vec<i32>>,
    #[validate(range(min = 1, max = 31))]
    pub day_of_month: Option<i32>,
    #[validate(range(min = 1, max = 12))]
    pub start_month: Option<i32>,
    #[validate(range(min = 1, max = 12))]
    pub end_month: Option<i32>,
    pub year_filter: Option<i32>,
    pub specific_dates: Option<Vec<NaiveDate>>,
    pub deliver_ai_chat: Option<bool>,
    pub deliver_chat: Option<bool>,
    pub deliver_notifier: Option<bool>,
    pub deliver_email: Option<bool>,
    pub target_user_ids: Option<Vec<i32>>,
    pub target_all_users: Option<bool>,
}

impl UpdatePromptRequest {
    pub fn into_update(self) -> AppResult<UpdateScheduledPrompt> {
        if let Some(tz) = &self.timezone {
            validate_timezone(tz)?;
        }
        let execution_time = self
            .execution_time
            .as_deref()
            .map(parse_execution_time)
            .transpose()?;

        Ok(UpdateScheduledPrompt {
            title: self.title,
            description: self.description.map(Some),
            content: self.content,
            provider: self.provider,
            model: self.model,
            is_scheduled: self.is_scheduled,
            frequency: self.frequency,
            execution_time,
            timezone: self.timezone,
            start_date: self.start_date.map(Some),
            end_date: self.end_date.map(Some),
            hourly_interval: self.hourly_interval.map(Some),
            weekdays: self.weekdays.map(Some),
            day_of_month: self.day_of_month.map(Some),
            start_month: self.start_month.map(Some),
            end_month: self.end_month.map(Some),
            year_filter: self.year_filter.map(Some),
            specific_dates: self.specific_dates.map(Some),
            deliver_ai_chat: self.deliver_ai_chat,
            deliver_chat: self.deliver_chat,
            deliver_notifier: self.deliver_notifier,
            deliver_email: self.deliver_email,
            target_user_ids: self.target_user_ids.map(Some),
            target_all_users: self.target_all_users,
        })
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Response body for scheduled prompt data.
#[derive(Debug, Serialize, ToSchema)]
pub struct PromptResponse {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub content: String,
    pub provider: String,
    pub model: String,
    pub is_scheduled: bool,
    pub frequency: Frequency,
    pub execution_time: String,
    pub timezone: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub hourly_interval: Option<i32>,
    pub weekdays: Option<Vec<i32>>,
    pub day_of_month: Option<i32>,
    pub start_month: Option<i32>,
    pub end_month: Option<i32>,
    pub year_filter: Option<i32>,
    pub specific_dates: Option<Vec<NaiveDate>>,
    pub deliver_ai_chat: bool,
    pub deliver_chat: bool,
    pub deliver_notifier: bool,
    pub deliver_email: bool,
    pub target_user_ids: Option<Vec<i32>>,
    pub target_all_users: bool,
    pub last_executed: Option<DateTime<Utc>>,
    pub next_execution: Option<DateTime<Utc>>,
    pub execution_status: ExecutionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ScheduledPrompt> for PromptResponse {
    fn from(prompt: ScheduledPrompt) -> Self {
        Self {
            id: prompt.id,
            user_id: prompt.user_id,
            title: prompt.title,
            description: prompt.description,
            content: prompt.content,
            provider: prompt.provider,
            model: prompt.model,
            is_scheduled: prompt.is_scheduled,
            frequency: prompt.frequency,
            execution_time: prompt.execution_time.format("%H:%M").to_string(),
            timezone: prompt.timezone,
            start_date: prompt.start_date,
            end_date: prompt.end_date,
            hourly_interval: prompt.hourly_interval,
            weekdays: prompt.weekdays,
            day_of_month: prompt.day_of_month,
            start_month: prompt.start_month,
            end_month: prompt.end_month,
            year_filter: prompt.year_filter,
            specific_dates: prompt.specific_dates,
            deliver_ai_chat: prompt.deliver_ai_chat,
            deliver_chat: prompt.deliver_chat,
            deliver_notifier: prompt.deliver_notifier,
            deliver_email: prompt.deliver_email,
            target_user_ids: prompt.target_user_ids,
            target_all_users: prompt.target_all_users,
            last_executed: prompt.last_executed,
            next_execution: prompt.next_execution,
            execution_status: prompt.execution_status,
            created_at: prompt.created_at,
            updated_at: prompt.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_request() -> CreatePromptRequest {
        serde_json::from_value(serde_json::json!({
            "title": "Digest",
            "content": "Summarize.",
            "provider": "openai",
            "model": "gpt-4o-mini",
            "frequency": "daily",
            "execution_time": "09:00",
            "timezone": "UTC"
        }))
        .unwrap()
    }

    #[test]
    fn create_request_parses_hh_mm_time() {
        let prompt = minimal_request().into_new_prompt(1).unwrap();
        assert_eq!(prompt.execution_time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(prompt.user_id, 1);
    }

    #[test]
    fn create_request_rejects_bad_time() {
        let mut request = minimal_request();
        request.execution_time = "25:99".to_string();
        assert!(request.into_new_prompt(1).is_err());
    }

    #[test]
    fn create_request_rejects_unknown_timezone() {
        let mut request = minimal_request();
        request.timezone = "Atlantis/Central".to_string();
        assert!(request.into_new_prompt(1).is_err());
    }

    #[test]
    fn response_formats_time_without_seconds() {
        let prompt = crate::scheduling::models::test_prompt(|_| {});
        let response = PromptResponse::from(prompt);
        assert_eq!(response.execution_time, "09:00");
    }
}
