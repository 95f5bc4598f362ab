use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::schema::{execution_logs, scheduled_prompts};
use crate::scheduling::types::{ExecutionStatus, Frequency, PromptState};

// ============================================================================
// ScheduledPrompt Models
// ============================================================================

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = scheduled_prompts)]
pub struct ScheduledPrompt {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub content: String,
    pub provider: String,
    pub model: String,
    pub is_scheduled: bool,
    pub frequency: Frequency,
    pub execution_time: NaiveTime,
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
    pub state: PromptState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduledPrompt {
    /// Explicit target ids, deduplicated, preserving first occurrence order.
    pub fn deduplicated_targets(&self) -> Vec<i32> {
        let mut seen = std::collections::HashSet::new();
        self.target_user_ids
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// True when at least one delivery channel is enabled.
    pub fn any_delivery_enabled(&self) -> bool {
        self.deliver_ai_chat || self.deliver_chat || self.deliver_notifier || self.deliver_email
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = scheduled_prompts)]
pub struct NewScheduledPrompt {
    pub user_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub content: String,
    pub provider: String,
    pub model: String,
    pub is_scheduled: bool,
    pub frequency: Frequency,
    pub execution_time: NaiveTime,
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
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = scheduled_prompts)]
pub struct UpdateScheduledPrompt {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub content: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub is_scheduled: Option<bool>,
    pub frequency: Option<Frequency>,
    pub execution_time: Option<NaiveTime>,
    pub timezone: Option<String>,
    pub start_date: Option<Option<NaiveDate>>,
    pub end_date: Option<Option<NaiveDate>>,
    pub hourly_interval: Option<Option<i32>>,
    pub weekdays: Option<Option<Vec<i32>>>,
    pub day_of_month: Option<Option<i32>>,
    pub start_month: Option<Option<i32>>,
    pub end_month: Option<Option<i32>>,
    pub year_filter: Option<Option<i32>>,
    pub specific_dates: Option<Option<Vec<NaiveDate>>>,
    pub deliver_ai_chat: Option<bool>,
    pub deliver_chat: Option<bool>,
    pub deliver_notifier: Option<bool>,
    pub deliver_email: Option<bool>,
    pub target_user_ids: Option<Option<Vec<i32>>>,
    pub target_all_users: Option<bool>,
}

// ============================================================================
// ExecutionLog Models
// ============================================================================

/// One immutable row per execution attempt. Never updated or deleted by
/// the core; retention is an external concern.
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = execution_logs)]
pub struct ExecutionLog {
    pub id: i64,
    pub prompt_id: i32,
    pub status: ExecutionStatus,
    pub success_count: i32,
    pub failure_count: i32,
    pub recipient_count: i32,
    pub errors: Vec<String>,
    pub executed_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = execution_logs)]
pub struct NewExecutionLog {
    pub prompt_id: i32,
    pub status: ExecutionStatus,
    pub success_count: i32,
    pub failure_count: i32,
    pub recipient_count: i32,
    pub errors: Vec<String>,
    pub executed_at: DateTime<Utc>,
}

/// Builds a minimal daily prompt and applies per-test tweaks.
#[cfg(test)]
pub(crate) fn test_prompt(tweak: impl FnOnce(&mut ScheduledPrompt)) -> ScheduledPrompt {
    let now = Utc::now();
    let mut prompt = ScheduledPrompt {
        id: 1,
        user_id: 1,
        title: "Daily revenue digest".to_string(),
        description: None,
        content: "Summarize yesterday's store revenue.".to_string(),
        provider: "openai".to_string(),
        model: "gpt-4o-mini".to_string(),
        is_scheduled: true,
        frequency: Frequency::Daily,
        execution_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        timezone: "UTC".to_string(),
        start_date: None,
        end_date: None,
        hourly_interval: None,
        weekdays: None,
        day_of_month: None,
        start_month: None,
        end_month: None,
        year_filter: None,
        specific_dates: None,
        deliver_ai_chat: false,
        deliver_chat: false,
        deliver_notifier: false,
        deliver_email: false,
        target_user_ids: None,
        target_all_users: false,
        last_executed: None,
        next_execution: None,
        execution_status: ExecutionStatus::Idle,
        state: PromptState::Active,
        created_at: now,
        updated_at: now,
    };
    tweak(&mut prompt);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deduplicated_targets_preserve_order() {
        let prompt = test_prompt(|p| {
            p.target_user_ids = Some(vec![3, 1, 3, 2, 1]);
        });
        assert_eq!(prompt.deduplicated_targets(), vec![3, 1, 2]);
    }

    #[test]
    fn no_targets_yields_empty_vec() {
        let prompt = test_prompt(|_| {});
        assert!(prompt.deduplicated_targets().is_empty());
    }

    #[test]
    fn any_delivery_enabled_checks_all_flags() {
        let none = test_prompt(|_| {});
        assert!(!none.any_delivery_enabled());

        let email = test_prompt(|p| p.deliver_email = true);
        assert!(email.any_delivery_enabled());
    }
}
