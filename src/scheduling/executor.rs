//! Prompt execution orchestration.
//!
//! One execution attempt: claim the prompt (idle -> running), invoke the
//! configured chat model once, fan the output out to every enabled
//! channel x resolved recipient concurrently, fold token usage into the
//! owner's running total, release the claim with the outcome, and append
//! one execution log row. Batch runs execute due prompts through a
//! bounded worker pool; one prompt's failure never aborts its siblings.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::{ExecutorConfig, LlmConfig};
use crate::error::AppResult;
use crate::llm;
use crate::repositories::{ExecutionLogRepository, PromptRepository, UserRepository};
use crate::scheduling::evaluator;
use crate::scheduling::models::{NewExecutionLog, ScheduledPrompt};
use crate::scheduling::types::{ExecutionStatus, PromptExecutionResult};
use crate::services::delivery::{ChannelRegistry, DeliveryChannel, DeliveryMessage, Recipient};
use crate::services::usage::TokenUsageService;

/// Executes scheduled prompts, one at a time or as a due batch.
///
/// Cloning is cheap: repositories wrap the pooled connection and the
/// channel registry holds `Arc`s.
#[derive(Clone)]
pub struct PromptExecutor {
    prompts: PromptRepository,
    users: UserRepository,
    logs: ExecutionLogRepository,
    usage: TokenUsageService,
    channels: ChannelRegistry,
    llm_config: LlmConfig,
    config: ExecutorConfig,
}

impl PromptExecutor {
    pub fn new(
        prompts: PromptRepository,
        users: UserRepository,
        logs: ExecutionLogRepository,
        usage: TokenUsageService,
        channels: ChannelRegistry,
        llm_config: LlmConfig,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            prompts,
            users,
            logs,
            usage,
            channels,
            llm_config,
            config,
        }
    }

    /// Pure read: all currently due prompts for active users.
    ///
    /// Prompts with malformed schedules are logged and skipped; they
    /// surface as errors only when executed explicitly.
    pub async fn get_due_prompts(&self) -> AppResult<Vec<ScheduledPrompt>> {
        let now = Utc::now();
        let candidates = self.prompts.list_due_candidates().await?;

        let mut due = Vec::new();
        for prompt in candidates {
            match evaluator::is_due(&prompt, now) {
                Ok(true) => due.push(prompt),
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(
                        prompt_id = prompt.id,
                        error = %e,
                        "Skipping prompt with invalid schedule configuration"
                    );
                }
            }
        }
        Ok(due)
    }

    /// Execute one prompt. With `force` the due-ness gate is skipped
    /// (explicit run), the overlap claim still applies.
    ///
    /// Skips (not found, not due, already running, malformed schedule)
    /// come back as results with a descriptive error; `Err` is reserved
    /// for infrastructure failures.
    pub async fn execute_scheduled_prompt(
        &self,
        prompt_id: i32,
        force: bool,
    ) -> AppResult<PromptExecutionResult> {
        let now = Utc::now();

        let Some(prompt) = self.prompts.find_active(prompt_id).await? else {
            return Ok(PromptExecutionResult::skipped(
                prompt_id,
                "prompt not found or deleted",
                now,
            ));
        };

        if !force {
            match evaluator::is_due(&prompt, now) {
                Ok(true) => {}
                Ok(false) => {
                    return Ok(PromptExecutionResult::skipped(
                        prompt_id,
                        "prompt is not due",
                        now,
                    ));
                }
                Err(e) => {
                    return Ok(PromptExecutionResult::skipped(
                        prompt_id,
                        format!("invalid schedule configuration: {}", e),
                        now,
                    ));
                }
            }
        }

        if !self.prompts.claim(prompt.id).await? {
            return Ok(PromptExecutionResult::skipped(
                prompt_id,
                "execution already running",
                now,
            ));
        }

        match self.run_claimed(&prompt, now).await {
            Ok(result) => Ok(result),
            Err(err) => {
                // Release the claim on infrastructure failure so the prompt
                // doesn't stay stuck in `running`.
                if let Err(release_err) =
                    self.prompts.release(prompt.id, ExecutionStatus::Failed).await
                {
                    tracing::error!(
                        prompt_id = prompt.id,
                        error = %release_err,
                        "Failed to release execution claim"
                    );
                }
                Err(err)
            }
        }
    }

    /// Execute all currently due prompts through a bounded worker pool.
    ///
    /// The concurrency limit comes from `executor.max_parallel`; each
    /// prompt runs in its own task with failures isolated per task.
    pub async fn run_due(&self) -> AppResult<Vec<PromptExecutionResult>> {
        let due = self.get_due_prompts().await?;
        if due.is_empty() {
            return Ok(Vec::new());
        }

        tracing::info!(count = due.len(), "Executing due prompts");

        let semaphore = Arc::new(Semaphore::new(self.config.max_parallel));
        let mut tasks = JoinSet::new();

        for prompt in due {
            let executor = self.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let prompt_id = prompt.id;
                executor
                    .execute_scheduled_prompt(prompt_id, false)
                    .await
                    .unwrap_or_else(|e| {
                        PromptExecutionResult::skipped(
                            prompt_id,
                            format!("execution aborted: {}", e),
                            Utc::now(),
                        )
                    })
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::error!(error = %e, "Prompt execution task panicked");
                }
            }
        }
        results.sort_by_key(|r| r.prompt_id);
        Ok(results)
    }

    /// The claimed execution path. Every exit releases the claim through
    /// `finish`, records one log row, and reports errors inline.
    async fn run_claimed(
        &self,
        prompt: &ScheduledPrompt,
        now: DateTime<Utc>,
    ) -> AppResult<PromptExecutionResult> {
        let recipients = self.resolve_recipients(prompt).await?;
        let (channels, mut errors) = self.channels.enabled_for(prompt);

        // Empty target set or no usable channel: a no-op execution, not an
        // error. Still logged with zero recipients for the audit trail.
        if recipients.is_empty() || channels.is_empty() {
            if recipients.is_empty() {
                tracing::info!(prompt_id = prompt.id, "Prompt resolved zero recipients");
            }
            return self
                .conclude(
                    prompt,
                    now,
                    ExecutionStatus::Completed,
                    0,
                    0,
                    recipients.len(),
                    errors,
                )
                .await;
        }

        let model = match llm::create_model(&prompt.provider, &prompt.model, &self.llm_config) {
            Ok(model) => model,
            Err(e) => {
                errors.push(e.to_string());
                return self
                    .conclude(
                        prompt,
                        now,
                        ExecutionStatus::Failed,
                        0,
                        0,
                        recipients.len(),
                        errors,
                    )
                    .await;
            }
        };

        let completion = match model.invoke(&prompt.content).await {
            Ok(completion) => completion,
            Err(e) => {
                errors.push(e.to_string());
                return self
                    .conclude(
                        prompt,
                        now,
                        ExecutionStatus::Failed,
                        0,
                        0,
                        recipients.len(),
                        errors,
                    )
                    .await;
            }
        };

        // Fold usage into the owner's running total. A failed write is an
        // operational problem surfaced in logs, not an execution failure.
        let scope = format!("user:{}", prompt.user_id);
        if let Err(e) = self.usage.record(&scope, &completion.usage).await {
            tracing::error!(
                prompt_id = prompt.id,
                scope = %scope,
                error = %e,
                "Token usage recording failed"
            );
        }

        let message = DeliveryMessage {
            prompt_id: prompt.id,
            title: prompt.title.clone(),
            body: completion.text,
        };
        let outcomes = deliver_fanout(&channels, &recipients, &message).await;

        let attempted = outcomes.len();
        let success_count = outcomes.iter().filter(|o| o.error.is_none()).count() as u32;
        let failure_count = attempted as u32 - success_count;
        errors.extend(outcomes.into_iter().filter_map(|outcome| {
            outcome
                .error
                .map(|e| format!("{} -> user {}: {}", outcome.channel, outcome.user_id, e))
        }));

        let status = outcome_status(attempted, success_count);
        self.conclude(
            prompt,
            now,
            status,
            success_count,
            failure_count,
            recipients.len(),
            errors,
        )
        .await
    }

    /// Resolve recipients through the user directory. With
    /// `target_all_users` the broadcast set already subsumes any explicit
    /// targets (union semantics); otherwise explicit ids are deduplicated
    /// and filtered down to active accounts.
    async fn resolve_recipients(&self, prompt: &ScheduledPrompt) -> AppResult<Vec<Recipient>> {
        let users = if prompt.target_all_users {
            self.users.list_active().await?
        } else {
            self.users
                .find_active_by_ids(&prompt.deduplicated_targets())
                .await?
        };

        Ok(users
            .into_iter()
            .map(|user| Recipient {
                user_id: user.id,
                username: user.username,
                email: user.email,
            })
            .collect())
    }

    /// Persist the attempt outcome: prompt state transition, advisory
    /// next-execution projection, one immutable log row, and the result.
    #[allow(clippy::too_many_arguments, reason = "plain outcome fields")]
    async fn conclude(
        &self,
        prompt: &ScheduledPrompt,
        now: DateTime<Utc>,
        status: ExecutionStatus,
        success_count: u32,
        failure_count: u32,
        recipient_count: usize,
        errors: Vec<String>,
    ) -> AppResult<PromptExecutionResult> {
        let next = self.project_next(prompt, now);
        self.prompts.finish(prompt.id, status, now, next).await?;

        let entry = NewExecutionLog {
            prompt_id: prompt.id,
            status,
            success_count: success_count as i32,
            failure_count: failure_count as i32,
            recipient_count: recipient_count as i32,
            errors: errors.clone(),
            executed_at: now,
        };
        // Log recorder failures must not fail an otherwise finished run.
        if let Err(e) = self.logs.create(entry).await {
            tracing::error!(prompt_id = prompt.id, error = %e, "Failed to record execution log");
        }

        Ok(PromptExecutionResult {
            prompt_id: prompt.id,
            success_count,
            failure_count,
            errors,
            executed_at: now,
        })
    }

    /// Advisory projection computed as if this run's `last_executed` were
    /// already stored.
    fn project_next(&self, prompt: &ScheduledPrompt, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut updated = prompt.clone();
        updated.last_executed = Some(now);
        match evaluator::compute_next_execution(&updated, now) {
            Ok(next) => next,
            Err(e) => {
                tracing::warn!(prompt_id = prompt.id, error = %e, "Cannot project next execution");
                None
            }
        }
    }
}

/// Failed only when every attempted delivery failed; partial success is a
/// completed run with its failures recorded.
fn outcome_status(attempted: usize, success_count: u32) -> ExecutionStatus {
    if attempted > 0 && success_count == 0 {
        ExecutionStatus::Failed
    } else {
        ExecutionStatus::Completed
    }
}

/// One recipient-channel delivery attempt outcome.
struct DeliveryOutcome {
    user_id: i32,
    channel: &'static str,
    error: Option<String>,
}

/// Fan one message out to every recipient on every channel concurrently.
///
/// Attempts are independent: a failure becomes an outcome entry and the
/// remaining deliveries proceed.
async fn deliver_fanout(
    channels: &[Arc<dyn DeliveryChannel>],
    recipients: &[Recipient],
    message: &DeliveryMessage,
) -> Vec<DeliveryOutcome> {
    let attempts = recipients
        .iter()
        .flat_map(|recipient| {
            channels.iter().map(move |channel| {
                let channel = Arc::clone(channel);
                async move {
                    let name = channel.name();
                    match channel.deliver(recipient, message).await {
                        Ok(receipt) if receipt.success => DeliveryOutcome {
                            user_id: recipient.user_id,
                            channel: name,
                            error: None,
                        },
                        Ok(receipt) => DeliveryOutcome {
                            user_id: recipient.user_id,
                            channel: name,
                            error: Some(
                                receipt
                                    .detail
                                    .unwrap_or_else(|| "delivery failed".to_string()),
                            ),
                        },
                        Err(e) => DeliveryOutcome {
                            user_id: recipient.user_id,
                            channel: name,
                            error: Some(e.to_string()),
                        },
                    }
                }
            })
        })
        .collect::<Vec<_>>();

    join_all(attempts).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::delivery::DeliveryReceipt;
    use async_trait::async_trait;

    /// Channel stub failing for one configured recipient.
    struct StubChannel {
        name: &'static str,
        fail_for: Option<i32>,
        hard_error_for: Option<i32>,
    }

    impl StubChannel {
        fn ok(name: &'static str) -> Arc<dyn DeliveryChannel> {
            Arc::new(Self {
                name,
                fail_for: None,
                hard_error_for: None,
            })
        }

        fn failing_for(name: &'static str, user_id: i32) -> Arc<dyn DeliveryChannel> {
            Arc::new(Self {
                name,
                fail_for: Some(user_id),
                hard_error_for: None,
            })
        }

        fn erroring_for(name: &'static str, user_id: i32) -> Arc<dyn DeliveryChannel> {
            Arc::new(Self {
                name,
                fail_for: None,
                hard_error_for: Some(user_id),
            })
        }

        fn always_failing(name: &'static str) -> Arc<dyn DeliveryChannel> {
            Arc::new(Self {
                name,
                fail_for: Some(-1),
                hard_error_for: None,
            })
        }
    }

    #[async_trait]
    impl DeliveryChannel for StubChannel {
        async fn deliver(
            &self,
            recipient: &Recipient,
            _message: &DeliveryMessage,
        ) -> AppResult<DeliveryReceipt> {
            if self.hard_error_for == Some(recipient.user_id) {
                return Err(AppError::Upstream {
                    service: self.name.to_string(),
                    message: "connection refused".to_string(),
                });
            }
            let failed =
                self.fail_for == Some(recipient.user_id) || self.fail_for == Some(-1);
            Ok(DeliveryReceipt {
                success: !failed,
                status_code: Some(if failed { 502 } else { 200 }),
                detail: failed.then(|| "bad gateway".to_string()),
                duration_ms: 1,
            })
        }

        fn name(&self) -> &'static str {
            self.name
        }
    }

    fn recipients(ids: &[i32]) -> Vec<Recipient> {
        ids.iter()
            .map(|id| Recipient {
                user_id: *id,
                username: format!("user{}", id),
                email: format!("user{}@example.com", id),
            })
            .collect()
    }

    fn message() -> DeliveryMessage {
        DeliveryMessage {
            prompt_id: 1,
            title: "Daily revenue digest".to_string(),
            body: "Revenue is up.".to_string(),
        }
    }

    #[tokio::test]
    async fn partial_failure_counts_per_recipient_channel_pair() {
        // 3 recipients x 2 channels; user 2's email delivery fails.
        let channels = vec![
            StubChannel::ok("chat"),
            StubChannel::failing_for("email", 2),
        ];
        let outcomes = deliver_fanout(&channels, &recipients(&[1, 2, 3]), &message()).await;

        assert_eq!(outcomes.len(), 6);
        let failures: Vec<_> = outcomes.iter().filter(|o| o.error.is_some()).collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].user_id, 2);
        assert_eq!(failures[0].channel, "email");
        assert_eq!(outcome_status(6, 5), ExecutionStatus::Completed);
    }

    #[tokio::test]
    async fn hard_errors_do_not_abort_sibling_deliveries() {
        let channels = vec![
            StubChannel::ok("chat"),
            StubChannel::erroring_for("email", 1),
        ];
        let outcomes = deliver_fanout(&channels, &recipients(&[1, 2]), &message()).await;

        assert_eq!(outcomes.len(), 4);
        let failed: Vec<_> = outcomes.iter().filter(|o| o.error.is_some()).collect();
        assert_eq!(failed.len(), 1);
        assert!(failed[0].error.as_deref().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn full_failure_yields_one_error_per_attempt() {
        let channels = vec![
            StubChannel::always_failing("chat"),
            StubChannel::always_failing("email"),
        ];
        let outcomes = deliver_fanout(&channels, &recipients(&[1, 2, 3]), &message()).await;

        assert_eq!(outcomes.len(), 6);
        assert!(outcomes.iter().all(|o| o.error.is_some()));
        assert_eq!(outcome_status(6, 0), ExecutionStatus::Failed);
    }

    #[test]
    fn zero_attempts_is_a_completed_noop() {
        assert_eq!(outcome_status(0, 0), ExecutionStatus::Completed);
    }

    #[test]
    fn at_least_one_success_completes() {
        assert_eq!(outcome_status(6, 1), ExecutionStatus::Completed);
        assert_eq!(outcome_status(1, 1), ExecutionStatus::Completed);
    }
}
