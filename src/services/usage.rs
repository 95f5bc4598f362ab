//! Token usage accounting service.
//!
//! Merges usage deltas into per-scope running totals with an
//! optimistic-concurrency loop: read the row, build the merged changeset,
//! and apply it only if the row is unchanged since the read. A lost race
//! re-reads and retries, so concurrent deltas on one scope never lose
//! updates.

use chrono::Utc;

use crate::error::{AppError, AppResult};
use crate::models::{NewTokenUsage, TokenUsage, UsageDelta};
use crate::repositories::TokenUsageRepository;

/// Retry budget for the read-merge-write cycle. Contention on a single
/// scope is short (one row update), so a handful of attempts suffices.
const MAX_MERGE_ATTEMPTS: usize = 5;

#[derive(Clone)]
pub struct TokenUsageService {
    repo: TokenUsageRepository,
}

impl TokenUsageService {
    pub fn new(repo: TokenUsageRepository) -> Self {
        Self { repo }
    }

    /// Fold `delta` into the running totals for `scope`, creating the row
    /// on first use. Additive only; negative deltas are rejected.
    pub async fn record(&self, scope: &str, delta: &UsageDelta) -> AppResult<TokenUsage> {
        delta.validate()?;

        for _ in 0..MAX_MERGE_ATTEMPTS {
            match self.repo.find_by_scope(scope).await? {
                None => {
                    let row = NewTokenUsage::from_delta(scope, delta, Utc::now());
                    if let Some(created) = self.repo.insert_new(row).await? {
                        return Ok(created);
                    }
                    // Lost the first-write race; the next pass merges.
                }
                Some(current) => {
                    let merge = current.merged_with(delta, Utc::now());
                    if let Some(updated) = self
                        .repo
                        .update_if_unchanged(current.id, current.updated_at, merge)
                        .await?
                    {
                        return Ok(updated);
                    }
                }
            }
        }

        Err(AppError::Internal {
            source: anyhow::anyhow!(
                "token usage merge for scope '{}' exceeded {} attempts",
                scope,
                MAX_MERGE_ATTEMPTS
            ),
        })
    }

    pub async fn get(&self, scope: &str) -> AppResult<Option<TokenUsage>> {
        self.repo.find_by_scope(scope).await
    }

    pub async fn get_all(&self) -> AppResult<Vec<TokenUsage>> {
        self.repo.list_all().await
    }
}
