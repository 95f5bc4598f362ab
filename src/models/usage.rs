use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::{AppError, AppResult};
use crate::schema::token_usage;

/// Running token and cost totals for one accounting scope.
///
/// A scope is either a chat thread (`thread:<id>`) or a user
/// (`user:<id>`). Rows are created lazily on the first usage event and
/// only ever grow; `updated_at` doubles as the optimistic-concurrency
/// guard for the read-merge-write cycle in the repository.
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = token_usage)]
pub struct TokenUsage {
    pub id: i32,
    pub scope: String,
    pub total_tokens: i64,
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub cached_tokens: i64,
    pub total_cost: BigDecimal,
    pub model_costs: JsonValue,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = token_usage)]
pub struct NewTokenUsage {
    pub scope: String,
    pub total_tokens: i64,
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub cached_tokens: i64,
    pub total_cost: BigDecimal,
    pub model_costs: JsonValue,
    pub updated_at: DateTime<Utc>,
}

/// Changeset applying one merged delta on top of an observed row.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = token_usage)]
pub struct UsageMerge {
    pub total_tokens: i64,
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub cached_tokens: i64,
    pub total_cost: BigDecimal,
    pub model_costs: JsonValue,
    pub updated_at: DateTime<Utc>,
}

/// One incremental usage observation from a model invocation.
#[derive(Debug, Clone, Serialize)]
pub struct UsageDelta {
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub cached_tokens: i64,
    pub total_tokens: i64,
    pub model: String,
    pub cost: BigDecimal,
}

impl UsageDelta {
    /// Rejects deltas that would shrink a running total. Totals are
    /// append-only; a negative observation is a caller bug.
    pub fn validate(&self) -> AppResult<()> {
        let fields = [
            ("prompt_tokens", self.prompt_tokens),
            ("completion_tokens", self.completion_tokens),
            ("cached_tokens", self.cached_tokens),
            ("total_tokens", self.total_tokens),
        ];
        for (field, value) in fields {
            if value < 0 {
                return Err(AppError::Validation {
                    field: field.to_string(),
                    reason: format!("usage delta must not be negative, got {}", value),
                });
            }
        }
        if self.cost < BigDecimal::from(0) {
            return Err(AppError::Validation {
                field: "cost".to_string(),
                reason: "usage cost must not be negative".to_string(),
            });
        }
        Ok(())
    }
}

impl NewTokenUsage {
    /// First-write case: initialize a scope's totals from zero plus the delta.
    pub fn from_delta(scope: &str, delta: &UsageDelta, now: DateTime<Utc>) -> Self {
        Self {
            scope: scope.to_string(),
            total_tokens: delta.total_tokens,
            prompt_tokens: delta.prompt_tokens,
            completion_tokens: delta.completion_tokens,
            cached_tokens: delta.cached_tokens,
            total_cost: delta.cost.clone(),
            model_costs: merge_model_costs(&JsonValue::Null, &delta.model, &delta.cost),
            updated_at: now,
        }
    }
}

impl TokenUsage {
    /// Build the changeset that folds `delta` into this observed row.
    pub fn merged_with(&self, delta: &UsageDelta, now: DateTime<Utc>) -> UsageMerge {
        UsageMerge {
            total_tokens: self.total_tokens + delta.total_tokens,
            prompt_tokens: self.prompt_tokens + delta.prompt_tokens,
            completion_tokens: self.completion_tokens + delta.completion_tokens,
            cached_tokens: self.cached_tokens + delta.cached_tokens,
            total_cost: &self.total_cost + &delta.cost,
            model_costs: merge_model_costs(&self.model_costs, &delta.model, &delta.cost),
            updated_at: now,
        }
    }
}

/// Accumulate `cost` into the per-model bucket of a JSONB cost map.
///
/// Costs are stored as decimal strings to keep arbitrary precision across
/// round-trips; numeric values written by earlier versions are still read.
pub fn merge_model_costs(costs: &JsonValue, model: &str, cost: &BigDecimal) -> JsonValue {
    let mut map = match costs {
        JsonValue::Object(map) => map.clone(),
        _ => serde_json::Map::new(),
    };
    let current = map.get(model).map(parse_cost).unwrap_or_default();
    let total = current + cost;
    map.insert(
        model.to_string(),
        JsonValue::String(total.normalized().to_string()),
    );
    JsonValue::Object(map)
}

fn parse_cost(value: &JsonValue) -> BigDecimal {
    match value {
        JsonValue::String(s) => s.parse().unwrap_or_default(),
        JsonValue::Number(n) => n.to_string().parse().unwrap_or_default(),
        _ => BigDecimal::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn delta(total: i64, model: &str, cost: &str) -> UsageDelta {
        UsageDelta {
            prompt_tokens: total / 2,
            completion_tokens: total - total / 2,
            cached_tokens: 0,
            total_tokens: total,
            model: model.to_string(),
            cost: BigDecimal::from_str(cost).unwrap(),
        }
    }

    fn row_from(new: NewTokenUsage) -> TokenUsage {
        TokenUsage {
            id: 1,
            scope: new.scope,
            total_tokens: new.total_tokens,
            prompt_tokens: new.prompt_tokens,
            completion_tokens: new.completion_tokens,
            cached_tokens: new.cached_tokens,
            total_cost: new.total_cost,
            model_costs: new.model_costs,
            updated_at: new.updated_at,
        }
    }

    #[test]
    fn deltas_accumulate_never_overwrite() {
        let now = Utc::now();
        let first = NewTokenUsage::from_delta("thread:42", &delta(10, "gpt-4o", "0.01"), now);
        assert_eq!(first.total_tokens, 10);

        let row = row_from(first);
        let merged = row.merged_with(&delta(5, "gpt-4o", "0.005"), now);
        assert_eq!(merged.total_tokens, 15);
        assert_eq!(merged.total_cost, BigDecimal::from_str("0.015").unwrap());
    }

    #[test]
    fn model_costs_accumulate_per_model() {
        let now = Utc::now();
        let row = row_from(NewTokenUsage::from_delta(
            "user:1",
            &delta(10, "gpt-4o", "0.01"),
            now,
        ));

        let merged = row.merged_with(&delta(10, "claude-sonnet-4-5", "0.02"), now);
        let map = merged.model_costs.as_object().unwrap();
        assert_eq!(map["gpt-4o"], JsonValue::String("0.01".to_string()));
        assert_eq!(map["claude-sonnet-4-5"], JsonValue::String("0.02".to_string()));

        let row = TokenUsage {
            model_costs: merged.model_costs,
            ..row
        };
        let again = row.merged_with(&delta(10, "gpt-4o", "0.03"), now);
        let map = again.model_costs.as_object().unwrap();
        assert_eq!(map["gpt-4o"], JsonValue::String("0.04".to_string()));
    }

    #[test]
    fn legacy_numeric_costs_are_still_read() {
        let costs = serde_json::json!({"gpt-4o": 0.25});
        let merged = merge_model_costs(&costs, "gpt-4o", &BigDecimal::from_str("0.25").unwrap());
        assert_eq!(
            merged.as_object().unwrap()["gpt-4o"],
            JsonValue::String("0.5".to_string())
        );
    }

    #[test]
    fn negative_deltas_are_rejected() {
        let mut bad = delta(10, "gpt-4o", "0.01");
        bad.total_tokens = -1;
        assert!(bad.validate().is_err());

        let mut bad_cost = delta(10, "gpt-4o", "0.01");
        bad_cost.cost = BigDecimal::from_str("-0.01").unwrap();
        assert!(bad_cost.validate().is_err());

        assert!(delta(0, "gpt-4o", "0").validate().is_ok());
    }

    #[test]
    fn ten_unit_deltas_converge_to_ten() {
        // Mirror of the concurrent-merge property: ten sequential unit
        // merges through the pure fold must total exactly ten.
        let now = Utc::now();
        let mut row = row_from(NewTokenUsage::from_delta(
            "thread:7",
            &delta(1, "gpt-4o-mini", "0.001"),
            now,
        ));
        for _ in 0..9 {
            let merged = row.merged_with(&delta(1, "gpt-4o-mini", "0.001"), now);
            row = TokenUsage {
                total_tokens: merged.total_tokens,
                prompt_tokens: merged.prompt_tokens,
                completion_tokens: merged.completion_tokens,
                cached_tokens: merged.cached_tokens,
                total_cost: merged.total_cost,
                model_costs: merged.model_costs,
                ..row
            };
        }
        assert_eq!(row.total_tokens, 10);
        assert_eq!(row.total_cost, BigDecimal::from_str("0.010").unwrap());
    }
}
