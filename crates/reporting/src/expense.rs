//! Append-only operational expense ledger.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use domain::Money;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ReportingError, Result};

/// Unique identifier for an expense entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(Uuid);

impl ExpenseId {
    /// Creates a new random expense ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ExpenseId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Operational expense category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseCategory {
    Fuel,
    Packaging,
    Preparation,
    Marketing,
    Salary,
    Others,
}

impl ExpenseCategory {
    /// Every category, in display order.
    pub const ALL: [ExpenseCategory; 6] = [
        ExpenseCategory::Fuel,
        ExpenseCategory::Packaging,
        ExpenseCategory::Preparation,
        ExpenseCategory::Marketing,
        ExpenseCategory::Salary,
        ExpenseCategory::Others,
    ];

    /// Returns the wire label for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Fuel => "FUEL",
            ExpenseCategory::Packaging => "PACKAGING",
            ExpenseCategory::Preparation => "PREPARATION",
            ExpenseCategory::Marketing => "MARKETING",
            ExpenseCategory::Salary => "SALARY",
            ExpenseCategory::Others => "OTHERS",
        }
    }
}

impl std::fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One recorded expense. Never linked to a specific order, never edited
/// after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identity.
    pub id: ExpenseId,

    /// What the money went to.
    pub title: String,

    /// Non-negative amount in minor units.
    pub amount: Money,

    /// Expense category.
    pub category: ExpenseCategory,

    /// When the expense was recorded.
    pub recorded_at: DateTime<Utc>,
}

/// Append-only in-memory expense ledger.
#[derive(Debug, Clone, Default)]
pub struct ExpenseLedger {
    entries: Arc<RwLock<Vec<Expense>>>,
}

impl ExpenseLedger {
    /// Creates a new empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new expense.
    ///
    /// Rejects negative amounts and empty titles; there is no update or
    /// delete path.
    pub async fn record(
        &self,
        title: impl Into<String>,
        amount: Money,
        category: ExpenseCategory,
    ) -> Result<Expense> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ReportingError::InvalidExpense(
                "title must not be empty".to_string(),
            ));
        }
        if amount.is_negative() {
            return Err(ReportingError::InvalidExpense(format!(
                "amount must not be negative, got {amount}"
            )));
        }

        let expense = Expense {
            id: ExpenseId::new(),
            title,
            amount,
            category,
            recorded_at: Utc::now(),
        };

        self.entries.write().await.push(expense.clone());
        metrics::counter!("expenses_recorded_total").increment(1);

        Ok(expense)
    }

    /// Returns all expenses, oldest first.
    pub async fn list(&self) -> Vec<Expense> {
        self.entries.read().await.clone()
    }

    /// Returns all expenses in a category.
    pub async fn list_by_category(&self, category: ExpenseCategory) -> Vec<Expense> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|e| e.category == category)
            .cloned()
            .collect()
    }

    /// Returns the number of recorded expenses.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if the ledger has no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
