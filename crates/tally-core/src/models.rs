//! Domain models for Tally

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A statement transaction exactly as received from the bank export.
///
/// Amounts are stored as non-negative magnitudes; the direction of the cash
/// movement is inferred from the category at classification time, never
/// stored. Only `override_subcategory` is mutable after ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTransaction {
    pub id: i64,
    /// Bank-assigned reference number, when the export carries one
    pub transaction_number: Option<String>,
    pub date: NaiveDate,
    pub account: String,
    /// Non-negative magnitude
    pub amount: f64,
    /// Institution label, e.g. "Direct Debit", "Card Purchase"
    pub subcategory: String,
    /// User correction; wins over `subcategory` during classification
    pub override_subcategory: Option<String>,
    pub memo: String,
    /// Hash for idempotent statement re-uploads
    pub import_hash: String,
    pub created_at: DateTime<Utc>,
}

impl RawTransaction {
    /// The category string classification actually runs against:
    /// the user override when set, otherwise the bank's label, lower-cased.
    pub fn effective_category(&self) -> String {
        self.override_subcategory
            .as_deref()
            .unwrap_or(&self.subcategory)
            .to_lowercase()
    }
}

/// A raw transaction parsed from a statement, before DB insertion
#[derive(Debug, Clone)]
pub struct NewRawTransaction {
    pub transaction_number: Option<String>,
    pub date: NaiveDate,
    pub account: String,
    pub amount: f64,
    pub subcategory: String,
    pub memo: String,
    pub import_hash: String,
}

/// The three cash-flow directions a classified transaction can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CashFlowKind {
    Income,
    Outgoing,
    Purchase,
}

impl CashFlowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Outgoing => "outgoing",
            Self::Purchase => "purchase",
        }
    }
}

impl std::str::FromStr for CashFlowKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "outgoing" => Ok(Self::Outgoing),
            "purchase" => Ok(Self::Purchase),
            _ => Err(format!("Unknown cash flow kind: {}", s)),
        }
    }
}

impl std::fmt::Display for CashFlowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification result for a single transaction.
///
/// Exactly one variant applies; `Unclassified` is a valid terminal state
/// (the transaction is excluded from downstream totals), not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Category {
    Income { source: String },
    Outgoing { merchant: String },
    Purchase { merchant: String },
    Unclassified,
}

impl Category {
    /// The merchant/source attribution, if this category carries one
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Income { source } => Some(source),
            Self::Outgoing { merchant } | Self::Purchase { merchant } => Some(merchant),
            Self::Unclassified => None,
        }
    }

    pub fn kind(&self) -> Option<CashFlowKind> {
        match self {
            Self::Income { .. } => Some(CashFlowKind::Income),
            Self::Outgoing { .. } => Some(CashFlowKind::Outgoing),
            Self::Purchase { .. } => Some(CashFlowKind::Purchase),
            Self::Unclassified => None,
        }
    }
}

/// A transaction that matched one of the three cash-flow categories.
///
/// Derived on demand from a `RawTransaction`; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizedTransaction {
    pub id: i64,
    pub date: NaiveDate,
    /// Non-negative magnitude; direction comes from `category`
    pub amount: f64,
    pub memo: String,
    pub category: Category,
}

impl CategorizedTransaction {
    /// Amount signed by cash-flow direction: income positive, spend negative
    pub fn signed_amount(&self) -> f64 {
        match self.category {
            Category::Income { .. } => self.amount,
            _ => -self.amount,
        }
    }

    /// Merchant/source if attributed, otherwise the memo
    pub fn description(&self) -> &str {
        match self.category.label() {
            Some(label) if !label.is_empty() => label,
            _ => &self.memo,
        }
    }
}

/// The classified view of a statement, split by cash-flow direction
#[derive(Debug, Clone, Default, Serialize)]
pub struct CategorizedSet {
    pub income: Vec<CategorizedTransaction>,
    pub outgoings: Vec<CategorizedTransaction>,
    pub purchases: Vec<CategorizedTransaction>,
    /// How many transactions matched no rule and were excluded
    pub unclassified: usize,
}

/// A user-curated recurring bill, tracked by day-of-month rather than date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledOutgoing {
    pub id: i64,
    /// 1-31
    pub day_of_month: u32,
    pub amount: f64,
    pub merchant: String,
    pub memo: String,
    pub subcategory: String,
    pub account: String,
    pub created_at: DateTime<Utc>,
}

/// A scheduled outgoing to be created (before DB insertion)
#[derive(Debug, Clone, Deserialize)]
pub struct NewScheduledOutgoing {
    pub day_of_month: u32,
    pub amount: f64,
    pub merchant: String,
    #[serde(default)]
    pub memo: String,
    #[serde(default = "default_outgoing_subcategory")]
    pub subcategory: String,
    #[serde(default = "default_outgoing_account")]
    pub account: String,
}

impl NewScheduledOutgoing {
    /// Build a scheduled outgoing from an observed transaction, taking the
    /// day-of-month from the transaction's date.
    pub fn from_transaction(tx: &RawTransaction) -> Self {
        use chrono::Datelike;

        Self {
            day_of_month: tx.date.day(),
            amount: tx.amount,
            merchant: crate::ingest::clean_merchant(&tx.memo),
            memo: tx.memo.clone(),
            subcategory: if tx.subcategory.is_empty() {
                default_outgoing_subcategory()
            } else {
                tx.subcategory.clone()
            },
            account: tx.account.clone(),
        }
    }
}

fn default_outgoing_subcategory() -> String {
    "Direct Debit".to_string()
}

fn default_outgoing_account() -> String {
    "Scheduled Outgoing".to_string()
}

/// One entry in a reconstructed running-balance series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalancePoint {
    pub date: NaiveDate,
    pub balance: f64,
}

/// A set of transactions sharing a day-of-month, treated as one repeating
/// bill or income. Recomputed from the current transaction set per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringGroup {
    pub day_of_month: u32,
    pub average_amount: f64,
    pub description: String,
    pub category: CashFlowKind,
    /// How many transactions back this group (1 = one-off candidate)
    pub occurrences: usize,
}

/// Forward-looking monthly affordability summary.
///
/// `savings_per_month` always equals `projected_balance`; the result keeps
/// both names because consumers historically read either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyProjection {
    pub next_income_date: Option<NaiveDate>,
    pub total_monthly_income: f64,
    pub total_monthly_outgoings: f64,
    pub total_monthly_purchases: f64,
    pub projected_balance: f64,
    pub savings_per_month: f64,
}

impl MonthlyProjection {
    /// The all-zero result returned when no income exists
    pub fn zero() -> Self {
        Self {
            next_income_date: None,
            total_monthly_income: 0.0,
            total_monthly_outgoings: 0.0,
            total_monthly_purchases: 0.0,
            projected_balance: 0.0,
            savings_per_month: 0.0,
        }
    }
}

/// A user-recorded account balance snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub id: i64,
    pub name: String,
    pub amount: f64,
    pub recorded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// An arranged overdraft limit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverdraftLimit {
    pub id: i64,
    pub amount: f64,
    pub recorded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A scheduled outgoing removed by de-duplication, with the reason
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovedOutgoing {
    pub id: i64,
    pub merchant: String,
    pub amount: f64,
    pub day_of_month: u32,
    /// "exact duplicate" or "cheaper duplicate"
    pub reason: String,
}

/// Report from a duplicate-removal run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupeReport {
    pub removed: Vec<RemovedOutgoing>,
    pub count: usize,
    pub message: String,
}
