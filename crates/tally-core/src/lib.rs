//! Tally Core Library
//!
//! Shared functionality for the Tally bank-statement analysis tool:
//! - Statement CSV ingestion (Barclays export format)
//! - Transaction classification into income / outgoings / purchases
//! - Recurring-pattern detection by day-of-month
//! - Running-balance reconstruction
//! - Monthly affordability projection
//! - Scheduled-outgoing management with de-duplication
//! - Database access and migrations
//! - Optional AI summary backend

pub mod balance;
pub mod classify;
pub mod db;
pub mod dedupe;
pub mod error;
pub mod ingest;
pub mod models;
pub mod projection;
pub mod recurring;
pub mod stats;
pub mod summary;

pub use balance::reconstruct_balance;
pub use classify::{categorize, categorize_new, classify};
pub use db::Database;
pub use dedupe::{plan_removals, DedupePlan};
pub use error::{Error, Result};
pub use ingest::{clean_merchant, parse_statement_csv};
pub use projection::project_monthly;
pub use recurring::{detect_recurring, find_consistent, ConsistentTransaction};
pub use stats::{compute_stats, StatementStats};
pub use summary::SummaryClient;
