//! Command implementations, organized by domain

mod balance;
mod core;
mod import;
mod outgoings;
mod report;
mod serve;

pub use balance::cmd_balance;
pub use core::{cmd_clear, cmd_init, cmd_status, open_db, resolve_db_path};
pub use import::cmd_import;
pub use outgoings::cmd_outgoings;
pub use report::{cmd_history, cmd_projection, cmd_recurring};
pub use serve::cmd_serve;
