//! Orchestration core for the fund-recovery workflow.
//!
//! Sequences liquidation, settlement wait, ledger transfer and
//! withdrawal against an `ExchangeApi` implementation. Data flows one
//! direction: metadata -> plan -> order -> settlement wait -> balance
//! re-read -> transfer -> balance re-read -> withdrawal. Each stage runs
//! only after the previous stage's post-condition (balance observed)
//! holds.

pub mod error;
pub mod plan;
pub mod run;
pub mod settle;
pub mod stages;

pub use error::{FlowError, FlowResult};
pub use plan::{cushioned_price, plan_sell};
pub use run::{Mode, RunConfig, RunState, Runner};
pub use settle::{SettleWait, DEFAULT_SETTLE_WAIT};
pub use stages::{select_amount, validate_destination};
