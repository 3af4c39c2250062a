//! Query modules — free functions over `&Connection`, one module per table.

pub mod ledger_ops;
pub mod queue_ops;
