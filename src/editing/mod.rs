//! Editing model: positions and atomic transactions

mod operation;

pub use operation::{Position, Step, Transaction, TransactionError, TransactionResult};
