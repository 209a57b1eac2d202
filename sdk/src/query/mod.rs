//! Read-only requests. Queries go through the same execution engine as
//! transactions but carry no signatures.

pub mod balance;
pub mod receipt;

pub use balance::{AccountBalance, AccountBalanceQuery};
pub use receipt::{TransactionReceipt, TransactionReceiptQuery};
