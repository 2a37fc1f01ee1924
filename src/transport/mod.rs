//! Transaction-Client: genau ein HTTP-POST pro kodierter Transaktion.

pub mod client;

pub use client::{HttpTransactionClient, TransactionClient};
