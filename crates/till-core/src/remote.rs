//! Remote transaction store interface.
//!
//! Two fire-and-forget operations against a remote JSON document store:
//! append a transaction record to a collection, and overwrite the stored
//! balance scalar. Failures are logged by the caller and never retried or
//! rolled back.

use core::fmt::{self, Write};

use thiserror_no_std::Error;

use crate::money::Money;

/// Device tag stamped into every transaction record.
pub const DEVICE_TAG: &str = "till_terminal";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnKind {
    Withdraw,
    Deposit,
}

impl TxnKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            TxnKind::Withdraw => "withdraw",
            TxnKind::Deposit => "deposit",
        }
    }
}

/// One committed transaction, as shipped to the remote collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionRecord {
    pub kind: TxnKind,
    pub amount: Money,
    pub balance_after: Money,
    /// Seconds since boot.
    pub timestamp: u64,
    pub device: &'static str,
}

impl TransactionRecord {
    /// Render the JSON body for the collection append.
    ///
    /// The record is a fixed five-field object; none of the values require
    /// escaping, so it is written straight through `core::fmt`.
    pub fn write_json<W: Write>(&self, out: &mut W) -> fmt::Result {
        write!(
            out,
            "{{\"type\":\"{}\",\"amount\":{},\"balanceAfter\":{},\"timestamp\":{},\"device\":\"{}\"}}",
            self.kind.as_str(),
            self.amount,
            self.balance_after,
            self.timestamp,
            self.device,
        )
    }
}

/// Errors a remote store port can report.
///
/// The core only ever logs these; no path in the UI depends on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The link is down or the host could not be reached.
    #[error("store unreachable")]
    Unreachable,
    /// The request was sent but the response status was not 2xx.
    #[error("store returned status {0}")]
    Status(u16),
    /// Transport-level read/write failure mid-request.
    #[error("transport error")]
    Transport,
}

/// Capability interface over the remote datastore client.
pub trait RemoteStore {
    fn append_record(&mut self, record: &TransactionRecord) -> Result<(), RemoteError>;
    fn put_balance(&mut self, balance: Money) -> Result<(), RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_json_shape() {
        let record = TransactionRecord {
            kind: TxnKind::Withdraw,
            amount: Money::from_minor(50_000),
            balance_after: Money::from_minor(75_075),
            timestamp: 1234,
            device: DEVICE_TAG,
        };

        let mut body = heapless::String::<192>::new();
        record.write_json(&mut body).unwrap();
        assert_eq!(
            body.as_str(),
            "{\"type\":\"withdraw\",\"amount\":500.00,\"balanceAfter\":750.75,\
             \"timestamp\":1234,\"device\":\"till_terminal\"}"
        );
    }
}
