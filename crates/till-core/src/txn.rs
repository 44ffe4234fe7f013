//! Transaction validation and commit.
//!
//! Split cleanly from the UI: [`precheck`] is pure validation run before PIN
//! entry is offered, [`commit`] is the side-effecting balance update and
//! remote notification run only after verification (or directly when PIN
//! gating is disabled by policy).

use log::{info, warn};

use thiserror_no_std::Error;

use crate::money::Money;
use crate::remote::{DEVICE_TAG, RemoteStore, TransactionRecord, TxnKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TxnError {
    /// The amount text did not parse to a positive decimal.
    #[error("invalid amount")]
    InvalidAmount,
    /// Withdrawal larger than the current balance.
    #[error("insufficient funds")]
    InsufficientFunds,
}

/// Validate an entered amount against the balance and mode.
///
/// Runs before PIN entry is offered; a failure aborts the flow with a
/// transient message and the PIN pad is never shown.
pub fn precheck(amount_text: &str, balance: Money, withdraw: bool) -> Result<Money, TxnError> {
    let amount = Money::parse(amount_text).map_err(|_| TxnError::InvalidAmount)?;
    if !amount.is_positive() {
        return Err(TxnError::InvalidAmount);
    }
    if withdraw && amount > balance {
        return Err(TxnError::InsufficientFunds);
    }
    Ok(amount)
}

/// Outcome of a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitOutcome {
    pub kind: TxnKind,
    pub balance_after: Money,
}

/// Apply a verified transaction.
///
/// `withdraw` is the mode snapshot captured when PIN entry began, not the
/// live banking flag. Withdrawals are re-validated against the balance at
/// commit time. Exactly two remote calls are made - record append, then
/// balance overwrite - and the second is attempted even if the first fails.
/// Remote failures are logged and never surfaced, retried, or rolled back.
pub fn commit<R: RemoteStore>(
    store: &mut R,
    balance: &mut Money,
    amount: Money,
    withdraw: bool,
    timestamp: u64,
) -> Result<CommitOutcome, TxnError> {
    let (kind, new_balance) = if withdraw {
        if amount > *balance {
            return Err(TxnError::InsufficientFunds);
        }
        let after = balance
            .checked_sub(amount)
            .ok_or(TxnError::InsufficientFunds)?;
        (TxnKind::Withdraw, after)
    } else {
        let after = balance.checked_add(amount).ok_or(TxnError::InvalidAmount)?;
        (TxnKind::Deposit, after)
    };

    *balance = new_balance;
    info!("{} {} -> balance {}", kind.as_str(), amount, new_balance);

    let record = TransactionRecord {
        kind,
        amount,
        balance_after: new_balance,
        timestamp,
        device: DEVICE_TAG,
    };
    if let Err(err) = store.append_record(&record) {
        warn!("record append failed: {}", err);
    }
    if let Err(err) = store.put_balance(new_balance) {
        warn!("balance overwrite failed: {}", err);
    }

    Ok(CommitOutcome {
        kind,
        balance_after: new_balance,
    })
}
