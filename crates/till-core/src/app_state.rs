//! Application-wide state for the terminal.
//!
//! All mutable state lives in one owned [`AppState`] passed by exclusive
//! reference into each screen handler - there are no module-level globals.

use heapless::{String, Vec};

use crate::money::Money;
use crate::net::{MAX_SCAN_RESULTS, NetworkEntry};
use crate::ui::grid::GridCursor;

/// Maximum password length the keyboard accepts.
pub const PASSWORD_MAX: usize = 64;
/// Maximum amount-entry length on the trackpad.
pub const AMOUNT_MAX: usize = 12;
/// Exact PIN length required for verification.
pub const PIN_LEN: usize = 4;

/// The five UI modes plus the terminal connection-error state.
///
/// Exactly one is active. Transitions are explicit assignments made by the
/// screen handlers; entering a screen always repaints it fully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenId {
    /// Network list shown at boot.
    NetworkScan,
    /// On-screen keyboard for the network password.
    PasswordInput,
    /// Join in progress (bounded retry loop).
    Connecting,
    /// Trackpad amount entry and mode toggle.
    Banking,
    /// PIN pad gating a pending transaction.
    PinInput,
    /// Join failed; waits for an acknowledging press.
    ConnectionError,
}

/// Whether transactions require PIN verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinPolicy {
    /// Execute opens the PIN pad; commit happens only after a match.
    Required { pin: String<PIN_LEN> },
    /// Execute commits directly.
    Disabled,
}

impl PinPolicy {
    pub fn required(pin: &str) -> Self {
        let mut s = String::new();
        let _ = s.push_str(pin);
        PinPolicy::Required { pin: s }
    }
}

/// Construction-time terminal configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalConfig {
    pub pin_policy: PinPolicy,
    /// Upper bound on join status polls.
    pub connect_attempts: u8,
    /// Delay between join status polls, in milliseconds.
    pub connect_poll_ms: u32,
    /// Boot-time account balance.
    pub initial_balance: Money,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            pin_policy: PinPolicy::required("1111"),
            connect_attempts: 20,
            connect_poll_ms: 500,
            initial_balance: Money::from_minor(125_075),
        }
    }
}

/// Password entry sub-state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialState {
    pub password: String<PASSWORD_MAX>,
    pub cursor: GridCursor,
    /// Symbols layout active instead of letters/digits.
    pub symbols_mode: bool,
    /// Shift modifier: a-z cells append uppercased.
    pub upper_case: bool,
    /// Render the buffer literally instead of as asterisks.
    pub show_password: bool,
    /// False forces a full keyboard repaint on the next draw.
    pub initialized: bool,
}

impl CredentialState {
    fn new() -> Self {
        Self {
            password: String::new(),
            cursor: GridCursor::at(0, 0),
            symbols_mode: false,
            upper_case: false,
            show_password: false,
            initialized: false,
        }
    }

    /// Fresh entry session for a newly selected network.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Trackpad amount-entry sub-state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankingState {
    pub amount: String<AMOUNT_MAX>,
    /// true: withdraw, false: deposit.
    pub withdraw_mode: bool,
    pub cursor: GridCursor,
    pub initialized: bool,
}

impl BankingState {
    fn new() -> Self {
        Self {
            amount: String::new(),
            withdraw_mode: true,
            cursor: GridCursor::at(0, 0),
            initialized: false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// PIN entry sub-state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinState {
    pub entered: String<PIN_LEN>,
    /// Gate flag: a transaction is parked awaiting verification.
    pub awaiting: bool,
    /// Transaction mode captured when PIN entry began. The commit uses this
    /// snapshot, never the live banking flag.
    pub withdraw_snapshot: bool,
    pub cursor: GridCursor,
    pub initialized: bool,
}

impl PinState {
    fn new() -> Self {
        Self {
            entered: String::new(),
            awaiting: false,
            withdraw_snapshot: true,
            // Start on the middle digit of the top row.
            cursor: GridCursor::at(1, 0),
            initialized: false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Open a PIN session for the given transaction mode.
    pub fn begin(&mut self, withdraw_mode: bool) {
        self.reset();
        self.awaiting = true;
        self.withdraw_snapshot = withdraw_mode;
    }
}

/// The single owned application state.
pub struct AppState {
    pub screen: ScreenId,
    /// Scan snapshot taken once at boot.
    pub networks: Vec<NetworkEntry, MAX_SCAN_RESULTS>,
    /// Cursor into `networks`, wrapping modulo its length.
    pub selected_network: usize,
    pub credentials: CredentialState,
    pub banking: BankingState,
    pub pin: PinState,
    pub balance: Money,
    pub config: TerminalConfig,
}

impl AppState {
    pub fn new(config: TerminalConfig) -> Self {
        Self {
            screen: ScreenId::NetworkScan,
            networks: Vec::new(),
            selected_network: 0,
            credentials: CredentialState::new(),
            banking: BankingState::new(),
            pin: PinState::new(),
            balance: config.initial_balance,
            config,
        }
    }

    /// SSID of the currently selected network, or "" before any scan.
    pub fn selected_ssid(&self) -> &str {
        self.networks
            .get(self.selected_network)
            .map(|n| n.ssid.as_str())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boot_state() {
        let state = AppState::new(TerminalConfig::default());
        assert_eq!(state.screen, ScreenId::NetworkScan);
        assert_eq!(state.balance, Money::from_minor(125_075));
        assert!(state.banking.withdraw_mode);
        assert!(!state.pin.awaiting);
        assert_eq!(state.selected_ssid(), "");
    }

    #[test]
    fn pin_session_snapshot() {
        let mut pin = PinState::new();
        pin.begin(false);
        assert!(pin.awaiting);
        assert!(!pin.withdraw_snapshot);
        assert_eq!(pin.cursor, GridCursor::at(1, 0));
    }
}
