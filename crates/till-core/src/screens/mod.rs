//! The screen state machine.
//!
//! [`Terminal`] owns the application state and the platform ports and runs
//! the single cooperative loop: each [`Terminal::tick`] repaints the active
//! screen's caret on a ~50 ms sub-tick, polls the input edge detector,
//! dispatches at most one event to the active screen's handler, and applies
//! at most one screen transition. A transition always repaints the
//! destination screen in full; partial repaints happen only within a screen.

pub mod banking;
pub mod connecting;
pub mod error_ack;
pub mod network_scan;
pub mod password;
pub mod pin_entry;

use embedded_graphics::{pixelcolor::Rgb565, prelude::*};
use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crate::Uptime;
use crate::app_state::{AppState, ScreenId, TerminalConfig};
use crate::input::{ACK_COOLDOWN_MS, EdgeDetector, InputPort};
use crate::net::NetworkPort;
use crate::remote::RemoteStore;
use crate::ui;

/// The terminal: application state plus the platform collaborators.
///
/// The display is not owned; it is lent into [`Terminal::boot`] and
/// [`Terminal::tick`] each call, the way every draw path in this crate
/// borrows its target.
pub struct Terminal<P, N, R, DLY, CLK> {
    pub state: AppState,
    detector: EdgeDetector,
    port: P,
    net: N,
    store: R,
    delay: DLY,
    clock: CLK,
    last_caret_ms: u64,
}

impl<P, N, R, DLY, CLK> Terminal<P, N, R, DLY, CLK>
where
    P: InputPort,
    N: NetworkPort,
    R: RemoteStore,
    DLY: DelayNs,
    CLK: Uptime,
{
    pub fn new(config: TerminalConfig, port: P, net: N, store: R, delay: DLY, clock: CLK) -> Self {
        Self {
            state: AppState::new(config),
            detector: EdgeDetector::new(),
            port,
            net,
            store,
            delay,
            clock,
            last_caret_ms: 0,
        }
    }

    /// One-time boot: take the scan snapshot and draw the network list.
    pub fn boot<D: DrawTarget<Color = Rgb565>>(
        &mut self,
        display: &mut D,
    ) -> Result<(), D::Error> {
        self.state.networks = self.net.scan();
        info!("scan found {} networks", self.state.networks.len());
        network_scan::draw_full(&self.state, display)
    }

    /// One iteration of the cooperative loop.
    pub fn tick<D: DrawTarget<Color = Rgb565>>(
        &mut self,
        display: &mut D,
    ) -> Result<(), D::Error> {
        let now = self.clock.uptime_ms();

        // Caret sub-tick, decoupled from buffer-change repaints.
        if now.saturating_sub(self.last_caret_ms) >= ui::CARET_TICK_MS {
            self.last_caret_ms = now;
            match self.state.screen {
                ScreenId::PasswordInput => password::blink(&self.state, display, now)?,
                ScreenId::Banking => banking::blink(&self.state, display, now)?,
                ScreenId::PinInput => pin_entry::blink(&self.state, display, now)?,
                _ => {}
            }
        }

        // The join loop runs to completion without consulting input.
        if self.state.screen == ScreenId::Connecting {
            let next = connecting::run(&mut self.state, display, &mut self.net, &mut self.delay)?;
            self.enter(display, next)?;
            return Ok(());
        }

        let Some(event) = self.detector.poll(&mut self.port, now) else {
            return Ok(());
        };
        debug!("{:?} on {:?}", event, self.state.screen);

        let screen = self.state.screen;
        let next = match screen {
            ScreenId::NetworkScan => network_scan::handle(&mut self.state, display, event)?,
            ScreenId::PasswordInput => password::handle(&mut self.state, display, event)?,
            ScreenId::Banking => banking::handle(
                &mut self.state,
                display,
                &mut self.delay,
                &mut self.store,
                &self.clock,
                event,
            )?,
            ScreenId::PinInput => pin_entry::handle(
                &mut self.state,
                display,
                &mut self.delay,
                &mut self.store,
                &self.clock,
                event,
            )?,
            ScreenId::ConnectionError => error_ack::handle(&mut self.state, event),
            // Handled above; no input path.
            ScreenId::Connecting => None,
        };

        let cooldown = if screen == ScreenId::ConnectionError {
            ACK_COOLDOWN_MS
        } else {
            event.button.cooldown_ms()
        };
        self.detector.hold_off(now, cooldown);

        if let Some(next) = next {
            self.enter(display, next)?;
        }
        Ok(())
    }

    /// Apply a transition: overwrite the screen id and repaint the
    /// destination in full.
    fn enter<D: DrawTarget<Color = Rgb565>>(
        &mut self,
        display: &mut D,
        next: ScreenId,
    ) -> Result<(), D::Error> {
        debug!("{:?} -> {:?}", self.state.screen, next);
        self.state.screen = next;
        match next {
            ScreenId::NetworkScan => network_scan::draw_full(&self.state, display),
            ScreenId::PasswordInput => password::draw_full(&mut self.state, display),
            ScreenId::Connecting => connecting::draw_full(&self.state, display),
            ScreenId::Banking => banking::draw_full(&mut self.state, display),
            ScreenId::PinInput => pin_entry::draw_full(&mut self.state, display),
            ScreenId::ConnectionError => error_ack::draw_full(display),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::PinPolicy;
    use crate::input::Button;
    use crate::money::Money;
    use crate::net::{LinkStatus, MAX_SCAN_RESULTS, NetworkEntry};
    use crate::remote::{RemoteError, TransactionRecord};
    use core::cell::Cell;
    use embedded_graphics::mock_display::MockDisplay;
    use heapless::Vec;

    struct NoDelay;
    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    /// Clock the test advances between ticks.
    struct SharedClock<'a>(&'a Cell<u64>);
    impl Uptime for SharedClock<'_> {
        fn uptime_ms(&self) -> u64 {
            self.0.get()
        }
    }

    /// One button held (or none), set by the test before each tick.
    struct TestPort<'a>(&'a Cell<Option<Button>>);
    impl InputPort for TestPort<'_> {
        fn is_active(&mut self, button: Button) -> bool {
            self.0.get() == Some(button)
        }
    }

    /// Two canned networks; joins succeed only with the right password.
    struct TestNet {
        password: &'static str,
        joined_ok: bool,
    }

    impl TestNet {
        fn new(password: &'static str) -> Self {
            Self {
                password,
                joined_ok: false,
            }
        }
    }

    impl NetworkPort for TestNet {
        fn scan(&mut self) -> Vec<NetworkEntry, MAX_SCAN_RESULTS> {
            let mut out = Vec::new();
            for (name, rssi) in [("cafe-guest", -48i8), ("home-ap", -67i8)] {
                let mut ssid = heapless::String::new();
                let _ = ssid.push_str(name);
                out.push(NetworkEntry { ssid, rssi }).unwrap();
            }
            out
        }

        fn connect(&mut self, _ssid: &str, secret: &str) {
            self.joined_ok = secret == self.password;
        }

        fn status(&mut self) -> LinkStatus {
            if self.joined_ok {
                LinkStatus::Connected
            } else {
                LinkStatus::Disconnected
            }
        }
    }

    #[derive(Default)]
    struct SpyStore {
        records: heapless::Vec<TransactionRecord, 8>,
        balances: heapless::Vec<Money, 8>,
    }

    impl RemoteStore for SpyStore {
        fn append_record(&mut self, record: &TransactionRecord) -> Result<(), RemoteError> {
            self.records.push(*record).unwrap();
            Ok(())
        }

        fn put_balance(&mut self, balance: Money) -> Result<(), RemoteError> {
            self.balances.push(balance).unwrap();
            Ok(())
        }
    }

    fn display() -> MockDisplay<Rgb565> {
        let mut d = MockDisplay::new();
        d.set_allow_overdraw(true);
        d.set_allow_out_of_bounds_drawing(true);
        d
    }

    type TestTerminal<'a> =
        Terminal<TestPort<'a>, TestNet, SpyStore, NoDelay, SharedClock<'a>>;

    struct Harness<'a> {
        terminal: TestTerminal<'a>,
        clock: &'a Cell<u64>,
        held: &'a Cell<Option<Button>>,
        display: MockDisplay<Rgb565>,
    }

    impl<'a> Harness<'a> {
        fn new(
            clock: &'a Cell<u64>,
            held: &'a Cell<Option<Button>>,
            net_password: &'static str,
        ) -> Self {
            let mut h = Self {
                terminal: Terminal::new(
                    TerminalConfig::default(),
                    TestPort(held),
                    TestNet::new(net_password),
                    SpyStore::default(),
                    NoDelay,
                    SharedClock(clock),
                ),
                clock,
                held,
                display: display(),
            };
            h.terminal.boot(&mut h.display).unwrap();
            h
        }

        /// Press and release a button, advancing time past any hold-off.
        fn press(&mut self, button: Button) {
            self.held.set(Some(button));
            self.terminal.tick(&mut self.display).unwrap();
            self.held.set(None);
            self.terminal.tick(&mut self.display).unwrap();
            self.clock.set(self.clock.get() + 1000);
        }

        /// Move the active grid cursor to a cell and press select.
        fn press_cell(&mut self, x: usize, y: usize) {
            match self.terminal.state.screen {
                ScreenId::Banking => {
                    self.terminal.state.banking.cursor.x = x;
                    self.terminal.state.banking.cursor.y = y;
                }
                ScreenId::PinInput => {
                    self.terminal.state.pin.cursor.x = x;
                    self.terminal.state.pin.cursor.y = y;
                }
                ScreenId::PasswordInput => {
                    self.terminal.state.credentials.cursor.x = x;
                    self.terminal.state.credentials.cursor.y = y;
                }
                _ => {}
            }
            self.press(Button::Press);
        }

        /// Drive the flow from boot to the banking screen.
        fn connect(&mut self) {
            self.press(Button::Press); // select network -> password
            self.press_cell(0, 0); // 'q'
            self.press(Button::KeyC); // confirm -> connecting -> banking
        }
    }

    #[test]
    fn happy_path_withdrawal_end_to_end() {
        let clock = Cell::new(0u64);
        let held = Cell::new(None);
        let mut h = Harness::new(&clock, &held, "q");

        assert_eq!(h.terminal.state.screen, ScreenId::NetworkScan);
        h.connect();
        assert_eq!(h.terminal.state.screen, ScreenId::Banking);

        // Enter 500.00 and execute.
        h.press_cell(1, 1); // 5
        h.press_cell(1, 3); // 0
        h.press_cell(1, 3); // 0
        h.press_cell(0, 3); // .
        h.press_cell(1, 3); // 0
        h.press_cell(1, 3); // 0
        assert_eq!(h.terminal.state.banking.amount.as_str(), "500.00");

        h.press_cell(3, 3); // E
        assert_eq!(h.terminal.state.screen, ScreenId::PinInput);

        // Type the PIN and confirm.
        h.press_cell(0, 0); // 1
        h.press_cell(0, 0);
        h.press_cell(0, 0);
        h.press_cell(0, 0);
        h.press_cell(1, 4); // ENTER

        assert_eq!(h.terminal.state.screen, ScreenId::Banking);
        assert_eq!(h.terminal.state.balance, Money::from_minor(75_075));

        let store = &h.terminal.store;
        assert_eq!(store.records.len(), 1);
        assert_eq!(store.records[0].balance_after, Money::from_minor(75_075));
        assert_eq!(store.balances.as_slice(), &[Money::from_minor(75_075)]);
    }

    #[test]
    fn failed_join_needs_a_fresh_edge_to_leave_the_error_screen() {
        let clock = Cell::new(0u64);
        let held = Cell::new(None);
        let mut h = Harness::new(&clock, &held, "not-q");

        h.connect();
        assert_eq!(h.terminal.state.screen, ScreenId::ConnectionError);

        // Acknowledge and land back on the keyboard with the password kept.
        h.press(Button::Press);
        assert_eq!(h.terminal.state.screen, ScreenId::PasswordInput);
        assert_eq!(h.terminal.state.credentials.password.as_str(), "q");
    }

    #[test]
    fn held_button_does_not_dismiss_the_error_screen() {
        let clock = Cell::new(0u64);
        let held = Cell::new(None);
        let mut h = Harness::new(&clock, &held, "not-q");

        // Hold select through the whole join; the press that confirmed the
        // password is still down when the error screen appears.
        h.press(Button::Press); // -> password
        h.press_cell(0, 0); // 'q'
        held.set(Some(Button::KeyC));
        h.terminal.tick(&mut h.display).unwrap(); // -> connecting
        h.terminal.tick(&mut h.display).unwrap(); // join fails -> error
        assert_eq!(h.terminal.state.screen, ScreenId::ConnectionError);

        // Still held well past the hold-off: not a rising edge, no dismiss.
        clock.set(clock.get() + 10_000);
        h.terminal.tick(&mut h.display).unwrap();
        assert_eq!(h.terminal.state.screen, ScreenId::ConnectionError);

        // Release, fresh press: dismissed.
        held.set(None);
        h.terminal.tick(&mut h.display).unwrap();
        clock.set(clock.get() + 1000);
        h.press(Button::Press);
        assert_eq!(h.terminal.state.screen, ScreenId::PasswordInput);
    }

    #[test]
    fn insufficient_funds_never_reaches_the_pin_screen() {
        let clock = Cell::new(0u64);
        let held = Cell::new(None);
        let mut h = Harness::new(&clock, &held, "q");
        h.connect();

        // 2000 against the 1250.75 starting balance.
        for (x, y) in [(1usize, 0usize), (1, 3), (1, 3), (1, 3)] {
            h.press_cell(x, y);
        }
        assert_eq!(h.terminal.state.banking.amount.as_str(), "2000");

        h.press_cell(3, 3); // E
        assert_eq!(h.terminal.state.screen, ScreenId::Banking);
        assert!(!h.terminal.state.pin.awaiting);
        assert!(h.terminal.store.records.is_empty());
        assert_eq!(h.terminal.state.balance, Money::from_minor(125_075));
    }

    #[test]
    fn disabled_pin_policy_commits_from_execute() {
        let clock = Cell::new(0u64);
        let held = Cell::new(None);
        let mut h = Harness::new(&clock, &held, "q");
        h.terminal.state.config.pin_policy = PinPolicy::Disabled;
        h.connect();

        h.press_cell(0, 0); // 1
        h.press_cell(3, 3); // E
        assert_eq!(h.terminal.state.screen, ScreenId::Banking);
        // Default mode is withdraw: 1250.75 - 1.00.
        assert_eq!(h.terminal.state.balance, Money::from_minor(124_975));
        assert_eq!(h.terminal.store.records.len(), 1);
        assert_eq!(h.terminal.store.balances.len(), 1);
    }

    #[test]
    fn mode_snapshot_survives_a_live_flag_flip() {
        let clock = Cell::new(0u64);
        let held = Cell::new(None);
        let mut h = Harness::new(&clock, &held, "q");
        h.connect();

        h.press_cell(0, 0); // 1
        h.press_cell(3, 3); // E -> PIN, snapshot = withdraw
        assert!(h.terminal.state.pin.withdraw_snapshot);

        // Flip the live flag behind the session's back.
        h.terminal.state.banking.withdraw_mode = false;

        for _ in 0..4 {
            h.press_cell(0, 0); // 1111
        }
        h.press_cell(1, 4); // ENTER

        // Committed as a withdrawal.
        assert_eq!(h.terminal.state.balance, Money::from_minor(124_975));
        assert_eq!(
            h.terminal.store.records[0].kind,
            crate::remote::TxnKind::Withdraw
        );
    }
}
