//! PIN entry screen gating a pending transaction.
//!
//! A 5x3 grid: digits, clear, backspace, back, enter, and one inert
//! placeholder cell. The entered PIN is rendered as centered asterisks only.
//! Verification requires exactly four digits; on a match the parked
//! transaction commits using the mode snapshot captured when the session
//! began, never the live banking flag.

use embedded_graphics::{
    Drawable as _,
    pixelcolor::Rgb565,
    prelude::*,
    primitives::Rectangle,
    text::{Alignment, Text},
};
use embedded_hal::delay::DelayNs;

use crate::Uptime;
use crate::app_state::{AppState, PIN_LEN, PinPolicy, ScreenId};
use crate::input::{Button, ButtonEvent};
use crate::remote::{RemoteStore, TxnKind};
use crate::txn;
use crate::ui::grid::{self, Direction, GridMetrics, GridSpec, KeyLabel, KeyVisual};
use crate::ui::{self, colors};

pub const ROWS: usize = 5;
pub const COLS: usize = 3;

/// PIN pad layout. `C` clear, `<` backspace, `B` back, `E` enter, `S`
/// disabled placeholder.
const PIN_KEYS: [[char; COLS]; ROWS] = [
    ['1', '2', '3'],
    ['4', '5', '6'],
    ['7', '8', '9'],
    ['C', '0', '<'],
    ['B', 'E', 'S'],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinAction {
    Digit(char),
    Clear,
    Backspace,
    Back,
    Enter,
    Inert,
}

pub fn action_at(x: usize, y: usize) -> PinAction {
    match PIN_KEYS[y][x] {
        'C' => PinAction::Clear,
        '<' => PinAction::Backspace,
        'B' => PinAction::Back,
        'E' => PinAction::Enter,
        'S' => PinAction::Inert,
        ch => PinAction::Digit(ch),
    }
}

const METRICS: GridMetrics = GridMetrics::centered(COLS, 52, 6, 85)
    .with_cell_h(20)
    .with_radius(4);

struct PinGrid;

impl GridSpec for PinGrid {
    const ROWS: usize = ROWS;
    const COLS: usize = COLS;

    fn metrics(&self) -> GridMetrics {
        METRICS
    }

    fn label(&self, x: usize, y: usize) -> KeyLabel {
        match action_at(x, y) {
            PinAction::Clear => KeyLabel::Text("CLR"),
            PinAction::Backspace => KeyLabel::Text("DEL"),
            PinAction::Back => KeyLabel::Text("BACK"),
            PinAction::Enter => KeyLabel::Text("ENTER"),
            PinAction::Inert => KeyLabel::Text("---"),
            PinAction::Digit(ch) => KeyLabel::Char(ch),
        }
    }

    fn visual(&self, x: usize, y: usize) -> KeyVisual {
        match action_at(x, y) {
            PinAction::Digit(_) => KeyVisual::Normal,
            PinAction::Inert => KeyVisual::Disabled,
            _ => KeyVisual::Special,
        }
    }

    fn clear_color(&self) -> Rgb565 {
        colors::KEYBOARD_BG
    }
}

const FIELD_RECT: Rectangle = Rectangle::new(Point::new(10, 50), Size::new(300, 25));

/// Strip used for transient PIN and transaction messages.
const MESSAGE_RECT: Rectangle = Rectangle::new(Point::new(10, 75), Size::new(300, 15));

/// Full repaint of the PIN screen.
pub fn draw_full<D: DrawTarget<Color = Rgb565>>(
    state: &mut AppState,
    display: &mut D,
) -> Result<(), D::Error> {
    display.clear(colors::KEYBOARD_BG)?;

    let title = if state.pin.withdraw_snapshot {
        "Enter PIN for Withdraw"
    } else {
        "Enter PIN for Deposit"
    };
    ui::title_bar(display, title, 30)?;

    Text::with_alignment(
        "Enter your 4-digit PIN",
        Point::new(ui::DISPLAY_WIDTH_PX as i32 / 2, 42),
        ui::small_text(colors::TEXT_PRIMARY),
        Alignment::Center,
    )
    .draw(display)?;

    draw_pin_field(state, display)?;
    grid::draw_all(&PinGrid, display, &state.pin.cursor)?;

    ui::bottom_bar(
        display,
        &[("Navigate with D-pad", 15), ("CENTER to select", 150), ("A:Clear", 260)],
    )?;

    state.pin.initialized = true;
    Ok(())
}

/// Repaint the masked PIN display: one centered asterisk per digit.
fn draw_pin_field<D: DrawTarget<Color = Rgb565>>(
    state: &AppState,
    display: &mut D,
) -> Result<(), D::Error> {
    ui::input_field(display, FIELD_RECT)?;

    let mut masked = heapless::String::<PIN_LEN>::new();
    for _ in 0..state.pin.entered.chars().count() {
        let _ = masked.push('*');
    }
    Text::with_alignment(
        masked.as_str(),
        Point::new(ui::DISPLAY_WIDTH_PX as i32 / 2, 69),
        ui::large_text(colors::TEXT_PRIMARY),
        Alignment::Center,
    )
    .draw(display)?;
    Ok(())
}

/// Caret sub-tick: caret sits after the centered asterisk run.
pub fn blink<D: DrawTarget<Color = Rgb565>>(
    state: &AppState,
    display: &mut D,
    now_ms: u64,
) -> Result<(), D::Error> {
    if !state.pin.initialized {
        return Ok(());
    }
    let width = state.pin.entered.chars().count() as i32 * ui::FONT_LARGE_PITCH;
    let x = ui::DISPLAY_WIDTH_PX as i32 / 2 + width / 2;
    ui::blink_caret(
        display,
        Point::new(x, 55),
        Size::new(2, 15),
        now_ms,
        colors::INPUT_BG,
    )
}

fn transient<D, DLY>(
    display: &mut D,
    delay: &mut DLY,
    text: &str,
    color: Rgb565,
    duration_ms: u32,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
    DLY: DelayNs,
{
    ui::transient_message(
        display,
        delay,
        MESSAGE_RECT,
        text,
        color,
        colors::KEYBOARD_BG,
        duration_ms,
    )
}

/// Compare the entered PIN and, on a match, commit the parked transaction.
fn verify<D, DLY, R, CLK>(
    state: &mut AppState,
    display: &mut D,
    delay: &mut DLY,
    store: &mut R,
    clock: &CLK,
) -> Result<Option<ScreenId>, D::Error>
where
    D: DrawTarget<Color = Rgb565>,
    DLY: DelayNs,
    R: RemoteStore,
    CLK: Uptime,
{
    if state.pin.entered.chars().count() != PIN_LEN {
        transient(
            display,
            delay,
            "PIN must be 4 digits!",
            colors::WITHDRAW,
            ui::TRANSIENT_MS,
        )?;
        return Ok(None);
    }

    let matches = match &state.config.pin_policy {
        PinPolicy::Required { pin } => state.pin.entered == *pin,
        // Not reachable through the banking screen; treat as verified.
        PinPolicy::Disabled => true,
    };

    if !matches {
        transient(
            display,
            delay,
            "Incorrect PIN! Try again.",
            colors::WITHDRAW,
            ui::TRANSIENT_MS,
        )?;
        state.pin.entered.clear();
        draw_pin_field(state, display)?;
        return Ok(None);
    }

    transient(
        display,
        delay,
        "PIN Correct!",
        colors::DEPOSIT,
        ui::TRANSIENT_SHORT_MS,
    )?;

    // Commit with the mode snapshot taken when this session began; the live
    // banking flag is deliberately not consulted.
    let withdraw = state.pin.withdraw_snapshot;
    let timestamp = clock.uptime_ms() / 1000;
    match txn::precheck(state.banking.amount.as_str(), state.balance, withdraw)
        .and_then(|amount| txn::commit(store, &mut state.balance, amount, withdraw, timestamp))
    {
        Ok(outcome) => {
            state.banking.amount.clear();
            let text = match outcome.kind {
                TxnKind::Withdraw => "Withdrawal successful!",
                TxnKind::Deposit => "Deposit successful!",
            };
            transient(display, delay, text, colors::DEPOSIT, ui::TRANSIENT_MS)?;
        }
        Err(_) => {
            // The balance moved out from under the parked amount.
            transient(
                display,
                delay,
                "Insufficient funds!",
                colors::WITHDRAW,
                ui::TRANSIENT_MS,
            )?;
        }
    }

    state.pin.reset();
    Ok(Some(ScreenId::Banking))
}

/// Handle one input event. Returns the destination screen on a transition.
pub fn handle<D, DLY, R, CLK>(
    state: &mut AppState,
    display: &mut D,
    delay: &mut DLY,
    store: &mut R,
    clock: &CLK,
    event: ButtonEvent,
) -> Result<Option<ScreenId>, D::Error>
where
    D: DrawTarget<Color = Rgb565>,
    DLY: DelayNs,
    R: RemoteStore,
    CLK: Uptime,
{
    let dir = match event.button {
        Button::Up => Some(Direction::Up),
        Button::Down => Some(Direction::Down),
        Button::Left => Some(Direction::Left),
        Button::Right => Some(Direction::Right),
        _ => None,
    };

    if let Some(dir) = dir {
        state.pin.cursor.step(dir, ROWS, COLS);
        if state.pin.initialized {
            grid::redraw_cursor_cells(&PinGrid, display, &mut state.pin.cursor)?;
        } else {
            draw_full(state, display)?;
        }
        return Ok(None);
    }

    match event.button {
        Button::Press => match action_at(state.pin.cursor.x, state.pin.cursor.y) {
            PinAction::Digit(ch) => {
                // Capped at four digits; further presses are ignored.
                if state.pin.entered.chars().count() < PIN_LEN {
                    let _ = state.pin.entered.push(ch);
                    draw_pin_field(state, display)?;
                }
                Ok(None)
            }
            PinAction::Backspace => {
                if state.pin.entered.pop().is_some() {
                    draw_pin_field(state, display)?;
                }
                Ok(None)
            }
            PinAction::Clear => {
                state.pin.entered.clear();
                draw_pin_field(state, display)?;
                Ok(None)
            }
            PinAction::Enter => verify(state, display, delay, store, clock),
            PinAction::Back => {
                // Abort: discard the PIN, keep the pending amount.
                state.pin.reset();
                Ok(Some(ScreenId::Banking))
            }
            PinAction::Inert => Ok(None),
        },
        Button::KeyA => {
            state.pin.entered.clear();
            draw_pin_field(state, display)?;
            Ok(None)
        }
        Button::KeyB => {
            state.pin.reset();
            Ok(Some(ScreenId::Banking))
        }
        Button::KeyC => verify(state, display, delay, store, clock),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::TerminalConfig;
    use crate::money::Money;
    use crate::remote::{RemoteError, TransactionRecord};
    use embedded_graphics::mock_display::MockDisplay;

    struct NoDelay;
    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    struct FixedClock(u64);
    impl Uptime for FixedClock {
        fn uptime_ms(&self) -> u64 {
            self.0
        }
    }

    #[derive(Default)]
    struct SpyStore {
        records: heapless::Vec<TransactionRecord, 4>,
        balances: heapless::Vec<Money, 4>,
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

    /// Banking state parked on a withdrawal of $500.00 awaiting PIN.
    fn state() -> AppState {
        let mut s = AppState::new(TerminalConfig::default());
        s.screen = ScreenId::PinInput;
        let _ = s.banking.amount.push_str("500.00");
        s.pin.begin(true);
        s.pin.initialized = true;
        s
    }

    fn press_cell(
        state: &mut AppState,
        display: &mut MockDisplay<Rgb565>,
        store: &mut SpyStore,
        x: usize,
        y: usize,
    ) -> Option<ScreenId> {
        state.pin.cursor.x = x;
        state.pin.cursor.y = y;
        handle(
            state,
            display,
            &mut NoDelay,
            store,
            &FixedClock(42_000),
            ButtonEvent { button: Button::Press, rising: true },
        )
        .unwrap()
    }

    fn type_pin(
        state: &mut AppState,
        display: &mut MockDisplay<Rgb565>,
        store: &mut SpyStore,
        digits: &str,
    ) {
        for ch in digits.chars() {
            let (x, y) = PIN_KEYS
                .iter()
                .enumerate()
                .find_map(|(y, row)| {
                    row.iter().position(|&c| c == ch).map(|x| (x, y))
                })
                .unwrap();
            press_cell(state, display, store, x, y);
        }
    }

    #[test]
    fn digit_entry_caps_at_four() {
        let mut s = state();
        let mut d = display();
        let mut store = SpyStore::default();

        type_pin(&mut s, &mut d, &mut store, "12345");
        assert_eq!(s.pin.entered.as_str(), "1234");
    }

    #[test]
    fn enter_with_short_pin_does_not_compare() {
        let mut s = state();
        let mut d = display();
        let mut store = SpyStore::default();

        type_pin(&mut s, &mut d, &mut store, "111");
        let next = press_cell(&mut s, &mut d, &mut store, 1, 4); // ENTER
        assert_eq!(next, None);
        // Buffer untouched, nothing committed.
        assert_eq!(s.pin.entered.as_str(), "111");
        assert!(store.records.is_empty());
    }

    #[test]
    fn mismatch_clears_pin_and_keeps_amount() {
        let mut s = state();
        let mut d = display();
        let mut store = SpyStore::default();

        type_pin(&mut s, &mut d, &mut store, "0000");
        let next = press_cell(&mut s, &mut d, &mut store, 1, 4); // ENTER
        assert_eq!(next, None);
        assert_eq!(s.pin.entered.as_str(), "");
        assert_eq!(s.banking.amount.as_str(), "500.00");
        assert_eq!(s.balance, Money::from_minor(125_075));
        assert!(store.records.is_empty());
        assert!(store.balances.is_empty());
    }

    #[test]
    fn match_commits_and_returns_to_banking() {
        let mut s = state();
        let mut d = display();
        let mut store = SpyStore::default();

        type_pin(&mut s, &mut d, &mut store, "1111");
        let next = press_cell(&mut s, &mut d, &mut store, 1, 4); // ENTER
        assert_eq!(next, Some(ScreenId::Banking));

        assert_eq!(s.balance, Money::from_minor(75_075));
        assert_eq!(s.banking.amount.as_str(), "");
        assert!(!s.pin.awaiting);

        assert_eq!(store.records.len(), 1);
        assert_eq!(store.records[0].kind, TxnKind::Withdraw);
        assert_eq!(store.records[0].amount, Money::from_minor(50_000));
        assert_eq!(store.records[0].balance_after, Money::from_minor(75_075));
        assert_eq!(store.records[0].timestamp, 42);
        assert_eq!(store.balances.as_slice(), &[Money::from_minor(75_075)]);
    }

    #[test]
    fn commit_uses_the_mode_snapshot_not_the_live_flag() {
        let mut s = state(); // snapshot: withdraw
        let mut d = display();
        let mut store = SpyStore::default();

        // Flip the live flag after the session began; the commit must still
        // be a withdrawal.
        s.banking.withdraw_mode = false;

        type_pin(&mut s, &mut d, &mut store, "1111");
        press_cell(&mut s, &mut d, &mut store, 1, 4); // ENTER

        assert_eq!(store.records[0].kind, TxnKind::Withdraw);
        assert_eq!(s.balance, Money::from_minor(75_075));
    }

    #[test]
    fn back_aborts_but_preserves_the_pending_amount() {
        let mut s = state();
        let mut d = display();
        let mut store = SpyStore::default();

        type_pin(&mut s, &mut d, &mut store, "11");
        let next = press_cell(&mut s, &mut d, &mut store, 0, 4); // BACK
        assert_eq!(next, Some(ScreenId::Banking));
        assert_eq!(s.pin.entered.as_str(), "");
        assert!(!s.pin.awaiting);
        assert_eq!(s.banking.amount.as_str(), "500.00");
    }

    #[test]
    fn clear_and_backspace_cells() {
        let mut s = state();
        let mut d = display();
        let mut store = SpyStore::default();

        type_pin(&mut s, &mut d, &mut store, "123");
        press_cell(&mut s, &mut d, &mut store, 2, 3); // DEL
        assert_eq!(s.pin.entered.as_str(), "12");
        press_cell(&mut s, &mut d, &mut store, 0, 3); // CLR
        assert_eq!(s.pin.entered.as_str(), "");
        // Backspace on empty is a no-op.
        press_cell(&mut s, &mut d, &mut store, 2, 3);
        assert_eq!(s.pin.entered.as_str(), "");
    }

    #[test]
    fn inert_cell_does_nothing() {
        let mut s = state();
        let mut d = display();
        let mut store = SpyStore::default();

        let next = press_cell(&mut s, &mut d, &mut store, 2, 4); // ---
        assert_eq!(next, None);
        assert_eq!(s.pin.entered.as_str(), "");
        assert!(s.pin.awaiting);
    }

    #[test]
    fn cursor_starts_on_the_middle_digit() {
        let s = state();
        assert_eq!((s.pin.cursor.x, s.pin.cursor.y), (1, 0));
    }
}
