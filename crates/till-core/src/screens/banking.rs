//! Banking screen: numeric trackpad amount entry and transaction kick-off.
//!
//! A 4x4 grid mixing digits, the decimal point, a backspace cell, and four
//! command cells (withdraw mode, deposit mode, clear, execute). Execute runs
//! the precheck and hands over to PIN entry; with PIN gating disabled by
//! policy it commits directly. The trackpad itself never calls the remote
//! store.

use embedded_graphics::{
    Drawable as _,
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle, RoundedRectangle},
    text::{Alignment, Text},
};
use embedded_hal::delay::DelayNs;

use crate::Uptime;
use crate::app_state::{AppState, PinPolicy, ScreenId};
use crate::input::{Button, ButtonEvent};
use crate::remote::{RemoteStore, TxnKind};
use crate::txn::{self, TxnError};
use crate::ui::grid::{self, Direction, GridMetrics, GridSpec, KeyLabel, KeyVisual};
use crate::ui::{self, colors};

pub const ROWS: usize = 4;
pub const COLS: usize = 4;

/// Trackpad layout. `W`/`D` switch the mode, `C` clears, `E` executes,
/// `#` is backspace.
const TRACKPAD_KEYS: [[char; COLS]; ROWS] = [
    ['1', '2', '3', 'W'],
    ['4', '5', '6', 'D'],
    ['7', '8', '9', 'C'],
    ['.', '0', '#', 'E'],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadAction {
    Digit(char),
    Point,
    Backspace,
    WithdrawMode,
    DepositMode,
    Clear,
    Execute,
}

pub fn action_at(x: usize, y: usize) -> PadAction {
    match TRACKPAD_KEYS[y][x] {
        'W' => PadAction::WithdrawMode,
        'D' => PadAction::DepositMode,
        'C' => PadAction::Clear,
        'E' => PadAction::Execute,
        '#' => PadAction::Backspace,
        '.' => PadAction::Point,
        ch => PadAction::Digit(ch),
    }
}

const METRICS: GridMetrics = GridMetrics::centered(COLS, 25, 3, 110)
    .with_cell_h(20)
    .with_radius(2);

struct TrackpadGrid;

impl GridSpec for TrackpadGrid {
    const ROWS: usize = ROWS;
    const COLS: usize = COLS;

    fn metrics(&self) -> GridMetrics {
        METRICS
    }

    fn label(&self, x: usize, y: usize) -> KeyLabel {
        KeyLabel::Char(TRACKPAD_KEYS[y][x])
    }

    fn visual(&self, x: usize, y: usize) -> KeyVisual {
        match action_at(x, y) {
            PadAction::WithdrawMode => {
                KeyVisual::Accent(colors::WITHDRAW, colors::WITHDRAW_BORDER)
            }
            PadAction::DepositMode => KeyVisual::Accent(colors::DEPOSIT, colors::DEPOSIT_BORDER),
            PadAction::Clear | PadAction::Execute => KeyVisual::Special,
            _ => KeyVisual::Normal,
        }
    }

    // Cells are too small for a drop shadow.
    fn shadow(&self) -> bool {
        false
    }

    fn clear_color(&self) -> Rgb565 {
        Rgb565::BLACK
    }
}

const AMOUNT_RECT: Rectangle = Rectangle::new(Point::new(10, 53), Size::new(300, 22));

/// Strip used for transient transaction messages and the key legend.
const MESSAGE_RECT: Rectangle = Rectangle::new(Point::new(10, 80), Size::new(300, 12));

const LEGEND: &str = "W=Withdraw D=Deposit C=Clear E=Execute";

/// Full repaint of the banking screen.
pub fn draw_full<D: DrawTarget<Color = Rgb565>>(
    state: &mut AppState,
    display: &mut D,
) -> Result<(), D::Error> {
    display.clear(Rgb565::BLACK)?;
    ui::title_bar(display, "Banking Terminal", 25)?;

    // Connection status on the right of the title bar.
    let mut status = heapless::String::<48>::new();
    let _ = status.push_str("Connected: ");
    let ssid: heapless::String<24> = ui::truncate_label(state.selected_ssid(), 16);
    let _ = status.push_str(ssid.as_str());
    Text::new(
        status.as_str(),
        Point::new(170, 14),
        ui::small_text(colors::DEPOSIT),
    )
    .draw(display)?;

    draw_balance(state, display)?;
    draw_mode_badge(state, display)?;
    draw_amount(state, display)?;
    draw_legend(display)?;

    grid::draw_all(&TrackpadGrid, display, &state.banking.cursor)?;

    if matches!(state.config.pin_policy, PinPolicy::Required { .. }) {
        Text::new(
            "PIN required for transactions",
            Point::new(10, 212),
            ui::small_text(colors::TEXT_SECONDARY),
        )
        .draw(display)?;
    }

    ui::bottom_bar(display, &[("A:Clear", 10), ("B:WiFi", 110), ("C:Process", 200)])?;

    state.banking.initialized = true;
    Ok(())
}

/// Green balance chip under the title bar.
fn draw_balance<D: DrawTarget<Color = Rgb565>>(
    state: &AppState,
    display: &mut D,
) -> Result<(), D::Error> {
    let chip = Rectangle::new(Point::new(10, 30), Size::new(150, 18));
    RoundedRectangle::with_equal_corners(chip, Size::new(3, 3))
        .into_styled(PrimitiveStyle::with_fill(colors::INPUT_BG))
        .draw(display)?;

    let mut text = heapless::String::<24>::new();
    let _ = text.push_str("Bal: ");
    let amount_text: heapless::String<16> = ui::dollars(state.balance);
    let _ = text.push_str(amount_text.as_str());
    Text::new(text.as_str(), Point::new(15, 42), ui::small_text(colors::DEPOSIT))
        .draw(display)?;
    Ok(())
}

/// Red/green mode badge. Repainted alone when the mode cells are pressed.
fn draw_mode_badge<D: DrawTarget<Color = Rgb565>>(
    state: &AppState,
    display: &mut D,
) -> Result<(), D::Error> {
    let badge = Rectangle::new(Point::new(170, 30), Size::new(70, 18));
    badge
        .into_styled(PrimitiveStyle::with_fill(Rgb565::BLACK))
        .draw(display)?;

    let (text, color) = if state.banking.withdraw_mode {
        ("WITHDRAW", colors::WITHDRAW)
    } else {
        ("DEPOSIT", colors::DEPOSIT)
    };
    RoundedRectangle::with_equal_corners(badge, Size::new(3, 3))
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(display)?;
    let center = badge.center();
    Text::with_alignment(
        text,
        Point::new(center.x, center.y + 3),
        ui::small_text(colors::TEXT_PRIMARY),
        Alignment::Center,
    )
    .draw(display)?;
    Ok(())
}

/// Repaint the amount field ("$0.00" placeholder when empty).
fn draw_amount<D: DrawTarget<Color = Rgb565>>(
    state: &AppState,
    display: &mut D,
) -> Result<(), D::Error> {
    ui::input_field(display, AMOUNT_RECT)?;

    let mut shown = heapless::String::<16>::new();
    if state.banking.amount.is_empty() {
        let _ = shown.push_str("$0.00");
    } else {
        let _ = shown.push('$');
        let _ = shown.push_str(state.banking.amount.as_str());
    }
    Text::new(
        shown.as_str(),
        Point::new(15, 67),
        ui::small_text(colors::TEXT_PRIMARY),
    )
    .draw(display)?;
    Ok(())
}

fn draw_legend<D: DrawTarget<Color = Rgb565>>(display: &mut D) -> Result<(), D::Error> {
    MESSAGE_RECT
        .into_styled(PrimitiveStyle::with_fill(Rgb565::BLACK))
        .draw(display)?;
    Text::new(
        LEGEND,
        Point::new(10, 89),
        ui::small_text(colors::TEXT_SECONDARY),
    )
    .draw(display)?;
    Ok(())
}

/// Caret sub-tick for the amount field.
pub fn blink<D: DrawTarget<Color = Rgb565>>(
    state: &AppState,
    display: &mut D,
    now_ms: u64,
) -> Result<(), D::Error> {
    if !state.banking.initialized {
        return Ok(());
    }
    let shown_len = if state.banking.amount.is_empty() {
        5 // "$0.00"
    } else {
        1 + state.banking.amount.chars().count() as i32
    };
    let x = 15 + shown_len * ui::FONT_SMALL_PITCH;
    ui::blink_caret(
        display,
        Point::new(x, 60),
        Size::new(1, 10),
        now_ms,
        colors::INPUT_BG,
    )
}

/// Show a transient transaction message, then restore the key legend.
fn transient<D, DLY>(
    display: &mut D,
    delay: &mut DLY,
    text: &str,
    color: Rgb565,
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
        Rgb565::BLACK,
        ui::TRANSIENT_MS,
    )?;
    draw_legend(display)
}

/// Execute: precheck the amount, then either open PIN entry or (PIN gating
/// disabled) commit on the spot.
fn execute<D, DLY, R, CLK>(
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
    let amount = match txn::precheck(
        state.banking.amount.as_str(),
        state.balance,
        state.banking.withdraw_mode,
    ) {
        Ok(amount) => amount,
        Err(TxnError::InvalidAmount) => {
            transient(display, delay, "Invalid amount!", colors::WITHDRAW)?;
            return Ok(None);
        }
        Err(TxnError::InsufficientFunds) => {
            transient(display, delay, "Insufficient funds!", colors::WITHDRAW)?;
            return Ok(None);
        }
    };

    match state.config.pin_policy {
        PinPolicy::Required { .. } => {
            state.pin.begin(state.banking.withdraw_mode);
            Ok(Some(ScreenId::PinInput))
        }
        PinPolicy::Disabled => {
            let timestamp = clock.uptime_ms() / 1000;
            match txn::commit(
                store,
                &mut state.balance,
                amount,
                state.banking.withdraw_mode,
                timestamp,
            ) {
                Ok(outcome) => {
                    state.banking.amount.clear();
                    let text = match outcome.kind {
                        TxnKind::Withdraw => "Withdrawal successful!",
                        TxnKind::Deposit => "Deposit successful!",
                    };
                    transient(display, delay, text, colors::DEPOSIT)?;
                    // Balance chip and amount field both changed.
                    draw_balance(state, display)?;
                    draw_amount(state, display)?;
                }
                Err(_) => {
                    transient(display, delay, "Insufficient funds!", colors::WITHDRAW)?;
                }
            }
            Ok(None)
        }
    }
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
        state.banking.cursor.step(dir, ROWS, COLS);
        if state.banking.initialized {
            grid::redraw_cursor_cells(&TrackpadGrid, display, &mut state.banking.cursor)?;
        } else {
            draw_full(state, display)?;
        }
        return Ok(None);
    }

    match event.button {
        Button::Press => {
            match action_at(state.banking.cursor.x, state.banking.cursor.y) {
                PadAction::WithdrawMode => {
                    state.banking.withdraw_mode = true;
                    draw_mode_badge(state, display)?;
                }
                PadAction::DepositMode => {
                    state.banking.withdraw_mode = false;
                    draw_mode_badge(state, display)?;
                }
                PadAction::Clear => {
                    state.banking.amount.clear();
                    draw_amount(state, display)?;
                }
                PadAction::Execute => return execute(state, display, delay, store, clock),
                PadAction::Point => {
                    // A second decimal point is silently rejected.
                    if !state.banking.amount.as_str().contains('.') {
                        let _ = state.banking.amount.push('.');
                        draw_amount(state, display)?;
                    }
                }
                PadAction::Digit(ch) => {
                    let _ = state.banking.amount.push(ch);
                    draw_amount(state, display)?;
                }
                PadAction::Backspace => {
                    if state.banking.amount.pop().is_some() {
                        draw_amount(state, display)?;
                    }
                }
            }
            Ok(None)
        }
        Button::KeyA => {
            state.banking.amount.clear();
            draw_amount(state, display)?;
            Ok(None)
        }
        Button::KeyB => Ok(Some(ScreenId::NetworkScan)),
        Button::KeyC => execute(state, display, delay, store, clock),
        _ => Ok(None),
    }
}
