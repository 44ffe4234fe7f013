//! Password entry screen: the on-screen text keyboard.
//!
//! A 4x10 grid with two swappable layouts (letters/digits and symbols) and
//! three modifiers: shift, password visibility, and the layout switch
//! itself. Cursor moves repaint two cells; modifier and layout changes
//! repaint the whole keyboard plus the mode indicator; the password field
//! repaints independently on every buffer mutation.

use embedded_graphics::{
    Drawable as _,
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Alignment, Text},
};

use crate::app_state::{AppState, ScreenId};
use crate::input::{Button, ButtonEvent};
use crate::ui::grid::{self, Direction, GridMetrics, GridSpec, KeyLabel, KeyVisual};
use crate::ui::{self, colors};

pub const ROWS: usize = 4;
pub const COLS: usize = 10;

/// Letters/digits layout. Command cells: `^` shift, `<` backspace, `E`
/// visibility toggle, `@` switch to symbols.
const BASE_KEYS: [[char; COLS]; ROWS] = [
    ['q', 'w', 'e', 'r', 't', 'y', 'u', 'i', 'o', 'p'],
    ['a', 's', 'd', 'f', 'g', 'h', 'j', 'k', 'l', 'E'],
    ['z', 'x', 'c', 'v', 'b', 'n', 'm', '0', '1', '2'],
    ['^', '3', '4', '5', '6', '7', '8', '9', '<', '@'],
];

/// Symbols layout. Command cells: `S` switch to letters, `_` space.
const SYMBOL_KEYS: [[char; COLS]; ROWS] = [
    ['!', '@', '#', '$', '%', '^', '&', '*', '(', ')'],
    ['-', '=', '[', ']', '\\', ';', '\'', ',', '.', '/'],
    ['~', '`', '{', '}', '|', ':', '"', '<', '>', '?'],
    ['S', '_', '+', '1', '2', '3', '4', '5', '6', '7'],
];

/// What selecting a cell does. The same glyph can be a command in one
/// layout and a literal character in the other (`^`, `<`, `@`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Char(char),
    Shift,
    Backspace,
    ToggleVisibility,
    SwitchLayout,
    Space,
}

pub fn action_at(symbols_mode: bool, x: usize, y: usize) -> KeyAction {
    if symbols_mode {
        match SYMBOL_KEYS[y][x] {
            'S' => KeyAction::SwitchLayout,
            '_' => KeyAction::Space,
            ch => KeyAction::Char(ch),
        }
    } else {
        match BASE_KEYS[y][x] {
            '^' => KeyAction::Shift,
            '<' => KeyAction::Backspace,
            'E' => KeyAction::ToggleVisibility,
            '@' => KeyAction::SwitchLayout,
            ch => KeyAction::Char(ch),
        }
    }
}

const METRICS: GridMetrics = GridMetrics::centered(COLS, 29, 2, 85)
    .with_cell_h(24)
    .with_radius(3);

/// Keyboard grid adapter over the credential sub-state flags.
struct KeyboardGrid {
    symbols_mode: bool,
    upper_case: bool,
    show_password: bool,
}

impl GridSpec for KeyboardGrid {
    const ROWS: usize = ROWS;
    const COLS: usize = COLS;

    fn metrics(&self) -> GridMetrics {
        METRICS
    }

    fn label(&self, x: usize, y: usize) -> KeyLabel {
        match action_at(self.symbols_mode, x, y) {
            KeyAction::Shift => KeyLabel::Text("SFT"),
            KeyAction::Backspace => KeyLabel::Text("DEL"),
            KeyAction::ToggleVisibility => KeyLabel::Text("EYE"),
            KeyAction::SwitchLayout => {
                KeyLabel::Text(if self.symbols_mode { "ABC" } else { "SYM" })
            }
            KeyAction::Space => KeyLabel::Text("SPC"),
            KeyAction::Char(ch) => {
                if !self.symbols_mode && self.upper_case && ch.is_ascii_lowercase() {
                    KeyLabel::Char(ch.to_ascii_uppercase())
                } else {
                    KeyLabel::Char(ch)
                }
            }
        }
    }

    fn visual(&self, x: usize, y: usize) -> KeyVisual {
        match action_at(self.symbols_mode, x, y) {
            KeyAction::Char(_) => {
                if self.symbols_mode {
                    KeyVisual::Symbols
                } else {
                    KeyVisual::Normal
                }
            }
            _ => KeyVisual::Special,
        }
    }

    fn label_color(&self, x: usize, y: usize) -> Option<Rgb565> {
        match action_at(self.symbols_mode, x, y) {
            KeyAction::Shift if self.upper_case => Some(colors::MODIFIER_ACTIVE),
            KeyAction::ToggleVisibility if self.show_password => Some(colors::MODIFIER_ACTIVE),
            _ => None,
        }
    }

    fn clear_color(&self) -> Rgb565 {
        colors::KEYBOARD_BG
    }
}

fn keyboard_grid(state: &AppState) -> KeyboardGrid {
    KeyboardGrid {
        symbols_mode: state.credentials.symbols_mode,
        upper_case: state.credentials.upper_case,
        show_password: state.credentials.show_password,
    }
}

const FIELD_RECT: Rectangle = Rectangle::new(Point::new(10, 50), Size::new(300, 25));

/// Full repaint of the password screen.
pub fn draw_full<D: DrawTarget<Color = Rgb565>>(
    state: &mut AppState,
    display: &mut D,
) -> Result<(), D::Error> {
    display.clear(colors::KEYBOARD_BG)?;
    ui::title_bar(display, "Enter Password", 30)?;

    // Selected network name, centered under the title.
    let ssid: heapless::String<24> = ui::truncate_label(state.selected_ssid(), 20);
    Text::with_alignment(
        ssid.as_str(),
        Point::new(ui::DISPLAY_WIDTH_PX as i32 / 2, 44),
        ui::small_text(colors::TEXT_PRIMARY),
        Alignment::Center,
    )
    .draw(display)?;

    draw_mode_indicator(state, display)?;
    draw_password_field(state, display)?;
    grid::draw_all(&keyboard_grid(state), display, &state.credentials.cursor)?;

    ui::bottom_bar(
        display,
        &[("B:Back to WiFi", 15), ("C:Connect", 120), ("A:Backspace", 200)],
    )?;

    state.credentials.initialized = true;
    Ok(())
}

/// `[ABC]`, `[ABC^]`, or `[SYM]` badge next to the network name.
fn draw_mode_indicator<D: DrawTarget<Color = Rgb565>>(
    state: &AppState,
    display: &mut D,
) -> Result<(), D::Error> {
    Rectangle::new(Point::new(250, 32), Size::new(70, 16))
        .into_styled(PrimitiveStyle::with_fill(colors::KEYBOARD_BG))
        .draw(display)?;

    let (text, color) = if state.credentials.symbols_mode {
        ("[SYM]", colors::MODIFIER_ACTIVE)
    } else if state.credentials.upper_case {
        ("[ABC^]", colors::TEXT_SECONDARY)
    } else {
        ("[ABC]", colors::TEXT_SECONDARY)
    };
    Text::new(text, Point::new(250, 42), ui::small_text(color)).draw(display)?;
    Ok(())
}

/// Repaint the password field (masked or literal).
fn draw_password_field<D: DrawTarget<Color = Rgb565>>(
    state: &AppState,
    display: &mut D,
) -> Result<(), D::Error> {
    ui::input_field(display, FIELD_RECT)?;

    let mut shown = heapless::String::<{ crate::app_state::PASSWORD_MAX }>::new();
    if state.credentials.show_password {
        let _ = shown.push_str(state.credentials.password.as_str());
    } else {
        for _ in 0..state.credentials.password.chars().count() {
            let _ = shown.push('*');
        }
    }
    Text::new(
        shown.as_str(),
        Point::new(15, 64),
        ui::small_text(colors::TEXT_PRIMARY),
    )
    .draw(display)?;
    Ok(())
}

/// Caret sub-tick: repaints only the caret column after the text.
pub fn blink<D: DrawTarget<Color = Rgb565>>(
    state: &AppState,
    display: &mut D,
    now_ms: u64,
) -> Result<(), D::Error> {
    if !state.credentials.initialized {
        return Ok(());
    }
    let len = state.credentials.password.chars().count() as i32;
    let x = 15 + len * ui::FONT_SMALL_PITCH;
    ui::blink_caret(
        display,
        Point::new(x, 57),
        Size::new(2, 12),
        now_ms,
        colors::INPUT_BG,
    )
}

fn append(state: &mut AppState, ch: char) {
    // Full buffer: silently ignore, same as every other full-buffer case.
    let _ = state.credentials.password.push(ch);
}

fn backspace<D: DrawTarget<Color = Rgb565>>(
    state: &mut AppState,
    display: &mut D,
) -> Result<(), D::Error> {
    if state.credentials.password.pop().is_some() {
        draw_password_field(state, display)?;
    }
    Ok(())
}

/// Handle one input event. Returns the destination screen on a transition.
pub fn handle<D: DrawTarget<Color = Rgb565>>(
    state: &mut AppState,
    display: &mut D,
    event: ButtonEvent,
) -> Result<Option<ScreenId>, D::Error> {
    let dir = match event.button {
        Button::Up => Some(Direction::Up),
        Button::Down => Some(Direction::Down),
        Button::Left => Some(Direction::Left),
        Button::Right => Some(Direction::Right),
        _ => None,
    };

    if let Some(dir) = dir {
        state.credentials.cursor.step(dir, ROWS, COLS);
        if state.credentials.initialized {
            grid::redraw_cursor_cells(&keyboard_grid(state), display, &mut state.credentials.cursor)?;
        } else {
            draw_full(state, display)?;
        }
        return Ok(None);
    }

    match event.button {
        Button::Press => {
            let (x, y) = (state.credentials.cursor.x, state.credentials.cursor.y);
            match action_at(state.credentials.symbols_mode, x, y) {
                KeyAction::Backspace => backspace(state, display)?,
                KeyAction::ToggleVisibility => {
                    state.credentials.show_password = !state.credentials.show_password;
                    draw_password_field(state, display)?;
                    // The EYE cell is the current cell; repainting the cursor
                    // pair refreshes its label highlight.
                    grid::redraw_cursor_cells(
                        &keyboard_grid(state),
                        display,
                        &mut state.credentials.cursor,
                    )?;
                }
                KeyAction::Shift => {
                    state.credentials.upper_case = !state.credentials.upper_case;
                    grid::draw_all(&keyboard_grid(state), display, &state.credentials.cursor)?;
                    draw_mode_indicator(state, display)?;
                }
                KeyAction::SwitchLayout => {
                    // Cursor position is preserved across the swap.
                    state.credentials.symbols_mode = !state.credentials.symbols_mode;
                    grid::draw_all(&keyboard_grid(state), display, &state.credentials.cursor)?;
                    draw_mode_indicator(state, display)?;
                }
                KeyAction::Space => {
                    append(state, ' ');
                    draw_password_field(state, display)?;
                }
                KeyAction::Char(ch) => {
                    let ch = if !state.credentials.symbols_mode
                        && state.credentials.upper_case
                        && ch.is_ascii_lowercase()
                    {
                        ch.to_ascii_uppercase()
                    } else {
                        ch
                    };
                    append(state, ch);
                    draw_password_field(state, display)?;
                }
            }
            Ok(None)
        }
        Button::KeyA => {
            backspace(state, display)?;
            Ok(None)
        }
        Button::KeyB => {
            // Cancel: discard the password and return to the network list.
            state.credentials.reset();
            Ok(Some(ScreenId::NetworkScan))
        }
        Button::KeyC => {
            if state.credentials.password.is_empty() {
                Ok(None)
            } else {
                Ok(Some(ScreenId::Connecting))
            }
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::TerminalConfig;
    use embedded_graphics::mock_display::MockDisplay;

    fn display() -> MockDisplay<Rgb565> {
        let mut d = MockDisplay::new();
        d.set_allow_overdraw(true);
        d.set_allow_out_of_bounds_drawing(true);
        d
    }

    fn state() -> AppState {
        let mut s = AppState::new(TerminalConfig::default());
        s.screen = ScreenId::PasswordInput;
        s.credentials.initialized = true;
        s
    }

    fn press(state: &mut AppState, display: &mut MockDisplay<Rgb565>, button: Button) {
        handle(state, display, ButtonEvent { button, rising: true }).unwrap();
    }

    fn press_cell(state: &mut AppState, display: &mut MockDisplay<Rgb565>, x: usize, y: usize) {
        state.credentials.cursor.x = x;
        state.credentials.cursor.y = y;
        press(state, display, Button::Press);
    }

    #[test]
    fn types_characters_with_shift() {
        let mut s = state();
        let mut d = display();

        press_cell(&mut s, &mut d, 0, 0); // q
        press_cell(&mut s, &mut d, 0, 3); // shift
        assert!(s.credentials.upper_case);
        press_cell(&mut s, &mut d, 1, 0); // w, uppercased
        assert_eq!(s.credentials.password.as_str(), "qW");
    }

    #[test]
    fn shift_does_not_uppercase_digits() {
        let mut s = state();
        let mut d = display();

        press_cell(&mut s, &mut d, 0, 3); // shift on
        press_cell(&mut s, &mut d, 7, 2); // '0'
        assert_eq!(s.credentials.password.as_str(), "0");
    }

    #[test]
    fn layout_swap_preserves_cursor() {
        let mut s = state();
        let mut d = display();

        s.credentials.cursor.x = 9;
        s.credentials.cursor.y = 3; // '@' switch cell
        press(&mut s, &mut d, Button::Press);
        assert!(s.credentials.symbols_mode);
        assert_eq!((s.credentials.cursor.x, s.credentials.cursor.y), (9, 3));

        // In symbols mode the same glyphs are literal characters.
        press_cell(&mut s, &mut d, 5, 0); // '^' literal
        assert_eq!(s.credentials.password.as_str(), "^");

        press_cell(&mut s, &mut d, 0, 3); // 'S' back to letters
        assert!(!s.credentials.symbols_mode);
    }

    #[test]
    fn space_key_in_symbols_layout() {
        let mut s = state();
        let mut d = display();
        s.credentials.symbols_mode = true;

        press_cell(&mut s, &mut d, 1, 3); // '_' space
        assert_eq!(s.credentials.password.as_str(), " ");
    }

    #[test]
    fn backspace_sequence_bottoms_out() {
        let mut s = state();
        let mut d = display();
        let _ = s.credentials.password.push_str("abc");

        press_cell(&mut s, &mut d, 8, 3); // DEL
        press(&mut s, &mut d, Button::Press);
        assert_eq!(s.credentials.password.as_str(), "a");

        press(&mut s, &mut d, Button::Press);
        assert_eq!(s.credentials.password.as_str(), "");

        // Backspace on empty is a no-op.
        press(&mut s, &mut d, Button::Press);
        assert_eq!(s.credentials.password.as_str(), "");
    }

    #[test]
    fn eye_toggles_visibility() {
        let mut s = state();
        let mut d = display();

        press_cell(&mut s, &mut d, 9, 1); // EYE
        assert!(s.credentials.show_password);
        press(&mut s, &mut d, Button::Press);
        assert!(!s.credentials.show_password);
    }

    #[test]
    fn confirm_requires_nonempty_password() {
        let mut s = state();
        let mut d = display();

        let next = handle(&mut s, &mut d, ButtonEvent { button: Button::KeyC, rising: true })
            .unwrap();
        assert_eq!(next, None);

        let _ = s.credentials.password.push_str("hunter2");
        let next = handle(&mut s, &mut d, ButtonEvent { button: Button::KeyC, rising: true })
            .unwrap();
        assert_eq!(next, Some(ScreenId::Connecting));
    }

    #[test]
    fn cancel_discards_password() {
        let mut s = state();
        let mut d = display();
        let _ = s.credentials.password.push_str("secret");

        let next = handle(&mut s, &mut d, ButtonEvent { button: Button::KeyB, rising: true })
            .unwrap();
        assert_eq!(next, Some(ScreenId::NetworkScan));
        assert_eq!(s.credentials.password.as_str(), "");
    }

    #[test]
    fn navigation_wraps_the_grid() {
        let mut s = state();
        let mut d = display();

        press(&mut s, &mut d, Button::Up);
        assert_eq!((s.credentials.cursor.x, s.credentials.cursor.y), (0, 3));
        press(&mut s, &mut d, Button::Left);
        assert_eq!((s.credentials.cursor.x, s.credentials.cursor.y), (9, 3));
    }
}
