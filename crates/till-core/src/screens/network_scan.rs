//! Network list screen shown at boot.
//!
//! Renders the scan snapshot with signal-strength bars; up/down wrap the
//! selection modulo the full result count, repainting only the two affected
//! rows. Center press opens password entry for the highlighted network.

use embedded_graphics::{
    Drawable as _,
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle, RoundedRectangle},
    text::Text,
};

use crate::app_state::{AppState, ScreenId};
use crate::input::{Button, ButtonEvent};
use crate::net::signal_bars;
use crate::ui::{self, colors};

/// Fixed row height for each network item.
const ROW_HEIGHT: i32 = 35;
/// Top of the first row.
const LIST_TOP: i32 = 45;
/// Only this many entries fit between the title and the hint bar.
const MAX_VISIBLE: usize = 5;

/// Full repaint of the network list.
pub fn draw_full<D: DrawTarget<Color = Rgb565>>(
    state: &AppState,
    display: &mut D,
) -> Result<(), D::Error> {
    display.clear(Rgb565::BLACK)?;
    ui::title_bar(display, "WiFi Networks", 35)?;

    for index in 0..state.networks.len().min(MAX_VISIBLE) {
        draw_row(state, display, index)?;
    }

    Rectangle::new(Point::new(0, 215), Size::new(ui::DISPLAY_WIDTH_PX as u32, 25))
        .into_styled(PrimitiveStyle::with_fill(colors::KEY_SHADOW))
        .draw(display)?;
    Text::new(
        "Use UP/DOWN to navigate, CENTER to select",
        Point::new(10, 228),
        ui::small_text(colors::TEXT_SECONDARY),
    )
    .draw(display)?;
    Ok(())
}

/// Repaint one row, highlighted when selected.
fn draw_row<D: DrawTarget<Color = Rgb565>>(
    state: &AppState,
    display: &mut D,
    index: usize,
) -> Result<(), D::Error> {
    let Some(entry) = state.networks.get(index) else {
        return Ok(());
    };
    let y = LIST_TOP + index as i32 * ROW_HEIGHT;
    let row = Rectangle::new(Point::new(5, y - 2), Size::new(310, (ROW_HEIGHT - 1) as u32));
    let selected = index == state.selected_network;

    row.into_styled(PrimitiveStyle::with_fill(Rgb565::BLACK))
        .draw(display)?;

    let (text_color, bar_color) = if selected {
        RoundedRectangle::with_equal_corners(row, Size::new(6, 6))
            .into_styled(PrimitiveStyle::with_fill(colors::ACCENT))
            .draw(display)?;
        (colors::TEXT_PRIMARY, colors::TEXT_PRIMARY)
    } else {
        (colors::TEXT_PRIMARY, colors::TEXT_SECONDARY)
    };

    let ssid: heapless::String<24> = ui::truncate_label(entry.ssid.as_str(), 18);
    Text::new(ssid.as_str(), Point::new(15, y + 15), ui::small_text(text_color))
        .draw(display)?;

    draw_signal_bars(display, Point::new(280, y + 8), entry.rssi, bar_color)?;
    Ok(())
}

/// Four ascending bars; `bars(rssi)` of them lit.
fn draw_signal_bars<D: DrawTarget<Color = Rgb565>>(
    display: &mut D,
    origin: Point,
    rssi_dbm: i8,
    lit: Rgb565,
) -> Result<(), D::Error> {
    let lit_count = signal_bars(rssi_dbm);
    for i in 0..4i32 {
        let color = if i < lit_count as i32 { lit } else { colors::SIGNAL_DIM };
        let height = 4 + i * 3;
        Rectangle::new(
            Point::new(origin.x + i * 5, origin.y + 12 - height),
            Size::new(3, height as u32),
        )
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(display)?;
    }
    Ok(())
}

/// Handle one input event. Returns the destination screen on a transition.
pub fn handle<D: DrawTarget<Color = Rgb565>>(
    state: &mut AppState,
    display: &mut D,
    event: ButtonEvent,
) -> Result<Option<ScreenId>, D::Error> {
    let count = state.networks.len();

    match event.button {
        Button::Up | Button::Down if count > 0 => {
            let old = state.selected_network;
            state.selected_network = if event.button == Button::Up {
                (old + count - 1) % count
            } else {
                (old + 1) % count
            };
            // Only the two affected rows repaint (when visible).
            if old < MAX_VISIBLE {
                draw_row(state, display, old)?;
            }
            if state.selected_network < MAX_VISIBLE {
                draw_row(state, display, state.selected_network)?;
            }
            Ok(None)
        }
        Button::Press if count > 0 => {
            // Fresh credential session for the chosen network.
            state.credentials.reset();
            Ok(Some(ScreenId::PasswordInput))
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::TerminalConfig;
    use crate::net::NetworkEntry;
    use embedded_graphics::mock_display::MockDisplay;

    fn display() -> MockDisplay<Rgb565> {
        let mut d = MockDisplay::new();
        d.set_allow_overdraw(true);
        d.set_allow_out_of_bounds_drawing(true);
        d
    }

    fn entry(name: &str, rssi: i8) -> NetworkEntry {
        let mut ssid = heapless::String::new();
        let _ = ssid.push_str(name);
        NetworkEntry { ssid, rssi }
    }

    fn state(count: usize) -> AppState {
        let mut s = AppState::new(TerminalConfig::default());
        for i in 0..count {
            let mut name = heapless::String::<32>::new();
            use core::fmt::Write;
            let _ = write!(name, "net-{i}");
            s.networks
                .push(NetworkEntry { ssid: name, rssi: -50 - i as i8 })
                .unwrap();
        }
        s
    }

    fn press(state: &mut AppState, button: Button) -> Option<ScreenId> {
        let mut d = display();
        handle(state, &mut d, ButtonEvent { button, rising: true }).unwrap()
    }

    #[test]
    fn selection_wraps_both_ways() {
        let mut s = state(3);
        assert_eq!(press(&mut s, Button::Up), None);
        assert_eq!(s.selected_network, 2);
        assert_eq!(press(&mut s, Button::Down), None);
        assert_eq!(s.selected_network, 0);
    }

    #[test]
    fn select_opens_password_entry_with_fresh_credentials() {
        let mut s = state(2);
        let _ = s.credentials.password.push_str("stale");
        s.selected_network = 1;

        assert_eq!(press(&mut s, Button::Press), Some(ScreenId::PasswordInput));
        assert_eq!(s.credentials.password.as_str(), "");
        assert!(!s.credentials.initialized);
        assert_eq!(s.selected_ssid(), "net-1");
    }

    #[test]
    fn empty_scan_ignores_input() {
        let mut s = state(0);
        assert_eq!(press(&mut s, Button::Up), None);
        assert_eq!(press(&mut s, Button::Down), None);
        assert_eq!(press(&mut s, Button::Press), None);
        assert_eq!(s.selected_network, 0);
    }

    #[test]
    fn long_ssids_render_without_panicking() {
        let mut s = state(0);
        s.networks
            .push(entry("an-extremely-long-network-name-indeed", -72))
            .unwrap();
        let mut d = display();
        draw_full(&s, &mut d).unwrap();
    }
}
