//! Terminal connection-error screen.
//!
//! A distinct state in the screen machine rather than a nested wait loop,
//! so the main dispatch loop stays the only polling site. Any fresh button
//! edge acknowledges the error and returns to password entry with the
//! keyboard marked uninitialized (forcing a full repaint); the typed
//! password is preserved for another attempt.

use embedded_graphics::{
    Drawable as _,
    pixelcolor::Rgb565,
    prelude::*,
    text::{Alignment, Text},
};

use crate::app_state::{AppState, ScreenId};
use crate::input::ButtonEvent;
use crate::ui::{self, colors};

pub fn draw_full<D: DrawTarget<Color = Rgb565>>(display: &mut D) -> Result<(), D::Error> {
    display.clear(colors::WITHDRAW)?;

    let center_x = ui::DISPLAY_WIDTH_PX as i32 / 2;
    Text::with_alignment(
        "Connection Failed!",
        Point::new(center_x, 95),
        ui::large_text(colors::TEXT_PRIMARY),
        Alignment::Center,
    )
    .draw(display)?;
    Text::with_alignment(
        "Check password and try again",
        Point::new(center_x, 128),
        ui::small_text(colors::TEXT_PRIMARY),
        Alignment::Center,
    )
    .draw(display)?;
    Text::with_alignment(
        "Press any key to go back",
        Point::new(center_x, 148),
        ui::small_text(colors::TEXT_PRIMARY),
        Alignment::Center,
    )
    .draw(display)?;
    Ok(())
}

/// Any fresh edge acknowledges; a line still held from before the screen
/// appeared does not.
pub fn handle(state: &mut AppState, event: ButtonEvent) -> Option<ScreenId> {
    if !event.rising {
        return None;
    }
    state.credentials.initialized = false;
    Some(ScreenId::PasswordInput)
}
