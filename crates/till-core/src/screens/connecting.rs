//! Connecting screen: the bounded join-and-poll loop.
//!
//! This is the one component allowed to block synchronously for a bounded
//! retry count: it issues the join, then polls link status up to the
//! configured attempt bound with a fixed inter-attempt delay, animating a
//! cycling dot count. Success resets all banking sub-state and lands on the
//! banking screen; exhaustion lands on the terminal connection-error screen.

use embedded_graphics::{
    Drawable as _,
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::Text,
};
use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::app_state::{AppState, ScreenId};
use crate::net::{LinkStatus, NetworkPort};
use crate::ui::{self, colors};

/// Strip the animated dots are drawn into.
const PROGRESS_RECT: Rectangle = Rectangle::new(Point::new(10, 160), Size::new(300, 30));

/// Full repaint: static title and network name. The dot animation is drawn
/// by [`run`].
pub fn draw_full<D: DrawTarget<Color = Rgb565>>(
    state: &AppState,
    display: &mut D,
) -> Result<(), D::Error> {
    display.clear(Rgb565::BLACK)?;

    Text::new(
        "Connecting",
        Point::new(70, 60),
        ui::large_text(colors::ACCENT),
    )
    .draw(display)?;

    Text::new(
        "Network:",
        Point::new(10, 110),
        ui::small_text(colors::TEXT_PRIMARY),
    )
    .draw(display)?;
    Text::new(
        state.selected_ssid(),
        Point::new(10, 130),
        ui::small_text(colors::TEXT_PRIMARY),
    )
    .draw(display)?;
    Ok(())
}

fn draw_progress<D: DrawTarget<Color = Rgb565>>(
    display: &mut D,
    dot_count: u8,
) -> Result<(), D::Error> {
    PROGRESS_RECT
        .into_styled(PrimitiveStyle::with_fill(Rgb565::BLACK))
        .draw(display)?;

    let mut text = heapless::String::<16>::new();
    let _ = text.push_str("Connecting");
    for _ in 0..(dot_count % 4) {
        let _ = text.push('.');
    }
    Text::new(
        text.as_str(),
        Point::new(10, 180),
        ui::small_text(colors::ACCENT),
    )
    .draw(display)?;
    Ok(())
}

/// Join the selected network and poll until connected or out of attempts.
///
/// Returns the screen to enter next.
pub fn run<D, N, DLY>(
    state: &mut AppState,
    display: &mut D,
    net: &mut N,
    delay: &mut DLY,
) -> Result<ScreenId, D::Error>
where
    D: DrawTarget<Color = Rgb565>,
    N: NetworkPort,
    DLY: DelayNs,
{
    info!("joining '{}'", state.selected_ssid());
    net.connect(state.selected_ssid(), state.credentials.password.as_str());

    for attempt in 0..state.config.connect_attempts {
        if net.status() == LinkStatus::Connected {
            return Ok(on_connected(state));
        }
        draw_progress(display, attempt)?;
        delay.delay_ms(state.config.connect_poll_ms);
    }

    if net.status() == LinkStatus::Connected {
        Ok(on_connected(state))
    } else {
        warn!("join failed after {} attempts", state.config.connect_attempts);
        Ok(ScreenId::ConnectionError)
    }
}

fn on_connected(state: &mut AppState) -> ScreenId {
    info!("link up, entering banking terminal");
    // Fresh session: amount cleared, withdraw mode, cursors home, no PIN
    // parked.
    state.banking.reset();
    state.pin.reset();
    ScreenId::Banking
}
