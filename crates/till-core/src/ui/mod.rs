//! Shared UI primitives: display geometry, fonts, and screen chrome.

pub mod colors;
pub mod grid;

use core::fmt::Write as _;

use embedded_graphics::{
    Drawable as _,
    mono_font::{MonoTextStyle, ascii::FONT_6X10, ascii::FONT_10X20},
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle, RoundedRectangle},
    text::{Alignment, Text},
};
use embedded_hal::delay::DelayNs;

pub const DISPLAY_WIDTH_PX: u16 = 320;
pub const DISPLAY_HEIGHT_PX: u16 = 240;

/// Horizontal advance of the small font, for caret positioning.
pub const FONT_SMALL_PITCH: i32 = 6;
/// Horizontal advance of the large font, for caret positioning.
pub const FONT_LARGE_PITCH: i32 = 10;

/// Caret blink half-period.
pub const CARET_BLINK_MS: u64 = 500;
/// Minimum interval between caret repaints.
pub const CARET_TICK_MS: u64 = 50;

/// How long a transient message stays on screen.
pub const TRANSIENT_MS: u32 = 2000;
/// Shorter window for the PIN-accepted message.
pub const TRANSIENT_SHORT_MS: u32 = 1500;

pub fn small_text(color: Rgb565) -> MonoTextStyle<'static, Rgb565> {
    MonoTextStyle::new(&FONT_6X10, color)
}

pub fn large_text(color: Rgb565) -> MonoTextStyle<'static, Rgb565> {
    MonoTextStyle::new(&FONT_10X20, color)
}

/// Solid title bar across the top of the screen.
pub fn title_bar<D: DrawTarget<Color = Rgb565>>(
    display: &mut D,
    text: &str,
    height: u32,
) -> Result<(), D::Error> {
    Rectangle::new(Point::zero(), Size::new(DISPLAY_WIDTH_PX as u32, height))
        .into_styled(PrimitiveStyle::with_fill(colors::ACCENT))
        .draw(display)?;
    Text::new(
        text,
        Point::new(10, height as i32 / 2 + 3),
        small_text(colors::TEXT_PRIMARY),
    )
    .draw(display)?;
    Ok(())
}

/// Hint bar across the bottom of the screen. `hints` are drawn left to
/// right at the given x offsets.
pub fn bottom_bar<D: DrawTarget<Color = Rgb565>>(
    display: &mut D,
    hints: &[(&str, i32)],
) -> Result<(), D::Error> {
    let top = DISPLAY_HEIGHT_PX as i32 - 30;
    Rectangle::new(
        Point::new(0, top),
        Size::new(DISPLAY_WIDTH_PX as u32, 30),
    )
    .into_styled(PrimitiveStyle::with_fill(colors::HINT_BAR_BG))
    .draw(display)?;

    for &(hint, x) in hints {
        Text::new(
            hint,
            Point::new(x, top + 12),
            small_text(colors::TEXT_SECONDARY),
        )
        .draw(display)?;
    }
    Ok(())
}

/// Rounded input field: filled background plus accent outline.
pub fn input_field<D: DrawTarget<Color = Rgb565>>(
    display: &mut D,
    bounds: Rectangle,
) -> Result<(), D::Error> {
    let corner = Size::new(4, 4);
    RoundedRectangle::with_equal_corners(bounds, corner)
        .into_styled(PrimitiveStyle::with_fill(colors::INPUT_BG))
        .draw(display)?;
    RoundedRectangle::with_equal_corners(bounds, corner)
        .into_styled(PrimitiveStyle::with_stroke(colors::ACCENT, 1))
        .draw(display)?;
    Ok(())
}

/// Draw a blinking caret column. Visibility follows 500 ms parity of the
/// uptime clock; the caller invokes this on its ~50 ms sub-tick.
pub fn blink_caret<D: DrawTarget<Color = Rgb565>>(
    display: &mut D,
    top_left: Point,
    size: Size,
    now_ms: u64,
    field_bg: Rgb565,
) -> Result<(), D::Error> {
    let visible = (now_ms / CARET_BLINK_MS) % 2 == 0;
    let color = if visible {
        colors::TEXT_PRIMARY
    } else {
        field_bg
    };
    Rectangle::new(top_left, size)
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(display)
}

/// Show a centered message in `strip` for `duration_ms`, then clear it.
///
/// This deliberately blocks the whole device for the display window; the
/// caller redraws whatever normally occupies the strip afterwards.
pub fn transient_message<D, DLY>(
    display: &mut D,
    delay: &mut DLY,
    strip: Rectangle,
    text: &str,
    color: Rgb565,
    bg: Rgb565,
    duration_ms: u32,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
    DLY: DelayNs,
{
    strip.into_styled(PrimitiveStyle::with_fill(bg)).draw(display)?;
    let center = strip.center();
    Text::with_alignment(text, Point::new(center.x, center.y + 3), small_text(color), Alignment::Center)
        .draw(display)?;
    delay.delay_ms(duration_ms);
    strip.into_styled(PrimitiveStyle::with_fill(bg)).draw(display)?;
    Ok(())
}

/// `src` truncated to at most `max` characters, "..." included when cut.
pub fn truncate_label<const N: usize>(src: &str, max: usize) -> heapless::String<N> {
    let mut out = heapless::String::new();
    if src.chars().count() > max {
        for ch in src.chars().take(max.saturating_sub(3)) {
            let _ = out.push(ch);
        }
        let _ = out.push_str("...");
    } else {
        let _ = out.push_str(src);
    }
    out
}

/// Render a dollar amount ("$1250.75") into a fixed buffer.
pub fn dollars<const N: usize>(amount: crate::money::Money) -> heapless::String<N> {
    let mut out = heapless::String::new();
    let _ = write!(out, "${}", amount);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_long_names() {
        let s: heapless::String<32> = truncate_label("very-long-network-name-here", 18);
        assert_eq!(s.as_str(), "very-long-netwo...");
        let s: heapless::String<32> = truncate_label("short", 18);
        assert_eq!(s.as_str(), "short");
    }

    #[test]
    fn dollar_formatting() {
        let s: heapless::String<16> = dollars(crate::money::Money::from_minor(125_075));
        assert_eq!(s.as_str(), "$1250.75");
    }
}
