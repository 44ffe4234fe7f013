//! GPIO button sampling.
//!
//! The five-way pad and the three auxiliary keys are plain active-low
//! inputs with pull-ups. Debouncing lives in the core's edge detector; this
//! port only reports levels.

use esp_hal::gpio::Input;
use till_core::input::{BUTTON_COUNT, Button, InputPort};

/// The eight button lines, indexed in [`Button::ALL`] order.
pub struct GpioButtons<'d> {
    lines: [Input<'d>; BUTTON_COUNT],
}

impl<'d> GpioButtons<'d> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        up: Input<'d>,
        down: Input<'d>,
        left: Input<'d>,
        right: Input<'d>,
        press: Input<'d>,
        key_a: Input<'d>,
        key_b: Input<'d>,
        key_c: Input<'d>,
    ) -> Self {
        Self {
            lines: [up, down, left, right, press, key_a, key_b, key_c],
        }
    }

    fn index(button: Button) -> usize {
        Button::ALL
            .iter()
            .position(|&b| b == button)
            .unwrap_or_default()
    }
}

impl InputPort for GpioButtons<'_> {
    fn is_active(&mut self, button: Button) -> bool {
        // Active low.
        self.lines[Self::index(button)].is_low()
    }
}
