//! Input line sampling and edge detection.
//!
//! The hardware exposes eight level-triggered lines: a five-way directional
//! pad (four directions plus a center press) and three auxiliary keys. The
//! platform performs no debouncing; [`EdgeDetector`] compares the previous
//! and current sample of every line and reports discrete events, and the
//! screen router imposes a fixed hold-off window after each handled event.
//!
//! While a line stays active it re-fires once per hold-off window, which
//! preserves hold-to-repeat navigation. The hold-off durations are part of
//! the input contract, not an incidental side effect of a blocking delay.

/// One physical input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    /// Center press of the five-way pad.
    Press,
    KeyA,
    KeyB,
    KeyC,
}

pub const BUTTON_COUNT: usize = 8;

impl Button {
    /// All lines, in priority order: when several lines are active in the
    /// same sample, the earliest wins.
    pub const ALL: [Button; BUTTON_COUNT] = [
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
        Button::Press,
        Button::KeyA,
        Button::KeyB,
        Button::KeyC,
    ];

    /// Hold-off applied after an event on this line is handled.
    pub const fn cooldown_ms(self) -> u32 {
        match self {
            Button::Up | Button::Down | Button::Left | Button::Right => NAV_COOLDOWN_MS,
            Button::Press | Button::KeyA => SELECT_COOLDOWN_MS,
            Button::KeyB | Button::KeyC => SWITCH_COOLDOWN_MS,
        }
    }
}

/// Hold-off after a directional step.
pub const NAV_COOLDOWN_MS: u32 = 150;
/// Hold-off after a select / auxiliary-A press.
pub const SELECT_COOLDOWN_MS: u32 = 200;
/// Hold-off after the screen-switching auxiliary keys.
pub const SWITCH_COOLDOWN_MS: u32 = 300;
/// Hold-off after acknowledging the connection-error screen.
pub const ACK_COOLDOWN_MS: u32 = 500;

/// Level-triggered read access to the input lines.
///
/// `true` means the line is currently active. Implementations perform no
/// debouncing of their own.
pub trait InputPort {
    fn is_active(&mut self, button: Button) -> bool;
}

/// A reported input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    pub button: Button,
    /// `true` when this sample is a fresh press (previous sample inactive).
    /// `false` for hold-to-repeat re-fires.
    pub rising: bool,
}

/// Previous-vs-current sample comparator with a global hold-off window.
pub struct EdgeDetector {
    prev: [bool; BUTTON_COUNT],
    quiet_until_ms: u64,
}

impl EdgeDetector {
    pub const fn new() -> Self {
        Self {
            prev: [false; BUTTON_COUNT],
            quiet_until_ms: 0,
        }
    }

    /// Sample every line once and report at most one event.
    ///
    /// During the hold-off window all lines are sampled (so edge state stays
    /// current) but nothing is reported.
    pub fn poll<P: InputPort>(&mut self, port: &mut P, now_ms: u64) -> Option<ButtonEvent> {
        let mut event = None;
        for (i, &button) in Button::ALL.iter().enumerate() {
            let level = port.is_active(button);
            let rising = level && !self.prev[i];
            self.prev[i] = level;

            if event.is_none() && level && now_ms >= self.quiet_until_ms {
                event = Some(ButtonEvent { button, rising });
            }
        }
        event
    }

    /// Suppress reporting until `now_ms + cooldown_ms`.
    pub fn hold_off(&mut self, now_ms: u64, cooldown_ms: u32) {
        self.quiet_until_ms = now_ms + u64::from(cooldown_ms);
    }
}

impl Default for EdgeDetector {
    fn default() -> Self {
        Self::new()
    }
}
