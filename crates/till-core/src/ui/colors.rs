//! Color palette for the terminal UI.
//!
//! All colors are RGB565 (5 bits red, 6 bits green, 5 bits blue), the native
//! format of the panel. Channel values below are raw 5/6/5 counts.

use embedded_graphics::pixelcolor::Rgb565;

/// Keyboard / PIN screen background - dark blue-gray.
pub const KEYBOARD_BG: Rgb565 = Rgb565::new(3, 32, 28);

/// Plain key face.
pub const KEY_NORMAL: Rgb565 = Rgb565::new(9, 18, 9);

/// Selected key face (also the accent color for title bars and outlines).
pub const KEY_PRESSED: Rgb565 = Rgb565::new(11, 23, 11);

/// Command key face (shift, backspace, mode switch, ...).
pub const KEY_SPECIAL: Rgb565 = Rgb565::new(7, 15, 7);

/// Key face in the symbols layout.
pub const KEY_SYMBOLS: Rgb565 = Rgb565::new(13, 26, 13);

/// Primary text - white.
pub const TEXT_PRIMARY: Rgb565 = Rgb565::new(31, 63, 31);

/// Secondary text - light gray.
pub const TEXT_SECONDARY: Rgb565 = Rgb565::new(24, 48, 24);

/// Title bars and field outlines.
pub const ACCENT: Rgb565 = Rgb565::new(11, 23, 11);

/// Text input field background.
pub const INPUT_BG: Rgb565 = Rgb565::new(5, 10, 5);

/// Withdraw badge / error text - red.
pub const WITHDRAW: Rgb565 = Rgb565::new(31, 0, 0);

/// Deposit badge / success text - green.
pub const DEPOSIT: Rgb565 = Rgb565::new(0, 63, 0);

/// Key drop shadow and disabled key face.
pub const KEY_SHADOW: Rgb565 = Rgb565::new(4, 8, 4);

/// Border of a plain key.
pub const KEY_BORDER: Rgb565 = Rgb565::new(13, 26, 13);

/// Border of a command key.
pub const KEY_BORDER_SPECIAL: Rgb565 = Rgb565::new(9, 18, 9);

/// Border of the selected key.
pub const KEY_BORDER_SELECTED: Rgb565 = Rgb565::new(15, 31, 15);

/// Inner highlight ring on the selected key.
pub const KEY_HIGHLIGHT: Rgb565 = Rgb565::new(19, 39, 19);

/// Active-modifier label color (shift held, password shown).
pub const MODIFIER_ACTIVE: Rgb565 = Rgb565::new(31, 63, 0);

/// Unlit signal bar segment.
pub const SIGNAL_DIM: Rgb565 = Rgb565::new(8, 16, 8);

/// Disabled key label.
pub const TEXT_DISABLED: Rgb565 = Rgb565::new(8, 16, 8);

/// Bottom hint bar background.
pub const HINT_BAR_BG: Rgb565 = Rgb565::new(5, 10, 5);

/// Withdraw badge border.
pub const WITHDRAW_BORDER: Rgb565 = Rgb565::new(24, 0, 0);

/// Deposit badge border.
pub const DEPOSIT_BORDER: Rgb565 = Rgb565::new(0, 46, 0);
