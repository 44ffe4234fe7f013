//! Desktop simulator for the till-rs banking terminal UI.
//!
//! Renders the till-core screens in an SDL2 window via
//! `embedded-graphics-simulator`, with mock network and remote-store
//! collaborators so the whole flow can be exercised without hardware.
//!
//! # Key bindings
//!
//! | Key         | Line            |
//! |-------------|-----------------|
//! | Arrow keys  | D-pad           |
//! | Return      | Center press    |
//! | A / B / C   | Auxiliary keys  |
//! | Q / Escape  | Quit            |
//!
//! The mock network accepts the password `password123` on any access point.

use std::time::{Duration, Instant};

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{
    OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window, sdl2::Keycode,
};
use log::info;

use till_core::Uptime;
use till_core::app_state::TerminalConfig;
use till_core::input::{BUTTON_COUNT, Button, InputPort};
use till_core::money::Money;
use till_core::net::{LinkStatus, MAX_SCAN_RESULTS, NetworkEntry, NetworkPort};
use till_core::remote::{RemoteError, RemoteStore, TransactionRecord};
use till_core::screens::Terminal;
use till_core::ui::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX};

/// Pixel scale factor for the simulator window.
const WINDOW_SCALE: u32 = 2;

/// Target frame duration (~60 FPS; the core paces itself).
const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Password the mock network accepts.
const MOCK_PASSWORD: &str = "password123";

// ---------------------------------------------------------------------------
// Mock collaborators
// ---------------------------------------------------------------------------

/// Keyboard-backed input lines, shared with the event pump.
#[derive(Default)]
struct KeyboardPort {
    held: std::rc::Rc<std::cell::RefCell<[bool; BUTTON_COUNT]>>,
}

impl KeyboardPort {
    fn handle(&self) -> std::rc::Rc<std::cell::RefCell<[bool; BUTTON_COUNT]>> {
        self.held.clone()
    }
}

fn button_index(button: Button) -> usize {
    Button::ALL.iter().position(|&b| b == button).unwrap_or(0)
}

fn keycode_to_button(keycode: Keycode) -> Option<Button> {
    match keycode {
        Keycode::Up => Some(Button::Up),
        Keycode::Down => Some(Button::Down),
        Keycode::Left => Some(Button::Left),
        Keycode::Right => Some(Button::Right),
        Keycode::Return | Keycode::KpEnter => Some(Button::Press),
        Keycode::A => Some(Button::KeyA),
        Keycode::B => Some(Button::KeyB),
        Keycode::C => Some(Button::KeyC),
        _ => None,
    }
}

impl InputPort for KeyboardPort {
    fn is_active(&mut self, button: Button) -> bool {
        self.held.borrow()[button_index(button)]
    }
}

/// Canned access points; joins succeed only with [`MOCK_PASSWORD`].
struct MockNetwork {
    connected: bool,
}

impl MockNetwork {
    fn new() -> Self {
        Self { connected: false }
    }
}

impl NetworkPort for MockNetwork {
    fn scan(&mut self) -> heapless::Vec<NetworkEntry, MAX_SCAN_RESULTS> {
        let mut out = heapless::Vec::new();
        for (name, rssi) in [
            ("HomeNetwork", -42i8),
            ("CoffeeShop-Guest", -58),
            ("Office-5G", -66),
            ("a-neighbours-network-with-a-long-name", -74),
            ("PrinterSetup", -83),
        ] {
            let mut ssid = heapless::String::new();
            let _ = ssid.push_str(name);
            let _ = out.push(NetworkEntry { ssid, rssi });
        }
        out
    }

    fn connect(&mut self, ssid: &str, secret: &str) {
        self.connected = secret == MOCK_PASSWORD;
        info!(
            "join '{}': {}",
            ssid,
            if self.connected { "accepted" } else { "wrong password" }
        );
    }

    fn status(&mut self) -> LinkStatus {
        if self.connected {
            LinkStatus::Connected
        } else {
            LinkStatus::Disconnected
        }
    }
}

/// Remote store that logs what the device would ship.
struct LoggingStore;

impl RemoteStore for LoggingStore {
    fn append_record(&mut self, record: &TransactionRecord) -> Result<(), RemoteError> {
        let mut body = heapless::String::<192>::new();
        record
            .write_json(&mut body)
            .map_err(|_| RemoteError::Transport)?;
        info!("POST /transactions.json {}", body);
        Ok(())
    }

    fn put_balance(&mut self, balance: Money) -> Result<(), RemoteError> {
        info!("PUT /account/balance.json {}", balance);
        Ok(())
    }
}

/// Thread-sleep delay for the core's documented busy-waits.
struct StdDelay;

impl embedded_hal::delay::DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(ns as u64));
    }
}

/// Wall-clock uptime.
struct StdClock {
    start: Instant,
}

impl Uptime for StdClock {
    fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    info!("Starting till-rs simulator");
    info!(
        "Display: {}x{} (scale {}x)",
        DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX, WINDOW_SCALE
    );
    info!("Keys: arrows=D-pad  Return=select  A/B/C=aux  Q=quit");
    info!("Mock network password: {MOCK_PASSWORD}");

    let mut display = SimulatorDisplay::<Rgb565>::new(Size::new(
        DISPLAY_WIDTH_PX as u32,
        DISPLAY_HEIGHT_PX as u32,
    ));

    let output_settings = OutputSettingsBuilder::new().scale(WINDOW_SCALE).build();
    let mut window = Window::new("Till Simulator", &output_settings);

    let port = KeyboardPort::default();
    let held = port.handle();

    let mut terminal = Terminal::new(
        TerminalConfig::default(),
        port,
        MockNetwork::new(),
        LoggingStore,
        StdDelay,
        StdClock { start: Instant::now() },
    );

    terminal
        .boot(&mut display)
        .expect("initial draw cannot fail on the simulator display");
    window.update(&display);

    'running: loop {
        let frame_start = Instant::now();

        for event in window.events() {
            match event {
                SimulatorEvent::Quit => break 'running,
                SimulatorEvent::KeyDown { keycode, .. } => {
                    if keycode == Keycode::Q || keycode == Keycode::Escape {
                        break 'running;
                    }
                    if let Some(button) = keycode_to_button(keycode) {
                        held.borrow_mut()[button_index(button)] = true;
                    }
                }
                SimulatorEvent::KeyUp { keycode, .. } => {
                    if let Some(button) = keycode_to_button(keycode) {
                        held.borrow_mut()[button_index(button)] = false;
                    }
                }
                _ => {}
            }
        }

        terminal
            .tick(&mut display)
            .expect("draw cannot fail on the simulator display");
        window.update(&display);

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    info!("Simulator exiting");
}
