//! ESP32-S3 entry point for the till banking terminal.
//!
//! Bring-up order: RTT logging, heap, embassy/esp-rtos, radio, display,
//! buttons, embassy-net stack, then the single cooperative UI loop.

#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]

use embassy_executor::Spawner;
use embassy_net::{Runner, StackResources};
use embassy_time::{Duration, Timer};
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull};
use esp_hal::timer::timg::TimerGroup;
use esp_radio::wifi::WifiDevice;
use log::error;
use rtt_target::rprintln;
use static_cell::StaticCell;

// Display-LCD panel specific imports
use embedded_hal_bus::spi::ExclusiveDevice;
use esp_hal::spi::master::{Config, Spi};
use mipidsi::interface::SpiInterface;
use mipidsi::{Builder as MipidsiBuilder, models::ILI9342CRgb565};

use till_core::app_state::TerminalConfig;
use till_core::screens::Terminal;
use till_core::ui::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX};
use till_firmware::buttons::GpioButtons;
use till_firmware::remote::{QueuedStore, remote_task};
use till_firmware::wifi::EspWifiPort;
use till_firmware::EmbassyClock;

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {}
}

extern crate alloc;

// This creates a default app-descriptor required by the esp-idf bootloader.
esp_bootloader_esp_idf::esp_app_desc!();

static STACK_RESOURCES: StaticCell<StackResources<4>> = StaticCell::new();

#[embassy_executor::task]
async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    rtt_target::rtt_init_print!();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 73744);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    rprintln!("Embassy initialized!");

    let radio_init = esp_radio::init().expect("Failed to initialize Wi-Fi/BLE controller");
    let (wifi_controller, interfaces) =
        esp_radio::wifi::new(&radio_init, peripherals.WIFI, Default::default())
            .expect("Failed to initialize Wi-Fi controller");

    // embassy-net stack over the station interface, DHCP-configured.
    let net_config = embassy_net::Config::dhcpv4(Default::default());
    let seed = 0x0bad_5eed_cafe_f00d;
    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        net_config,
        STACK_RESOURCES.init(StackResources::new()),
        seed,
    );
    spawner.spawn(net_task(runner)).ok();
    spawner.spawn(remote_task(stack)).ok();

    // Configure and initialize the display

    // 1. Configure SPI bus
    let spi_bus = Spi::new(peripherals.SPI2, Config::default())
        .unwrap()
        .with_sck(peripherals.GPIO36)
        .with_mosi(peripherals.GPIO37);

    // 2. CS pin (no hardware CS for this panel)
    let cs = Output::new(peripherals.GPIO35, Level::High, OutputConfig::default());

    // 3. Wrap the SPI bus as a SPI device (required by embedded-hal traits)
    let spi_device = ExclusiveDevice::new_no_delay(spi_bus, cs).unwrap();

    // 4. DC (Data/Command) pin
    let dc = Output::new(peripherals.GPIO34, Level::Low, OutputConfig::default());

    // 5. SPI batching buffer (larger = faster, uses more RAM)
    let mut spi_buffer = [0u8; 512];

    // 6. Display interface + driver
    let di = SpiInterface::new(spi_device, dc, &mut spi_buffer);
    let mut display = MipidsiBuilder::new(ILI9342CRgb565, di)
        .display_size(DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX)
        .init(&mut embassy_time::Delay)
        .expect("Failed to initialize display");

    rprintln!("Display initialized!");

    // Buttons: five-way pad plus A/B/C, active low with pull-ups.
    let pull_up = InputConfig::default().with_pull(Pull::Up);
    let buttons = GpioButtons::new(
        Input::new(peripherals.GPIO1, pull_up),
        Input::new(peripherals.GPIO2, pull_up),
        Input::new(peripherals.GPIO3, pull_up),
        Input::new(peripherals.GPIO4, pull_up),
        Input::new(peripherals.GPIO5, pull_up),
        Input::new(peripherals.GPIO6, pull_up),
        Input::new(peripherals.GPIO7, pull_up),
        Input::new(peripherals.GPIO8, pull_up),
    );

    let wifi = EspWifiPort::new(wifi_controller);

    let mut terminal = Terminal::new(
        TerminalConfig::default(),
        buttons,
        wifi,
        QueuedStore,
        embassy_time::Delay,
        EmbassyClock,
    );

    if let Err(err) = terminal.boot(&mut display) {
        error!("boot draw failed: {:?}", err);
    }

    loop {
        if let Err(err) = terminal.tick(&mut display) {
            error!("draw failed: {:?}", err);
        }
        Timer::after(Duration::from_millis(10)).await;
    }
}
