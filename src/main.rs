#![no_std]
#![no_main]

// Required for ESP-IDF bootloader compatibility
// Use explicit parameters to ensure correct efuse block revision values
esp_bootloader_esp_idf::esp_app_desc!(
    env!("CARGO_PKG_VERSION"),  // version
    env!("CARGO_PKG_NAME"),     // project_name
    "00:00:00",                 // build_time
    "2025-01-01",               // build_date
    "0.0.0",                    // idf_ver (not using IDF)
    0x10000,                    // mmu_page_size (64KB)
    0,                          // min_efuse_blk_rev_full (accept all)
    u16::MAX                    // max_efuse_blk_rev_full (accept all)
);

use esp_backtrace as _;
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::timer::timg::TimerGroup;
use esp_hal::uart::{Config as UartConfig, DataBits, Parity, StopBits, Uart, UartRx, UartTx};
use esp_hal::usb_serial_jtag::{UsbSerialJtag, UsbSerialJtagRx, UsbSerialJtagTx};
use esp_hal::Async;
use static_cell::StaticCell;

use ubridge_firmware::boot::ModeSequencer;
use ubridge_firmware::bridge::{Bridge, BridgeConfig, StopFlag};
use ubridge_firmware::config;
use ubridge_firmware::io::IoLink;

/// USB side of the bridge: the built-in USB Serial JTAG peripheral
type UsbLink = IoLink<UsbSerialJtagRx<'static, Async>, UsbSerialJtagTx<'static, Async>>;

/// UART side of the bridge: UART1 wired to the attached device
type UartLink = IoLink<UartRx<'static, Async>, UartTx<'static, Async>>;

/// Sequencer over the two boot-control outputs
type BootSequencer = ModeSequencer<Output<'static>, Output<'static>, embassy_time::Delay>;

/// Static executor for embassy
static EXECUTOR: StaticCell<esp_rtos::embassy::Executor> = StaticCell::new();

/// Never set on hardware; the loop runs until power-cycle
static STOP: StopFlag = StopFlag::new();

#[esp_hal::main]
fn main() -> ! {
    // Logs go out on the UART0 console; both bridge transports stay clean
    esp_println::logger::init_logger_from_env();

    let peripherals = esp_hal::init(esp_hal::Config::default());

    // Initialise the RTOS scheduler with timer - MUST be done before any async operations
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // Boot-control pins, outputs with no pulls: NRST released, BOOT0 low
    // until the first sequence runs (GPIO7 / GPIO8, see config::boot)
    let nrst = Output::new(peripherals.GPIO7, Level::High, OutputConfig::default());
    let boot0 = Output::new(peripherals.GPIO8, Level::Low, OutputConfig::default());
    let sequencer = ModeSequencer::new(
        nrst,
        boot0,
        embassy_time::Delay,
        config::boot::SETTLE_DELAY_MS,
    );

    // UART to the attached device: 8 data bits, 1 stop bit, no flow
    // control. Parity is a build-time choice; the STM32 system bootloader
    // expects even parity on some parts, none is the default here.
    let uart_config = UartConfig::default()
        .with_baudrate(config::uart::BAUD_RATE)
        .with_data_bits(DataBits::_8)
        .with_parity(Parity::None)
        .with_stop_bits(StopBits::_1);
    let uart = Uart::new(peripherals.UART1, uart_config)
        .expect("Failed to configure UART1")
        .with_tx(peripherals.GPIO17)
        .with_rx(peripherals.GPIO18)
        .into_async();
    let (uart_rx, uart_tx) = uart.split();

    // USB Serial JTAG carries the host side of the bridge
    let usb_serial = UsbSerialJtag::new(peripherals.USB_DEVICE).into_async();
    let (usb_rx, usb_tx) = usb_serial.split();

    let usb_link = IoLink::new(usb_rx, usb_tx);
    let uart_link = IoLink::new(uart_rx, uart_tx);

    // Create and run the embassy executor
    let executor = EXECUTOR.init(esp_rtos::embassy::Executor::new());
    executor.run(|spawner| {
        spawner.must_spawn(bridge_task(sequencer, usb_link, uart_link));
    })
}

/// Resets the attached device into download mode, then relays bytes
/// between USB and UART forever
#[embassy_executor::task]
async fn bridge_task(mut sequencer: BootSequencer, mut usb: UsbLink, mut uart: UartLink) {
    // Download mode by convention: the host on the USB side talks to the
    // attached device's bootloader. No feedback channel exists, so a pin
    // failure is only logged.
    if sequencer.enter_download_mode().await.is_err() {
        log::error!("boot sequencer could not drive NRST/BOOT0");
    }

    let mut bridge = Bridge::new(BridgeConfig::default());
    bridge.run(&mut usb, &mut uart, &STOP).await;
}
