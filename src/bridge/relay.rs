//! The bridge loop: half-duplex byte relay between two transports
//!
//! A single task services both directions. Each iteration does a
//! bounded-wait read from the USB side and forwards whatever arrived to
//! the UART side, then the same in the opposite direction. The bounded
//! wait keeps either direction from starving the other while avoiding a
//! busy poll; worst-case added latency per direction is one wait period.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::bridge::transport::Transport;
use crate::config::bridge::{BUF_SIZE, READ_TIMEOUT_MS};

/// Bridge loop configuration
#[derive(Debug, Clone, Copy)]
pub struct BridgeConfig {
    /// Upper bound on each bounded-wait read, in milliseconds
    pub read_timeout_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            read_timeout_ms: READ_TIMEOUT_MS,
        }
    }
}

/// Cooperative stop signal, checked once per loop iteration
///
/// The firmware never requests a stop (the loop runs until power-cycle);
/// this exists so tests and host deployments can shut the loop down
/// deterministically.
pub struct StopFlag(AtomicBool);

impl StopFlag {
    /// Create a flag in the running state
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Request the bridge loop to exit after its current iteration
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for StopFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters for relayed traffic
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    /// Bytes successfully relayed from the USB side to the UART side
    pub usb_to_uart_bytes: u64,
    /// Bytes successfully relayed from the UART side to the USB side
    pub uart_to_usb_bytes: u64,
    /// Chunks discarded because a write or flush failed
    pub dropped_chunks: u32,
}

/// Relay direction, used for stats accounting and log labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    UsbToUart,
    UartToUsb,
}

impl Direction {
    fn label(self) -> &'static str {
        match self {
            Direction::UsbToUart => "usb->uart",
            Direction::UartToUsb => "uart->usb",
        }
    }
}

/// Transparent byte bridge between two transports
pub struct Bridge {
    config: BridgeConfig,
    stats: BridgeStats,
}

impl Bridge {
    /// Create a new bridge with the given configuration
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            stats: BridgeStats::default(),
        }
    }

    /// Traffic counters accumulated so far
    pub fn stats(&self) -> BridgeStats {
        self.stats
    }

    /// Run the relay loop until `stop` is set
    ///
    /// The transfer buffer lives for the whole run and is reused by both
    /// directions; only one direction touches it at a time since the loop
    /// is strictly sequential.
    pub async fn run<U: Transport, S: Transport>(
        &mut self,
        usb: &mut U,
        uart: &mut S,
        stop: &StopFlag,
    ) {
        let mut buf = [0u8; BUF_SIZE];

        log::info!(
            "bridge running: chunk capacity {} bytes, read timeout {} ms",
            BUF_SIZE,
            self.config.read_timeout_ms
        );

        while !stop.is_set() {
            self.run_iteration(usb, uart, &mut buf).await;
        }

        log::info!(
            "bridge stopped: {} bytes usb->uart, {} bytes uart->usb, {} chunks dropped",
            self.stats.usb_to_uart_bytes,
            self.stats.uart_to_usb_bytes,
            self.stats.dropped_chunks
        );
    }

    /// One half-duplex service pass: USB -> UART, then UART -> USB
    async fn run_iteration<U: Transport, S: Transport>(
        &mut self,
        usb: &mut U,
        uart: &mut S,
        buf: &mut [u8; BUF_SIZE],
    ) {
        let timeout_ms = self.config.read_timeout_ms;

        match usb.read(buf, timeout_ms).await {
            // Timeout with no data: normal idle, give the other direction a turn
            Ok(0) => {}
            Ok(n) => self.forward(uart, &buf[..n], Direction::UsbToUart).await,
            Err(e) => log::warn!("usb read error: {:?}", e),
        }

        match uart.read(buf, timeout_ms).await {
            Ok(0) => {}
            Ok(n) => self.forward(usb, &buf[..n], Direction::UartToUsb).await,
            Err(e) => log::warn!("uart read error: {:?}", e),
        }
    }

    /// Write one chunk to `dest` and force it onto the wire
    ///
    /// A failed write or flush drops the chunk and the loop keeps running;
    /// the bridge holds no retry state. Drops are counted and logged.
    async fn forward<T: Transport>(&mut self, dest: &mut T, chunk: &[u8], direction: Direction) {
        let result = match dest.write_all(chunk).await {
            Ok(()) => dest.flush().await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                let count = chunk.len() as u64;
                match direction {
                    Direction::UsbToUart => self.stats.usb_to_uart_bytes += count,
                    Direction::UartToUsb => self.stats.uart_to_usb_bytes += count,
                }
            }
            Err(error) => {
                self.stats.dropped_chunks += 1;
                log::warn!(
                    "{}: dropped {} byte chunk: {:?}",
                    direction.label(),
                    chunk.len(),
                    error
                );
            }
        }
    }
}
