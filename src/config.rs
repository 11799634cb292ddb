//! Hardware configuration constants for the ESP32-S3 USB-UART bridge

/// Boot-mode sequencer pins driving the attached device
pub mod boot {
    /// NRST: active-low reset line of the attached device
    pub const NRST_PIN: u8 = 7;

    /// BOOT0: boot source select (HIGH = system bootloader)
    pub const BOOT0_PIN: u8 = 8;

    /// How long NRST is held low so the attached device's reset circuit
    /// settles reliably
    pub const SETTLE_DELAY_MS: u32 = 20;
}

/// UART link to the attached device
///
/// 8 data bits, 1 stop bit, no hardware flow control (RTS/CTS unused).
pub mod uart {
    pub const BAUD_RATE: u32 = 115_200;
    pub const TX_PIN: u8 = 17;
    pub const RX_PIN: u8 = 18;
}

/// Bridge loop tuning
pub mod bridge {
    /// Transfer buffer capacity, shared by both directions
    pub const BUF_SIZE: usize = 512;

    /// Upper bound on a single bounded-wait read; caps the added latency
    /// each direction can impose on the other
    pub const READ_TIMEOUT_MS: u64 = 500;

    /// Upper bound on a single write or flush into a transport. The USB
    /// Serial JTAG TX FIFO stops draining when no host is attached, so an
    /// unbounded write would stall the whole loop.
    pub const WRITE_TIMEOUT_MS: u64 = 500;
}
