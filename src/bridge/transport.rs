//! Transport trait for abstraction and testability
//!
//! This trait defines the interface the bridge loop requires from each of
//! its two endpoints, allowing the real peripheral drivers to be swapped
//! with mocks for testing.

use core::future::Future;

/// Errors that can occur during transport operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// Read from the peripheral failed
    Read,
    /// Write into the peripheral failed
    Write,
    /// Forcing queued output onto the wire failed
    Flush,
}

/// Abstract byte-stream endpoint for the bridge
///
/// Implemented by the USB Serial JTAG and UART halves on hardware, and by
/// an in-memory mock in tests.
pub trait Transport {
    /// Bounded-wait read into `buf`
    ///
    /// Blocks until data arrives or `timeout_ms` elapses, whichever comes
    /// first. Returns `Ok(0)` on timeout with no data, which is the normal
    /// idle condition rather than an error.
    fn read(
        &mut self,
        buf: &mut [u8],
        timeout_ms: u64,
    ) -> impl Future<Output = Result<usize, TransportError>>;

    /// Write all of `data` into the transport
    fn write_all(&mut self, data: &[u8]) -> impl Future<Output = Result<(), TransportError>>;

    /// Force any buffered output to be physically transmitted
    fn flush(&mut self) -> impl Future<Output = Result<(), TransportError>>;
}
