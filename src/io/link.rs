//! Bounded-wait transport over split embedded-io endpoints
//!
//! Adapts a split rx/tx half pair to the bridge `Transport` contract.
//! Generic over the `embedded_io_async` traits, so the same implementation
//! serves the USB Serial JTAG halves and the UART halves.

use embassy_time::{with_timeout, Duration};
use embedded_io::Error as _;
use embedded_io_async::{Read, Write};

use crate::bridge::transport::{Transport, TransportError};
use crate::config::bridge::WRITE_TIMEOUT_MS;

/// One side of the bridge: a receive half paired with a transmit half
pub struct IoLink<R, W> {
    rx: R,
    tx: W,
}

impl<R, W> IoLink<R, W>
where
    R: Read,
    W: Write,
{
    pub fn new(rx: R, tx: W) -> Self {
        Self { rx, tx }
    }
}

impl<R, W> Transport for IoLink<R, W>
where
    R: Read,
    W: Write,
{
    async fn read(&mut self, buf: &mut [u8], timeout_ms: u64) -> Result<usize, TransportError> {
        match with_timeout(Duration::from_millis(timeout_ms), self.rx.read(buf)).await {
            Ok(Ok(n)) => Ok(n),
            Ok(Err(e)) => {
                log::warn!("link read error: {:?}", e.kind());
                Err(TransportError::Read)
            }
            // Nothing arrived within the bounded wait: normal idle
            Err(_) => Ok(0),
        }
    }

    // Writes are bounded too: with no host attached the USB TX FIFO never
    // drains, and an unbounded write_all would pend forever and stall the
    // opposite direction along with it. A timed-out chunk surfaces as a
    // write error and gets dropped by the bridge.

    async fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let deadline = Duration::from_millis(WRITE_TIMEOUT_MS);
        match with_timeout(deadline, self.tx.write_all(data)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                log::warn!("link write error: {:?}", e.kind());
                Err(TransportError::Write)
            }
            Err(_) => {
                log::warn!("link write timed out after {} ms", WRITE_TIMEOUT_MS);
                Err(TransportError::Write)
            }
        }
    }

    async fn flush(&mut self) -> Result<(), TransportError> {
        let deadline = Duration::from_millis(WRITE_TIMEOUT_MS);
        match with_timeout(deadline, self.tx.flush()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                log::warn!("link flush error: {:?}", e.kind());
                Err(TransportError::Flush)
            }
            Err(_) => {
                log::warn!("link flush timed out after {} ms", WRITE_TIMEOUT_MS);
                Err(TransportError::Flush)
            }
        }
    }
}
