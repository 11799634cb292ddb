#![cfg_attr(not(test), no_std)]

pub mod boot;
pub mod bridge;
pub mod config;

// Hardware-backed transports depend on esp-hal/embassy features only
// available with the embedded feature
#[cfg(feature = "embedded")]
pub mod io;
