//! Hardware-backed `Transport` implementations.

pub mod link;

pub use link::IoLink;
