//! Small shared helpers.

pub mod digest;

pub use digest::{md5_hex, unix_now};
