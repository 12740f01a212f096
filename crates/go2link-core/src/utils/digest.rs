use chrono::Utc;
use md5::{Digest, Md5};

/// Lowercase hex MD5 digest, the form the remote service compares against.
pub fn md5_hex(input: &[u8]) -> String {
    format!("{:x}", Md5::digest(input))
}

/// Current Unix time in seconds
pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}
