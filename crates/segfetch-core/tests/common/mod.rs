#![allow(dead_code)]

pub mod range_server;

/// Deterministic test body of `len` bytes.
pub fn body(len: usize) -> Vec<u8> {
    (0u8..251).cycle().take(len).collect()
}
