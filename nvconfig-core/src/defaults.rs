//! Payload default initialization
//!
//! When the stored blob is stale, the header is rewritten by the store
//! itself and the payload is handed to a [`PayloadDefaults`] hook before
//! anything is written back.

/// Fills the payload region with default contents
pub trait PayloadDefaults {
    /// Overwrite `payload` with defaults
    ///
    /// `payload` is the whole region after the header; its length is the
    /// blob size minus [`HEADER_LEN`](crate::blob::HEADER_LEN).
    fn init_payload(&mut self, payload: &mut [u8]);
}

/// Zero-fills the payload
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroPayload;

impl PayloadDefaults for ZeroPayload {
    fn init_payload(&mut self, payload: &mut [u8]) {
        payload.fill(0);
    }
}

/// Fills the payload with a fixed byte
#[derive(Debug, Clone, Copy)]
pub struct FillPayload(pub u8);

impl PayloadDefaults for FillPayload {
    fn init_payload(&mut self, payload: &mut [u8]) {
        payload.fill(self.0);
    }
}

/// Leaves whatever was loaded in place
///
/// Only the header is reset, so payload bytes from an older schema are
/// written back unchanged. Use when the payload layout is known to be
/// compatible across the versions being replaced.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepPayload;

impl PayloadDefaults for KeepPayload {
    fn init_payload(&mut self, _payload: &mut [u8]) {}
}

impl<F: FnMut(&mut [u8])> PayloadDefaults for F {
    fn init_payload(&mut self, payload: &mut [u8]) {
        self(payload)
    }
}
