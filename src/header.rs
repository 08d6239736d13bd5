//! Block header buffer with the two nonce fields at fixed offsets.

use super::*;

/// Offset of the embedded target, `[41, 73)`.
pub const TARGET_OFFSET: usize = 41;
/// Offset of the pool-assigned nonce-raw field, `[73, 76)`.
pub const NONCE_RAW_OFFSET: usize = 73;
/// Offset of the 5-byte big-endian nonce-low counter, `[76, 81)`.
pub const NONCE_LOW_OFFSET: usize = 76;
/// Smallest header that can hold both nonce fields.
pub const MIN_LEN: usize = NONCE_LOW_OFFSET + NonceCounter::BYTES;

const NONCE_RAW_LEN: usize = NONCE_LOW_OFFSET - NONCE_RAW_OFFSET;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header(Vec<u8>);

impl Header {
    /// Returns `None` if `bytes` is too short for the nonce fields.
    pub fn new(bytes: Vec<u8>) -> Option<Self> {
        (bytes.len() >= MIN_LEN).then_some(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copies the leading bytes of the task nonce into the nonce-raw field.
    /// The remainder of the 8-byte task nonce would land on the nonce-low
    /// field, which the counter always overwrites.
    pub fn set_nonce_raw(&mut self, nonce: &[u8; 8]) {
        self.0[NONCE_RAW_OFFSET..NONCE_LOW_OFFSET].copy_from_slice(&nonce[..NONCE_RAW_LEN]);
    }

    pub fn set_nonce_low(&mut self, counter: NonceCounter) {
        BigEndian::write_uint(
            &mut self.0[NONCE_LOW_OFFSET..MIN_LEN],
            counter.into(),
            NonceCounter::BYTES,
        );
    }

    pub fn nonce_low(&self) -> NonceCounter {
        NonceCounter::new(BigEndian::read_uint(
            &self.0[NONCE_LOW_OFFSET..MIN_LEN],
            NonceCounter::BYTES,
        ))
        .unwrap_or_default()
    }

    /// The target the header carries itself at `[41, 73)`.
    pub fn embedded_target(&self) -> Target {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&self.0[TARGET_OFFSET..NONCE_RAW_OFFSET]);
        Target::from_be_bytes(bytes)
    }

    pub fn hash(&self) -> [u8; 32] {
        double_sha256(&self.0)
    }
}
