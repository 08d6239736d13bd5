use super::*;

/// A 32-byte big-endian difficulty threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Target([u8; 32]);

impl Target {
    pub const MAX: Self = Self([0xff; 32]);
    pub const ZERO: Self = Self([0; 32]);

    pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn to_be_bytes(self) -> [u8; 32] {
        self.0
    }

    /// A hash meets the target iff it is numerically `<=` the target.
    /// Both are fixed-width big-endian, so byte order comparison is exact.
    pub fn is_met_by(&self, hash: &[u8; 32]) -> bool {
        hash <= &self.0
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}
