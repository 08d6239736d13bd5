use super::*;

/// The locally incremented 40-bit "nonce-low" counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct NonceCounter(u64);

impl NonceCounter {
    pub const BYTES: usize = 5;
    pub const MAX: Self = Self(0xff_ffff_ffff);
    pub const ZERO: Self = Self(0);

    /// Returns `None` if `value` does not fit in 40 bits.
    pub fn new(value: u64) -> Option<Self> {
        (value <= Self::MAX.0).then_some(Self(value))
    }

    /// Next counter value, wrapping from `MAX` to zero.
    #[must_use]
    pub fn next(self) -> Self {
        if self.0 < Self::MAX.0 {
            Self(self.0 + 1)
        } else {
            Self::ZERO
        }
    }

    /// Number of increments from `earlier` to `self`, modulo 2^40.
    pub fn distance_from(self, earlier: Self) -> u64 {
        self.0.wrapping_sub(earlier.0) & Self::MAX.0
    }
}

impl From<NonceCounter> for u64 {
    fn from(counter: NonceCounter) -> u64 {
        counter.0
    }
}

impl fmt::Display for NonceCounter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:010x}", self.0)
    }
}
