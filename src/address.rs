use super::*;

pub const ADDRESS_LEN: usize = 25;
const CHECKSUM_OFFSET: usize = 21;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AddressError {
    #[snafu(display("`{input}` is not a valid address: {source}"))]
    Base58 {
        input: String,
        source: bs58::decode::Error,
    },

    #[snafu(display("`{input}` is not a valid address: expected 25 bytes, got {len}"))]
    Length { input: String, len: usize },

    #[snafu(display("`{input}` is not a valid address: checksum mismatch"))]
    Checksum { input: String },
}

/// Raw mining address: version byte, 20 payload bytes, 4 checksum bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn checksum_valid(bytes: &[u8]) -> bool {
        bytes.len() >= ADDRESS_LEN
            && double_sha256(&bytes[..CHECKSUM_OFFSET])[..4] == bytes[CHECKSUM_OFFSET..ADDRESS_LEN]
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = bs58::decode(s).into_vec().context(Base58Snafu { input: s })?;

        let bytes: [u8; ADDRESS_LEN] = decoded.as_slice().try_into().map_err(|_| {
            LengthSnafu {
                input: s,
                len: decoded.len(),
            }
            .build()
        })?;

        ensure_checksum(&bytes, s)?;

        Ok(Self(bytes))
    }
}

fn ensure_checksum(bytes: &[u8; ADDRESS_LEN], input: &str) -> Result<(), AddressError> {
    if Address::checksum_valid(bytes) {
        Ok(())
    } else {
        ChecksumSnafu { input }.fail()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.0).into_string())
    }
}
