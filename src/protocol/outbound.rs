use super::*;

/// A client-to-pool message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outbound<'a> {
    RequestTask {
        address: &'a Address,
    },
    BlockFound {
        address: &'a Address,
        header: &'a Header,
    },
}

impl Outbound<'_> {
    pub fn tag(&self) -> Tag {
        match self {
            Self::RequestTask { .. } => Tag::RequestTask,
            Self::BlockFound { .. } => Tag::BlockFound,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::RequestTask { address } => {
                let mut frame = Vec::with_capacity(1 + address::ADDRESS_LEN);
                frame.push(self.tag().into());
                frame.extend_from_slice(address.as_bytes());
                frame
            }
            Self::BlockFound { address, header } => {
                let mut frame = Vec::with_capacity(1 + address::ADDRESS_LEN + header.len());
                frame.push(self.tag().into());
                frame.extend_from_slice(address.as_bytes());
                frame.extend_from_slice(header.as_bytes());
                frame
            }
        }
    }
}
