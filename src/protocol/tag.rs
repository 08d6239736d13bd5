use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[repr(u8)]
pub enum Tag {
    #[display("REQUEST_TASK")]
    RequestTask = 0x00,
    #[display("TAKE_TASK")]
    TakeTask = 0x01,
    #[display("BLOCK_FOUND")]
    BlockFound = 0x02,
    #[display("ACCEPTED")]
    Accepted = 0xf0,
    #[display("SUSPEND")]
    Suspend = 0xfe,
    #[display("ERROR")]
    Error = 0xff,
}

impl Tag {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::RequestTask),
            0x01 => Some(Self::TakeTask),
            0x02 => Some(Self::BlockFound),
            0xf0 => Some(Self::Accepted),
            0xfe => Some(Self::Suspend),
            0xff => Some(Self::Error),
            _ => None,
        }
    }
}

impl From<Tag> for u8 {
    fn from(tag: Tag) -> u8 {
        tag as u8
    }
}
