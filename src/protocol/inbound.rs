use {super::*, super::error::*};

const NONCE: std::ops::Range<usize> = 1..9;
const TARGET: std::ops::Range<usize> = 9..41;
const HEADER_LEN: std::ops::Range<usize> = 41..45;
const HEADER_START: usize = 45;

/// A decoded pool-to-client message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    TakeTask(Task),
    Accepted,
    Suspend,
    Error,
}

impl Inbound {
    pub fn decode(frame: &[u8]) -> Result<Self, FrameError> {
        let (&byte, _) = frame.split_first().context(EmptySnafu)?;

        let tag = Tag::from_byte(byte).context(UnknownTagSnafu { tag: byte })?;

        match tag {
            Tag::TakeTask => Self::decode_take_task(frame),
            Tag::Accepted => Ok(Self::Accepted),
            Tag::Suspend => Ok(Self::Suspend),
            Tag::Error => Ok(Self::Error),
            Tag::RequestTask | Tag::BlockFound => UnexpectedTagSnafu { tag }.fail(),
        }
    }

    pub fn tag(&self) -> Tag {
        match self {
            Self::TakeTask(_) => Tag::TakeTask,
            Self::Accepted => Tag::Accepted,
            Self::Suspend => Tag::Suspend,
            Self::Error => Tag::Error,
        }
    }

    fn decode_take_task(frame: &[u8]) -> Result<Self, FrameError> {
        ensure_len(frame, HEADER_START)?;

        let len = BigEndian::read_u32(&frame[HEADER_LEN]) as usize;
        let end = HEADER_START.saturating_add(len);

        ensure_len(frame, end)?;

        let mut nonce = [0u8; 8];
        nonce.copy_from_slice(&frame[NONCE]);

        let mut target = [0u8; 32];
        target.copy_from_slice(&frame[TARGET]);

        let header =
            Header::new(frame[HEADER_START..end].to_vec()).context(HeaderTooShortSnafu { len })?;

        Ok(Self::TakeTask(Task::new(
            nonce,
            Some(Target::from_be_bytes(target)),
            header,
        )))
    }
}

fn ensure_len(frame: &[u8], needed: usize) -> Result<(), FrameError> {
    if frame.len() < needed {
        return TruncatedSnafu {
            tag: Tag::TakeTask,
            needed,
            available: frame.len(),
        }
        .fail();
    }

    Ok(())
}
