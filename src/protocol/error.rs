use super::*;

/// Why an inbound frame was dropped. None of these tear down the connection.
#[derive(Debug, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum FrameError {
    #[snafu(display("empty frame"))]
    Empty,

    #[snafu(display("unknown tag {tag:#04x}"))]
    UnknownTag { tag: u8 },

    #[snafu(display("unexpected {tag} from pool"))]
    UnexpectedTag { tag: Tag },

    #[snafu(display("{tag} frame truncated: need {needed} bytes, got {available}"))]
    Truncated {
        tag: Tag,
        needed: usize,
        available: usize,
    },

    #[snafu(display(
        "header of {len} bytes is shorter than the {} required for the nonce fields",
        header::MIN_LEN
    ))]
    HeaderTooShort { len: usize },
}
