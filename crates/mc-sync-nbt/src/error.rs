use thiserror::Error;

#[derive(Debug, Error)]
pub enum NbtError {
    #[error("tag data truncated: needed {needed} byte(s), {remaining} left")]
    Truncated { needed: usize, remaining: usize },

    #[error("slot tag must start with a compound, found type {0}")]
    RootNotCompound(u8),

    #[error("unknown tag type {0}")]
    UnknownTagType(u8),

    #[error("tag name or value is not UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("tags nested deeper than {0}")]
    TooDeep(usize),

    #[error("negative length {0}")]
    NegativeLength(i32),
}
