pub mod bcd;
pub mod checksum;
pub mod layout;
pub mod save;
pub mod text;

pub use save::{gen, SAVE_SIZE};

#[derive(thiserror::Error, Debug)]
pub enum EncodeError {
    #[error("character {0:?} is not available in the character set")]
    UnsupportedCharacter(char),

    #[error("insufficient reserved space: need {required} bytes, have {reserved}")]
    InsufficientSpace { required: usize, reserved: usize },

    #[error("value {value} does not fit in {width} bytes of binary coded decimal")]
    ValueTooLarge { value: u64, width: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl EncodeError {
    /// Whether the error was caused by the values passed in, as opposed to the sink.
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, EncodeError::Io(_))
    }
}
