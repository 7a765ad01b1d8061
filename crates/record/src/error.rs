/// Error is the status enumeration shared with embedders of the generated
/// metadata. Discriminants are ABI: they must stay numerically stable across
/// releases, and new statuses may only be appended.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[repr(u8)]
pub enum Error {
    #[error("object expected")]
    ObjectExpected = 1,
    #[error("unknown record")]
    UnknownRecord = 2,
    #[error("end of input expected")]
    EofExpected = 3,
    #[error("missing key")]
    MissingKey = 4,
    #[error("unterminated key")]
    UnterminatedKey = 5,
    #[error("missing value")]
    MissingValue = 6,
    #[error("unterminated object")]
    UnterminatedObject = 7,
    #[error("invalid value")]
    InvalidValue = 8,
    #[error("unterminated string")]
    UnterminatedString = 9,
    #[error("unterminated array")]
    UnterminatedArray = 10,
    #[error("invalid escape")]
    InvalidEscape = 11,
    #[error("output buffer too small")]
    ShortBuffer = 12,
}

impl Error {
    /// The wire value of this status. Zero is reserved for "ok", which Rust
    /// callers observe as `Ok(..)` instead.
    pub fn code(self) -> u8 {
        self as u8
    }
}

pub type Result<T> = std::result::Result<T, Error>;
