/// A diagnostic from the lexer or parser. All compile errors are fatal and
/// render as `<line>: <message>`; the CLI prepends the input file name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{line}: {kind}")]
pub struct Error {
    pub line: u32,
    pub kind: ErrorKind,
}

impl Error {
    pub fn new(line: u32, kind: ErrorKind) -> Self {
        Self { line, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    #[error("invalid character in input: {0}")]
    InvalidCharacter(String),

    #[error("no digits in hexadecimal constant")]
    EmptyHexConstant,

    #[error("no digits in exponent")]
    EmptyExponent,

    #[error("invalid integer suffix")]
    InvalidIntegerSuffix,

    #[error("invalid float suffix")]
    InvalidFloatSuffix,

    #[error("unterminated string")]
    UnterminatedString,

    #[error("unterminated comment")]
    UnterminatedComment,

    #[error("\\x used with no following hex digits")]
    EmptyHexEscape,

    #[error("\\{0} needs {1} hexadecimal digits")]
    ShortUnicodeEscape(char, usize),

    #[error("unknown escape sequence: {0}")]
    UnknownEscape(String),

    #[error("duplicate '{0}'")]
    DuplicateSign(&'static str),

    #[error("'signed' and 'unsigned' specified together")]
    ConflictingSign,

    #[error("'signed' or 'unsigned' invalid for '{0}'")]
    SignWithNonInteger(String),

    #[error("type or identifier expected")]
    TypeExpected,

    #[error("arrays of pointers are not supported")]
    ArrayOfPointers,

    #[error("{0} expected")]
    Expected(&'static str),
}
