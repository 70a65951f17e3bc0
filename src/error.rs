//! Error types for script, address, codec and signing operations

use thiserror::Error;

/// Failures decoding hex or the binary transaction format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("Truncated {field}: needed {needed} bytes, {remaining} remaining")]
    Truncated {
        field: &'static str,
        needed: usize,
        remaining: usize,
    },

    #[error("{0} trailing bytes after lock time")]
    TrailingBytes(usize),

    #[error("Non-canonical varint for {field}: {value} encoded with a wider prefix")]
    NonCanonicalVarint { field: &'static str, value: u64 },

    #[error("Length {0} does not fit in memory")]
    LengthOverflow(u64),
}

/// Failures decoding a base58check address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid base58: {0}")]
    InvalidBase58(String),

    #[error("Decoded address is {0} bytes, expected 25")]
    BadLength(usize),

    #[error("Address checksum mismatch")]
    BadChecksum,

    #[error("Unsupported address version byte 0x{0:02x}")]
    UnsupportedVersion(u8),
}

/// Failures producing a signature.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignError {
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Input index {index} out of range for {inputs} inputs")]
    InputIndexOutOfRange { index: usize, inputs: usize },
}

/// Output values outside the representable money range.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("Output {output} would carry negative value {value}")]
    NegativeOutput { output: usize, value: i64 },

    #[error("Value {0} out of range")]
    OutOfRange(i64),
}

#[derive(Error, Debug)]
pub enum HashLockError {
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Address error: {0}")]
    Address(#[from] AddressError),

    #[error("Signing input {input} failed: {source}")]
    Sign {
        input: usize,
        #[source]
        source: SignError,
    },

    #[error("Key error: {0}")]
    Key(SignError),

    #[error("Value error: {0}")]
    Value(#[from] ValueError),

    #[error("Script execution failed: {0}")]
    ScriptExecution(String),

    #[error("Input {input} does not satisfy its locking script: {reason}")]
    Verification { input: usize, reason: String },

    #[error("Funding transaction has no output {0}")]
    MissingOutput(u32),

    #[error("Unsupported locking script: {0}")]
    UnsupportedScript(String),
}

impl HashLockError {
    /// Wrap a signing failure with the index of the input being signed.
    pub fn signing(input: usize, source: SignError) -> Self {
        HashLockError::Sign { input, source }
    }
}

pub type Result<T> = std::result::Result<T, HashLockError>;
