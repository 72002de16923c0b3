use {crate::ber::StringKind, thiserror::Error};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned by the top-level decode operations.
///
/// Failures inside the field collector never surface here; a branch that
/// cannot be read simply contributes no strings.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("malformed encoding at offset {offset}: {kind}")]
    MalformedEncoding { offset: usize, kind: Malformed },

    #[error("nesting depth exceeds the limit of {limit} elements")]
    DepthExceeded { limit: usize },

    #[error("invalid base64 transport encoding: {0}")]
    Transport(#[from] base64::DecodeError),
}

/// The specific defect behind an [`Error::MalformedEncoding`].
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum Malformed {
    #[error("unexpected end of data in identifier octets")]
    TruncatedTag,

    #[error("unexpected end of data in length octets")]
    TruncatedLength,

    #[error("contents extend {missing} bytes past the end of data")]
    TruncatedContents { missing: usize },

    #[error("tag number does not fit in 32 bits")]
    TagTooLarge,

    #[error("high tag number starts with a redundant octet")]
    NonMinimalTag,

    #[error("reserved length octet 0xff")]
    ReservedLength,

    #[error("length does not fit in the address space")]
    LengthTooLarge,

    #[error("length encoding is non-canonical")]
    NonMinimalLength,

    #[error("indefinite length encoding")]
    IndefiniteLength,

    #[error("indefinite length on a primitive encoding")]
    IndefinitePrimitive,

    #[error("missing end-of-contents marker")]
    MissingEndOfContents,

    #[error("unexpected end-of-contents marker")]
    UnexpectedEndOfContents,

    #[error("SEQUENCE and SET must use the constructed encoding")]
    PrimitiveCollection,

    #[error("universal type {number} does not allow the constructed encoding")]
    UnexpectedConstructed { number: u32 },

    #[error("constructed encoding of a string type")]
    ConstructedString,

    #[error("segment of a constructed string has tag {actual}, expected {expected}")]
    SegmentTag { expected: u32, actual: u32 },

    #[error("malformed BIT STRING segment")]
    BitStringSegment,

    #[error("INTEGER with empty contents")]
    EmptyInteger,

    #[error("INTEGER has redundant leading octets")]
    NonMinimalInteger,

    #[error("contents are not valid {kind} text")]
    InvalidText { kind: StringKind },

    #[error("{len} bytes of trailing data after the top-level element")]
    TrailingData { len: usize },
}

impl Error {
    pub(crate) const fn malformed(offset: usize, kind: Malformed) -> Self {
        Self::MalformedEncoding { offset, kind }
    }

    /// True for the encoding errors of the decoder, as opposed to the depth
    /// guard or the transport layer.
    pub const fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedEncoding { .. })
    }
}
