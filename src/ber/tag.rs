//! X.690 section 8.1.2 identifier octets.

use {
    crate::{ensure_err, Malformed},
    bytes::Buf,
    std::fmt::{self, Display, Formatter},
};

/// Universal class tag numbers, X.680 section 8.6.
pub mod universal {
    pub const END_OF_CONTENTS: u32 = 0;
    pub const BOOLEAN: u32 = 1;
    pub const INTEGER: u32 = 2;
    pub const BIT_STRING: u32 = 3;
    pub const OCTET_STRING: u32 = 4;
    pub const NULL: u32 = 5;
    pub const OBJECT_IDENTIFIER: u32 = 6;
    pub const ENUMERATED: u32 = 10;
    pub const SEQUENCE: u32 = 16;
    pub const SET: u32 = 17;
    pub const UTC_TIME: u32 = 23;
    pub const GENERALIZED_TIME: u32 = 24;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Class {
    Universal,
    Application,
    ContextSpecific,
    Private,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tag {
    pub class:       Class,
    pub constructed: bool,
    pub number:      u32,
}

impl Class {
    const fn from_identifier(byte: u8) -> Self {
        match byte >> 6 {
            0 => Self::Universal,
            1 => Self::Application,
            2 => Self::ContextSpecific,
            _ => Self::Private,
        }
    }
}

impl Tag {
    pub const fn universal(number: u32, constructed: bool) -> Self {
        Self {
            class: Class::Universal,
            constructed,
            number,
        }
    }

    pub const fn is_universal(self, number: u32) -> bool {
        matches!(self.class, Class::Universal) && self.number == number
    }

    pub(super) fn decode<B: Buf>(buffer: &mut B) -> Result<Self, Malformed> {
        ensure_err!(buffer.has_remaining(), Malformed::TruncatedTag);
        let first = buffer.get_u8();
        let class = Class::from_identifier(first);
        let constructed = first & 0x20 != 0;
        let mut number = u32::from(first & 0x1f);
        if number == 0x1f {
            // High tag number form, base-128 with continuation bit.
            number = 0;
            let mut leading = true;
            loop {
                ensure_err!(buffer.has_remaining(), Malformed::TruncatedTag);
                let byte = buffer.get_u8();
                ensure_err!(!(leading && byte == 0x80), Malformed::NonMinimalTag);
                ensure_err!(number >> 25 == 0, Malformed::TagTooLarge);
                number = (number << 7) | u32::from(byte & 0x7f);
                leading = false;
                if byte & 0x80 == 0 {
                    break;
                }
            }
        }
        Ok(Self {
            class,
            constructed,
            number,
        })
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.class {
            Class::Universal => write!(f, "[UNIVERSAL {}]", self.number),
            Class::Application => write!(f, "[APPLICATION {}]", self.number),
            Class::ContextSpecific => write!(f, "[{}]", self.number),
            Class::Private => write!(f, "[PRIVATE {}]", self.number),
        }
    }
}
