//! Character string types, X.680 section 41.

use {
    num_enum::{IntoPrimitive, TryFromPrimitive},
    std::fmt::{self, Display, Formatter},
};

/// The universal string types, keyed by their tag number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum StringKind {
    Utf8 = 12,
    Numeric = 18,
    Printable = 19,
    Teletex = 20,
    Videotex = 21,
    Ia5 = 22,
    Graphic = 25,
    Visible = 26,
    General = 27,
    Universal = 28,
    Bmp = 30,
}

impl StringKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Utf8 => "UTF8String",
            Self::Numeric => "NumericString",
            Self::Printable => "PrintableString",
            Self::Teletex => "TeletexString",
            Self::Videotex => "VideotexString",
            Self::Ia5 => "IA5String",
            Self::Graphic => "GraphicString",
            Self::Visible => "VisibleString",
            Self::General => "GeneralString",
            Self::Universal => "UniversalString",
            Self::Bmp => "BMPString",
        }
    }

    /// Decodes the contents according to the declared character encoding.
    ///
    /// The 8-bit types are read as ISO 8859-1, which is exact for their
    /// ASCII repertoire and maps the remaining octets one to one.
    pub fn decode(self, contents: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => std::str::from_utf8(contents).ok().map(str::to_owned),
            Self::Bmp => {
                if contents.len() % 2 != 0 {
                    return None;
                }
                let units = contents
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
                char::decode_utf16(units).collect::<Result<_, _>>().ok()
            }
            Self::Universal => {
                if contents.len() % 4 != 0 {
                    return None;
                }
                contents
                    .chunks_exact(4)
                    .map(|quad| u32::from_be_bytes([quad[0], quad[1], quad[2], quad[3]]))
                    .map(char::from_u32)
                    .collect()
            }
            _ => Some(contents.iter().copied().map(char::from).collect()),
        }
    }
}

impl Display for StringKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
