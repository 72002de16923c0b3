//! X.690 section 8.1.3 length octets.

use {
    crate::{ensure_err, Malformed},
    bytes::Buf,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Length {
    Definite(usize),
    /// Contents run until an end-of-contents marker (BER only).
    Indefinite,
}

impl Length {
    /// Reads the length octets. The flag is false when the definite form did
    /// not use the minimal number of octets.
    pub(super) fn decode<B: Buf>(buffer: &mut B) -> Result<(Self, bool), Malformed> {
        ensure_err!(buffer.has_remaining(), Malformed::TruncatedLength);
        let first = buffer.get_u8();
        if first < 0x80 {
            return Ok((Self::Definite(first.into()), true));
        }
        const BYTES: usize = usize::BITS as usize / 8;
        let len = usize::from(first & 0x7f);
        if len == 0 {
            return Ok((Self::Indefinite, true));
        }
        ensure_err!(len != 0x7f, Malformed::ReservedLength);
        ensure_err!(buffer.remaining() >= len, Malformed::TruncatedLength);
        let bytes = buffer.copy_to_bytes(len);
        let trim = bytes.iter().position(|&b| b != 0).unwrap_or(len);
        let significant = &bytes[trim..];
        ensure_err!(significant.len() <= BYTES, Malformed::LengthTooLarge);
        let mut be = [0; BYTES];
        be[BYTES - significant.len()..].copy_from_slice(significant);
        let value = usize::from_be_bytes(be);
        Ok((Self::Definite(value), trim == 0 && value >= 0x80))
    }
}
