//! Decoding of TLV encoded identity records into numbered text fields.
//!
//! Identity documents such as the personal data group (DG13) of a chip
//! based identity card carry their fields as ASN.1 BER/DER. Each field is a
//! `SEQUENCE { INTEGER id, value... }` somewhere in the structure, and the
//! value holds the text directly or wrapped in an octet string.
//!
//! ```
//! let fields = identity_tlv::parse(&[
//!     0x31, 0x0a, 0x30, 0x08, 0x02, 0x01, 0x04, 0x0c, 0x03, b'N', b'a', b'm',
//! ])?;
//! assert_eq!(fields.get(4), Some(&["Nam".to_owned()][..]));
//! # Ok::<(), identity_tlv::Error>(())
//! ```
//!
//! The [`ber`] module decodes bytes into a [`Node`] tree and knows nothing
//! about fields. The [`fields`] module walks a tree and collects the strings
//! of every field into a [`FieldMap`].

pub mod ber;
mod error;
pub mod fields;

pub use self::{
    ber::{BerCodec, Class, Integer, Leniency, Node, StringKind, Tag, DEFAULT_MAX_DEPTH},
    error::{Error, Malformed, Result},
    fields::{Collector, FieldMap, IdentityField},
};
use base64::{prelude::BASE64_STANDARD, Engine};

#[macro_export]
macro_rules! ensure_err {
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return Err($err.into());
        }
    };
}

/// Decodes a BER/DER buffer holding exactly one element.
pub fn decode(bytes: &[u8]) -> Result<Node> {
    BerCodec::default().decode(bytes)
}

pub fn collect_fields(root: &Node) -> FieldMap {
    Collector::default().collect(root)
}

pub fn extract_strings(node: &Node) -> Vec<String> {
    Collector::default().extract_strings(node)
}

/// Decodes `bytes` and collects its fields. Only a malformed top-level
/// encoding is an error.
pub fn parse(bytes: &[u8]) -> Result<FieldMap> {
    let root = decode(bytes)?;
    Ok(collect_fields(&root))
}

/// Like [`parse`], for a record in Base64 text transport. ASCII whitespace,
/// such as line breaks, is ignored.
pub fn parse_base64(text: &str) -> Result<FieldMap> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = BASE64_STANDARD.decode(compact)?;
    parse(&bytes)
}
