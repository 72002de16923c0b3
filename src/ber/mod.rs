//! Generic ASN.1 BER/DER decoding, without any knowledge of field semantics.
//!
//! Decoding happens in two passes. The input is first framed into a raw
//! tag-length-value tree, enforcing length consistency and the depth limit.
//! The raw tree is then typed into [`Node`]s: collections, integers, text,
//! octet strings and tagged values. Octet strings are never interpreted here,
//! even when they hold a nested encoding.
//!
//! Real world documents are not always DER compliant, so correctable
//! deviations are governed by a [`Leniency`] per kind in [`BerCodec`].

mod codec;
mod length;
mod node;
mod tag;
mod text;
mod tlv;

pub use self::{
    codec::{BerCodec, Leniency, DEFAULT_MAX_DEPTH},
    node::{Integer, Node},
    tag::{universal, Class, Tag},
    text::StringKind,
};
