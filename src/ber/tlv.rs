//! Framing of the input into a raw tag-length-value tree.
//!
//! No contents are interpreted here beyond what is needed to find element
//! boundaries; typing happens when the tree is converted into [`Node`]s.
//!
//! [`Node`]: super::Node

use {
    super::{codec::lenient, length::Length, universal, BerCodec, Tag},
    crate::{ensure_err, Error, Malformed, Result},
    bytes::{Buf, Bytes},
};

pub(super) struct Tlv {
    pub tag:    Tag,
    /// Position of the identifier octets.
    pub offset: usize,
    pub body:   Body,
}

pub(super) enum Body {
    Primitive(Bytes),
    Constructed(Vec<Tlv>),
}

/// Byte cursor that knows its absolute position in the decoded buffer.
pub(super) struct Reader {
    buf:  Bytes,
    base: usize,
    len:  usize,
}

impl Reader {
    pub fn new(buf: Bytes, base: usize) -> Self {
        let len = buf.len();
        Self { buf, base, len }
    }

    pub fn position(&self) -> usize {
        self.base + self.len - self.buf.remaining()
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    pub fn has_remaining(&self) -> bool {
        self.buf.has_remaining()
    }

    fn at_end_of_contents(&self) -> bool {
        self.buf.starts_with(&[0, 0])
    }

    fn malformed(&self, kind: Malformed) -> Error {
        Error::malformed(self.position(), kind)
    }
}

impl BerCodec {
    pub(super) fn read_tlv(&self, reader: &mut Reader, depth: usize) -> Result<Tlv> {
        ensure_err!(depth < self.max_depth, Error::DepthExceeded {
            limit: self.max_depth,
        });

        let offset = reader.position();
        let tag = Tag::decode(&mut reader.buf).map_err(|kind| Error::malformed(offset, kind))?;
        ensure_err!(
            !tag.is_universal(universal::END_OF_CONTENTS),
            Error::malformed(offset, Malformed::UnexpectedEndOfContents)
        );

        let length_offset = reader.position();
        let (length, canonical) =
            Length::decode(&mut reader.buf).map_err(|kind| Error::malformed(length_offset, kind))?;
        if !canonical {
            lenient(
                self.non_minimal_length,
                length_offset,
                Malformed::NonMinimalLength,
            )?;
        }

        let body = match length {
            Length::Definite(len) => {
                let start = reader.position();
                ensure_err!(
                    reader.remaining() >= len,
                    reader.malformed(Malformed::TruncatedContents {
                        missing: len - reader.remaining(),
                    })
                );
                let contents = reader.buf.copy_to_bytes(len);
                if tag.constructed {
                    let mut inner = Reader::new(contents, start);
                    let mut children = Vec::new();
                    while inner.has_remaining() {
                        children.push(self.read_tlv(&mut inner, depth + 1)?);
                    }
                    Body::Constructed(children)
                } else {
                    Body::Primitive(contents)
                }
            }
            Length::Indefinite => {
                ensure_err!(
                    tag.constructed,
                    Error::malformed(length_offset, Malformed::IndefinitePrimitive)
                );
                lenient(
                    self.indefinite_length,
                    length_offset,
                    Malformed::IndefiniteLength,
                )?;
                let mut children = Vec::new();
                while !reader.at_end_of_contents() {
                    ensure_err!(
                        reader.has_remaining(),
                        reader.malformed(Malformed::MissingEndOfContents)
                    );
                    children.push(self.read_tlv(reader, depth + 1)?);
                }
                reader.buf.advance(2);
                Body::Constructed(children)
            }
        };

        Ok(Tlv { tag, offset, body })
    }
}

impl Tlv {
    /// Collects the primitive segments of a segmented string in order. Every
    /// segment must carry the universal tag of the outer string.
    pub fn segments(self, number: u32, out: &mut Vec<Bytes>) -> Result<()> {
        match self.body {
            Body::Primitive(contents) => out.push(contents),
            Body::Constructed(children) => {
                for child in children {
                    ensure_err!(
                        child.tag.is_universal(number),
                        Error::malformed(child.offset, Malformed::SegmentTag {
                            expected: number,
                            actual:   child.tag.number,
                        })
                    );
                    child.segments(number, out)?;
                }
            }
        }
        Ok(())
    }
}
