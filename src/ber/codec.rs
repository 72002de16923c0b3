//! Decoding of BER, and its DER subset, into a [`Node`] tree.
use {
    super::{
        tlv::{Body, Reader, Tlv},
        universal, Class, Integer, Node, StringKind, Tag,
    },
    crate::{ensure_err, Error, Malformed, Result},
    bytes::Bytes,
    const_oid::ObjectIdentifier,
    tracing::{debug, warn},
};

/// How to handle correctable errors when decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Leniency {
    /// Correct errors
    Allow,

    /// Correct, but log a warning.
    Warn,

    /// Be strict and return an error.
    Strict,
}

/// Decoder settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BerCodec {
    /// Non-canonical length encoding.
    pub non_minimal_length: Leniency,

    /// Indefinite length constructed encodings.
    pub indefinite_length: Leniency,

    /// Leading zeros in integers.
    pub leading_zeros: Leniency,

    /// Segmented (constructed) octet and character strings.
    pub constructed_strings: Leniency,

    /// Bytes following the top-level element.
    pub trailing_data: Leniency,

    /// Maximum number of nested elements.
    pub max_depth: usize,
}

pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default behaviour is to read BER and warn about anything outside DER.
/// Trailing data is always an error.
impl Default for BerCodec {
    fn default() -> Self {
        Self {
            non_minimal_length:  Leniency::Warn,
            indefinite_length:   Leniency::Warn,
            leading_zeros:       Leniency::Warn,
            constructed_strings: Leniency::Warn,
            trailing_data:       Leniency::Strict,
            max_depth:           DEFAULT_MAX_DEPTH,
        }
    }
}

pub(super) fn lenient(leniency: Leniency, offset: usize, kind: Malformed) -> Result<()> {
    match leniency {
        Leniency::Strict => Err(Error::malformed(offset, kind)),
        Leniency::Warn => {
            warn!(offset, "{kind}");
            Ok(())
        }
        Leniency::Allow => Ok(()),
    }
}

impl BerCodec {
    /// Only accept Distinguished Encoding Rules.
    pub const fn der() -> Self {
        Self {
            non_minimal_length:  Leniency::Strict,
            indefinite_length:   Leniency::Strict,
            leading_zeros:       Leniency::Strict,
            constructed_strings: Leniency::Strict,
            trailing_data:       Leniency::Strict,
            max_depth:           DEFAULT_MAX_DEPTH,
        }
    }

    /// Accept every correctable deviation without logging.
    pub const fn permissive() -> Self {
        Self {
            non_minimal_length:  Leniency::Allow,
            indefinite_length:   Leniency::Allow,
            leading_zeros:       Leniency::Allow,
            constructed_strings: Leniency::Allow,
            trailing_data:       Leniency::Allow,
            max_depth:           DEFAULT_MAX_DEPTH,
        }
    }

    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub const fn with_trailing_data(mut self, leniency: Leniency) -> Self {
        self.trailing_data = leniency;
        self
    }

    /// Decodes exactly one element spanning `data`.
    pub fn decode(&self, data: &[u8]) -> Result<Node> {
        self.decode_nested(data, 0)
    }

    /// Decodes `data` as if it were found `depth` elements deep, so that
    /// re-decoded payloads share the depth budget of their container.
    pub fn decode_nested(&self, data: &[u8], depth: usize) -> Result<Node> {
        let mut reader = Reader::new(Bytes::copy_from_slice(data), 0);
        let tlv = self.read_tlv(&mut reader, depth)?;
        if reader.has_remaining() {
            lenient(
                self.trailing_data,
                reader.position(),
                Malformed::TrailingData {
                    len: reader.remaining(),
                },
            )?;
        }
        self.to_node(tlv)
    }

    fn to_nodes(&self, children: Vec<Tlv>) -> Result<Vec<Node>> {
        children.into_iter().map(|child| self.to_node(child)).collect()
    }

    fn to_node(&self, tlv: Tlv) -> Result<Node> {
        let Tlv { tag, offset, body } = tlv;

        if tag.class != Class::Universal {
            let inner = match body {
                Body::Primitive(contents) => Node::OctetString(contents),
                Body::Constructed(children) => {
                    let mut nodes = self.to_nodes(children)?;
                    if nodes.len() == 1 {
                        nodes.swap_remove(0)
                    } else {
                        // Implicitly tagged collection
                        Node::Sequence(nodes)
                    }
                }
            };
            return Ok(Node::tagged(tag, inner));
        }

        match (tag.number, body) {
            (universal::SEQUENCE, Body::Constructed(children)) => {
                Ok(Node::Sequence(self.to_nodes(children)?))
            }
            (universal::SET, Body::Constructed(children)) => Ok(Node::Set(self.to_nodes(children)?)),
            (universal::SEQUENCE | universal::SET, Body::Primitive(_)) => {
                Err(Error::malformed(offset, Malformed::PrimitiveCollection))
            }
            (number, body @ Body::Constructed(_)) if is_segmentable(number) => {
                lenient(self.constructed_strings, offset, Malformed::ConstructedString)?;
                let mut segments = Vec::new();
                Tlv { tag, offset, body }.segments(number, &mut segments)?;
                let contents = if number == universal::BIT_STRING {
                    join_bit_string(offset, &segments)?
                } else {
                    segments.concat()
                };
                self.primitive(Tag::universal(number, false), offset, contents.into())
            }
            (number, Body::Constructed(_)) => {
                Err(Error::malformed(offset, Malformed::UnexpectedConstructed { number }))
            }
            (_, Body::Primitive(contents)) => self.primitive(tag, offset, contents),
        }
    }

    fn primitive(&self, tag: Tag, offset: usize, contents: Bytes) -> Result<Node> {
        match tag.number {
            universal::INTEGER => Ok(Node::Integer(self.integer(offset, contents)?)),
            universal::OCTET_STRING => Ok(Node::OctetString(contents)),
            universal::OBJECT_IDENTIFIER => match ObjectIdentifier::from_bytes(&contents) {
                Ok(oid) => Ok(Node::ObjectIdentifier(oid)),
                Err(err) => {
                    debug!(offset, %err, "keeping object identifier unparsed");
                    Ok(Node::Other { tag, contents })
                }
            },
            number => match StringKind::try_from(number) {
                Ok(kind) => {
                    let value = kind
                        .decode(&contents)
                        .ok_or_else(|| Error::malformed(offset, Malformed::InvalidText { kind }))?;
                    Ok(Node::Text { kind, value })
                }
                Err(_) => Ok(Node::Other { tag, contents }),
            },
        }
    }

    fn integer(&self, offset: usize, contents: Bytes) -> Result<Integer> {
        ensure_err!(
            !contents.is_empty(),
            Error::malformed(offset, Malformed::EmptyInteger)
        );
        if let &[first, second, ..] = &contents[..] {
            if (first == 0x00 && second & 0x80 == 0) || (first == 0xff && second & 0x80 != 0) {
                lenient(self.leading_zeros, offset, Malformed::NonMinimalInteger)?;
            }
        }
        Ok(Integer::from_contents(contents))
    }
}

/// Types that BER allows in segmented, constructed form.
fn is_segmentable(number: u32) -> bool {
    matches!(
        number,
        universal::BIT_STRING
            | universal::OCTET_STRING
            | universal::UTC_TIME
            | universal::GENERALIZED_TIME
    ) || StringKind::try_from(number).is_ok()
}

/// Every BIT STRING segment starts with its count of unused bits, which only
/// the last segment may set.
fn join_bit_string(offset: usize, segments: &[Bytes]) -> Result<Vec<u8>> {
    let mut unused_bits = 0;
    let mut bits = Vec::new();
    for (index, segment) in segments.iter().enumerate() {
        let Some((&unused, data)) = segment.split_first() else {
            return Err(Error::malformed(offset, Malformed::BitStringSegment));
        };
        ensure_err!(
            unused == 0 || index + 1 == segments.len(),
            Error::malformed(offset, Malformed::BitStringSegment)
        );
        unused_bits = unused;
        bits.extend_from_slice(data);
    }
    Ok(std::iter::once(unused_bits).chain(bits).collect())
}
