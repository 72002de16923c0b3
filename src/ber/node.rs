use {
    super::{StringKind, Tag},
    bytes::Bytes,
    const_oid::{db::DB, ObjectIdentifier},
    std::fmt::{self, Display, Formatter},
};

/// One decoded TLV element.
///
/// Every node owns the contents it was decoded from; the tree has no shared
/// or cyclic structure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// Application, context-specific or private tag. `inner` is always the
    /// fully decoded content, whether the tagging was explicit or implicit.
    Tagged { tag: Tag, inner: Box<Node> },
    Sequence(Vec<Node>),
    /// Kept in encoded order.
    Set(Vec<Node>),
    Integer(Integer),
    Text { kind: StringKind, value: String },
    /// Opaque payload, possibly a nested encoding.
    OctetString(Bytes),
    ObjectIdentifier(ObjectIdentifier),
    /// Any other universal primitive, kept as raw contents.
    Other { tag: Tag, contents: Bytes },
}

/// An INTEGER of arbitrary size as two's-complement big-endian contents.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Integer(Bytes);

impl Node {
    /// A UTF8String node.
    pub fn utf8(value: impl Into<String>) -> Self {
        Self::Text {
            kind:  StringKind::Utf8,
            value: value.into(),
        }
    }

    pub fn integer(value: i64) -> Self {
        Self::Integer(value.into())
    }

    pub fn tagged(tag: Tag, inner: Self) -> Self {
        Self::Tagged {
            tag,
            inner: Box::new(inner),
        }
    }

    fn fmt_indented(&self, f: &mut Formatter, indent: usize) -> fmt::Result {
        write!(f, "{:indent$}", "", indent = indent * 2)?;
        match self {
            Self::Tagged { tag, inner } => {
                writeln!(f, "{tag}")?;
                inner.fmt_indented(f, indent + 1)
            }
            Self::Sequence(children) | Self::Set(children) => {
                let name = if matches!(self, Self::Set(_)) {
                    "SET"
                } else {
                    "SEQUENCE"
                };
                writeln!(f, "{name} ({} elements)", children.len())?;
                children
                    .iter()
                    .try_for_each(|child| child.fmt_indented(f, indent + 1))
            }
            Self::Integer(value) => writeln!(f, "INTEGER {value}"),
            Self::Text { kind, value } => writeln!(f, "{kind} {value:?}"),
            Self::OctetString(bytes) => {
                writeln!(f, "OCTET STRING ({} bytes) {}", bytes.len(), hex::encode(bytes))
            }
            Self::ObjectIdentifier(oid) => match DB.by_oid(oid) {
                Some(name) => writeln!(f, "OBJECT IDENTIFIER {oid} ({name})"),
                None => writeln!(f, "OBJECT IDENTIFIER {oid}"),
            },
            Self::Other { tag, contents } => writeln!(f, "{tag} {}", hex::encode(contents)),
        }
    }
}

/// Renders the tree with one element per line.
impl Display for Node {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

impl Integer {
    /// Contents must be non-empty.
    pub(super) const fn from_contents(contents: Bytes) -> Self {
        Self(contents)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0.first().is_some_and(|b| b & 0x80 != 0)
    }

    pub fn to_i64(&self) -> Option<i64> {
        let bytes = self.as_bytes();
        let fill = if self.is_negative() { 0xff } else { 0x00 };
        let excess = bytes.len().saturating_sub(8);
        let (sign, tail) = bytes.split_at(excess);
        if sign.iter().any(|&b| b != fill) || tail.first().is_some_and(|&b| (b ^ fill) & 0x80 != 0) {
            return None;
        }
        let mut be = [fill; 8];
        be[8 - tail.len()..].copy_from_slice(tail);
        Some(i64::from_be_bytes(be))
    }

    pub fn to_i32(&self) -> Option<i32> {
        self.to_i64()?.try_into().ok()
    }
}

/// Minimal two's-complement encoding.
impl From<i64> for Integer {
    fn from(value: i64) -> Self {
        let be = value.to_be_bytes();
        let fill = if value < 0 { 0xff } else { 0x00 };
        let mut start = 0;
        while start < 7 && be[start] == fill && (be[start + 1] ^ fill) & 0x80 == 0 {
            start += 1;
        }
        Self(Bytes::copy_from_slice(&be[start..]))
    }
}

impl Display for Integer {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.to_i64() {
            Some(value) => write!(f, "{value}"),
            None => write!(f, "0x{}", hex::encode(self.as_bytes())),
        }
    }
}
