//! Collection of numbered text fields from a decoded tree.
//!
//! A field is a `SEQUENCE` whose first element is an `INTEGER`, the field id,
//! followed by value elements. Field sequences may be nested at any depth in
//! other sequences, sets or tagged values. Every string reachable from the
//! value elements is collected for the id, including text wrapped in octet
//! strings, which are re-decoded as nested TLV and otherwise read as UTF-8.
//!
//! Collection never fails. A branch that cannot be read contributes nothing
//! and the remaining fields are still collected.

mod field_map;
mod identity;
mod legacy;

pub use self::{field_map::FieldMap, identity::IdentityField, legacy::single_values};
use {
    crate::{BerCodec, Node},
    tracing::{debug, trace, warn},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Collector {
    /// Codec used to re-decode octet string payloads.
    pub codec: BerCodec,

    /// Log a warning when a field id is collected again, replacing the
    /// earlier strings.
    pub report_duplicates: bool,
}

impl Collector {
    pub const fn new(codec: BerCodec) -> Self {
        Self {
            codec,
            report_duplicates: false,
        }
    }

    #[must_use]
    pub const fn with_duplicate_reports(mut self, report_duplicates: bool) -> Self {
        self.report_duplicates = report_duplicates;
        self
    }

    /// Walks the tree depth-first, in pre-order.
    pub fn collect(&self, root: &Node) -> FieldMap {
        let mut fields = FieldMap::new();
        self.collect_into(root, &mut fields);
        fields
    }

    fn collect_into(&self, node: &Node, out: &mut FieldMap) {
        match node {
            Node::Tagged { inner, .. } => self.collect_into(inner, out),
            Node::Sequence(children) => {
                if let Some((Node::Integer(id), values)) = children.split_first() {
                    match id.to_i32() {
                        Some(id) => self.collect_field(id, values, out),
                        None => debug!(%id, "leading integer out of field id range"),
                    }
                }
                for child in children {
                    self.collect_into(child, out);
                }
            }
            Node::Set(children) => {
                for child in children {
                    self.collect_into(child, out);
                }
            }
            Node::Integer(_)
            | Node::Text { .. }
            | Node::OctetString(_)
            | Node::ObjectIdentifier(_)
            | Node::Other { .. } => {}
        }
    }

    /// A recurring id replaces the earlier strings, unless it has none.
    fn collect_field(&self, id: i32, values: &[Node], out: &mut FieldMap) {
        let mut strings = Vec::new();
        for value in values {
            self.extract_into(value, 0, &mut strings);
        }
        if strings.is_empty() {
            return;
        }
        if let Some(previous) = out.insert(id, strings) {
            if self.report_duplicates {
                warn!(id, ?previous, "field collected again, keeping the later strings");
            }
        }
    }

    /// All non-empty strings reachable from `node`, in encounter order.
    pub fn extract_strings(&self, node: &Node) -> Vec<String> {
        let mut strings = Vec::new();
        self.extract_into(node, 0, &mut strings);
        strings
    }

    fn extract_into(&self, node: &Node, depth: usize, out: &mut Vec<String>) {
        if depth >= self.codec.max_depth {
            debug!(depth, "nesting too deep, skipping branch");
            return;
        }
        match node {
            Node::Text { value, .. } => {
                if !value.is_empty() {
                    out.push(value.clone());
                }
            }
            Node::Tagged { inner, .. } => self.extract_into(inner, depth + 1, out),
            Node::OctetString(bytes) => match self.codec.decode_nested(bytes, depth + 1) {
                Ok(nested) => self.extract_into(&nested, depth + 1, out),
                Err(err) => {
                    trace!(%err, "octet string is not a nested encoding, reading as text");
                    match std::str::from_utf8(bytes) {
                        Ok(text) if !text.is_empty() => out.push(text.to_owned()),
                        _ => {}
                    }
                }
            },
            Node::Sequence(children) | Node::Set(children) => {
                for child in children {
                    self.extract_into(child, depth + 1, out);
                }
            }
            Node::Integer(_) | Node::ObjectIdentifier(_) | Node::Other { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{Class, Tag},
        bytes::Bytes,
        hex_literal::hex,
    };

    fn field(id: i64, values: Vec<Node>) -> Node {
        let mut children = vec![Node::integer(id)];
        children.extend(values);
        Node::Sequence(children)
    }

    fn octets(bytes: &[u8]) -> Node {
        Node::OctetString(Bytes::copy_from_slice(bytes))
    }

    fn ordered(fields: &FieldMap) -> Vec<(i32, Vec<String>)> {
        fields
            .iter()
            .map(|(&id, values)| (id, values.clone()))
            .collect()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|&s| s.to_owned()).collect()
    }

    #[test]
    fn test_nested_field_recognition() {
        let name = "Nguy\u{1ec5}n \u{110}\u{ec}nh \u{da}t";
        let root = Node::Sequence(vec![Node::Set(vec![Node::Sequence(vec![field(2, vec![
            Node::utf8(name),
        ])])])]);
        let fields = Collector::default().collect(&root);
        assert_eq!(ordered(&fields), vec![(2, strings(&[name]))]);
    }

    #[test]
    fn test_strings_in_encounter_order() {
        let tag = Tag {
            class:       Class::ContextSpecific,
            constructed: true,
            number:      0,
        };
        let root = field(13, vec![
            Node::Sequence(vec![Node::utf8("A"), Node::integer(9), Node::utf8("")]),
            Node::tagged(tag, Node::utf8("B")),
            Node::Set(vec![Node::utf8("C"), Node::Sequence(vec![Node::utf8("D")])]),
        ]);
        let fields = Collector::default().collect(&root);
        assert_eq!(ordered(&fields), vec![(13, strings(&["A", "B", "C", "D"]))]);
    }

    #[test]
    fn test_field_without_strings_is_absent() {
        let root = Node::Set(vec![
            field(14, vec![]),
            field(15, vec![Node::utf8(""), Node::integer(3)]),
            field(16, vec![octets(b"")]),
        ]);
        assert!(Collector::default().collect(&root).is_empty());
    }

    #[test]
    fn test_empty_extraction_keeps_earlier_value() {
        let root = Node::Set(vec![field(5, vec![Node::utf8("A")]), field(5, vec![])]);
        let fields = Collector::default().collect(&root);
        assert_eq!(ordered(&fields), vec![(5, strings(&["A"]))]);
    }

    #[test]
    fn test_duplicate_id_last_write_wins() {
        let root = Node::Set(vec![
            field(5, vec![Node::utf8("A")]),
            field(6, vec![Node::utf8("X")]),
            field(5, vec![Node::utf8("B")]),
        ]);
        let collector = Collector::default().with_duplicate_reports(true);
        let fields = collector.collect(&root);
        assert_eq!(ordered(&fields), vec![
            (5, strings(&["B"])),
            (6, strings(&["X"]))
        ]);
    }

    #[test]
    fn test_outer_field_is_replaced_by_inner() {
        // The record header is itself a field sequence with id 1 whose values
        // contain every other field.
        let root = field(1, vec![Node::Set(vec![
            field(1, vec![Node::utf8("027203000307")]),
            field(2, vec![Node::utf8("Name")]),
        ])]);
        let fields = Collector::default().collect(&root);
        assert_eq!(ordered(&fields), vec![
            (1, strings(&["027203000307"])),
            (2, strings(&["Name"])),
        ]);
    }

    #[test]
    fn test_integer_values_are_not_text() {
        let root = field(7, vec![Node::integer(42)]);
        assert!(Collector::default().collect(&root).is_empty());
    }

    #[test]
    fn test_field_id_out_of_range() {
        let large = Node::Integer(crate::Integer::from(i64::from(i32::MAX) + 1));
        let root = Node::Set(vec![
            Node::Sequence(vec![large, Node::utf8("ignored")]),
            field(-3, vec![Node::utf8("negative")]),
        ]);
        let fields = Collector::default().collect(&root);
        assert_eq!(ordered(&fields), vec![(-3, strings(&["negative"]))]);
    }

    #[test]
    fn test_sequence_not_starting_with_integer() {
        let root = Node::Sequence(vec![Node::utf8("A"), Node::integer(1), Node::utf8("B")]);
        assert!(Collector::default().collect(&root).is_empty());
    }

    #[test]
    fn test_octet_string_nested_encoding() {
        // SEQUENCE { UTF8String "Kinh" }
        let nested = field(6, vec![octets(&hex!("30 06 0c 04 4b 69 6e 68"))]);
        let direct = field(6, vec![Node::Sequence(vec![Node::utf8("Kinh")])]);
        let collector = Collector::default();
        assert_eq!(collector.collect(&nested), collector.collect(&direct));
        assert_eq!(ordered(&collector.collect(&nested)), vec![(6, strings(&["Kinh"]))]);
    }

    #[test]
    fn test_octet_string_text_fallback() {
        let collector = Collector::default();
        assert_eq!(collector.extract_strings(&octets(b"Kinh")), strings(&["Kinh"]));
        // Looks like a SEQUENCE header but is truncated.
        assert_eq!(collector.extract_strings(&octets(b"0294011D")), strings(&["0294011D"]));
        assert_eq!(
            collector.extract_strings(&octets("Vi\u{1ec7}t Nam".as_bytes())),
            strings(&["Vi\u{1ec7}t Nam"])
        );
    }

    #[test]
    fn test_octet_string_neither_encoding_nor_text() {
        let collector = Collector::default();
        assert!(collector.extract_strings(&octets(&hex!("ff fe 80"))).is_empty());
        let root = Node::Set(vec![
            field(3, vec![octets(&hex!("ff fe 80"))]),
            field(4, vec![Node::utf8("Nam")]),
        ]);
        assert_eq!(ordered(&collector.collect(&root)), vec![(4, strings(&["Nam"]))]);
    }

    #[test]
    fn test_octet_string_nested_twice() {
        // OCTET STRING { OCTET STRING { PrintableString "24/08/2022" } }
        let node = octets(&hex!("04 0c 13 0a 32 34 2f 30 38 2f 32 30 32 32"));
        assert_eq!(Collector::default().extract_strings(&node), strings(&["24/08/2022"]));
    }

    #[test]
    fn test_octet_string_depth_guard() {
        // Each layer is an OCTET STRING wrapping the next, innermost "A".
        let mut encoding = hex!("0c 01 41").to_vec();
        for _ in 0..10 {
            let mut wrapped = vec![0x04, u8::try_from(encoding.len()).unwrap()];
            wrapped.extend(&encoding);
            encoding = wrapped;
        }
        let node = Node::OctetString(encoding.into());
        let shallow = Collector::new(BerCodec::default().with_max_depth(4));
        let deep = Collector::default();
        assert_eq!(deep.extract_strings(&node), strings(&["A"]));
        // Past the limit the remaining layers are read as raw text.
        let truncated = shallow.extract_strings(&node);
        assert_eq!(truncated.len(), 1);
        assert_ne!(truncated[0], "A");
        assert!(truncated[0].ends_with('A'));
    }

    #[test]
    fn test_deterministic() {
        let root = Node::Set(vec![
            field(1, vec![Node::utf8("x")]),
            field(2, vec![octets(b"y"), Node::utf8("z")]),
        ]);
        let collector = Collector::default();
        assert_eq!(ordered(&collector.collect(&root)), ordered(&collector.collect(&root)));
    }
}
