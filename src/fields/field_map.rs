use {
    super::IdentityField,
    indexmap::{map::Iter, IndexMap},
};

/// Field id to the strings collected for it.
///
/// Ids iterate in the order they were first encountered in the document.
/// Every list is non-empty; an id without string content is absent.
///
/// Equality compares contents regardless of order; compare [`FieldMap::iter`]
/// when the order matters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldMap(IndexMap<i32, Vec<String>>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any previous value for `id`, keeping its position.
    pub(crate) fn insert(&mut self, id: i32, values: Vec<String>) -> Option<Vec<String>> {
        debug_assert!(!values.is_empty());
        self.0.insert(id, values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: i32) -> bool {
        self.0.contains_key(&id)
    }

    pub fn get(&self, id: i32) -> Option<&[String]> {
        self.0.get(&id).map(Vec::as_slice)
    }

    /// The first string collected for `id`.
    pub fn first(&self, id: i32) -> Option<&str> {
        self.get(id)?.first().map(String::as_str)
    }

    pub fn field(&self, field: IdentityField) -> Option<&[String]> {
        self.get(field.into())
    }

    pub fn ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> Iter<'_, i32, Vec<String>> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a FieldMap {
    type Item = (&'a i32, &'a Vec<String>);
    type IntoIter = Iter<'a, i32, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for FieldMap {
    type Item = (i32, Vec<String>);
    type IntoIter = indexmap::map::IntoIter<i32, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
