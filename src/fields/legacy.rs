//! Single value per field, for callers written against the older interface.
//!
//! This is only a projection of the collected [`FieldMap`], so both views
//! always agree on which fields exist.

use {super::FieldMap, indexmap::IndexMap};

/// The first string of every field, in field order.
pub fn single_values(fields: &FieldMap) -> IndexMap<i32, String> {
    fields
        .iter()
        .filter_map(|(&id, values)| Some((id, values.first()?.clone())))
        .collect()
}
