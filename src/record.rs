// Host records: non-map inputs inspected through an explicit capability
// instead of runtime reflection.

use std::fmt;

use crate::value::JValue;

/// A named field of a host record.
#[derive(Debug, Clone)]
pub struct RecordField {
    /// Declared field name, conventionally capitalized (e.g. `FirstName`).
    pub name: String,
    /// Serialization tag (e.g. `first_name`), if the host declares one.
    pub tag: Option<String>,
    pub value: JValue,
}

impl RecordField {
    pub fn new(name: impl Into<String>, value: JValue) -> Self {
        RecordField {
            name: name.into(),
            tag: None,
            value,
        }
    }

    pub fn tagged(name: impl Into<String>, tag: impl Into<String>, value: JValue) -> Self {
        RecordField {
            name: name.into(),
            tag: Some(tag.into()),
            value,
        }
    }

    /// Key used when the record is rendered as JSON.
    pub fn serialized_name(&self) -> &str {
        self.tag.as_deref().unwrap_or(&self.name)
    }
}

/// A host value that is neither a native array nor a native object.
///
/// Implementors expose their named fields, and collection-like hosts also
/// expose a sequence view so projections, flatten, slice and index can walk
/// them like arrays.
pub trait HostRecord: fmt::Debug {
    fn type_name(&self) -> &str;

    fn fields(&self) -> Vec<RecordField>;

    /// Elements of a sequence-like host, `None` for plain records.
    fn elements(&self) -> Option<Vec<JValue>> {
        None
    }
}

/// Resolves a field key against a host record.
pub trait FieldResolver {
    fn resolve(&self, key: &str, record: &dyn HostRecord) -> Option<JValue>;
}

/// Default resolver: a field whose serialization tag equals the key wins,
/// otherwise the field named like the key with its first letter capitalized.
#[derive(Debug, Default, Clone, Copy)]
pub struct TagFieldResolver;

impl FieldResolver for TagFieldResolver {
    fn resolve(&self, key: &str, record: &dyn HostRecord) -> Option<JValue> {
        let fields = record.fields();
        let field_name = fields
            .iter()
            .find(|f| f.tag.as_deref() == Some(key))
            .map(|f| f.name.clone())
            .unwrap_or_else(|| capitalize(key));
        fields
            .into_iter()
            .find(|f| f.name == field_name)
            .map(|f| f.value)
    }
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
