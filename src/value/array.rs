use std::sync::Arc;

use super::error::ValueError;
use super::{Value, ValueTag};

struct ArrayInner {
    tag: Option<ValueTag>,
    elements: Vec<Value>,
}

/// An immutable, reference-counted, homogeneously-tagged JSON array.
/// Obtained only by calling [`ArrayBuilder::build`].
#[derive(Clone)]
pub struct JsonArray(Arc<ArrayInner>);

impl std::fmt::Debug for JsonArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonArray")
            .field("element_tag", &self.0.tag)
            .field("elements", &self.0.elements)
            .finish()
    }
}

impl JsonArray {
    /// An array with no elements and no fixed element tag.
    pub fn empty() -> Self {
        ArrayBuilder::new().build()
    }

    pub fn len(&self) -> usize {
        self.0.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.elements.is_empty()
    }

    /// The tag shared by every element, or `None` for an empty array.
    pub fn element_tag(&self) -> Option<ValueTag> {
        self.0.tag
    }

    pub fn elements(&self) -> impl Iterator<Item = &Value> {
        self.0.elements.iter()
    }

    fn get(&self, index: usize) -> Result<&Value, ValueError> {
        self.0.elements.get(index).ok_or(ValueError::IndexOutOfRange(index))
    }

    pub fn get_bool(&self, index: usize) -> Result<bool, ValueError> {
        match self.get(index)? {
            Value::Bool(b) => Ok(*b),
            _ => Err(ValueError::Domain),
        }
    }

    pub fn get_int(&self, index: usize) -> Result<i64, ValueError> {
        match self.get(index)? {
            Value::Int(n) => Ok(*n),
            _ => Err(ValueError::Domain),
        }
    }

    pub fn get_string(&self, index: usize) -> Result<&str, ValueError> {
        match self.get(index)? {
            Value::String(s) => Ok(s.as_str()),
            _ => Err(ValueError::Domain),
        }
    }

    pub fn get_array(&self, index: usize) -> Result<&JsonArray, ValueError> {
        match self.get(index)? {
            Value::Array(a) => Ok(a),
            _ => Err(ValueError::Domain),
        }
    }

    pub fn get_object(&self, index: usize) -> Result<&super::JsonObject, ValueError> {
        match self.get(index)? {
            Value::Object(o) => Ok(o),
            _ => Err(ValueError::Domain),
        }
    }
}

/// Writable handle used to construct a [`JsonArray`]. Consumed by
/// [`ArrayBuilder::build`].
#[derive(Default)]
pub struct ArrayBuilder {
    tag: Option<ValueTag>,
    elements: Vec<Value>,
}

impl ArrayBuilder {
    pub fn new() -> Self {
        Self {
            tag: None,
            elements: Vec::new(),
        }
    }

    /// Appends `value`, fixing the element tag on the first insertion.
    /// Fails with [`ValueError::Domain`] if `value`'s tag does not match
    /// an already-fixed element tag.
    pub fn append_value(&mut self, value: Value) -> Result<&mut Self, ValueError> {
        let tag = value.tag();
        match self.tag {
            None => self.tag = Some(tag),
            Some(fixed) if fixed != tag => return Err(ValueError::Domain),
            Some(_) => {}
        }
        self.elements.push(value);
        Ok(self)
    }

    pub fn append_bool(&mut self, value: bool) -> Result<&mut Self, ValueError> {
        self.append_value(Value::Bool(value))
    }

    pub fn append_int(&mut self, value: i64) -> Result<&mut Self, ValueError> {
        self.append_value(Value::Int(value))
    }

    pub fn append_string(&mut self, value: impl Into<String>) -> Result<&mut Self, ValueError> {
        self.append_value(Value::String(value.into()))
    }

    pub fn append_array(&mut self, value: JsonArray) -> Result<&mut Self, ValueError> {
        self.append_value(Value::Array(value))
    }

    pub fn append_object(&mut self, value: super::JsonObject) -> Result<&mut Self, ValueError> {
        self.append_value(Value::Object(value))
    }

    /// Consumes the builder, returning an immutable shared array.
    pub fn build(self) -> JsonArray {
        JsonArray(Arc::new(ArrayInner {
            tag: self.tag,
            elements: self.elements,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixes_element_tag_on_first_insert() {
        let mut b = ArrayBuilder::new();
        b.append_int(1).unwrap();
        assert_eq!(b.append_string("x"), Err(ValueError::Domain));
    }

    #[test]
    fn accumulates_homogeneous_elements_in_order() {
        let mut b = ArrayBuilder::new();
        b.append_int(1).unwrap();
        b.append_int(2).unwrap();
        b.append_int(3).unwrap();
        let arr = b.build();
        assert_eq!(arr.len(), 3);
        assert_eq!(arr.get_int(1).unwrap(), 2);
        assert_eq!(arr.get_int(5), Err(ValueError::IndexOutOfRange(5)));
    }

    #[test]
    fn empty_array_has_no_element_tag() {
        assert_eq!(JsonArray::empty().element_tag(), None);
    }
}
