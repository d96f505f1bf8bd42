use std::sync::Arc;

use super::error::ValueError;
use super::Value;

/// An immutable, reference-counted JSON object with fields kept sorted by
/// name. Obtained only by calling [`ObjectBuilder::build`]: there is no
/// mutator on this type, which is how the "writable until shared"
/// invariant is enforced at the type level rather than with a runtime flag.
#[derive(Debug, Clone)]
pub struct JsonObject(Arc<Vec<(String, Value)>>);

impl JsonObject {
    /// An object with no fields.
    pub fn empty() -> Self {
        ObjectBuilder::new().build()
    }

    fn find(&self, name: &str) -> Result<usize, usize> {
        self.0.binary_search_by(|(k, _)| k.as_str().cmp(name))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True iff the object has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Field names in sorted order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    /// Fields in sorted order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the raw value for `name`, or `None` if absent.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.find(name).ok().map(|i| &self.0[i].1)
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, ValueError> {
        match self.get(name) {
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(ValueError::Domain),
            None => Err(ValueError::NoSuchKey(name.to_string())),
        }
    }

    pub fn get_int(&self, name: &str) -> Result<i64, ValueError> {
        match self.get(name) {
            Some(Value::Int(n)) => Ok(*n),
            Some(_) => Err(ValueError::Domain),
            None => Err(ValueError::NoSuchKey(name.to_string())),
        }
    }

    pub fn get_string(&self, name: &str) -> Result<&str, ValueError> {
        match self.get(name) {
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(_) => Err(ValueError::Domain),
            None => Err(ValueError::NoSuchKey(name.to_string())),
        }
    }

    pub fn get_array(&self, name: &str) -> Result<&super::JsonArray, ValueError> {
        match self.get(name) {
            Some(Value::Array(a)) => Ok(a),
            Some(_) => Err(ValueError::Domain),
            None => Err(ValueError::NoSuchKey(name.to_string())),
        }
    }

    pub fn get_object(&self, name: &str) -> Result<&JsonObject, ValueError> {
        match self.get(name) {
            Some(Value::Object(o)) => Ok(o),
            Some(_) => Err(ValueError::Domain),
            None => Err(ValueError::NoSuchKey(name.to_string())),
        }
    }
}

/// Writable handle used to construct a [`JsonObject`]. Consumed by
/// [`ObjectBuilder::build`].
#[derive(Debug, Default)]
pub struct ObjectBuilder {
    fields: Vec<(String, Value)>,
}

impl ObjectBuilder {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Replaces the field `name` with `value` if present, else inserts it,
    /// preserving sorted order.
    pub fn set_value(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        let name = name.into();
        match self.fields.binary_search_by(|(k, _)| k.cmp(&name)) {
            Ok(i) => self.fields[i].1 = value,
            Err(i) => self.fields.insert(i, (name, value)),
        }
        self
    }

    pub fn set_bool(&mut self, name: impl Into<String>, value: bool) -> &mut Self {
        self.set_value(name, Value::Bool(value))
    }

    pub fn set_int(&mut self, name: impl Into<String>, value: i64) -> &mut Self {
        self.set_value(name, Value::Int(value))
    }

    pub fn set_string(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.set_value(name, Value::String(value.into()))
    }

    pub fn set_array(&mut self, name: impl Into<String>, value: super::JsonArray) -> &mut Self {
        self.set_value(name, Value::Array(value))
    }

    pub fn set_object(&mut self, name: impl Into<String>, value: JsonObject) -> &mut Self {
        self.set_value(name, Value::Object(value))
    }

    /// Consumes the builder, returning an immutable shared object.
    pub fn build(self) -> JsonObject {
        JsonObject(Arc::new(self.fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_existing_field_preserving_order() {
        let mut b = ObjectBuilder::new();
        b.set_int("b", 1);
        b.set_int("a", 2);
        b.set_int("b", 3);
        let obj = b.build();
        assert_eq!(obj.field_names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(obj.get_int("b").unwrap(), 3);
    }

    #[test]
    fn accessors_report_domain_and_no_such_key() {
        let mut b = ObjectBuilder::new();
        b.set_string("name", "x");
        let obj = b.build();
        assert_eq!(obj.get_int("name"), Err(ValueError::Domain));
        assert_eq!(
            obj.get_string("missing"),
            Err(ValueError::NoSuchKey("missing".to_string()))
        );
    }

    #[test]
    fn empty_object_has_no_fields() {
        assert_eq!(JsonObject::empty().len(), 0);
    }
}
