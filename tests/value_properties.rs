//! Property-based coverage of the value graph's round-trip and ordering
//! invariants.

use proptest::prelude::*;

use varlink_service::buffer::ByteBuffer;
use varlink_service::value::{parse_str, write_value, ArrayBuilder, ObjectBuilder, Value, ValueTag};

fn serialize(value: &Value) -> String {
    let mut buf = ByteBuffer::new();
    write_value(value, &mut buf);
    String::from_utf8(buf.as_bytes().to_vec()).unwrap()
}

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Bool(true)),
        Just(Value::Bool(false)),
        any::<i64>().prop_map(Value::Int),
        "[a-zA-Z0-9 _.-]{0,16}".prop_map(Value::String),
    ]
}

fn arb_object() -> impl Strategy<Value = Value> {
    prop::collection::vec(("[a-z][a-z0-9]{0,8}", arb_scalar()), 0..6).prop_map(|pairs| {
        let mut builder = ObjectBuilder::new();
        for (name, value) in pairs {
            builder.set_value(name, value);
        }
        Value::Object(builder.build())
    })
}

proptest! {
    /// Reparsing a serialized value yields byte-identical output, since
    /// serialization is a deterministic function of the value's own
    /// already-sorted field order.
    #[test]
    fn round_trip_is_byte_stable(value in arb_object()) {
        let text = serialize(&value);
        let reparsed = parse_str(&text).unwrap();
        prop_assert_eq!(serialize(&reparsed), text);
    }

    /// An object's field names, once built, are always strictly sorted
    /// regardless of insertion order.
    #[test]
    fn object_field_names_are_strictly_sorted(value in arb_object()) {
        let Value::Object(obj) = value else { unreachable!() };
        let names: Vec<&str> = obj.field_names().collect();
        let mut sorted = names.clone();
        sorted.sort();
        prop_assert_eq!(names, sorted);
    }

    /// Serializing never panics and always yields valid UTF-8 (checked by
    /// construction since `serialize` unwraps `from_utf8`).
    #[test]
    fn serialization_is_total_over_generated_objects(value in arb_object()) {
        let _ = serialize(&value);
    }

    /// An array built from any run of same-tagged scalars accepts every
    /// element and reports that one tag for every element.
    #[test]
    fn homogeneous_arrays_accept_every_element(values in prop::collection::vec(any::<i64>(), 0..12)) {
        let mut builder = ArrayBuilder::new();
        for v in &values {
            builder.append_int(*v).unwrap();
        }
        let array = builder.build();
        prop_assert_eq!(array.len(), values.len());
        if !values.is_empty() {
            prop_assert_eq!(array.element_tag(), Some(ValueTag::Int));
        }
    }
}
