use std::fmt::Write as _;

use crate::buffer::ByteBuffer;

use super::Value;

/// Emits canonical JSON for `value`: objects with fields in sorted-by-name
/// order, arrays in insertion order, strings with the minimal escape set
/// plus `\u00XX` for bytes below `0x20`, integers base-10, booleans as
/// `true`/`false`. Empty containers emit `{}` / `[]`.
pub fn write_value(value: &Value, buf: &mut ByteBuffer) {
    match value {
        Value::Bool(b) => {
            let _ = write!(buf, "{}", if *b { "true" } else { "false" });
        }
        Value::Int(n) => {
            let _ = write!(buf, "{n}");
        }
        Value::String(s) => write_string(s, buf),
        Value::Array(arr) => {
            buf.append(b"[");
            for (i, element) in arr.elements().enumerate() {
                if i > 0 {
                    buf.append(b",");
                }
                write_value(element, buf);
            }
            buf.append(b"]");
        }
        Value::Object(obj) => {
            buf.append(b"{");
            for (i, (name, field_value)) in obj.fields().enumerate() {
                if i > 0 {
                    buf.append(b",");
                }
                write_string(name, buf);
                buf.append(b":");
                write_value(field_value, buf);
            }
            buf.append(b"}");
        }
    }
}

fn write_string(s: &str, buf: &mut ByteBuffer) {
    buf.append(b"\"");
    for ch in s.chars() {
        match ch {
            '"' => buf.append(b"\\\""),
            '\\' => buf.append(b"\\\\"),
            '\u{0008}' => buf.append(b"\\b"),
            '\u{000C}' => buf.append(b"\\f"),
            '\n' => buf.append(b"\\n"),
            '\r' => buf.append(b"\\r"),
            '\t' => buf.append(b"\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(buf, "\\u{:04x}", c as u32);
            }
            c => {
                let mut tmp = [0u8; 4];
                buf.append(c.encode_utf8(&mut tmp).as_bytes());
            }
        }
    }
    buf.append(b"\"");
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::parse::parse_str;
    use super::super::{ArrayBuilder, ObjectBuilder};

    fn serialize(value: &Value) -> String {
        let mut buf = ByteBuffer::new();
        write_value(value, &mut buf);
        String::from_utf8(buf.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn round_trip_preserves_equivalent_value() {
        let mut b = ObjectBuilder::new();
        b.set_string("name", "a\nb");
        b.set_int("count", -7);
        let original = Value::Object(b.build());

        let text = serialize(&original);
        let reparsed = parse_str(&text).unwrap();
        assert_eq!(serialize(&reparsed), text);
    }

    #[test]
    fn object_fields_serialize_sorted_by_name() {
        let mut b = ObjectBuilder::new();
        b.set_int("z", 1);
        b.set_int("a", 2);
        let text = serialize(&Value::Object(b.build()));
        assert_eq!(text, r#"{"a":2,"z":1}"#);
    }

    #[test]
    fn control_bytes_escape_as_u00xx() {
        let mut b = ArrayBuilder::new();
        b.append_string("\u{0001}").unwrap();
        let text = serialize(&Value::Array(b.build()));
        assert_eq!(text, "[\"\\u0001\"]");
    }

    #[test]
    fn empty_containers_serialize_compactly() {
        assert_eq!(serialize(&Value::Object(ObjectBuilder::new().build())), "{}");
        assert_eq!(serialize(&Value::Array(ArrayBuilder::new().build())), "[]");
    }
}
