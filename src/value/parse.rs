use crate::scanner::Scanner;

use super::error::ValueError;
use super::object::ObjectBuilder;
use super::array::ArrayBuilder;
use super::{JsonObject, Value};

/// Parses the single top-level value in `source`. Unconsumed trailing
/// non-whitespace is an error. Comments are disabled (JSON has none).
pub fn parse_str(source: &str) -> Result<Value, ValueError> {
    let mut scanner = Scanner::new(source, false);
    let value = parse_value(&mut scanner)?;
    if !scanner.at_end_after_advance() {
        return Err(ValueError::TrailingData);
    }
    Ok(value)
}

fn parse_value(scanner: &mut Scanner<'_>) -> Result<Value, ValueError> {
    match scanner.peek() {
        b'{' => Ok(Value::Object(parse_object(scanner)?)),
        b'[' => Ok(Value::Array(parse_array(scanner)?)),
        b'"' => Ok(Value::String(scanner.read_string()?)),
        b't' => {
            scanner.read_keyword("true")?;
            Ok(Value::Bool(true))
        }
        b'f' => {
            scanner.read_keyword("false")?;
            Ok(Value::Bool(false))
        }
        _ => Ok(Value::Int(scanner.read_number()?)),
    }
}

/// Parses an object field's value: `null` means the key is absent.
fn parse_field_value(scanner: &mut Scanner<'_>) -> Result<Option<Value>, ValueError> {
    if scanner.peek() == b'n' && scanner.read_keyword("null").is_ok() {
        return Ok(None);
    }
    Ok(Some(parse_value(scanner)?))
}

fn parse_object(scanner: &mut Scanner<'_>) -> Result<JsonObject, ValueError> {
    scanner.read_operator("{")?;
    let mut builder = ObjectBuilder::new();
    if scanner.peek() == b'}' {
        scanner.read_operator("}")?;
        return Ok(builder.build());
    }
    loop {
        let key = scanner.read_string()?;
        scanner.read_operator(":")?;
        if let Some(value) = parse_field_value(scanner)? {
            builder.set_value(key, value);
        }
        if scanner.read_operator(",").is_ok() {
            continue;
        }
        break;
    }
    scanner.read_operator("}")?;
    Ok(builder.build())
}

fn parse_array(scanner: &mut Scanner<'_>) -> Result<super::JsonArray, ValueError> {
    scanner.read_operator("[")?;
    let mut builder = ArrayBuilder::new();
    if scanner.peek() == b']' {
        scanner.read_operator("]")?;
        return Ok(builder.build());
    }
    loop {
        let value = parse_value(scanner)?;
        builder.append_value(value)?;
        if scanner.read_operator(",").is_ok() {
            continue;
        }
        break;
    }
    scanner.read_operator("]")?;
    Ok(builder.build())
}
