//! Pack/unpack of Varlink call and reply envelopes.

use crate::value::{JsonObject, ObjectBuilder, Value};

use super::error::ProtocolError;

/// Flags carried by an inbound call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallFlags {
    pub more: bool,
    pub oneway: bool,
}

/// Flags carried by an outbound reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplyFlags {
    pub continues: bool,
}

/// An unpacked inbound call.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: String,
    pub parameters: JsonObject,
    pub flags: CallFlags,
}

fn extract_bool_field(obj: &JsonObject, name: &'static str) -> Result<bool, ProtocolError> {
    match obj.get(name) {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(ProtocolError::WrongFieldType(name)),
    }
}

/// Unpacks a top-level call object into a method name, an owned
/// parameters object (a fresh empty object if absent, never a reference
/// to the caller's value), and the call's flag set.
pub fn unpack_call(obj: &JsonObject) -> Result<Call, ProtocolError> {
    let method = match obj.get("method") {
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(ProtocolError::WrongFieldType("method")),
        None => return Err(ProtocolError::MissingMethod),
    };
    let parameters = match obj.get("parameters") {
        Some(Value::Object(p)) => p.clone(),
        Some(_) => return Err(ProtocolError::WrongFieldType("parameters")),
        None => JsonObject::empty(),
    };
    let more = extract_bool_field(obj, "more")?;
    let oneway = extract_bool_field(obj, "oneway")?;
    if more && oneway {
        return Err(ProtocolError::MoreAndOneway);
    }
    Ok(Call {
        method,
        parameters,
        flags: CallFlags { more, oneway },
    })
}

/// Packs an outbound reply: `error` (if set), `parameters` (if provided),
/// `continues: true` (if the `CONTINUES` flag is set), in that field
/// order. `parameters` is shared by reference, not deep-copied.
pub fn pack_reply(
    error: Option<&str>,
    parameters: Option<JsonObject>,
    flags: ReplyFlags,
) -> JsonObject {
    let mut builder = ObjectBuilder::new();
    if let Some(error) = error {
        builder.set_string("error", error);
    }
    if let Some(parameters) = parameters {
        builder.set_object("parameters", parameters);
    }
    if flags.continues {
        builder.set_bool("continues", true);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::parse_str;

    #[test]
    fn unpack_substitutes_fresh_empty_object_when_parameters_absent() {
        let obj = parse_str(r#"{"method":"a.b.C"}"#).unwrap();
        let call = unpack_call(obj.as_object().unwrap()).unwrap();
        assert_eq!(call.method, "a.b.C");
        assert_eq!(call.parameters.len(), 0);
        assert_eq!(call.flags, CallFlags::default());
    }

    #[test]
    fn unpack_rejects_missing_method() {
        let obj = parse_str(r#"{}"#).unwrap();
        assert_eq!(
            unpack_call(obj.as_object().unwrap()),
            Err(ProtocolError::MissingMethod)
        );
    }

    #[test]
    fn unpack_rejects_more_and_oneway_together() {
        let obj = parse_str(r#"{"method":"a.b.C","more":true,"oneway":true}"#).unwrap();
        assert_eq!(
            unpack_call(obj.as_object().unwrap()),
            Err(ProtocolError::MoreAndOneway)
        );
    }

    #[test]
    fn pack_reply_field_order_is_error_then_parameters_then_continues() {
        let mut params = ObjectBuilder::new();
        params.set_int("x", 1);
        let reply = pack_reply(None, Some(params.build()), ReplyFlags { continues: true });
        assert_eq!(reply.field_names().collect::<Vec<_>>(), vec!["continues", "parameters"]);
    }
}
