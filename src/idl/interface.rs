//! Interface description parsing, name validation, and sorted method/error
//! tables.

use std::sync::Arc;

use crate::connection::Connection;
use crate::protocol::CallFlags;
use crate::scanner::Scanner;
use crate::value::JsonObject;

use super::error::IdlError;

/// A method handler: invoked with the connection (so it can reply),
/// the fully-qualified method name, and the call's parameters/flags.
/// The original C API's `void *userdata` context argument collapses into
/// whatever this closure captures by value.
pub type Handler = dyn Fn(&Connection, &str, &JsonObject, CallFlags) + Send + Sync;

struct MethodEntry {
    name: String,
    handler: Option<Arc<Handler>>,
}

impl std::fmt::Debug for MethodEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodEntry")
            .field("name", &self.name)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

/// A parsed, validated Varlink interface description.
#[derive(Debug)]
pub struct InterfaceDescription {
    name: String,
    description: String,
    methods: Vec<MethodEntry>,
    errors: Vec<String>,
}

enum MemberKind {
    Type,
    Method,
    Error,
}

impl InterfaceDescription {
    /// Parses and validates an interface description. On failure, no
    /// partial interface leaks out (the parser's intermediate state is
    /// owned locally and dropped by the `?`-propagated error path).
    pub fn parse(description: &str) -> Result<Self, IdlError> {
        let mut scanner = Scanner::new(description, true);
        scanner.read_keyword("interface")?;
        let name = scanner.read_word()?.to_string();
        validate_interface_name(&name)?;

        let mut members: Vec<String> = Vec::new();
        let mut methods: Vec<MethodEntry> = Vec::new();
        let mut errors: Vec<String> = Vec::new();

        loop {
            if scanner.read_keyword("type").is_ok() {
                let member_name = read_member(&mut scanner, MemberKind::Type)?;
                register_member(&mut members, member_name)?;
                scanner.read_operator_skip(")")?;
            } else if scanner.read_keyword("method").is_ok() {
                let member_name = read_member(&mut scanner, MemberKind::Method)?;
                register_member(&mut members, member_name.clone())?;
                scanner.read_operator_skip(")")?;
                scanner.read_operator("->")?;
                scanner.read_operator("(")?;
                scanner.read_operator_skip(")")?;
                methods.push(MethodEntry {
                    name: member_name,
                    handler: None,
                });
            } else if scanner.read_keyword("error").is_ok() {
                let member_name = read_member(&mut scanner, MemberKind::Error)?;
                register_member(&mut members, member_name.clone())?;
                scanner.read_operator_skip(")")?;
                errors.push(member_name);
            } else {
                break;
            }
        }

        if !scanner.at_end_after_advance() {
            return Err(IdlError::TrailingData);
        }

        methods.sort_by(|a, b| a.name.cmp(&b.name));
        errors.sort();

        Ok(Self {
            name,
            description: description.to_string(),
            methods,
            errors,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The verbatim source text this interface was parsed from.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Method names in sorted order.
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(|m| m.name.as_str())
    }

    /// Error names in sorted order.
    pub fn error_names(&self) -> &[String] {
        &self.errors
    }

    pub fn find_error(&self, name: &str) -> bool {
        self.errors.binary_search_by(|e| e.as_str().cmp(name)).is_ok()
    }

    fn method_index(&self, name: &str) -> Option<usize> {
        self.methods.binary_search_by(|m| m.name.as_str().cmp(name)).ok()
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.method_index(name).is_some()
    }

    /// Returns the handler registered for `name`, if the method is
    /// declared and a handler has been attached.
    pub fn find_method(&self, name: &str) -> Option<&Arc<Handler>> {
        self.method_index(name).and_then(|i| self.methods[i].handler.as_ref())
    }

    /// Attaches a handler to a declared method. Fails if the method was
    /// not declared in the interface description.
    pub fn set_method(
        &mut self,
        name: &str,
        handler: impl Fn(&Connection, &str, &JsonObject, CallFlags) + Send + Sync + 'static,
    ) -> Result<(), IdlError> {
        match self.method_index(name) {
            Some(i) => {
                self.methods[i].handler = Some(Arc::new(handler));
                Ok(())
            }
            None => Err(IdlError::NoSuchMethod(name.to_string())),
        }
    }
}

fn read_member(scanner: &mut Scanner<'_>, kind: MemberKind) -> Result<String, IdlError> {
    let name = scanner.read_word()?.to_string();
    match kind {
        MemberKind::Type | MemberKind::Method | MemberKind::Error => validate_member_name(&name)?,
    }
    scanner.read_operator("(")?;
    Ok(name)
}

fn register_member(members: &mut Vec<String>, name: String) -> Result<(), IdlError> {
    if members.contains(&name) {
        return Err(IdlError::NotUnique(name));
    }
    members.push(name);
    Ok(())
}

/// 3-255 bytes; lowercase letters/digits/`.`/`-`; must start and end with
/// a lowercase letter or digit; at least one `.` and one lowercase
/// letter; no two adjacent dots; `-` may not immediately follow `.`.
fn validate_interface_name(name: &str) -> Result<(), IdlError> {
    let invalid = || IdlError::InvalidInterfaceName(name.to_string());
    let bytes = name.as_bytes();
    if bytes.len() < 3 || bytes.len() > 255 {
        return Err(invalid());
    }
    let is_head_tail = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    if !is_head_tail(bytes[0]) || !is_head_tail(*bytes.last().unwrap()) {
        return Err(invalid());
    }
    let mut has_dot = false;
    let mut has_lower = false;
    for (i, &b) in bytes.iter().enumerate() {
        let ok = b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'.' || b == b'-';
        if !ok {
            return Err(invalid());
        }
        if b.is_ascii_lowercase() {
            has_lower = true;
        }
        if b == b'.' {
            has_dot = true;
            if i > 0 && bytes[i - 1] == b'.' {
                return Err(invalid());
            }
        }
        if b == b'-' && i > 0 && bytes[i - 1] == b'.' {
            return Err(invalid());
        }
    }
    if !has_dot || !has_lower {
        return Err(invalid());
    }
    Ok(())
}

/// `[A-Z][A-Za-z0-9]*`.
fn validate_member_name(name: &str) -> Result<(), IdlError> {
    let invalid = || IdlError::InvalidMemberName(name.to_string());
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() => {}
        _ => return Err(invalid()),
    }
    if chars.clone().any(|c| !c.is_ascii_alphanumeric()) {
        return Err(invalid());
    }
    Ok(())
}
