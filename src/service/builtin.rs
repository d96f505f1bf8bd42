//! The built-in `org.varlink.service` introspection interface.

use crate::connection::Connection;
use crate::protocol::{CallFlags, ReplyFlags};
use crate::value::{ArrayBuilder, JsonObject, ObjectBuilder};

use super::registry::Service;

pub const ORG_VARLINK_SERVICE_IDL: &str = "interface org.varlink.service\n\
method GetInfo() -> (vendor: string, product: string, version: string, url: string, interfaces: []string)\n\
method GetInterfaceDescription(interface: string) -> (description: string)\n\
error InterfaceNotFound(interface: string)\n\
error MethodNotFound(method: string)\n\
error MethodNotImplemented(method: string)\n\
error InvalidParameter(parameter: string)\n";

pub fn handle_get_info(conn: &Connection, _method: &str, _params: &JsonObject, _flags: CallFlags) {
    let svc = conn.service();
    let mut names = ArrayBuilder::new();
    for name in svc.interface_names() {
        names
            .append_string(name)
            .expect("interface names are always strings");
    }
    let mut out = ObjectBuilder::new();
    out.set_string("vendor", svc.vendor());
    out.set_string("product", svc.product());
    out.set_string("version", svc.version());
    out.set_string("url", svc.url());
    out.set_array("interfaces", names.build());
    let _ = conn.reply(ReplyFlags::default(), Some(out.build()));
}

pub fn handle_get_interface_description(
    conn: &Connection,
    _method: &str,
    params: &JsonObject,
    _flags: CallFlags,
) {
    let svc = conn.service();
    let interface = match params.get_string("interface") {
        Ok(name) => name,
        Err(_) => {
            let _ = conn.error("org.varlink.service.InvalidParameter", None);
            return;
        }
    };
    match svc.find_interface(interface) {
        Some(iface) => {
            let mut out = ObjectBuilder::new();
            out.set_string("description", iface.description());
            let _ = conn.reply(ReplyFlags::default(), Some(out.build()));
        }
        None => {
            let _ = conn.error("org.varlink.service.InterfaceNotFound", None);
        }
    }
}

pub(super) fn attach_builtin_handlers(service: &mut Service) {
    let iface = service
        .find_interface_mut("org.varlink.service")
        .expect("builtin interface was just installed");
    iface
        .set_method("GetInfo", handle_get_info)
        .expect("GetInfo is declared in the builtin IDL");
    iface
        .set_method("GetInterfaceDescription", handle_get_interface_description)
        .expect("GetInterfaceDescription is declared in the builtin IDL");
}
