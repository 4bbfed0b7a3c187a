//! The provider-neutral intermediate representation.
//!
//! An [Ir] is built fresh for every conversion: the [common](crate::common)
//! converter fills it from Ingresses, a provider enriches it in place, and it's
//! consumed once when it's lowered to Gateway API objects.
//!
//! Everything is keyed by [NamespacedName] in ordered maps, so two conversions
//! of the same input produce the same IR.

use std::collections::BTreeMap;

use gateway_api::apis::experimental::{
    tcproutes::TCPRoute, tlsroutes::TLSRoute, udproutes::UDPRoute,
};
use gateway_api::apis::standard::referencegrants::ReferenceGrant;
use serde::{Deserialize, Serialize};

use crate::NamespacedName;

pub mod gce;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ir {
    pub gateways: BTreeMap<NamespacedName, GatewayContext>,

    pub http_routes: BTreeMap<NamespacedName, HttpRouteContext>,

    /// L4 routes and ReferenceGrants have no Ingress equivalent. They're
    /// carried through to the output exactly as a provider sets them.
    pub tls_routes: BTreeMap<NamespacedName, TLSRoute>,
    pub tcp_routes: BTreeMap<NamespacedName, TCPRoute>,
    pub udp_routes: BTreeMap<NamespacedName, UDPRoute>,
    pub reference_grants: BTreeMap<NamespacedName, ReferenceGrant>,

    pub services: BTreeMap<NamespacedName, ServiceIr>,
}

impl Ir {
    /// Get the [ServiceIr] for a Service, creating an empty one if this is the
    /// first time anything has been attached to it.
    pub fn service_mut(&mut self, name: &NamespacedName) -> &mut ServiceIr {
        self.services.entry(name.clone()).or_default()
    }
}

/// A Gateway and any provider-specific extension attached to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayContext {
    pub gateway_class_name: String,

    pub listeners: Vec<Listener>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<GatewayExtension>,
}

impl GatewayContext {
    pub fn new(gateway_class_name: impl Into<String>) -> Self {
        Self {
            gateway_class_name: gateway_class_name.into(),
            ..Default::default()
        }
    }

    /// Add a listener unless one with the same name already exists.
    pub fn add_listener(&mut self, listener: Listener) {
        if !self.listeners.iter().any(|l| l.name == listener.name) {
            self.listeners.push(listener);
        }
    }

    pub fn extension_mut(&mut self) -> &mut GatewayExtension {
        self.extension.get_or_insert_with(Default::default)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listener {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    pub port: u16,

    pub protocol: ListenerProtocol,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<ListenerTls>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListenerProtocol {
    #[serde(rename = "HTTP")]
    Http,
    #[serde(rename = "HTTPS")]
    Https,
}

impl ListenerProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListenerProtocol::Http => "HTTP",
            ListenerProtocol::Https => "HTTPS",
        }
    }

    /// The suffix used when naming a listener for this protocol.
    pub fn name_suffix(&self) -> &'static str {
        match self {
            ListenerProtocol::Http => "http",
            ListenerProtocol::Https => "https",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerTls {
    /// Secrets in the Gateway's namespace.
    pub certificate_refs: Vec<String>,
}

/// An HTTPRoute in progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpRouteContext {
    pub parent_refs: Vec<ParentRef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hostnames: Vec<String>,

    pub rules: Vec<HttpRouteRule>,
}

/// A reference from a route to the Gateway it attaches to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    pub name: String,

    /// The Gateway namespace. When unset, the Gateway is in the same
    /// namespace as the route.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_name: Option<String>,
}

impl ParentRef {
    pub fn gateway(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            section_name: None,
        }
    }
}

/// A set of matches and the backends that traffic matching any of them is
/// sent to. A rule with no matches matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRouteRule {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<PathMatch>,

    pub backend_refs: Vec<BackendRef>,
}

/// Describes how to select a HTTP route by matching the HTTP request path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PathMatch {
    #[serde(rename = "PathPrefix")]
    Prefix { value: String },

    Exact { value: String },
}

impl PathMatch {
    pub fn prefix(value: impl Into<String>) -> Self {
        PathMatch::Prefix {
            value: value.into(),
        }
    }

    pub fn exact(value: impl Into<String>) -> Self {
        PathMatch::Exact {
            value: value.into(),
        }
    }
}

/// Where a rule sends traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BackendRef {
    /// A port on a Service in the route's namespace.
    Service { name: String, port: u16 },

    /// Any other object in the route's namespace.
    Resource {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        group: Option<String>,
        kind: String,
        name: String,
    },
}

/// Provider extensions attached to a Gateway.
///
/// Each provider owns exactly one field and never writes to another
/// provider's field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayExtension {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gce: Option<gce::GceGatewayIr>,
}

/// Provider extensions attached to a Kubernetes Service.
///
/// Each provider owns exactly one field and never writes to another
/// provider's field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceIr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gce: Option<gce::GceServiceIr>,
}
