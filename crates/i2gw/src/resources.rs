use std::collections::BTreeMap;

use gateway_api::apis::experimental::{
    tcproutes::TCPRoute, tlsroutes::TLSRoute, udproutes::UDPRoute,
};
use gateway_api::apis::standard::{
    gateways::Gateway, httproutes::HTTPRoute, referencegrants::ReferenceGrant,
};
use kube::Resource;

use crate::providers::gce::crd::{GCPBackendPolicy, GCPGatewayPolicy, HealthCheckPolicy};
use crate::NamespacedName;

/// The output of a conversion: Gateway API objects and vendor policies,
/// keyed by their identity.
#[derive(Debug, Clone, Default)]
pub struct GatewayResources {
    pub gateways: BTreeMap<NamespacedName, Gateway>,
    pub http_routes: BTreeMap<NamespacedName, HTTPRoute>,
    pub tls_routes: BTreeMap<NamespacedName, TLSRoute>,
    pub tcp_routes: BTreeMap<NamespacedName, TCPRoute>,
    pub udp_routes: BTreeMap<NamespacedName, UDPRoute>,
    pub reference_grants: BTreeMap<NamespacedName, ReferenceGrant>,

    /// Vendor policies that attach to the objects above.
    pub extensions: Vec<PolicyExtension>,
}

impl GatewayResources {
    pub fn is_empty(&self) -> bool {
        self.gateways.is_empty()
            && self.http_routes.is_empty()
            && self.tls_routes.is_empty()
            && self.tcp_routes.is_empty()
            && self.udp_routes.is_empty()
            && self.reference_grants.is_empty()
            && self.extensions.is_empty()
    }

    /// Serialize every object, Gateways first and policies last.
    pub fn documents(&self) -> Result<Vec<serde_json::Value>, serde_json::Error> {
        let mut docs = Vec::new();

        for gateway in self.gateways.values() {
            docs.push(serde_json::to_value(gateway)?);
        }
        for route in self.http_routes.values() {
            docs.push(serde_json::to_value(route)?);
        }
        for route in self.tls_routes.values() {
            docs.push(serde_json::to_value(route)?);
        }
        for route in self.tcp_routes.values() {
            docs.push(serde_json::to_value(route)?);
        }
        for route in self.udp_routes.values() {
            docs.push(serde_json::to_value(route)?);
        }
        for grant in self.reference_grants.values() {
            docs.push(serde_json::to_value(grant)?);
        }
        for extension in &self.extensions {
            docs.push(extension.to_document()?);
        }

        Ok(docs)
    }
}

/// A vendor policy attached to a Gateway API object or a Service.
#[derive(Debug, Clone)]
pub enum PolicyExtension {
    GcpBackendPolicy(GCPBackendPolicy),
    HealthCheckPolicy(HealthCheckPolicy),
    GcpGatewayPolicy(GCPGatewayPolicy),
}

impl PolicyExtension {
    pub fn kind(&self) -> &'static str {
        match self {
            PolicyExtension::GcpBackendPolicy(_) => "GCPBackendPolicy",
            PolicyExtension::HealthCheckPolicy(_) => "HealthCheckPolicy",
            PolicyExtension::GcpGatewayPolicy(_) => "GCPGatewayPolicy",
        }
    }

    pub fn name(&self) -> NamespacedName {
        let meta = match self {
            PolicyExtension::GcpBackendPolicy(p) => p.meta(),
            PolicyExtension::HealthCheckPolicy(p) => p.meta(),
            PolicyExtension::GcpGatewayPolicy(p) => p.meta(),
        };
        NamespacedName::from_meta(meta)
    }

    /// Convert this policy into an untyped document for printing.
    pub fn to_document(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            PolicyExtension::GcpBackendPolicy(p) => serde_json::to_value(p),
            PolicyExtension::HealthCheckPolicy(p) => serde_json::to_value(p),
            PolicyExtension::GcpGatewayPolicy(p) => serde_json::to_value(p),
        }
    }
}
