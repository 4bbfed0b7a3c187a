//! Lowering from the IR to Gateway API objects.

use std::collections::BTreeMap;

use gateway_api::apis::standard::gateways::{
    Gateway, GatewayListeners, GatewayListenersTls, GatewayListenersTlsCertificateRefs, GatewaySpec,
};
use gateway_api::apis::standard::httproutes::{
    HTTPRoute, HTTPRouteParentRefs, HTTPRouteRules, HTTPRouteRulesBackendRefs,
    HTTPRouteRulesMatches, HTTPRouteRulesMatchesPath, HTTPRouteRulesMatchesPathType, HTTPRouteSpec,
};
use kube::api::ObjectMeta;

use crate::error::{ErrorContext, FieldError};
use crate::ir::{
    BackendRef, GatewayContext, HttpRouteContext, HttpRouteRule, Ir, Listener, ParentRef,
    PathMatch,
};
use crate::{GatewayResources, NamespacedName, ObjectRef};

impl Ir {
    /// Lower this IR into Gateway API objects.
    ///
    /// Provider extensions are ignored here. Providers lower their own
    /// extensions into [GatewayResources::extensions] after this runs.
    ///
    /// Every HTTPRoute is checked against the Gateways in this IR, and a route
    /// with a parent that doesn't exist is reported as a [FieldError]. The
    /// route is still part of the output.
    pub fn to_gateway_resources(&self) -> (GatewayResources, Vec<FieldError>) {
        let mut errors = vec![];

        let gateways: BTreeMap<_, _> = self
            .gateways
            .iter()
            .map(|(key, gateway)| (key.clone(), gateway.to_gateway(key)))
            .collect();

        let mut http_routes = BTreeMap::new();
        for (key, route) in &self.http_routes {
            if let Err(e) = check_parent_refs(key, &route.parent_refs, &self.gateways)
                .with_field("spec")
            {
                errors.push(e.for_object(&ObjectRef::new("HTTPRoute", key.clone())));
            }
            http_routes.insert(key.clone(), route.to_httproute(key));
        }

        let resources = GatewayResources {
            gateways,
            http_routes,
            tls_routes: self.tls_routes.clone(),
            tcp_routes: self.tcp_routes.clone(),
            udp_routes: self.udp_routes.clone(),
            reference_grants: self.reference_grants.clone(),
            extensions: vec![],
        };

        (resources, errors)
    }
}

fn check_parent_refs(
    route: &NamespacedName,
    parent_refs: &[ParentRef],
    gateways: &BTreeMap<NamespacedName, GatewayContext>,
) -> Result<(), FieldError> {
    for (i, parent_ref) in parent_refs.iter().enumerate() {
        let namespace = parent_ref.namespace.as_deref().unwrap_or(&route.namespace);
        let gateway = NamespacedName::new(namespace, &parent_ref.name);

        if !gateways.contains_key(&gateway) {
            return Err(FieldError::not_found(format!("Gateway {gateway} does not exist")))
                .with_field_index("parentRefs", i);
        }
    }

    Ok(())
}

fn object_meta(key: &NamespacedName) -> ObjectMeta {
    ObjectMeta {
        namespace: (!key.namespace.is_empty()).then(|| key.namespace.clone()),
        name: Some(key.name.clone()),
        ..Default::default()
    }
}

impl GatewayContext {
    fn to_gateway(&self, key: &NamespacedName) -> Gateway {
        Gateway {
            metadata: object_meta(key),
            spec: GatewaySpec {
                gateway_class_name: self.gateway_class_name.clone(),
                listeners: self.listeners.iter().map(GatewayListeners::from).collect(),
                ..Default::default()
            },
            status: None,
        }
    }
}

impl From<&Listener> for GatewayListeners {
    fn from(listener: &Listener) -> Self {
        let tls = listener.tls.as_ref().map(|tls| GatewayListenersTls {
            certificate_refs: Some(
                tls.certificate_refs
                    .iter()
                    .map(|name| GatewayListenersTlsCertificateRefs {
                        name: name.clone(),
                        ..Default::default()
                    })
                    .collect(),
            ),
            ..Default::default()
        });

        GatewayListeners {
            name: listener.name.clone(),
            hostname: listener.hostname.clone(),
            port: listener.port as i32,
            protocol: listener.protocol.as_str().to_string(),
            tls,
            ..Default::default()
        }
    }
}

impl HttpRouteContext {
    fn to_httproute(&self, key: &NamespacedName) -> HTTPRoute {
        let hostnames = (!self.hostnames.is_empty()).then(|| self.hostnames.clone());

        HTTPRoute {
            metadata: object_meta(key),
            spec: HTTPRouteSpec {
                parent_refs: Some(self.parent_refs.iter().map(HTTPRouteParentRefs::from).collect()),
                hostnames,
                rules: Some(self.rules.iter().map(HTTPRouteRules::from).collect()),
                ..Default::default()
            },
            status: None,
        }
    }
}

impl From<&ParentRef> for HTTPRouteParentRefs {
    fn from(parent_ref: &ParentRef) -> Self {
        HTTPRouteParentRefs {
            name: parent_ref.name.clone(),
            namespace: parent_ref.namespace.clone(),
            section_name: parent_ref.section_name.clone(),
            ..Default::default()
        }
    }
}

impl From<&HttpRouteRule> for HTTPRouteRules {
    fn from(rule: &HttpRouteRule) -> Self {
        let matches = (!rule.matches.is_empty())
            .then(|| rule.matches.iter().map(HTTPRouteRulesMatches::from).collect());

        HTTPRouteRules {
            matches,
            backend_refs: Some(
                rule.backend_refs
                    .iter()
                    .map(HTTPRouteRulesBackendRefs::from)
                    .collect(),
            ),
            ..Default::default()
        }
    }
}

impl From<&PathMatch> for HTTPRouteRulesMatches {
    fn from(path_match: &PathMatch) -> Self {
        let (path_type, value) = match path_match {
            PathMatch::Prefix { value } => (HTTPRouteRulesMatchesPathType::PathPrefix, value),
            PathMatch::Exact { value } => (HTTPRouteRulesMatchesPathType::Exact, value),
        };

        HTTPRouteRulesMatches {
            path: Some(HTTPRouteRulesMatchesPath {
                r#type: Some(path_type),
                value: Some(value.clone()),
            }),
            ..Default::default()
        }
    }
}

impl From<&BackendRef> for HTTPRouteRulesBackendRefs {
    fn from(backend_ref: &BackendRef) -> Self {
        match backend_ref {
            BackendRef::Service { name, port } => HTTPRouteRulesBackendRefs {
                name: name.clone(),
                port: Some(*port as i32),
                ..Default::default()
            },
            BackendRef::Resource { group, kind, name } => HTTPRouteRulesBackendRefs {
                group: group.clone(),
                kind: Some(kind.clone()),
                name: name.clone(),
                ..Default::default()
            },
        }
    }
}
