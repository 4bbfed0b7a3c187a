use std::collections::BTreeSet;

use k8s_openapi::api::networking::v1::Ingress;

use super::storage::Storage;
use super::{
    extensions, GCE_INGRESS_CLASS, GCE_L7_GLOBAL_EXTERNAL_MANAGED_GATEWAY_CLASS,
    GCE_L7_ILB_INGRESS_CLASS, GCE_L7_REGIONAL_INTERNAL_GATEWAY_CLASS,
};
use crate::common::{self, get_ingress_class, ToIrOptions};
use crate::ir::{Ir, PathMatch};
use crate::{FieldError, NamespacedName, Notifications, ObjectRef};

/// GCE treats a trailing `/*` as a prefix wildcard. Any other path is matched
/// exactly.
pub(crate) fn implementation_specific_path_match(path: &str) -> PathMatch {
    match path.strip_suffix("/*") {
        Some("") => PathMatch::prefix("/"),
        Some(prefix) => PathMatch::prefix(prefix),
        None => PathMatch::exact(path),
    }
}

/// Convert everything in storage into the IR, including GCE extensions.
pub(crate) fn to_ir(storage: &Storage, notifications: &mut Notifications) -> (Ir, Vec<FieldError>) {
    let ingresses: Vec<Ingress> = storage.ingresses.values().cloned().collect();

    let options = ToIrOptions {
        implementation_specific_path_match: Some(implementation_specific_path_match),
        default_ingress_class: Some(GCE_INGRESS_CLASS.to_string()),
    };
    let (mut ir, mut errors) = common::to_ir(&ingresses, &options);

    errors.extend(set_gateway_classes(&ingresses, &mut ir));

    extensions::build_service_ir(storage, &mut ir, notifications);
    extensions::build_gateway_ir(storage, &mut ir, notifications);

    (ir, errors)
}

fn gateway_class(ingress_class: &str) -> Option<&'static str> {
    match ingress_class {
        GCE_INGRESS_CLASS => Some(GCE_L7_GLOBAL_EXTERNAL_MANAGED_GATEWAY_CLASS),
        GCE_L7_ILB_INGRESS_CLASS => Some(GCE_L7_REGIONAL_INTERNAL_GATEWAY_CLASS),
        _ => None,
    }
}

/// Swap every Gateway's ingress class for the matching GKE GatewayClass.
///
/// A Gateway for any other ingress class can't be converted. It's removed from
/// the IR along with every route attached to it, and each Ingress that used
/// the class gets a field error.
fn set_gateway_classes(ingresses: &[Ingress], ir: &mut Ir) -> Vec<FieldError> {
    let mut unsupported = BTreeSet::new();

    for (key, gateway) in ir.gateways.iter_mut() {
        match gateway_class(&gateway.gateway_class_name) {
            Some(class) => gateway.gateway_class_name = class.to_string(),
            None => {
                unsupported.insert(key.clone());
            }
        }
    }

    if unsupported.is_empty() {
        return vec![];
    }

    ir.gateways.retain(|key, _| !unsupported.contains(key));
    ir.http_routes.retain(|key, route| {
        !route.parent_refs.iter().any(|parent| {
            let namespace = parent.namespace.as_deref().unwrap_or(&key.namespace);
            unsupported.contains(&NamespacedName::new(namespace, &parent.name))
        })
    });

    ingresses
        .iter()
        .filter_map(|ingress| {
            let class = get_ingress_class(ingress).unwrap_or(GCE_INGRESS_CLASS);
            let namespace = ingress.metadata.namespace.as_deref().unwrap_or_default();
            let gateway = NamespacedName::new(namespace, class);

            unsupported.contains(&gateway).then(|| {
                tracing::debug!(%gateway, class, "skipping gateway for unsupported ingress class");
                FieldError::not_supported(format!("Ingress class not supported: {class}"))
                    .for_object(&ObjectRef::from_resource(ingress))
            })
        })
        .collect()
}
