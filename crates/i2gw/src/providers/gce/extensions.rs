//! GCE features that live outside of the Ingress: BackendConfigs attached to
//! Services and FrontendConfigs attached to Ingresses.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::Service;
use serde::Deserialize;

use super::crd::{BackendConfigOptions, HealthCheckConfig, SessionAffinityConfig};
use super::storage::Storage;
use super::GCE_INGRESS_CLASS;
use crate::common::get_ingress_class;
use crate::ir::gce::{
    GceGatewayIr, GceServiceIr, HealthCheck, HealthCheckProtocol, SessionAffinity,
};
use crate::ir::Ir;
use crate::{NamespacedName, NotificationType, Notifications, ObjectRef};

/// The Service annotation naming a `cloud.google.com/v1` BackendConfig.
pub const BACKEND_CONFIG_ANNOTATION: &str = "cloud.google.com/backend-config";

/// The Service annotation naming a `cloud.google.com/v1beta1` BackendConfig.
pub const BETA_BACKEND_CONFIG_ANNOTATION: &str = "beta.cloud.google.com/backend-config";

/// The Ingress annotation naming a FrontendConfig.
pub const FRONTEND_CONFIG_ANNOTATION: &str = "networking.gke.io/v1beta1.FrontendConfig";

/// The value of a BackendConfig annotation.
#[derive(Debug, Default, Deserialize)]
struct BackendConfigs {
    #[serde(default)]
    default: String,

    #[serde(default)]
    ports: BTreeMap<String, String>,
}

/// The Services that reference each BackendConfig, for both versions of the
/// CRD.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct BackendConfigMapping {
    pub(crate) v1: BTreeMap<NamespacedName, Vec<NamespacedName>>,
    pub(crate) v1beta1: BTreeMap<NamespacedName, Vec<NamespacedName>>,
}

/// Index every Service by the BackendConfig it references.
///
/// A Service with both annotations is only indexed by the v1 annotation. A
/// Service with an annotation that can't be used is left out entirely.
pub(crate) fn backend_config_mapping(
    storage: &Storage,
    notifications: &mut Notifications,
) -> BackendConfigMapping {
    let mut mapping = BackendConfigMapping::default();

    for (svc_key, service) in &storage.services {
        if let Some(name) = backend_config_name(service, BACKEND_CONFIG_ANNOTATION, notifications) {
            let config_key = NamespacedName::new(&svc_key.namespace, name);
            mapping.v1.entry(config_key).or_default().push(svc_key.clone());
            continue;
        }

        if let Some(name) =
            backend_config_name(service, BETA_BACKEND_CONFIG_ANNOTATION, notifications)
        {
            let config_key = NamespacedName::new(&svc_key.namespace, name);
            mapping.v1beta1.entry(config_key).or_default().push(svc_key.clone());
        }
    }

    mapping
}

/// Get the name of the BackendConfig a Service references with an annotation.
pub(crate) fn backend_config_name(
    service: &Service,
    annotation: &str,
    notifications: &mut Notifications,
) -> Option<String> {
    let value = service.metadata.annotations.as_ref()?.get(annotation)?;
    let service_ref = ObjectRef::from_resource(service);
    parse_backend_config_name(value, &service_ref, notifications)
}

/// Parse a BackendConfig annotation.
///
/// Only a single default config that applies to every port on the Service is
/// supported, since the policies it converts to attach to a whole Service.
fn parse_backend_config_name(
    value: &str,
    service: &ObjectRef,
    notifications: &mut Notifications,
) -> Option<String> {
    let Ok(configs) = serde_json::from_str::<BackendConfigs>(value) else {
        notifications.notify(
            NotificationType::Error,
            "BackendConfig annotation is invalid json",
            Some(service),
        );
        return None;
    };

    if configs.default.is_empty() && configs.ports.is_empty() {
        notifications.notify(
            NotificationType::Error,
            "No BackendConfig's found in annotation",
            Some(service),
        );
        return None;
    }

    if !configs.ports.is_empty() {
        notifications.notify(
            NotificationType::Error,
            "Only config with default is supported since HealthCheckPolicy is attached on the whole service",
            Some(service),
        );
        return None;
    }

    Some(configs.default)
}

/// Attach a [GceServiceIr] to every Service that references a BackendConfig.
///
/// v1beta1 configs are applied before v1 configs, so when both end up on the
/// same Service, v1 wins.
pub(crate) fn build_service_ir(storage: &Storage, ir: &mut Ir, notifications: &mut Notifications) {
    let mapping = backend_config_mapping(storage, notifications);

    let beta_configs = mapping.v1beta1.iter().map(|(key, services)| {
        let config = storage.beta_backend_configs.get(key).map(|c| &c.spec.inner);
        (key, "v1beta1", config, services)
    });
    let configs = mapping.v1.iter().map(|(key, services)| {
        let config = storage.backend_configs.get(key).map(|c| &c.spec.inner);
        (key, "v1", config, services)
    });

    for (key, version, config, services) in beta_configs.chain(configs) {
        let config_ref = ObjectRef::new("BackendConfig", key.clone());

        let Some(config) = config else {
            for svc in services {
                notifications.notify(
                    NotificationType::Warning,
                    format!("{version} BackendConfig {key} not found"),
                    Some(&ObjectRef::new("Service", svc.clone())),
                );
            }
            continue;
        };

        let gce_ir = to_gce_service_ir(config, &config_ref, notifications);
        if gce_ir.is_empty() {
            continue;
        }

        for svc in services {
            ir.service_mut(svc).gce = Some(gce_ir.clone());
        }
    }
}

/// Normalize a BackendConfig of any version.
pub(crate) fn to_gce_service_ir(
    config: &BackendConfigOptions,
    config_ref: &ObjectRef,
    notifications: &mut Notifications,
) -> GceServiceIr {
    let session_affinity = config
        .session_affinity
        .as_ref()
        .and_then(|sa| to_session_affinity(sa, config_ref, notifications));

    let security_policy = config
        .security_policy
        .as_ref()
        .map(|sp| sp.name.clone())
        .filter(|name| !name.is_empty());

    let health_check = config
        .health_check
        .as_ref()
        .and_then(|hc| to_health_check(hc, config_ref, notifications));

    GceServiceIr {
        session_affinity,
        security_policy,
        health_check,
    }
}

fn to_session_affinity(
    config: &SessionAffinityConfig,
    config_ref: &ObjectRef,
    notifications: &mut Notifications,
) -> Option<SessionAffinity> {
    let affinity_type = config.affinity_type.as_deref().filter(|t| !t.is_empty())?;

    let affinity = SessionAffinity::from_type(affinity_type, config.affinity_cookie_ttl_sec);
    if affinity.is_none() {
        notifications.notify(
            NotificationType::Warning,
            format!("unsupported session affinity type {affinity_type}, ignoring sessionAffinity"),
            Some(config_ref),
        );
    }
    affinity
}

fn to_health_check(
    config: &HealthCheckConfig,
    config_ref: &ObjectRef,
    notifications: &mut Notifications,
) -> Option<HealthCheck> {
    let protocol = match config.protocol.as_deref() {
        None | Some("") => HealthCheckProtocol::default(),
        Some(p) => match HealthCheckProtocol::from_type(p) {
            Some(protocol) => protocol,
            None => {
                notifications.notify(
                    NotificationType::Warning,
                    format!("unsupported health check type {p}, ignoring healthCheck"),
                    Some(config_ref),
                );
                return None;
            }
        },
    };

    Some(HealthCheck {
        check_interval_sec: config.check_interval_sec,
        timeout_sec: config.timeout_sec,
        healthy_threshold: config.healthy_threshold,
        unhealthy_threshold: config.unhealthy_threshold,
        protocol,
        port: config.port,
        request_path: config.request_path.clone(),
    })
}

/// Attach a [GceGatewayIr] to every Gateway whose Ingresses reference a
/// FrontendConfig with an SSL policy.
///
/// When Ingresses that share a Gateway disagree on an SSL policy, the first
/// Ingress by namespace and name wins.
pub(crate) fn build_gateway_ir(storage: &Storage, ir: &mut Ir, notifications: &mut Notifications) {
    for (ingress_key, ingress) in &storage.ingresses {
        let Some(config_name) = ingress
            .metadata
            .annotations
            .as_ref()
            .and_then(|a| a.get(FRONTEND_CONFIG_ANNOTATION))
        else {
            continue;
        };

        let ingress_ref = ObjectRef::new("Ingress", ingress_key.clone());
        let config_key = NamespacedName::new(&ingress_key.namespace, config_name);
        let Some(config) = storage.frontend_configs.get(&config_key) else {
            notifications.notify(
                NotificationType::Warning,
                format!("FrontendConfig {config_key} not found"),
                Some(&ingress_ref),
            );
            continue;
        };

        let config_ref = ObjectRef::new("FrontendConfig", config_key.clone());
        if config.spec.redirect_to_https.as_ref().is_some_and(|r| r.enabled) {
            notifications.notify(
                NotificationType::Warning,
                "redirectToHttps is not converted, add a RequestRedirect filter to the HTTP routes instead",
                Some(&config_ref),
            );
        }

        let Some(ssl_policy) = config.spec.ssl_policy.as_ref().filter(|p| !p.is_empty()) else {
            continue;
        };

        let class = get_ingress_class(ingress).unwrap_or(GCE_INGRESS_CLASS);
        let gateway_key = NamespacedName::new(&ingress_key.namespace, class);
        let Some(gateway) = ir.gateways.get_mut(&gateway_key) else {
            continue;
        };

        let gce = gateway.extension_mut().gce.get_or_insert_with(GceGatewayIr::default);
        match &gce.ssl_policy {
            Some(existing) if existing != ssl_policy => notifications.notify(
                NotificationType::Warning,
                format!(
                    "Gateway {gateway_key} already uses sslPolicy {existing}, ignoring sslPolicy {ssl_policy}"
                ),
                Some(&config_ref),
            ),
            Some(_) => (),
            None => gce.ssl_policy = Some(ssl_policy.clone()),
        }
    }
}
