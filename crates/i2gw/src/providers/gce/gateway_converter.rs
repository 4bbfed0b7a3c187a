use super::crd::{
    BackendPolicySessionAffinity, CommonHealthCheck, GCPBackendPolicy, GCPBackendPolicyConfig,
    GCPBackendPolicySpec, GCPGatewayPolicy, GCPGatewayPolicyConfig, GCPGatewayPolicySpec,
    HealthCheckPolicy, HealthCheckPolicyConfig, HealthCheckPolicySpec, HttpHealthCheck,
    PolicyTargetReference,
};
use crate::ir::gce::{GceGatewayIr, GceServiceIr, HealthCheck, HealthCheckProtocol};
use crate::ir::Ir;
use crate::{FieldError, GatewayResources, NamespacedName, PolicyExtension};

/// Lower a GCE IR into Gateway API objects and GKE policies.
///
/// Policies are named after the object they attach to. Services and Gateways
/// without GCE extensions get no policies.
pub(crate) fn to_gateway_resources(ir: Ir) -> (GatewayResources, Vec<FieldError>) {
    let (mut resources, errors) = ir.to_gateway_resources();

    for (svc, service_ir) in &ir.services {
        let Some(gce) = &service_ir.gce else {
            continue;
        };

        if let Some(policy) = backend_policy(svc, gce) {
            resources
                .extensions
                .push(PolicyExtension::GcpBackendPolicy(policy));
        }
        if let Some(policy) = gce.health_check.as_ref().map(|hc| health_check_policy(svc, hc)) {
            resources
                .extensions
                .push(PolicyExtension::HealthCheckPolicy(policy));
        }
    }

    for (gateway, context) in &ir.gateways {
        let gateway_policy = context
            .extension
            .as_ref()
            .and_then(|ext| ext.gce.as_ref())
            .and_then(|gce| gateway_policy(gateway, gce));

        if let Some(policy) = gateway_policy {
            resources
                .extensions
                .push(PolicyExtension::GcpGatewayPolicy(policy));
        }
    }

    tracing::debug!(
        gateways = resources.gateways.len(),
        http_routes = resources.http_routes.len(),
        extensions = resources.extensions.len(),
        "lowered gce ir"
    );
    (resources, errors)
}

/// Named `<svc>`, not `<svc>-GCPBackendPolicy`: uppercase isn't valid in an object name.
fn backend_policy(svc: &NamespacedName, gce: &GceServiceIr) -> Option<GCPBackendPolicy> {
    if gce.session_affinity.is_none() && gce.security_policy.is_none() {
        return None;
    }

    let session_affinity = gce
        .session_affinity
        .as_ref()
        .map(|sa| BackendPolicySessionAffinity {
            affinity_type: sa.type_name().to_string(),
            cookie_ttl_sec: sa.cookie_ttl_sec(),
        });

    let spec = GCPBackendPolicySpec {
        default: GCPBackendPolicyConfig {
            session_affinity,
            security_policy: gce.security_policy.clone(),
        },
        target_ref: PolicyTargetReference::service(&svc.name),
    };

    let mut policy = GCPBackendPolicy::new(&svc.name, spec);
    policy.metadata.namespace = namespace(svc);
    Some(policy)
}

fn health_check_policy(svc: &NamespacedName, hc: &HealthCheck) -> HealthCheckPolicy {
    let http = HttpHealthCheck {
        port: hc.port,
        request_path: hc.request_path.clone(),
    };

    let mut config = CommonHealthCheck {
        protocol: hc.protocol.as_str().to_string(),
        ..Default::default()
    };
    match hc.protocol {
        HealthCheckProtocol::Http => config.http_health_check = Some(http),
        HealthCheckProtocol::Https => config.https_health_check = Some(http),
        HealthCheckProtocol::Http2 => config.http2_health_check = Some(http),
    }

    let spec = HealthCheckPolicySpec {
        default: HealthCheckPolicyConfig {
            check_interval_sec: hc.check_interval_sec,
            timeout_sec: hc.timeout_sec,
            healthy_threshold: hc.healthy_threshold,
            unhealthy_threshold: hc.unhealthy_threshold,
            config,
        },
        target_ref: PolicyTargetReference::service(&svc.name),
    };

    let mut policy = HealthCheckPolicy::new(&svc.name, spec);
    policy.metadata.namespace = namespace(svc);
    policy
}

fn gateway_policy(gateway: &NamespacedName, gce: &GceGatewayIr) -> Option<GCPGatewayPolicy> {
    let ssl_policy = gce.ssl_policy.clone()?;

    let spec = GCPGatewayPolicySpec {
        default: GCPGatewayPolicyConfig {
            ssl_policy: Some(ssl_policy),
        },
        target_ref: PolicyTargetReference::gateway(&gateway.name),
    };

    let mut policy = GCPGatewayPolicy::new(&gateway.name, spec);
    policy.metadata.namespace = namespace(gateway);
    Some(policy)
}

fn namespace(name: &NamespacedName) -> Option<String> {
    (!name.namespace.is_empty()).then(|| name.namespace.clone())
}
