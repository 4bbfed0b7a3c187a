use std::path::PathBuf;

use i2gw::convert::{to_gateway_api_resources, Source};
use i2gw::providers::gce;
use i2gw::{FieldErrorKind, NamespacedName, NotificationType, ProviderConf, ProviderRegistry};
use serde_json::json;

fn testdata(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/testdata")
        .join(name)
}

fn registry() -> ProviderRegistry {
    ProviderRegistry::new().with(gce::PROVIDER_NAME, gce::new_provider)
}

#[tokio::test]
async fn test_convert_manifest() {
    let conversion = to_gateway_api_resources(
        &registry(),
        &["gce".to_string()],
        &ProviderConf::default(),
        &Source::File(testdata("gce.yaml")),
    )
    .await
    .unwrap();

    assert_eq!(conversion.outputs.len(), 1);
    let output = &conversion.outputs[0];
    assert_eq!(output.provider, "gce");

    // the named port on /admin is the only field error, and the rest of the
    // ingress still converts.
    let errors: Vec<_> = conversion.errors().collect();
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert_eq!(errors[0].kind(), FieldErrorKind::NotSupported);
    assert_eq!(
        errors[0].to_string(),
        "Ingress prod/shop: spec.rules[0].http.paths[2].backend.service.port.name: unsupported value: named ports not supported",
    );

    // the per-port BackendConfig on the api Service is skipped
    let notifications: Vec<_> = output.notifications.iter().collect();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].level, NotificationType::Error);
    assert_eq!(
        notifications[0].related.as_ref().map(|r| r.to_string()),
        Some("Service prod/api".to_string()),
    );

    let resources = &output.resources;
    assert_eq!(
        resources.gateways.keys().collect::<Vec<_>>(),
        vec![
            &NamespacedName::new("prod", "gce"),
            &NamespacedName::new("prod", "gce-internal"),
        ],
    );
    assert_eq!(
        resources.http_routes.keys().collect::<Vec<_>>(),
        vec![
            &NamespacedName::new("prod", "internal-default-backend"),
            &NamespacedName::new("prod", "shop-shop-example-com"),
        ],
    );

    assert_eq!(
        serde_json::to_value(&resources.gateways[&NamespacedName::new("prod", "gce")]).unwrap(),
        json!({
            "apiVersion": "gateway.networking.k8s.io/v1",
            "kind": "Gateway",
            "metadata": {"name": "gce", "namespace": "prod"},
            "spec": {
                "gatewayClassName": "gke-l7-global-external-managed",
                "listeners": [
                    {
                        "name": "shop-example-com-http",
                        "hostname": "shop.example.com",
                        "port": 80,
                        "protocol": "HTTP",
                    },
                    {
                        "name": "shop-example-com-https",
                        "hostname": "shop.example.com",
                        "port": 443,
                        "protocol": "HTTPS",
                        "tls": {"certificateRefs": [{"name": "shop-cert"}]},
                    },
                ],
            },
        }),
    );

    assert_eq!(
        serde_json::to_value(
            &resources.http_routes[&NamespacedName::new("prod", "shop-shop-example-com")]
        )
        .unwrap()["spec"]["rules"],
        json!([
            {
                "matches": [{"path": {"type": "PathPrefix", "value": "/"}}],
                "backendRefs": [{"name": "storefront", "port": 80}],
            },
            {
                "matches": [{"path": {"type": "Exact", "value": "/api"}}],
                "backendRefs": [{"name": "api", "port": 8080}],
            },
        ]),
    );

    let extensions: Vec<_> = resources
        .extensions
        .iter()
        .map(|e| (e.kind(), e.name().to_string()))
        .collect();
    assert_eq!(
        extensions,
        vec![
            ("GCPBackendPolicy", "prod/storefront".to_string()),
            ("HealthCheckPolicy", "prod/storefront".to_string()),
            ("GCPGatewayPolicy", "prod/gce".to_string()),
        ],
    );

    // storefront has both annotations, the v1 BackendConfig is the one used
    assert_eq!(
        resources.extensions[0].to_document().unwrap()["spec"]["default"],
        json!({
            "sessionAffinity": {"type": "GENERATED_COOKIE", "cookieTtlSec": 300},
            "securityPolicy": "edge-armor",
        }),
    );
    assert_eq!(
        resources.extensions[1].to_document().unwrap()["spec"]["default"]["config"],
        json!({
            "type": "HTTP",
            "httpHealthCheck": {"port": 8081, "requestPath": "/healthz"},
        }),
    );
    assert_eq!(
        resources.extensions[2].to_document().unwrap()["spec"]["default"],
        json!({"sslPolicy": "modern-tls"}),
    );

    assert_eq!(resources.documents().unwrap().len(), 7);
}

#[tokio::test]
async fn test_convert_namespace() {
    let conf = ProviderConf {
        namespace: Some("staging".to_string()),
    };
    let conversion = to_gateway_api_resources(
        &registry(),
        &["gce".to_string()],
        &conf,
        &Source::File(testdata("gce.yaml")),
    )
    .await
    .unwrap();

    assert!(!conversion.has_errors());
    assert!(conversion.outputs[0].resources.is_empty());
}

#[tokio::test]
async fn test_unknown_provider() {
    let err = to_gateway_api_resources(
        &registry(),
        &["istio".to_string()],
        &ProviderConf::default(),
        &Source::File(testdata("gce.yaml")),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, i2gw::Error::UnknownProvider(name) if name == "istio"));
}

#[tokio::test]
async fn test_missing_file() {
    let err = to_gateway_api_resources(
        &registry(),
        &["gce".to_string()],
        &ProviderConf::default(),
        &Source::File(testdata("does-not-exist.yaml")),
    )
    .await
    .unwrap_err();

    assert!(
        matches!(&err, i2gw::Error::Provider { provider: "gce", .. }),
        "{err}"
    );
}
