//! The ingress-gce provider.
//!
//! Converts Ingresses for the `gce` and `gce-internal` classes, and any
//! Ingress with no class at all, into Gateways for the GKE Gateway
//! controller. BackendConfigs referenced from Services become
//! GCPBackendPolicy and HealthCheckPolicy objects, and FrontendConfigs
//! referenced from Ingresses become GCPGatewayPolicy objects.

use std::path::Path;

use async_trait::async_trait;

use crate::ir::Ir;
use crate::{Error, FieldError, GatewayResources, Notifications, ProviderConf};

pub mod crd;

mod extensions;
mod gateway_converter;
mod ir_converter;
mod storage;

pub const PROVIDER_NAME: &str = "gce";

pub(crate) const GCE_INGRESS_CLASS: &str = "gce";
pub(crate) const GCE_L7_ILB_INGRESS_CLASS: &str = "gce-internal";

pub(crate) const GCE_L7_GLOBAL_EXTERNAL_MANAGED_GATEWAY_CLASS: &str =
    "gke-l7-global-external-managed";
pub(crate) const GCE_L7_REGIONAL_INTERNAL_GATEWAY_CLASS: &str = "gke-l7-rilb";

#[derive(Debug)]
pub struct Provider {
    conf: ProviderConf,
    storage: storage::Storage,
}

/// Build a new GCE provider. Use this to register the provider with a
/// [ProviderRegistry](crate::ProviderRegistry).
pub fn new_provider(conf: &ProviderConf) -> Box<dyn crate::Provider> {
    Box::new(Provider {
        conf: conf.clone(),
        storage: Default::default(),
    })
}

#[async_trait]
impl crate::Provider for Provider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn read_resources_from_cluster(&mut self, client: &kube::Client) -> Result<(), Error> {
        self.storage = storage::read_from_cluster(client, &self.conf).await?;
        Ok(())
    }

    fn read_resources_from_file(&mut self, path: &Path) -> Result<(), Error> {
        self.storage = storage::read_from_file(path, &self.conf)?;
        Ok(())
    }

    fn to_ir(&self, notifications: &mut Notifications) -> (Ir, Vec<FieldError>) {
        ir_converter::to_ir(&self.storage, notifications)
    }

    fn to_gateway_resources(
        &self,
        ir: Ir,
        _notifications: &mut Notifications,
    ) -> (GatewayResources, Vec<FieldError>) {
        gateway_converter::to_gateway_resources(ir)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Provider as _;
    use crate::{NamespacedName, ProviderRegistry};

    const MANIFEST: &str = r#"
apiVersion: networking.k8s.io/v1
kind: Ingress
metadata:
  name: web
  namespace: default
spec:
  rules:
  - host: test.mydomain.com
    http:
      paths:
      - path: /
        pathType: Prefix
        backend:
          service:
            name: web
            port:
              number: 80
---
apiVersion: v1
kind: Service
metadata:
  name: web
  namespace: default
  annotations:
    cloud.google.com/backend-config: '{"default": "web"}'
spec:
  ports:
  - port: 80
---
apiVersion: cloud.google.com/v1
kind: BackendConfig
metadata:
  name: web
  namespace: default
spec:
  sessionAffinity:
    affinityType: CLIENT_IP
"#;

    #[test]
    fn test_provider() {
        let registry = ProviderRegistry::new().with(PROVIDER_NAME, new_provider);
        let mut provider = registry
            .build(PROVIDER_NAME, &ProviderConf::default())
            .unwrap();
        assert_eq!(provider.name(), "gce");

        // an empty provider converts to nothing
        let mut notifications = Notifications::new();
        let (ir, errors) = provider.to_ir(&mut notifications);
        assert!(errors.is_empty());
        assert!(ir.gateways.is_empty());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.yaml");
        std::fs::write(&path, MANIFEST).unwrap();

        provider.read_resources_from_file(&path).unwrap();
        let (ir, errors) = provider.to_ir(&mut notifications);
        assert!(errors.is_empty(), "{errors:?}");
        assert!(notifications.is_empty());

        assert_eq!(
            ir.gateways[&NamespacedName::new("default", "gce")].gateway_class_name,
            GCE_L7_GLOBAL_EXTERNAL_MANAGED_GATEWAY_CLASS,
        );

        let (resources, errors) = provider.to_gateway_resources(ir, &mut notifications);
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(resources.gateways.len(), 1);
        assert_eq!(resources.http_routes.len(), 1);
        assert_eq!(
            resources
                .extensions
                .iter()
                .map(|e| (e.kind(), e.name()))
                .collect::<Vec<_>>(),
            vec![("GCPBackendPolicy", NamespacedName::new("default", "web"))],
        );
    }

    #[test]
    fn test_read_missing_file() {
        let mut provider = new_provider(&ProviderConf::default());
        let err = provider
            .read_resources_from_file(Path::new("/does/not/exist.yaml"))
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
