use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::Path;

use k8s_openapi::api::core::v1::Service;
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::NamespaceResourceScope;
use kube::api::ListParams;
use kube::{Api, Resource};
use serde::de::DeserializeOwned;

use super::crd::{v1, v1beta1};
use super::{GCE_INGRESS_CLASS, GCE_L7_ILB_INGRESS_CLASS};
use crate::common::get_ingress_class;
use crate::{manifest, Error, NamespacedName, ProviderConf};

/// Every object the GCE provider converts, keyed by identity.
#[derive(Debug, Clone, Default)]
pub(crate) struct Storage {
    pub(crate) ingresses: BTreeMap<NamespacedName, Ingress>,
    pub(crate) services: BTreeMap<NamespacedName, Service>,
    pub(crate) backend_configs: BTreeMap<NamespacedName, v1::BackendConfig>,
    pub(crate) beta_backend_configs: BTreeMap<NamespacedName, v1beta1::BackendConfig>,
    pub(crate) frontend_configs: BTreeMap<NamespacedName, v1beta1::FrontendConfig>,
}

impl Storage {
    fn new(
        ingresses: Vec<Ingress>,
        services: Vec<Service>,
        backend_configs: Vec<v1::BackendConfig>,
        beta_backend_configs: Vec<v1beta1::BackendConfig>,
        frontend_configs: Vec<v1beta1::FrontendConfig>,
    ) -> Self {
        let ingresses: Vec<_> = ingresses.into_iter().filter(is_gce_ingress).collect();

        let storage = Self {
            ingresses: index(ingresses),
            services: index(services),
            backend_configs: index(backend_configs),
            beta_backend_configs: index(beta_backend_configs),
            frontend_configs: index(frontend_configs),
        };

        tracing::debug!(
            ingresses = storage.ingresses.len(),
            services = storage.services.len(),
            backend_configs = storage.backend_configs.len(),
            beta_backend_configs = storage.beta_backend_configs.len(),
            frontend_configs = storage.frontend_configs.len(),
            "read gce resources",
        );
        storage
    }
}

/// Ingresses without a class belong to GCE. Ingresses for any other
/// controller are ignored.
fn is_gce_ingress(ingress: &Ingress) -> bool {
    matches!(
        get_ingress_class(ingress),
        None | Some(GCE_INGRESS_CLASS) | Some(GCE_L7_ILB_INGRESS_CLASS)
    )
}

fn index<K: Resource>(objects: Vec<K>) -> BTreeMap<NamespacedName, K> {
    objects
        .into_iter()
        .map(|obj| (NamespacedName::from_meta(obj.meta()), obj))
        .collect()
}

pub(crate) fn read_from_file(path: &Path, conf: &ProviderConf) -> Result<Storage, Error> {
    let docs = manifest::read_manifests(path)?;
    let namespace = conf.namespace.as_deref();

    Ok(Storage::new(
        manifest::decode(&docs, namespace)?,
        manifest::decode(&docs, namespace)?,
        manifest::decode(&docs, namespace)?,
        manifest::decode(&docs, namespace)?,
        manifest::decode(&docs, namespace)?,
    ))
}

pub(crate) async fn read_from_cluster(
    client: &kube::Client,
    conf: &ProviderConf,
) -> Result<Storage, Error> {
    let namespace = conf.namespace.as_deref();

    let ingresses = list(client, namespace).await?;
    let services = list(client, namespace).await?;
    let backend_configs = list_crd(client, namespace).await?;
    let beta_backend_configs = list_crd(client, namespace).await?;
    let frontend_configs = list_crd(client, namespace).await?;

    Ok(Storage::new(
        ingresses,
        services,
        backend_configs,
        beta_backend_configs,
        frontend_configs,
    ))
}

async fn list<K>(client: &kube::Client, namespace: Option<&str>) -> Result<Vec<K>, Error>
where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + Debug
        + DeserializeOwned,
{
    let api: Api<K> = match namespace {
        Some(namespace) => Api::namespaced(client.clone(), namespace),
        None => Api::all(client.clone()),
    };

    let objects = api
        .list(&ListParams::default())
        .await
        .map_err(|source| Error::Kube {
            kind: K::kind(&()).to_string(),
            source,
        })?;

    Ok(objects.items)
}

/// List a custom resource, treating a CRD that isn't installed as an empty
/// list.
async fn list_crd<K>(client: &kube::Client, namespace: Option<&str>) -> Result<Vec<K>, Error>
where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + Debug
        + DeserializeOwned,
{
    match list(client, namespace).await {
        Err(Error::Kube {
            source: kube::Error::Api(response),
            ..
        }) if response.code == 404 => {
            tracing::debug!(
                kind = %K::kind(&()),
                api_version = %K::api_version(&()),
                "resource is not installed, skipping",
            );
            Ok(vec![])
        }
        res => res,
    }
}
