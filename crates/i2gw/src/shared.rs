//! Object identities shared by every stage of a conversion.

use kube::api::ObjectMeta;
use serde::{Deserialize, Serialize};

/// The identity of a namespaced Kubernetes object.
///
/// Ordering compares namespace first and then name so that everything keyed
/// by a `NamespacedName` is emitted in a stable order.
#[derive(
    Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub struct NamespacedName {
    pub namespace: String,
    pub name: String,
}

impl NamespacedName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// The identity of an object from its metadata. A missing namespace or
    /// name is treated as the empty string.
    pub fn from_meta(meta: &ObjectMeta) -> Self {
        Self {
            namespace: meta.namespace.clone().unwrap_or_default(),
            name: meta.name.clone().unwrap_or_default(),
        }
    }
}

impl std::fmt::Display for NamespacedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// A reference to the object a diagnostic is about.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ObjectRef {
    pub kind: String,
    pub name: NamespacedName,
}

impl ObjectRef {
    pub fn new(kind: impl Into<String>, name: NamespacedName) -> Self {
        Self {
            kind: kind.into(),
            name,
        }
    }

    /// Reference a typed Kubernetes object by its kind and metadata.
    pub fn from_resource<K>(obj: &K) -> Self
    where
        K: kube::Resource<DynamicType = ()>,
    {
        Self {
            kind: K::kind(&()).to_string(),
            name: NamespacedName::from_meta(obj.meta()),
        }
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind, self.name)
    }
}
