//! Read Kubernetes objects from manifest files.
//!
//! Manifests are multi-document YAML (JSON is valid YAML) and may contain
//! `List` objects. Documents are kept untyped until a provider decodes the
//! kinds it's interested in.

use std::path::Path;

use kube::Resource;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::Error;

/// Read every object from a manifest file. `List` objects are flattened into
/// their items and empty documents are skipped.
pub fn read_manifests(path: impl AsRef<Path>) -> Result<Vec<serde_json::Value>, Error> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let docs = parse_manifests(&contents).map_err(|source| Error::Manifest {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), objects = docs.len(), "read manifest");
    Ok(docs)
}

/// Parse every object from a multi-document YAML string.
pub fn parse_manifests(contents: &str) -> Result<Vec<serde_json::Value>, serde_yml::Error> {
    let mut docs = Vec::new();

    for document in serde_yml::Deserializer::from_str(contents) {
        let value = serde_json::Value::deserialize(document)?;
        flatten_into(value, &mut docs);
    }

    Ok(docs)
}

fn flatten_into(value: serde_json::Value, docs: &mut Vec<serde_json::Value>) {
    match value {
        serde_json::Value::Null => (),
        serde_json::Value::Object(mut obj) if is_list(&obj) => {
            if let Some(serde_json::Value::Array(items)) = obj.remove("items") {
                for item in items {
                    flatten_into(item, docs);
                }
            }
        }
        value => docs.push(value),
    }
}

fn is_list(obj: &serde_json::Map<String, serde_json::Value>) -> bool {
    obj.get("kind")
        .and_then(|k| k.as_str())
        .is_some_and(|k| k.ends_with("List"))
        && obj.get("items").is_some_and(|items| items.is_array())
}

/// Decode every document that has the same apiVersion and kind as `K`.
///
/// When a namespace is given, objects in any other namespace are skipped.
/// A document that matches but fails to decode is an error.
pub fn decode<K>(docs: &[serde_json::Value], namespace: Option<&str>) -> Result<Vec<K>, Error>
where
    K: Resource<DynamicType = ()> + DeserializeOwned,
{
    let api_version = K::api_version(&());
    let kind = K::kind(&());

    let mut objects = Vec::new();
    for doc in docs {
        if doc["apiVersion"].as_str() != Some(api_version.as_ref())
            || doc["kind"].as_str() != Some(kind.as_ref())
        {
            continue;
        }

        if let Some(namespace) = namespace {
            if doc["metadata"]["namespace"].as_str() != Some(namespace) {
                continue;
            }
        }

        let obj = K::deserialize(doc).map_err(|source| Error::Decode {
            kind: kind.to_string(),
            name: doc["metadata"]["name"].as_str().unwrap_or_default().to_string(),
            source,
        })?;
        objects.push(obj);
    }

    Ok(objects)
}
