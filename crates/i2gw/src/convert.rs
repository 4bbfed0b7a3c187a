//! Run providers end to end.

use std::path::PathBuf;

use crate::{
    Error, FieldError, GatewayResources, Notifications, ProviderConf, ProviderRegistry,
};

/// Where providers read their input from.
#[derive(Clone)]
pub enum Source {
    Cluster(kube::Client),
    File(PathBuf),
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Cluster(_) => f.write_str("Cluster"),
            Source::File(path) => f.debug_tuple("File").field(path).finish(),
        }
    }
}

/// Everything one provider produced.
#[derive(Debug)]
pub struct ProviderOutput {
    pub provider: &'static str,
    pub resources: GatewayResources,
    pub notifications: Notifications,
    pub errors: Vec<FieldError>,
}

/// The result of running every requested provider, in the order they were
/// requested.
#[derive(Debug, Default)]
pub struct Conversion {
    pub outputs: Vec<ProviderOutput>,
}

impl Conversion {
    pub fn errors(&self) -> impl Iterator<Item = &FieldError> {
        self.outputs.iter().flat_map(|o| o.errors.iter())
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }
}

/// Convert resources with every named provider.
///
/// Providers run one at a time. A provider that fails to read its input stops
/// the whole conversion with an [Error]. Field errors never do: each
/// provider's field errors are returned next to the resources it could still
/// convert.
pub async fn to_gateway_api_resources(
    registry: &ProviderRegistry,
    providers: &[String],
    conf: &ProviderConf,
    source: &Source,
) -> Result<Conversion, Error> {
    let mut conversion = Conversion::default();

    for name in providers {
        let mut provider = registry.build(name, conf)?;
        let provider_name = provider.name();

        match source {
            Source::Cluster(client) => provider.read_resources_from_cluster(client).await,
            Source::File(path) => provider.read_resources_from_file(path),
        }
        .map_err(|e| e.for_provider(provider_name))?;

        let mut notifications = Notifications::new();
        let (ir, mut errors) = provider.to_ir(&mut notifications);
        let (resources, lowering_errors) = provider.to_gateway_resources(ir, &mut notifications);
        errors.extend(lowering_errors);

        tracing::debug!(
            provider = provider_name,
            errors = errors.len(),
            notifications = notifications.len(),
            "finished conversion"
        );

        conversion.outputs.push(ProviderOutput {
            provider: provider_name,
            resources,
            notifications,
            errors,
        });
    }

    Ok(conversion)
}
