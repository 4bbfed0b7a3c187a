use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;

use crate::ir::Ir;
use crate::{Error, FieldError, GatewayResources, Notifications};

/// Configuration shared by every provider in a conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderConf {
    /// Only read objects from this namespace. Read from every namespace when
    /// unset.
    pub namespace: Option<String>,
}

/// A source of Ingress-family objects and the rules for converting them.
///
/// A provider is used for exactly one conversion. It reads everything it needs
/// into its own storage with one of the `read_resources_*` methods, then
/// converts that storage with [Provider::to_ir] and lowers the result with
/// [Provider::to_gateway_resources].
#[async_trait]
pub trait Provider: Send {
    fn name(&self) -> &'static str;

    /// Read resources from a cluster.
    ///
    /// Storage is only replaced once every kind has been read, so dropping the
    /// returned future part way through leaves the provider untouched.
    async fn read_resources_from_cluster(&mut self, client: &kube::Client) -> Result<(), Error>;

    /// Read resources from a manifest file.
    fn read_resources_from_file(&mut self, path: &Path) -> Result<(), Error>;

    /// Convert stored resources to the IR.
    fn to_ir(&self, notifications: &mut Notifications) -> (Ir, Vec<FieldError>);

    /// Lower an IR produced by [Provider::to_ir] into Gateway API objects and
    /// this provider's policy extensions.
    fn to_gateway_resources(
        &self,
        ir: Ir,
        notifications: &mut Notifications,
    ) -> (GatewayResources, Vec<FieldError>);
}

/// Build a new provider.
pub type ProviderConstructor = fn(&ProviderConf) -> Box<dyn Provider>;

/// The set of providers available to a conversion, by name.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    constructors: BTreeMap<&'static str, ProviderConstructor>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider. Registering the same name twice replaces the
    /// previous constructor.
    pub fn with(mut self, name: &'static str, constructor: ProviderConstructor) -> Self {
        self.constructors.insert(name, constructor);
        self
    }

    /// The names of all registered providers, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.constructors.keys().copied()
    }

    pub fn build(&self, name: &str, conf: &ProviderConf) -> Result<Box<dyn Provider>, Error> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| Error::UnknownProvider(name.to_string()))?;

        Ok(constructor(conf))
    }
}
