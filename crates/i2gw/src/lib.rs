//! Convert Ingress resources to Gateway API resources.
//!
//! Conversion runs as a one-shot pipeline per provider:
//!
//! 1. a provider reads the objects it cares about, from a cluster or a
//!    manifest file, into its own storage.
//! 2. the [common] converter turns plain Ingresses into a provider-neutral
//!    [Ir](ir::Ir).
//! 3. the provider enriches that IR with its own semantics, like GCE session
//!    affinity from BackendConfigs.
//! 4. the IR is lowered into [GatewayResources]: Gateway API objects plus any
//!    vendor [policy extensions](PolicyExtension).
//!
//! Problems with individual objects never abort a conversion. They're
//! collected as [FieldError]s or reported as [Notification]s and conversion
//! continues with everything else.
//!
//! Use [convert::to_gateway_api_resources] to run every requested provider
//! from a [ProviderRegistry].

mod error;
pub use error::{Error, FieldError, FieldErrorKind};

mod shared;
pub use shared::{NamespacedName, ObjectRef};

pub mod common;
pub mod convert;
pub mod ir;
pub mod manifest;
pub mod notifications;
pub mod providers;

mod kube;
mod provider;
mod resources;

pub use notifications::{Notification, NotificationType, Notifications};
pub use provider::{Provider, ProviderConf, ProviderConstructor, ProviderRegistry};
pub use resources::{GatewayResources, PolicyExtension};

/// Re-exported so that callers build objects with the same versions this
/// crate converts.
pub use gateway_api;
pub use k8s_openapi;
