//! GKE custom resources.
//!
//! BackendConfig and FrontendConfig are read as input. Only the fields that
//! get converted are modeled, everything else is ignored when deserializing.
//!
//! GCPBackendPolicy, HealthCheckPolicy and GCPGatewayPolicy are output-only
//! policy attachments for the GKE Gateway controller.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The parts of a BackendConfig spec shared by every version of the CRD.
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, Eq, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfigOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_affinity: Option<SessionAffinityConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_policy: Option<SecurityPolicyConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_check: Option<HealthCheckConfig>,
}

#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, Eq, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SessionAffinityConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affinity_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affinity_cookie_ttl_sec: Option<i64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, Eq, PartialEq, Default)]
pub struct SecurityPolicyConfig {
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, Eq, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_interval_sec: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_sec: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healthy_threshold: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unhealthy_threshold: Option<i64>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_path: Option<String>,
}

pub mod v1 {
    use super::*;

    #[derive(CustomResource, Serialize, Deserialize, Clone, Debug, JsonSchema, Default)]
    #[kube(
        group = "cloud.google.com",
        version = "v1",
        kind = "BackendConfig",
        plural = "backendconfigs"
    )]
    #[kube(namespaced)]
    #[kube(derive = "Default")]
    pub struct BackendConfigSpec {
        #[serde(flatten)]
        pub inner: BackendConfigOptions,
    }
}

pub mod v1beta1 {
    use super::*;

    #[derive(CustomResource, Serialize, Deserialize, Clone, Debug, JsonSchema, Default)]
    #[kube(
        group = "cloud.google.com",
        version = "v1beta1",
        kind = "BackendConfig",
        plural = "backendconfigs"
    )]
    #[kube(namespaced)]
    #[kube(derive = "Default")]
    pub struct BackendConfigSpec {
        #[serde(flatten)]
        pub inner: BackendConfigOptions,
    }

    #[derive(CustomResource, Serialize, Deserialize, Clone, Debug, JsonSchema, Default)]
    #[kube(
        group = "networking.gke.io",
        version = "v1beta1",
        kind = "FrontendConfig",
        plural = "frontendconfigs"
    )]
    #[kube(namespaced)]
    #[kube(derive = "Default")]
    #[serde(rename_all = "camelCase")]
    pub struct FrontendConfigSpec {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub ssl_policy: Option<String>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub redirect_to_https: Option<HttpsRedirectConfig>,
    }

    #[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, Eq, PartialEq, Default)]
    #[serde(rename_all = "camelCase")]
    pub struct HttpsRedirectConfig {
        #[serde(default)]
        pub enabled: bool,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub response_code_name: Option<String>,
    }
}

/// A reference to the object a policy is attached to.
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, Eq, PartialEq, Default)]
pub struct PolicyTargetReference {
    pub group: String,
    pub kind: String,
    pub name: String,
}

impl PolicyTargetReference {
    pub(crate) fn service(name: &str) -> Self {
        Self {
            group: String::new(),
            kind: "Service".to_string(),
            name: name.to_string(),
        }
    }

    pub(crate) fn gateway(name: &str) -> Self {
        Self {
            group: "gateway.networking.k8s.io".to_string(),
            kind: "Gateway".to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, JsonSchema, Default)]
#[kube(
    group = "networking.gke.io",
    version = "v1",
    kind = "GCPBackendPolicy",
    plural = "gcpbackendpolicies"
)]
#[kube(namespaced)]
#[kube(derive = "Default")]
#[serde(rename_all = "camelCase")]
pub struct GCPBackendPolicySpec {
    pub default: GCPBackendPolicyConfig,
    pub target_ref: PolicyTargetReference,
}

#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, Eq, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GCPBackendPolicyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_affinity: Option<BackendPolicySessionAffinity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_policy: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, Eq, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BackendPolicySessionAffinity {
    #[serde(rename = "type")]
    pub affinity_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie_ttl_sec: Option<i64>,
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, JsonSchema, Default)]
#[kube(
    group = "networking.gke.io",
    version = "v1",
    kind = "HealthCheckPolicy",
    plural = "healthcheckpolicies"
)]
#[kube(namespaced)]
#[kube(derive = "Default")]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckPolicySpec {
    pub default: HealthCheckPolicyConfig,
    pub target_ref: PolicyTargetReference,
}

#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, Eq, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckPolicyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_interval_sec: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_sec: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healthy_threshold: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unhealthy_threshold: Option<i64>,

    pub config: CommonHealthCheck,
}

/// The protocol specific part of a HealthCheckPolicy. Exactly one of the
/// protocol fields is set, matching `type`.
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, Eq, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CommonHealthCheck {
    #[serde(rename = "type")]
    pub protocol: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_health_check: Option<HttpHealthCheck>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub https_health_check: Option<HttpHealthCheck>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http2_health_check: Option<HttpHealthCheck>,
}

#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, Eq, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HttpHealthCheck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_path: Option<String>,
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, JsonSchema, Default)]
#[kube(
    group = "networking.gke.io",
    version = "v1",
    kind = "GCPGatewayPolicy",
    plural = "gcpgatewaypolicies"
)]
#[kube(namespaced)]
#[kube(derive = "Default")]
#[serde(rename_all = "camelCase")]
pub struct GCPGatewayPolicySpec {
    pub default: GCPGatewayPolicyConfig,
    pub target_ref: PolicyTargetReference,
}

#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, Eq, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GCPGatewayPolicyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_policy: Option<String>,
}
