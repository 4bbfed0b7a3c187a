//! GCE sub-records of the IR.
//!
//! These are normalized from BackendConfig and FrontendConfig objects. They
//! don't care which CRD version they came from.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GceServiceIr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_affinity: Option<SessionAffinity>,

    /// The name of a Cloud Armor security policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_policy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_check: Option<HealthCheck>,
}

impl GceServiceIr {
    pub fn is_empty(&self) -> bool {
        self.session_affinity.is_none()
            && self.security_policy.is_none()
            && self.health_check.is_none()
    }
}

/// How a load balancer pins clients to backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionAffinity {
    #[serde(rename = "CLIENT_IP")]
    ClientIp,

    #[serde(rename = "GENERATED_COOKIE")]
    GeneratedCookie {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cookie_ttl_sec: Option<i64>,
    },

    #[serde(rename = "NONE")]
    None,
}

impl SessionAffinity {
    /// Parse a GCE affinity type. The cookie TTL is only kept for generated
    /// cookie affinity and is ignored for every other type.
    pub fn from_type(affinity_type: &str, cookie_ttl_sec: Option<i64>) -> Option<Self> {
        match affinity_type {
            "CLIENT_IP" => Some(SessionAffinity::ClientIp),
            "GENERATED_COOKIE" => Some(SessionAffinity::GeneratedCookie { cookie_ttl_sec }),
            "NONE" => Some(SessionAffinity::None),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            SessionAffinity::ClientIp => "CLIENT_IP",
            SessionAffinity::GeneratedCookie { .. } => "GENERATED_COOKIE",
            SessionAffinity::None => "NONE",
        }
    }

    pub fn cookie_ttl_sec(&self) -> Option<i64> {
        match self {
            SessionAffinity::GeneratedCookie { cookie_ttl_sec } => *cookie_ttl_sec,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_interval_sec: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_sec: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healthy_threshold: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unhealthy_threshold: Option<i64>,

    pub protocol: HealthCheckProtocol,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_path: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthCheckProtocol {
    #[default]
    #[serde(rename = "HTTP")]
    Http,

    #[serde(rename = "HTTPS")]
    Https,

    #[serde(rename = "HTTP2")]
    Http2,
}

impl HealthCheckProtocol {
    pub fn from_type(s: &str) -> Option<Self> {
        match s {
            "HTTP" => Some(Self::Http),
            "HTTPS" => Some(Self::Https),
            "HTTP2" => Some(Self::Http2),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "HTTP",
            Self::Https => "HTTPS",
            Self::Http2 => "HTTP2",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GceGatewayIr {
    /// The name of a GCP SSL policy applied to every HTTPS listener.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_policy: Option<String>,
}
