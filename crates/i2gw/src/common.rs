//! Convert plain Ingresses into the IR, ignoring every provider-specific
//! annotation and CRD.
//!
//! Ingress rules are grouped by namespace, ingress class and host. Every group
//! becomes one HTTPRoute attached to a Gateway named after the ingress class,
//! and adds listeners for its host to that Gateway. Paths that match the same
//! requests are merged into a single route rule with multiple backends.

use std::collections::BTreeMap;

use k8s_openapi::api::networking::v1::{
    HTTPIngressPath, Ingress, IngressBackend, IngressRule, IngressTLS,
};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ErrorContext, FieldError};
use crate::ir::{
    BackendRef, GatewayContext, HttpRouteContext, HttpRouteRule, Ir, Listener, ListenerProtocol,
    ListenerTls, ParentRef, PathMatch,
};
use crate::{NamespacedName, ObjectRef};

/// The annotation used to pick an ingress class before `spec.ingressClassName`
/// existed.
pub const INGRESS_CLASS_ANNOTATION: &str = "kubernetes.io/ingress.class";

const NON_ALPHANUMERIC_PATTERN: &str = "[^a-zA-Z0-9]+";

/// Translate an `ImplementationSpecific` Ingress path into a path match.
pub type PathMatchHook = fn(&str) -> PathMatch;

/// Provider hooks for the common converter.
#[derive(Debug, Clone, Default)]
pub struct ToIrOptions {
    /// How to treat `ImplementationSpecific` paths. Without a hook they're
    /// reported as unsupported.
    pub implementation_specific_path_match: Option<PathMatchHook>,

    /// The ingress class of any Ingress that doesn't name one.
    pub default_ingress_class: Option<String>,
}

/// Get the ingress class of an Ingress from `spec.ingressClassName` or the
/// legacy annotation. Returns `None` if neither is set.
pub fn get_ingress_class(ingress: &Ingress) -> Option<&str> {
    let from_spec = ingress
        .spec
        .as_ref()
        .and_then(|spec| spec.ingress_class_name.as_deref())
        .filter(|class| !class.is_empty());

    from_spec.or_else(|| {
        ingress
            .metadata
            .annotations
            .as_ref()
            .and_then(|annotations| annotations.get(INGRESS_CLASS_ANNOTATION))
            .map(String::as_str)
            .filter(|class| !class.is_empty())
    })
}

/// Generate a name from a hostname that's safe to use as part of a Kubernetes
/// object name.
///
/// Runs of anything that isn't ASCII alphanumeric are replaced with a single
/// `-` and any leading separator is dropped. A leading `*.` becomes
/// `wildcard-` so a wildcard host and its apex get different names. An empty
/// or wildcard-only host is `all-hosts`.
pub fn name_from_host(host: &str) -> String {
    static NON_ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| {
        Regex::new(NON_ALPHANUMERIC_PATTERN).unwrap_or_else(|_| {
            panic!(r#"hostname regex "{NON_ALPHANUMERIC_PATTERN}" did not compile (this is a bug!)"#)
        })
    });

    if host.is_empty() || host == "*" {
        return "all-hosts".to_string();
    }

    let (prefix, host) = match host.strip_prefix("*.") {
        Some(rest) => ("wildcard-", rest),
        None => ("", host),
    };
    let name = NON_ALPHANUMERIC.replace_all(host, "-");
    format!("{prefix}{}", name.trim_start_matches('-'))
}

/// The name of the HTTPRoute generated for an Ingress rule.
pub fn route_name(ingress_name: &str, host: &str) -> String {
    format!("{ingress_name}-{}", name_from_host(host))
}

/// The name of the listener generated for a host and protocol.
pub fn listener_name(host: Option<&str>, protocol: ListenerProtocol) -> String {
    match host {
        Some(host) if !host.is_empty() => {
            format!("{}-{}", name_from_host(host), protocol.name_suffix())
        }
        _ => protocol.name_suffix().to_string(),
    }
}

/// Convert a list of Ingresses into an [Ir].
///
/// Conversion never stops on a bad Ingress. Anything that can't be converted
/// is returned as a [FieldError] and skipped, and everything else still ends
/// up in the IR.
pub fn to_ir(ingresses: &[Ingress], options: &ToIrOptions) -> (Ir, Vec<FieldError>) {
    let mut aggregator = Aggregator::default();
    let mut errors = vec![];

    for ingress in ingresses {
        if let Err(errs) = aggregator.add_ingress(ingress, options) {
            let obj = ObjectRef::from_resource(ingress);
            errors.extend(errs.into_iter().map(|e| e.for_object(&obj)));
        }
    }

    let (ir, conflicts) = aggregator.into_ir();
    errors.extend(conflicts);
    tracing::debug!(
        gateways = ir.gateways.len(),
        http_routes = ir.http_routes.len(),
        errors = errors.len(),
        "converted ingresses"
    );
    (ir, errors)
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct GroupKey {
    namespace: String,
    ingress_class: String,
    host: String,
}

/// Every rule with the same namespace, class and host, across all Ingresses.
#[derive(Debug, Default)]
struct RuleGroup {
    /// The name of the first Ingress in the group.
    ingress_name: String,

    /// The index of the group's rule in the first Ingress.
    rule_index: usize,

    tls: Vec<IngressTLS>,

    /// Paths in first-seen order, merged by path match.
    rules: Vec<(PathMatch, Vec<BackendRef>)>,
}

impl RuleGroup {
    fn add_backend(&mut self, path_match: PathMatch, backend: BackendRef) {
        match self.rules.iter_mut().find(|(m, _)| m == &path_match) {
            Some((_, backends)) => backends.push(backend),
            None => self.rules.push((path_match, vec![backend])),
        }
    }
}

struct DefaultBackend {
    namespace: String,
    ingress_name: String,
    ingress_class: String,
    backend: BackendRef,
}

#[derive(Default)]
struct Aggregator {
    groups: BTreeMap<GroupKey, RuleGroup>,
    default_backends: Vec<DefaultBackend>,
}

impl Aggregator {
    fn add_ingress(
        &mut self,
        ingress: &Ingress,
        options: &ToIrOptions,
    ) -> Result<(), Vec<FieldError>> {
        let namespace = ingress.metadata.namespace.clone().unwrap_or_default();
        let ingress_name = ingress.metadata.name.clone().unwrap_or_default();
        let ingress_class = get_ingress_class(ingress)
            .map(str::to_string)
            .or_else(|| options.default_ingress_class.clone())
            .unwrap_or_else(|| ingress_name.clone());

        let Some(spec) = &ingress.spec else {
            return Ok(());
        };

        let mut errors = vec![];

        for (i, rule) in spec.rules.iter().flatten().enumerate() {
            let host = rule.host.clone().unwrap_or_default();
            let key = GroupKey {
                namespace: namespace.clone(),
                ingress_class: ingress_class.clone(),
                host,
            };

            let group = self.groups.entry(key).or_insert_with(|| RuleGroup {
                ingress_name: ingress_name.clone(),
                rule_index: i,
                ..Default::default()
            });
            group.tls.extend(spec.tls.iter().flatten().cloned());

            let rule_errors = add_rule(group, rule, options)
                .into_iter()
                .map(|e| e.with_index(i).with_field("rules").with_field("spec"));
            errors.extend(rule_errors);
        }

        if let Some(default_backend) = &spec.default_backend {
            match backend_ref(default_backend).with_fields("spec", "defaultBackend") {
                Ok(backend) => self.default_backends.push(DefaultBackend {
                    namespace,
                    ingress_name,
                    ingress_class,
                    backend,
                }),
                Err(e) => errors.push(e),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(())
    }

    /// Build the IR from every group.
    ///
    /// Two different hosts can sanitize to the same route or listener name. The
    /// first group by `(namespace, class, host)` keeps the name and every later
    /// group is reported against its Ingress rule and skipped.
    fn into_ir(self) -> (Ir, Vec<FieldError>) {
        let mut ir = Ir::default();
        let mut errors = vec![];

        for (key, group) in self.groups {
            let route_key = NamespacedName::new(
                &key.namespace,
                route_name(&group.ingress_name, &key.host),
            );
            let gateway_key = NamespacedName::new(&key.namespace, &key.ingress_class);
            let gateway = ir
                .gateways
                .entry(gateway_key)
                .or_insert_with(|| GatewayContext::new(&key.ingress_class));

            let listeners = listeners(&key.host, &group.tls);
            let conflict = if !group.rules.is_empty() && ir.http_routes.contains_key(&route_key) {
                Some(route_conflict(&route_key))
            } else {
                listeners.iter().find_map(|listener| listener_conflict(gateway, listener))
            };

            if let Some(message) = conflict {
                let ingress = ObjectRef::new(
                    "Ingress",
                    NamespacedName::new(&key.namespace, &group.ingress_name),
                );
                errors.push(
                    FieldError::invalid(message)
                        .with_field("host")
                        .with_index(group.rule_index)
                        .with_field("rules")
                        .with_field("spec")
                        .for_object(&ingress),
                );
                continue;
            }

            for listener in listeners {
                gateway.add_listener(listener);
            }

            if group.rules.is_empty() {
                continue;
            }

            let mut hostnames = vec![];
            if !key.host.is_empty() {
                hostnames.push(key.host.clone());
            }
            let rules = group
                .rules
                .into_iter()
                .map(|(path_match, backend_refs)| HttpRouteRule {
                    matches: vec![path_match],
                    backend_refs,
                })
                .collect();

            ir.http_routes.insert(
                route_key,
                HttpRouteContext {
                    parent_refs: vec![ParentRef::gateway(&key.ingress_class)],
                    hostnames,
                    rules,
                },
            );
        }

        for default_backend in self.default_backends {
            let route_key = NamespacedName::new(
                &default_backend.namespace,
                format!("{}-default-backend", default_backend.ingress_name),
            );
            if ir.http_routes.contains_key(&route_key) {
                let ingress = ObjectRef::new(
                    "Ingress",
                    NamespacedName::new(&default_backend.namespace, &default_backend.ingress_name),
                );
                errors.push(
                    FieldError::invalid(route_conflict(&route_key))
                        .with_field("defaultBackend")
                        .with_field("spec")
                        .for_object(&ingress),
                );
                continue;
            }

            let gateway_key =
                NamespacedName::new(&default_backend.namespace, &default_backend.ingress_class);
            let gateway = ir
                .gateways
                .entry(gateway_key)
                .or_insert_with(|| GatewayContext::new(&default_backend.ingress_class));
            gateway.add_listener(Listener {
                name: listener_name(None, ListenerProtocol::Http),
                hostname: None,
                port: 80,
                protocol: ListenerProtocol::Http,
                tls: None,
            });

            ir.http_routes.insert(
                route_key,
                HttpRouteContext {
                    parent_refs: vec![ParentRef::gateway(&default_backend.ingress_class)],
                    hostnames: vec![],
                    rules: vec![HttpRouteRule {
                        matches: vec![],
                        backend_refs: vec![default_backend.backend],
                    }],
                },
            );
        }

        (ir, errors)
    }
}

fn route_conflict(route_key: &NamespacedName) -> String {
    format!("route name {} is already used by another host", route_key.name)
}

/// A listener conflicts with an existing one when they share a name but not a
/// hostname.
fn listener_conflict(gateway: &GatewayContext, listener: &Listener) -> Option<String> {
    let existing = gateway.listeners.iter().find(|l| l.name == listener.name)?;
    if existing.hostname == listener.hostname {
        return None;
    }

    Some(format!(
        "listener name {} is already used by host {}",
        listener.name,
        existing.hostname.as_deref().unwrap_or("*"),
    ))
}

fn add_rule(group: &mut RuleGroup, rule: &IngressRule, options: &ToIrOptions) -> Vec<FieldError> {
    let Some(http) = &rule.http else {
        return vec![];
    };

    let mut errors = vec![];
    for (i, path) in http.paths.iter().enumerate() {
        let converted = path_match(path, options).and_then(|m| {
            let backend = backend_ref(&path.backend).with_field("backend")?;
            Ok((m, backend))
        });

        match converted.with_field_index("paths", i).with_field("http") {
            Ok((path_match, backend)) => group.add_backend(path_match, backend),
            Err(e) => errors.push(e),
        }
    }
    errors
}

fn path_match(path: &HTTPIngressPath, options: &ToIrOptions) -> Result<PathMatch, FieldError> {
    let value = match path.path.as_deref() {
        Some(p) if !p.is_empty() => p,
        _ => return Ok(PathMatch::prefix("/")),
    };

    match path.path_type.as_str() {
        "" | "Prefix" => Ok(PathMatch::prefix(value)),
        "Exact" => Ok(PathMatch::exact(value)),
        "ImplementationSpecific" => match options.implementation_specific_path_match {
            Some(hook) => Ok(hook(value)),
            None => Err(FieldError::not_supported(
                "implementation specific path type is not supported by this provider",
            ))
            .with_field("pathType"),
        },
        other => Err(FieldError::not_supported(format!("unsupported path type: {other}")))
            .with_field("pathType"),
    }
}

fn backend_ref(backend: &IngressBackend) -> Result<BackendRef, FieldError> {
    if let Some(service) = &backend.service {
        let Some(port) = &service.port else {
            return Err(FieldError::required("service port is required"))
                .with_fields("service", "port");
        };

        if port.name.as_deref().is_some_and(|name| !name.is_empty()) {
            return Err(FieldError::not_supported("named ports not supported"))
                .with_field("name")
                .with_fields("service", "port");
        }

        let port = match port.number.map(u16::try_from) {
            Some(Ok(port)) if port > 0 => port,
            Some(_) => {
                return Err(FieldError::invalid("port must be between 1 and 65535"))
                    .with_field("number")
                    .with_fields("service", "port")
            }
            None => {
                return Err(FieldError::required("service port number is required"))
                    .with_field("number")
                    .with_fields("service", "port")
            }
        };

        return Ok(BackendRef::Service {
            name: service.name.clone(),
            port,
        });
    }

    if let Some(resource) = &backend.resource {
        return Ok(BackendRef::Resource {
            group: resource.api_group.clone().filter(|g| !g.is_empty()),
            kind: resource.kind.clone(),
            name: resource.name.clone(),
        });
    }

    Err(FieldError::required(
        "a backend must reference either a service or a resource",
    ))
}

/// The listeners for a rule group.
///
/// Every group gets a plain HTTP listener. Groups covered by a TLS block get an
/// HTTPS listener with the block's secrets too.
fn listeners(host: &str, tls: &[IngressTLS]) -> Vec<Listener> {
    let hostname = match host {
        "" => single_tls_host(tls),
        host => Some(host.to_string()),
    };

    let mut listeners = vec![Listener {
        name: listener_name(hostname.as_deref(), ListenerProtocol::Http),
        hostname: hostname.clone(),
        port: 80,
        protocol: ListenerProtocol::Http,
        tls: None,
    }];

    let certificate_refs: Vec<_> = tls
        .iter()
        .filter(|t| tls_covers_host(t, host))
        .filter_map(|t| t.secret_name.clone())
        .fold(vec![], |mut refs, secret| {
            if !refs.contains(&secret) {
                refs.push(secret);
            }
            refs
        });

    if !certificate_refs.is_empty() {
        listeners.push(Listener {
            name: listener_name(hostname.as_deref(), ListenerProtocol::Https),
            hostname,
            port: 443,
            protocol: ListenerProtocol::Https,
            tls: Some(ListenerTls { certificate_refs }),
        });
    }

    listeners
}

fn single_tls_host(tls: &[IngressTLS]) -> Option<String> {
    match tls {
        [tls] => match tls.hosts.as_deref() {
            Some([host]) => Some(host.clone()),
            _ => None,
        },
        _ => None,
    }
}

/// A TLS block without hosts covers every host. A rule without a host is
/// covered by every TLS block.
fn tls_covers_host(tls: &IngressTLS, host: &str) -> bool {
    match tls.hosts.as_deref() {
        None | Some([]) => true,
        Some(hosts) => host.is_empty() || hosts.iter().any(|h| h == host),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::FieldErrorKind;
    use k8s_openapi::api::networking::v1::{
        HTTPIngressRuleValue, IngressServiceBackend, IngressSpec, ServiceBackendPort,
    };
    use kube::api::ObjectMeta;

    fn ingress(name: &str, class: Option<&str>, rules: Vec<IngressRule>) -> Ingress {
        let annotations = class.map(|class| {
            [(INGRESS_CLASS_ANNOTATION.to_string(), class.to_string())]
                .into_iter()
                .collect()
        });

        Ingress {
            metadata: ObjectMeta {
                namespace: Some("default".to_string()),
                name: Some(name.to_string()),
                annotations,
                ..Default::default()
            },
            spec: Some(IngressSpec {
                rules: Some(rules),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn rule(host: &str, paths: Vec<HTTPIngressPath>) -> IngressRule {
        IngressRule {
            host: Some(host.to_string()),
            http: Some(HTTPIngressRuleValue { paths }),
        }
    }

    fn path(path_type: &str, path: &str, service: &str, port: i32) -> HTTPIngressPath {
        HTTPIngressPath {
            path: Some(path.to_string()),
            path_type: path_type.to_string(),
            backend: IngressBackend {
                service: Some(IngressServiceBackend {
                    name: service.to_string(),
                    port: Some(ServiceBackendPort {
                        number: Some(port),
                        name: None,
                    }),
                }),
                resource: None,
            },
        }
    }

    fn wildcard_hook(path: &str) -> PathMatch {
        match path.strip_suffix("/*") {
            Some(prefix) => PathMatch::prefix(prefix),
            None => PathMatch::exact(path),
        }
    }

    #[test]
    fn test_name_from_host() {
        assert_eq!(name_from_host("test.mydomain.com"), "test-mydomain-com");
        assert_eq!(name_from_host("*.foo.com"), "wildcard-foo-com");
        assert_eq!(name_from_host("foo..bar"), "foo-bar");
        assert_eq!(name_from_host("*"), "all-hosts");
        assert_eq!(name_from_host(""), "all-hosts");
    }

    #[test]
    fn test_get_ingress_class() {
        let mut ing = ingress("web", Some("from-annotation"), vec![]);
        assert_eq!(get_ingress_class(&ing), Some("from-annotation"));

        ing.spec.as_mut().unwrap().ingress_class_name = Some("from-spec".to_string());
        assert_eq!(get_ingress_class(&ing), Some("from-spec"));

        let ing = ingress("web", None, vec![]);
        assert_eq!(get_ingress_class(&ing), None);
    }

    #[test]
    fn test_single_ingress() {
        let ingresses = vec![ingress(
            "web",
            Some("gce"),
            vec![rule(
                "test.mydomain.com",
                vec![path("Prefix", "/", "test", 80)],
            )],
        )];

        let (ir, errors) = to_ir(&ingresses, &ToIrOptions::default());
        assert!(errors.is_empty(), "{errors:?}");

        assert_eq!(
            ir.gateways[&NamespacedName::new("default", "gce")],
            GatewayContext {
                gateway_class_name: "gce".to_string(),
                listeners: vec![Listener {
                    name: "test-mydomain-com-http".to_string(),
                    hostname: Some("test.mydomain.com".to_string()),
                    port: 80,
                    protocol: ListenerProtocol::Http,
                    tls: None,
                }],
                extension: None,
            }
        );

        assert_eq!(
            ir.http_routes[&NamespacedName::new("default", "web-test-mydomain-com")],
            HttpRouteContext {
                parent_refs: vec![ParentRef::gateway("gce")],
                hostnames: vec!["test.mydomain.com".to_string()],
                rules: vec![HttpRouteRule {
                    matches: vec![PathMatch::prefix("/")],
                    backend_refs: vec![BackendRef::Service {
                        name: "test".to_string(),
                        port: 80
                    }],
                }],
            }
        );
    }

    #[test]
    fn test_default_class() {
        let ingresses = vec![ingress(
            "web",
            None,
            vec![rule("foo.com", vec![path("Prefix", "/", "test", 80)])],
        )];

        let options = ToIrOptions {
            default_ingress_class: Some("gce".to_string()),
            ..Default::default()
        };
        let (ir, _) = to_ir(&ingresses, &options);
        assert_eq!(
            ir.gateways.keys().collect::<Vec<_>>(),
            vec![&NamespacedName::new("default", "gce")],
        );

        // with no provider default, fall back to the ingress name
        let (ir, _) = to_ir(&ingresses, &ToIrOptions::default());
        assert_eq!(
            ir.gateways.keys().collect::<Vec<_>>(),
            vec![&NamespacedName::new("default", "web")],
        );
    }

    #[test]
    fn test_merge_paths_across_ingresses() {
        let ingresses = vec![
            ingress(
                "a",
                Some("gce"),
                vec![rule(
                    "foo.com",
                    vec![
                        path("Prefix", "/api", "api-v1", 80),
                        path("Exact", "/health", "health", 8080),
                    ],
                )],
            ),
            ingress(
                "b",
                Some("gce"),
                vec![rule("foo.com", vec![path("Prefix", "/api", "api-v2", 80)])],
            ),
        ];

        let (ir, errors) = to_ir(&ingresses, &ToIrOptions::default());
        assert!(errors.is_empty(), "{errors:?}");

        // one route per host, named after the first ingress
        assert_eq!(ir.http_routes.len(), 1);
        let route = &ir.http_routes[&NamespacedName::new("default", "a-foo-com")];
        assert_eq!(
            route.rules,
            vec![
                HttpRouteRule {
                    matches: vec![PathMatch::prefix("/api")],
                    backend_refs: vec![
                        BackendRef::Service {
                            name: "api-v1".to_string(),
                            port: 80
                        },
                        BackendRef::Service {
                            name: "api-v2".to_string(),
                            port: 80
                        },
                    ],
                },
                HttpRouteRule {
                    matches: vec![PathMatch::exact("/health")],
                    backend_refs: vec![BackendRef::Service {
                        name: "health".to_string(),
                        port: 8080
                    }],
                },
            ]
        );

        let gateway = &ir.gateways[&NamespacedName::new("default", "gce")];
        assert_eq!(gateway.listeners.len(), 1);
    }

    #[test]
    fn test_wildcard_and_apex_hosts() {
        let ingresses = vec![ingress(
            "web",
            None,
            vec![
                rule("*.foo.com", vec![path("Prefix", "/", "wild", 80)]),
                rule("foo.com", vec![path("Prefix", "/", "apex", 80)]),
            ],
        )];

        let options = ToIrOptions {
            default_ingress_class: Some("gce".to_string()),
            ..Default::default()
        };
        let (ir, errors) = to_ir(&ingresses, &options);
        assert!(errors.is_empty(), "{errors:?}");

        assert_eq!(ir.http_routes.len(), 2);
        assert_eq!(
            ir.http_routes[&NamespacedName::new("default", "web-wildcard-foo-com")].hostnames,
            vec!["*.foo.com".to_string()],
        );
        assert_eq!(
            ir.http_routes[&NamespacedName::new("default", "web-foo-com")].hostnames,
            vec!["foo.com".to_string()],
        );

        let listeners: Vec<_> = ir.gateways[&NamespacedName::new("default", "gce")]
            .listeners
            .iter()
            .map(|l| (l.name.as_str(), l.hostname.as_deref()))
            .collect();
        assert_eq!(
            listeners,
            vec![
                ("wildcard-foo-com-http", Some("*.foo.com")),
                ("foo-com-http", Some("foo.com")),
            ],
        );
    }

    #[test]
    fn test_conflicting_host_names() {
        let ingresses = vec![ingress(
            "web",
            Some("gce"),
            vec![
                rule("foo.com", vec![path("Prefix", "/", "dot", 80)]),
                rule("foo-com", vec![path("Prefix", "/", "dash", 80)]),
            ],
        )];

        let (ir, errors) = to_ir(&ingresses, &ToIrOptions::default());

        // both hosts are named foo-com. the first host in order keeps the
        // route and the other is reported instead of overwriting it.
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert_eq!(errors[0].kind(), FieldErrorKind::Invalid);
        assert_eq!(errors[0].path(), "spec.rules[0].host");
        assert_eq!(
            errors[0].object().map(|o| o.to_string()),
            Some("Ingress default/web".to_string())
        );

        assert_eq!(ir.http_routes.len(), 1);
        assert_eq!(
            ir.http_routes[&NamespacedName::new("default", "web-foo-com")].hostnames,
            vec!["foo-com".to_string()],
        );
        let listeners = &ir.gateways[&NamespacedName::new("default", "gce")].listeners;
        assert_eq!(listeners.len(), 1);
        assert_eq!(listeners[0].hostname.as_deref(), Some("foo-com"));
    }

    #[test]
    fn test_tls_listener() {
        let mut ing = ingress(
            "web",
            Some("gce"),
            vec![rule("foo.com", vec![path("Prefix", "/", "web", 80)])],
        );
        ing.spec.as_mut().unwrap().tls = Some(vec![IngressTLS {
            hosts: Some(vec!["foo.com".to_string()]),
            secret_name: Some("foo-cert".to_string()),
        }]);

        let (ir, errors) = to_ir(&[ing], &ToIrOptions::default());
        assert!(errors.is_empty(), "{errors:?}");

        let listeners = &ir.gateways[&NamespacedName::new("default", "gce")].listeners;
        assert_eq!(
            listeners.iter().map(|l| l.name.as_str()).collect::<Vec<_>>(),
            vec!["foo-com-http", "foo-com-https"],
        );
        assert_eq!(
            listeners[1].tls,
            Some(ListenerTls {
                certificate_refs: vec!["foo-cert".to_string()]
            })
        );
        assert_eq!(listeners[1].port, 443);
    }

    #[test]
    fn test_default_backend() {
        let mut ing = ingress("web", Some("gce"), vec![]);
        ing.spec.as_mut().unwrap().default_backend =
            Some(path("Prefix", "/", "fallback", 80).backend);

        let (ir, errors) = to_ir(&[ing], &ToIrOptions::default());
        assert!(errors.is_empty(), "{errors:?}");

        let route = &ir.http_routes[&NamespacedName::new("default", "web-default-backend")];
        assert_eq!(route.parent_refs, vec![ParentRef::gateway("gce")]);
        assert_eq!(route.rules.len(), 1);
        assert!(route.rules[0].matches.is_empty());

        let listeners = &ir.gateways[&NamespacedName::new("default", "gce")].listeners;
        assert_eq!(
            listeners.iter().map(|l| l.name.as_str()).collect::<Vec<_>>(),
            vec!["http"],
        );
    }

    #[test]
    fn test_implementation_specific_without_hook() {
        let ingresses = vec![ingress(
            "web",
            Some("gce"),
            vec![rule(
                "foo.com",
                vec![
                    path("Prefix", "/", "web", 80),
                    path("ImplementationSpecific", "/foo/*", "web", 80),
                ],
            )],
        )];

        let (ir, errors) = to_ir(&ingresses, &ToIrOptions::default());

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), FieldErrorKind::NotSupported);
        assert_eq!(errors[0].path(), "spec.rules[0].http.paths[1].pathType");
        assert_eq!(
            errors[0].object().map(|o| o.to_string()),
            Some("Ingress default/web".to_string())
        );

        // the rest of the ingress still converts
        assert_eq!(ir.http_routes[&NamespacedName::new("default", "web-foo-com")].rules.len(), 1);
    }

    #[test]
    fn test_implementation_specific_with_hook() {
        let ingresses = vec![ingress(
            "web",
            Some("gce"),
            vec![rule(
                "foo.com",
                vec![
                    path("ImplementationSpecific", "/foo/*", "web", 80),
                    path("ImplementationSpecific", "/bar", "web", 80),
                ],
            )],
        )];

        let options = ToIrOptions {
            implementation_specific_path_match: Some(wildcard_hook),
            ..Default::default()
        };
        let (ir, errors) = to_ir(&ingresses, &options);
        assert!(errors.is_empty(), "{errors:?}");

        let matches: Vec<_> = ir.http_routes[&NamespacedName::new("default", "web-foo-com")]
            .rules
            .iter()
            .flat_map(|r| r.matches.clone())
            .collect();
        assert_eq!(matches, vec![PathMatch::prefix("/foo"), PathMatch::exact("/bar")]);
    }

    #[test]
    fn test_named_port() {
        let mut p = path("Prefix", "/", "web", 80);
        p.backend.service.as_mut().unwrap().port = Some(ServiceBackendPort {
            name: Some("http".to_string()),
            number: None,
        });

        let ingresses = vec![ingress("web", Some("gce"), vec![rule("foo.com", vec![p])])];
        let (_, errors) = to_ir(&ingresses, &ToIrOptions::default());

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message(), "named ports not supported");
        assert_eq!(
            errors[0].path(),
            "spec.rules[0].http.paths[0].backend.service.port.name"
        );
    }

    #[test]
    fn test_prefix_paths_arbtest() {
        arbtest::arbtest(|u| {
            let segment: String = u.arbitrary()?;
            let value = format!("/{segment}");

            let ing = ingress(
                "web",
                Some("gce"),
                vec![rule("foo.com", vec![path("Prefix", &value, "web", 80)])],
            );
            let (ir, errors) = to_ir(&[ing], &ToIrOptions::default());

            assert!(errors.is_empty());
            let route = &ir.http_routes[&NamespacedName::new("default", "web-foo-com")];
            assert_eq!(route.rules[0].matches, vec![PathMatch::prefix(&value)]);
            Ok(())
        });
    }

    #[test]
    fn test_idempotent_arbtest() {
        arbtest::arbtest(|u| {
            let hosts: Vec<String> = u.arbitrary()?;
            let mut ingresses = vec![];
            for (i, host) in hosts.iter().enumerate() {
                let path_type = *u.choose(&["Prefix", "Exact", "ImplementationSpecific", "Regex"])?;
                let p: String = u.arbitrary()?;
                let port: i32 = u.arbitrary()?;
                ingresses.push(ingress(
                    &format!("ing-{i}"),
                    None,
                    vec![rule(host, vec![path(path_type, &p, "svc", port)])],
                ));
            }

            let options = ToIrOptions {
                implementation_specific_path_match: Some(wildcard_hook),
                default_ingress_class: Some("gce".to_string()),
            };
            let (first, first_errors) = to_ir(&ingresses, &options);
            let (second, second_errors) = to_ir(&ingresses, &options);

            assert_eq!(first, second);
            assert_eq!(first_errors, second_errors);
            Ok(())
        });
    }
}
