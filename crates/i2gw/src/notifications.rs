//! Advisory diagnostics.
//!
//! Notifications are for input that gets skipped or only partially converted
//! but doesn't make the output wrong, like a malformed vendor annotation. They
//! never stop a conversion.

use crate::ObjectRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NotificationType {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NotificationType::Info => "INFO",
            NotificationType::Warning => "WARNING",
            NotificationType::Error => "ERROR",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationType,
    pub message: String,

    /// The object the notification is about, if there is one.
    pub related: Option<ObjectRef>,
}

/// An append-only list of [Notification]s for a single provider run.
#[derive(Debug, Default, Clone)]
pub struct Notifications {
    inner: Vec<Notification>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a notification and emit it as a tracing event.
    pub fn notify(
        &mut self,
        level: NotificationType,
        message: impl Into<String>,
        related: Option<&ObjectRef>,
    ) {
        let message = message.into();
        let object = related.map(|r| r.to_string()).unwrap_or_default();
        match level {
            NotificationType::Info => tracing::info!(%object, "{message}"),
            NotificationType::Warning => tracing::warn!(%object, "{message}"),
            NotificationType::Error => tracing::error!(%object, "{message}"),
        }

        self.inner.push(Notification {
            level,
            message,
            related: related.cloned(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.inner.iter()
    }

    /// Render notifications as a table, one row per notification.
    pub fn to_table(&self, provider: &str) -> String {
        let mut rows = vec![(
            "TYPE".to_string(),
            "MESSAGE".to_string(),
            "CALLING OBJECT".to_string(),
        )];
        for n in &self.inner {
            let related = n.related.as_ref().map(|r| r.to_string()).unwrap_or_default();
            rows.push((n.level.to_string(), n.message.clone(), related));
        }

        // padding in format strings counts chars, not bytes
        let width = |s: &String| s.chars().count();
        let widths = rows.iter().fold((0, 0, 0), |(a, b, c), (x, y, z)| {
            (a.max(width(x)), b.max(width(y)), c.max(width(z)))
        });

        let mut buf = format!("Notifications from {}:\n", provider.to_uppercase());
        for (level, message, related) in rows {
            buf.push_str(&format!(
                "| {level:<w0$} | {message:<w1$} | {related:<w2$} |\n",
                w0 = widths.0,
                w1 = widths.1,
                w2 = widths.2,
            ));
        }
        buf
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::NamespacedName;

    #[test]
    fn test_notify() {
        let svc = ObjectRef::new("Service", NamespacedName::new("default", "web"));

        let mut notifications = Notifications::new();
        notifications.notify(NotificationType::Error, "bad annotation", Some(&svc));
        notifications.notify(NotificationType::Info, "nothing to see here", None);

        assert_eq!(notifications.len(), 2);
        assert_eq!(
            notifications.iter().next(),
            Some(&Notification {
                level: NotificationType::Error,
                message: "bad annotation".to_string(),
                related: Some(svc),
            })
        );
    }

    #[test]
    fn test_table() {
        let svc = ObjectRef::new("Service", NamespacedName::new("ns", "a"));

        let mut notifications = Notifications::new();
        notifications.notify(NotificationType::Warning, "hi", Some(&svc));

        assert_eq!(
            notifications.to_table("gce"),
            "Notifications from GCE:\n\
             | TYPE    | MESSAGE | CALLING OBJECT |\n\
             | WARNING | hi      | Service ns/a   |\n",
        );
    }

    #[test]
    fn test_table_non_ascii() {
        let svc = ObjectRef::new("Service", NamespacedName::new("ns", "a"));

        let mut notifications = Notifications::new();
        notifications.notify(NotificationType::Info, "café ünïcode", Some(&svc));
        notifications.notify(NotificationType::Info, "plain", None);

        let table = notifications.to_table("gce");
        let widths: Vec<_> = table.lines().skip(1).map(|l| l.chars().count()).collect();
        assert_eq!(widths.len(), 3);
        assert!(widths.iter().all(|w| *w == widths[0]), "{table}");
    }
}
