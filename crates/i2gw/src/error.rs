use std::{fmt::Write as _, path::PathBuf};

use crate::ObjectRef;

/// A fatal error that stops a provider from converting anything.
///
/// Problems with individual objects are never reported this way. See
/// [FieldError] for those.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },

    #[error("failed to decode {kind} {name}: {source}")]
    Decode {
        kind: String,
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to list {kind} from the cluster: {source}")]
    Kube {
        kind: String,
        #[source]
        source: kube::Error,
    },

    #[error("failed to read {provider} resources: {source}")]
    Provider {
        provider: &'static str,
        #[source]
        source: Box<Error>,
    },

    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}

impl Error {
    pub(crate) fn for_provider(self, provider: &'static str) -> Self {
        Error::Provider {
            provider,
            source: Box::new(self),
        }
    }
}

/// The category of a [FieldError].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    /// The field has a value that can't be converted.
    Invalid,

    /// The field has a value that is valid Kubernetes but has no Gateway API
    /// equivalent.
    NotSupported,

    /// A required field is missing.
    Required,

    /// A reference points at an object that doesn't exist.
    NotFound,
}

impl std::fmt::Display for FieldErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FieldErrorKind::Invalid => "invalid value",
            FieldErrorKind::NotSupported => "unsupported value",
            FieldErrorKind::Required => "required value",
            FieldErrorKind::NotFound => "not found",
        };
        f.write_str(s)
    }
}

/// An error converting a single object or field.
///
/// Field errors are collected and returned alongside whatever output could
/// still be produced. They contain a message, the object they're about and a
/// jsonpath style path to the field that caused problems.
#[derive(Clone, PartialEq)]
pub struct FieldError {
    kind: FieldErrorKind,

    // an error message
    message: String,

    // the object the path is relative to, if known.
    object: Option<ObjectRef>,

    // the reversed path to the field where the conversion error happened.
    //
    // the leaf of the path is built up at path[0] with the root of the
    // struct at the end. see ErrorContext for how this gets done.
    path: Vec<PathEntry>,
}

impl std::error::Error for FieldError {}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(object) = &self.object {
            write!(f, "{object}: ")?;
        }
        if !self.path.is_empty() {
            write!(f, "{}: ", self.path())?;
        }

        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::fmt::Debug for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("object", &self.object)
            .field("path", &self.path())
            .finish()
    }
}

impl FieldError {
    pub fn kind(&self) -> FieldErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn object(&self) -> Option<&ObjectRef> {
        self.object.as_ref()
    }

    pub fn path(&self) -> String {
        path_str(self.path.iter().rev())
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::new(FieldErrorKind::Invalid, message)
    }

    pub(crate) fn not_supported(message: impl Into<String>) -> Self {
        Self::new(FieldErrorKind::NotSupported, message)
    }

    pub(crate) fn required(message: impl Into<String>) -> Self {
        Self::new(FieldErrorKind::Required, message)
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self::new(FieldErrorKind::NotFound, message)
    }

    fn new(kind: FieldErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            object: None,
            path: vec![],
        }
    }

    /// Append a new field to this error's path.
    pub(crate) fn with_field(mut self, field: &'static str) -> Self {
        self.path.push(PathEntry::from(field));
        self
    }

    /// Append a new field index to this error's path.
    pub(crate) fn with_index(mut self, index: usize) -> Self {
        self.path.push(PathEntry::Index(index));
        self
    }

    /// Set the object this error's path is relative to. Only the first call
    /// has any effect, the innermost caller knows best.
    pub(crate) fn for_object(mut self, object: &ObjectRef) -> Self {
        if self.object.is_none() {
            self.object = Some(object.clone());
        }
        self
    }
}

/// Join an iterator of PathEntry together into a path string.
///
/// This isn't quite `entries.join('.')` because index fields exist and have to
/// be bracketed.
pub(crate) fn path_str<'a, I, Iter>(path: I) -> String
where
    I: IntoIterator<IntoIter = Iter>,
    Iter: Iterator<Item = &'a PathEntry> + DoubleEndedIterator,
{
    let mut buf = String::with_capacity(16);

    for (i, path_entry) in path.into_iter().enumerate() {
        if i > 0 && path_entry.is_field() {
            buf.push('.');
        }
        let _ = write!(&mut buf, "{}", path_entry);
    }

    buf
}

/// Add field-path context to an error by appending an entry to its path. Because
/// Context is added at the callsite this means a function can add its own fields
/// and the path ends up in the appropriate order.
///
/// This trait isn't meant to be implemented, but it's not explicitly sealed
/// because it's only `pub(crate)`. Don't implement it!
pub(crate) trait ErrorContext<T>: Sized {
    fn with_field(self, field: &'static str) -> Result<T, FieldError>;
    fn with_index(self, index: usize) -> Result<T, FieldError>;

    /// Shorthand for `with_field(b).with_field(a)` but in a more intuitive
    /// order.
    fn with_fields(self, a: &'static str, b: &'static str) -> Result<T, FieldError> {
        self.with_field(b).with_field(a)
    }

    /// Shorthand for `with_index(idx).with_field(name)`, but in a slightly more
    /// inutitive order.
    fn with_field_index(self, field: &'static str, index: usize) -> Result<T, FieldError> {
        self.with_index(index).with_field(field)
    }
}

/// A JSON-path style path entry. An entry is either a field name or an index
/// into a sequence.
#[derive(Debug, PartialEq, Eq, Clone)]
pub(crate) enum PathEntry {
    Field(&'static str),
    Index(usize),
}

impl PathEntry {
    fn is_field(&self) -> bool {
        matches!(self, PathEntry::Field(_))
    }
}

impl std::fmt::Display for PathEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathEntry::Field(field) => f.write_str(field),
            PathEntry::Index(idx) => f.write_fmt(format_args!("[{idx}]")),
        }
    }
}

impl From<&'static str> for PathEntry {
    fn from(value: &'static str) -> Self {
        PathEntry::Field(value)
    }
}

impl<T> ErrorContext<T> for Result<T, FieldError> {
    fn with_field(self, field: &'static str) -> Result<T, FieldError> {
        self.map_err(|err| err.with_field(field))
    }

    fn with_index(self, index: usize) -> Result<T, FieldError> {
        self.map_err(|err| err.with_index(index))
    }
}
