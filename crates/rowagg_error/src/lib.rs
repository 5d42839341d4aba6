use std::backtrace::{Backtrace, BacktraceStatus};
use std::borrow::Cow;
use std::error::Error;
use std::fmt;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

/// Broad classification of an error.
///
/// Most errors are `Generic`. The remaining kinds exist so that callers (and
/// tests) can distinguish the failures the aggregate compiler promises to
/// report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Any other failure, including evaluation failures raised while folding
    /// rows.
    Generic,
    /// The operator description is malformed (column out of range, grouping
    /// set not a subset of the group key, wrong argument count).
    InvalidInput,
    /// An aggregate call that cannot be compiled (DISTINCT, or no registered
    /// implementation).
    UnsupportedAggregation,
    /// An aggregate implementation touched state slots it never declared.
    StateLayoutMismatch,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic => write!(f, "Generic"),
            Self::InvalidInput => write!(f, "Invalid input"),
            Self::UnsupportedAggregation => write!(f, "Unsupported aggregation"),
            Self::StateLayoutMismatch => write!(f, "State layout mismatch"),
        }
    }
}

#[derive(Debug)]
pub struct DbError {
    inner: Box<DbErrorInner>,
}

#[derive(Debug)]
struct DbErrorInner {
    kind: ErrorKind,
    msg: String,
    fields: Vec<(Cow<'static, str>, String)>,
    source: Option<Box<dyn Error + Send + Sync>>,
    backtrace: Backtrace,
}

impl DbError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Generic, msg)
    }

    pub fn with_kind(kind: ErrorKind, msg: impl Into<String>) -> Self {
        DbError {
            inner: Box::new(DbErrorInner {
                kind,
                msg: msg.into(),
                fields: Vec::new(),
                source: None,
                backtrace: Backtrace::capture(),
            }),
        }
    }

    pub fn with_source(msg: impl Into<String>, source: Box<dyn Error + Send + Sync>) -> Self {
        let mut err = Self::new(msg);
        err.inner.source = Some(source);
        err
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::InvalidInput, msg)
    }

    pub fn unsupported_aggregation(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::UnsupportedAggregation, msg)
    }

    pub fn state_layout_mismatch(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::StateLayoutMismatch, msg)
    }

    /// Attach an additional key/value pair to the error for display.
    pub fn with_field(mut self, key: impl Into<Cow<'static, str>>, value: impl fmt::Debug) -> Self {
        self.inner.fields.push((key.into(), format!("{value:?}")));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.inner.kind
    }

    pub fn message(&self) -> &str {
        &self.inner.msg
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner
            .fields
            .iter()
            .map(|(k, v)| (k.as_ref(), v.as_str()))
    }
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.msg)?;

        for (key, value) in &self.inner.fields {
            write!(f, "\n  {key}: {value}")?;
        }

        if let Some(source) = &self.inner.source {
            write!(f, "\nError source: {source}")?;
        }

        if self.inner.backtrace.status() == BacktraceStatus::Captured {
            write!(f, "\nBacktrace: {}", self.inner.backtrace)?;
        }

        Ok(())
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl From<fmt::Error> for DbError {
    fn from(value: fmt::Error) -> Self {
        DbError::with_source("Format error", Box::new(value))
    }
}

/// Helper for adding context to errors.
pub trait ResultExt<T, E> {
    /// Wrap an error with a message. The original error becomes the source,
    /// and the kind of a wrapped `DbError` is preserved.
    fn context(self, msg: &'static str) -> Result<T>;

    /// Like `context`, but the message is only computed on error.
    fn context_fn<F>(self, f: F) -> Result<T>
    where
        F: Fn() -> String;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: Into<Box<dyn Error + Send + Sync>> + ErrorKindHint,
{
    fn context(self, msg: &'static str) -> Result<T> {
        self.map_err(|e| wrap(msg.to_string(), e))
    }

    fn context_fn<F>(self, f: F) -> Result<T>
    where
        F: Fn() -> String,
    {
        self.map_err(|e| wrap(f(), e))
    }
}

fn wrap<E>(msg: String, e: E) -> DbError
where
    E: Into<Box<dyn Error + Send + Sync>> + ErrorKindHint,
{
    let kind = e.kind_hint();
    let mut err = DbError::with_source(msg, e.into());
    err.inner.kind = kind;
    err
}

/// Lets `ResultExt` carry the kind of an underlying `DbError` through a
/// context wrap.
pub trait ErrorKindHint {
    fn kind_hint(&self) -> ErrorKind {
        ErrorKind::Generic
    }
}

impl ErrorKindHint for DbError {
    fn kind_hint(&self) -> ErrorKind {
        self.kind()
    }
}

impl ErrorKindHint for fmt::Error {}

pub trait OptionExt<T> {
    /// Return an error if the option is None.
    fn required(self, msg: &'static str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn required(self, msg: &'static str) -> Result<T> {
        match self {
            Some(v) => Ok(v),
            None => Err(DbError::new(format!("Missing required value: {msg}"))),
        }
    }
}

/// Return a "not implemented" error for the current function.
#[macro_export]
macro_rules! not_implemented {
    ($($arg:tt)+) => {{
        let msg = format!($($arg)+);
        return Err($crate::DbError::new(format!("Not yet implemented: {msg}")));
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_keeps_kind() {
        let res: Result<()> = Err(DbError::unsupported_aggregation("distinct"));
        let err = res.context("planning aggregate").unwrap_err();

        assert_eq!(ErrorKind::UnsupportedAggregation, err.kind());
        assert_eq!("planning aggregate", err.message());
        assert!(err.source().is_some());
    }

    #[test]
    fn display_includes_fields() {
        let err = DbError::state_layout_mismatch("slot out of range")
            .with_field("slot", 3)
            .with_field("declared", 2);
        let s = err.to_string();

        assert!(s.starts_with("slot out of range"));
        assert!(s.contains("slot: 3"));
        assert!(s.contains("declared: 2"));
    }

    #[test]
    fn context_on_fmt_error_is_generic() {
        let res: std::result::Result<(), fmt::Error> = Err(fmt::Error);
        let err = res.context_fn(|| format!("writing {}", "row")).unwrap_err();

        assert_eq!(ErrorKind::Generic, err.kind());
        assert_eq!("writing row", err.message());
        assert!(err.source().is_some());
    }

    #[test]
    fn required_none() {
        let err = None::<i32>.required("key").unwrap_err();
        assert_eq!(ErrorKind::Generic, err.kind());
        assert!(err.message().contains("key"));
    }

    #[test]
    fn not_implemented_returns_err() {
        fn f() -> Result<()> {
            not_implemented!("thing {}", 1)
        }
        let err = f().unwrap_err();
        assert_eq!("Not yet implemented: thing 1", err.message());
    }
}
