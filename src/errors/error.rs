use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Boxed error detail carried as the source of an [`Error`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Request,
    Url,
    Task,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Request => write!(f, "request"),
            ErrorKind::Url => write!(f, "url"),
            ErrorKind::Task => write!(f, "task"),
        }
    }
}

pub struct ErrorInner {
    pub kind: ErrorKind,
    pub source: Option<BoxError>,
    pub message: Option<String>,
}

pub struct Error {
    pub inner: Box<ErrorInner>,
}

impl Error {
    pub fn new<E>(kind: ErrorKind, source: Option<E>) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            inner: Box::new(ErrorInner {
                kind,
                source: source.map(Into::into),
                message: None,
            }),
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.inner.kind
    }

    pub fn is_request(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Request)
    }

    pub fn is_url(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Url)
    }

    pub fn is_task(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Task)
    }

    pub fn is_timeout(&self) -> bool {
        if let Some(source) = &self.inner.source {
            source.to_string().to_lowercase().contains("timeout")
        } else {
            false
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("reqflow::Error");
        f.field("kind", &self.inner.kind);
        if let Some(ref message) = self.inner.message {
            f.field("message", message);
        }
        if let Some(ref source) = self.inner.source {
            f.field("source", source);
        }
        f.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref message) = self.inner.message {
            write!(f, "{} error: {}", self.inner.kind, message)?;
        } else {
            write!(f, "{} error", self.inner.kind)?;
        }

        if let Some(ref source) = self.inner.source {
            write!(f, ": {source}")?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .source
            .as_ref()
            .map(|e| &**e as &(dyn StdError + 'static))
    }
}

impl From<RequestError> for Error {
    fn from(err: RequestError) -> Self {
        Error::new(ErrorKind::Request, Some(err))
    }
}

impl From<UrlError> for Error {
    fn from(err: UrlError) -> Self {
        Error::new(ErrorKind::Url, Some(err))
    }
}

impl From<TaskError> for Error {
    fn from(err: TaskError) -> Self {
        Error::new(ErrorKind::Task, Some(err))
    }
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("timeout")]
    Timeout,
}

#[derive(Debug, Error)]
pub enum UrlError {
    #[error("a base url must be configured before requesting without a path")]
    MissingBaseUrl,
    #[error("a base url must be configured before requesting a relative path: {0}")]
    RelativeWithoutBase(String),
}

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task already completed")]
    AlreadyCompleted,
}

impl Error {
    pub fn request_timeout() -> Self {
        Error::from(RequestError::Timeout)
    }

    pub fn missing_base_url() -> Self {
        Error::from(UrlError::MissingBaseUrl)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut => Error::request_timeout(),
            _ => Error::new(ErrorKind::Request, Some(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::request_timeout();
        assert!(err.is_request());
        assert!(err.is_timeout());
    }

    #[test]
    fn test_error_display() {
        let err = Error::missing_base_url();
        assert_eq!(
            err.to_string(),
            "url error: a base url must be configured before requesting without a path"
        );
    }

    #[test]
    fn test_error_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::TimedOut, "connection timed out");
        let err = Error::from(io_err);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_error_kinds() {
        let err = Error::from(UrlError::RelativeWithoutBase("/users".into()));
        assert!(err.is_url());
        assert!(!err.is_request());

        let err = Error::from(TaskError::AlreadyCompleted);
        assert!(err.is_task());
    }
}
