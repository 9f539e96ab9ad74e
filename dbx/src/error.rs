//! Error handling.
//!
//! Errors can happen in one of a few different phases:
//!
//! * connecting to a database
//! * executing a statement or fetching its rows
//! * decoding column values into record fields
//! * reading a single row that isn't there
//! * transaction control
//!
//! Use the `kind()` method on [`Error`] to find out
//! which step it was.  If we have an underlying database
//! error it can be retrieved with the `inner()` method.

/// An error that occurred when trying to use the database.
#[derive(Debug, Clone)]
pub struct Error<ClientError> {
    message: String,
    kind: ErrorKind,
    inner: Option<ClientError>,
}

impl<ClientError> Error<ClientError> {
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn inner(&self) -> Option<&ClientError> {
        self.inner.as_ref()
    }

    /// Consumes the error, returning the underlying database error if any.
    pub fn into_inner(self) -> Option<ClientError> {
        self.inner
    }

    /// Is this the "no rows" outcome of a single-row read?
    pub fn is_no_rows(&self) -> bool {
        self.kind == ErrorKind::NoRows
    }

    pub fn no_rows() -> Self {
        Error {
            message: "no rows in result set".into(),
            kind: ErrorKind::NoRows,
            inner: None,
        }
    }

    pub fn decode_str<S: Into<String>>(message: S, inner: Option<ClientError>) -> Self {
        let kind = ErrorKind::Decode;
        let message = message.into();
        Error {
            message,
            kind,
            inner,
        }
    }

    pub fn execute_str<S: Into<String>>(message: S, inner: Option<ClientError>) -> Self {
        let kind = ErrorKind::Execute;
        let message = message.into();
        Error {
            message,
            kind,
            inner,
        }
    }

    pub fn connect_str<S: Into<String>>(message: S, inner: Option<ClientError>) -> Self {
        let kind = ErrorKind::Connect;
        let message = message.into();
        Error {
            message,
            kind,
            inner,
        }
    }

    pub fn transaction_str<S: Into<String>>(message: S, inner: Option<ClientError>) -> Self {
        let kind = ErrorKind::Transaction;
        let message = message.into();
        Error {
            message,
            kind,
            inner,
        }
    }
}

impl<ClientError: std::fmt::Display> Error<ClientError> {
    pub fn decode(inner: ClientError) -> Self {
        let message = inner.to_string();
        Self::decode_str(message, Some(inner))
    }

    pub fn execute(inner: ClientError) -> Self {
        let message = inner.to_string();
        Self::execute_str(message, Some(inner))
    }

    pub fn connect(inner: ClientError) -> Self {
        let message = inner.to_string();
        Self::connect_str(message, Some(inner))
    }

    pub fn transaction(inner: ClientError) -> Self {
        let message = inner.to_string();
        Self::transaction_str(message, Some(inner))
    }
}

impl<ClientError: std::error::Error + 'static> std::error::Error for Error<ClientError> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.as_ref().map(|err| err as &(dyn std::error::Error + 'static))
    }
}

/// What operation prompted the error?
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A single-row read found no rows.
    NoRows,

    /// Database error while executing a statement or fetching rows.
    Execute,

    /// Bad conversion from a database column.
    Decode,

    /// Problems connecting to the database.
    Connect,

    /// Error in transaction control.
    Transaction,
}

impl<ClientError> std::fmt::Display for Error<ClientError> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.message.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Boom;

    impl std::fmt::Display for Boom {
        fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("boom")
        }
    }

    impl std::error::Error for Boom {}

    #[test]
    fn wrapped_error_keeps_message_and_source() {
        use std::error::Error as _;

        let err = Error::execute(Boom);
        assert_eq!(ErrorKind::Execute, err.kind());
        assert_eq!("boom", err.to_string());
        assert!(err.inner().is_some());
        assert_eq!("boom", err.source().unwrap().to_string());
    }

    #[test]
    fn no_rows_is_distinguishable() {
        let err = Error::<Boom>::no_rows();
        assert!(err.is_no_rows());
        assert!(err.inner().is_none());
        assert!(!Error::decode(Boom).is_no_rows());
    }
}
