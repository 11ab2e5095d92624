//! Error shape inspection
//!
//! Reduces an arbitrary error value to one of a handful of shapes the
//! classifier knows how to decide on. Errors built from the [`chain`](super::chain)
//! types are read directly; `reqwest` and `hyper` errors are lowered onto the
//! same shapes by walking their `source()` chains.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::io;

use super::chain::{OpError, RequestError};
use super::classifier::{
    CONNECT_OP, DIAL_OP, HTTP_MALFORMED_PREFIX, LOCAL_ERROR_OP, READ_OP, RESOLVE_SYSCALL,
};

/// The structural shape of an error, as seen by the classifier.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Shape<'a> {
    /// A request-level failure wrapping a network operation.
    Transport(Operation<'a>),
    /// A bare network operation failure.
    Operation(Operation<'a>),
    /// The end-of-stream sentinel.
    EndOfStream,
    /// Nothing structural to go on; only the message text.
    Message(Cow<'a, str>),
}

/// A failed operation and what it wrapped.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Operation<'a> {
    pub label: &'a str,
    pub inner: Inner<'a>,
}

/// The cause directly beneath an operation.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Inner<'a> {
    /// Another operation, identified by its label.
    Operation(&'a str),
    /// A system call, identified by its name.
    Syscall(&'a str),
    /// Anything else, or nothing.
    Other,
}

impl<'a> Operation<'a> {
    fn of(op: &'a OpError) -> Self {
        let inner = if let Some(inner) = op.inner_op() {
            Inner::Operation(&inner.op)
        } else if let Some(syscall) = op.inner_syscall() {
            Inner::Syscall(&syscall.syscall)
        } else {
            Inner::Other
        };
        Self {
            label: &op.op,
            inner,
        }
    }

    pub(crate) fn new(label: &'a str, inner: Inner<'a>) -> Self {
        Self { label, inner }
    }
}

/// Inspects the top of an error chain and returns its shape.
pub(crate) fn inspect<'a>(err: &'a (dyn StdError + 'static)) -> Shape<'a> {
    if let Some(request) = err.downcast_ref::<RequestError>() {
        let inner: &(dyn StdError + 'static) = &*request.source;
        if let Some(op) = inner.downcast_ref::<OpError>() {
            return Shape::Transport(Operation::of(op));
        }
        if let Some(lowered) = lower(inner) {
            return lowered;
        }
        return Shape::Message(Cow::Owned(err.to_string()));
    }

    if let Some(op) = err.downcast_ref::<OpError>() {
        return Shape::Operation(Operation::of(op));
    }

    if let Some(lowered) = lower(err) {
        return lowered;
    }

    if err
        .downcast_ref::<io::Error>()
        .is_some_and(|io_err| io_err.kind() == io::ErrorKind::UnexpectedEof)
    {
        return Shape::EndOfStream;
    }

    Shape::Message(Cow::Owned(err.to_string()))
}

/// Returns the error followed by every error in its `source()` chain.
pub(crate) fn chain<'a>(
    err: &'a (dyn StdError + 'static),
) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(Some(err), |&e| e.source())
}

fn lower(err: &(dyn StdError + 'static)) -> Option<Shape<'static>> {
    if let Some(reqwest_err) = err.downcast_ref::<reqwest::Error>() {
        return Some(lower_reqwest(reqwest_err));
    }
    if let Some(hyper_err) = err.downcast_ref::<hyper::Error>() {
        return lower_hyper(hyper_err);
    }
    None
}

fn lower_reqwest(err: &reqwest::Error) -> Shape<'static> {
    if err.is_connect() {
        return Shape::Transport(lower_connect(err));
    }
    // An expired probe deadline counts as a failed connect.
    if err.is_timeout() {
        return Shape::Transport(Operation::new(DIAL_OP, Inner::Operation(CONNECT_OP)));
    }

    for cause in chain(err).skip(1) {
        if let Some(hyper_err) = cause.downcast_ref::<hyper::Error>() {
            if let Some(shape) = lower_hyper(hyper_err) {
                return shape;
            }
        }
        // The connection was already open, so a dropped peer is a failed receive.
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            if matches!(
                io_err.kind(),
                io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
            ) {
                return Shape::Transport(Operation::new(READ_OP, Inner::Other));
            }
        }
    }

    Shape::Message(Cow::Owned(err.to_string()))
}

fn lower_connect(err: &reqwest::Error) -> Operation<'static> {
    let causes: Vec<&(dyn StdError + 'static)> = chain(err).skip(1).collect();
    connect_operation(&causes, err.is_timeout())
}

/// Decides which operation a failed connect stands for, given its causes.
pub(crate) fn connect_operation(
    causes: &[&(dyn StdError + 'static)],
    timed_out: bool,
) -> Operation<'static> {
    if causes
        .iter()
        .any(|cause| cause.to_string().contains("dns error"))
    {
        return Operation::new(DIAL_OP, Inner::Syscall(RESOLVE_SYSCALL));
    }

    let io_kinds: Vec<io::ErrorKind> = causes
        .iter()
        .filter_map(|cause| cause.downcast_ref::<io::Error>())
        .map(io::Error::kind)
        .collect();

    let refused = io_kinds.iter().any(|kind| {
        matches!(
            kind,
            io::ErrorKind::ConnectionRefused
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::TimedOut
                | io::ErrorKind::AddrNotAvailable
        )
    });
    if refused || timed_out {
        return Operation::new(DIAL_OP, Inner::Operation(CONNECT_OP));
    }

    // The TLS layer reports every handshake and certificate failure as invalid data.
    if io_kinds.contains(&io::ErrorKind::InvalidData) {
        return Operation::new(LOCAL_ERROR_OP, Inner::Other);
    }

    Operation::new(DIAL_OP, Inner::Other)
}

fn lower_hyper(err: &hyper::Error) -> Option<Shape<'static>> {
    if err.is_incomplete_message() || err.is_closed() || err.is_canceled() {
        return Some(Shape::Transport(Operation::new(READ_OP, Inner::Other)));
    }
    // hyper reports parse failures structurally; route them through the
    // malformed-response rule.
    if err.is_parse() {
        return Some(Shape::Message(Cow::Owned(format!(
            "{HTTP_MALFORMED_PREFIX}: {err}"
        ))));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::chain::SyscallError;

    #[test]
    fn test_request_wrapping_op_is_transport() {
        let err = RequestError::new(
            "Head",
            "http://example.com",
            OpError::new("dial").with_source(OpError::new("ConnectEx")),
        );
        assert_eq!(
            inspect(&err),
            Shape::Transport(Operation::new("dial", Inner::Operation("ConnectEx")))
        );
    }

    #[test]
    fn test_bare_op_wrapping_syscall() {
        let err = OpError::new("dial").with_source(SyscallError::new(
            "GetAddrInfoW",
            io::Error::new(io::ErrorKind::Other, "no such host"),
        ));
        assert_eq!(
            inspect(&err),
            Shape::Operation(Operation::new("dial", Inner::Syscall("GetAddrInfoW")))
        );
    }

    #[test]
    fn test_unexpected_eof_is_sentinel() {
        let err = io::Error::from(io::ErrorKind::UnexpectedEof);
        assert_eq!(inspect(&err), Shape::EndOfStream);
    }

    #[test]
    fn test_other_io_error_is_message() {
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert_eq!(inspect(&err), Shape::Message(Cow::Borrowed("nope")));
    }

    #[test]
    fn test_request_wrapping_plain_error_is_message() {
        let err = RequestError::new("Head", "http://example.com", "boom");
        assert_eq!(
            inspect(&err),
            Shape::Message(Cow::Borrowed("Head \"http://example.com\": boom"))
        );
    }

    #[test]
    fn test_connect_dns_failure_is_resolve_syscall() {
        let dns = io::Error::new(io::ErrorKind::Other, "dns error: failed to lookup address");
        assert_eq!(
            connect_operation(&[&dns], false),
            Operation::new(DIAL_OP, Inner::Syscall(RESOLVE_SYSCALL))
        );
    }

    #[test]
    fn test_connect_refused_or_timed_out_is_connect() {
        let refused = io::Error::from(io::ErrorKind::ConnectionRefused);
        assert_eq!(
            connect_operation(&[&refused], false),
            Operation::new(DIAL_OP, Inner::Operation(CONNECT_OP))
        );
        assert_eq!(
            connect_operation(&[], true),
            Operation::new(DIAL_OP, Inner::Operation(CONNECT_OP))
        );
    }

    #[test]
    fn test_connect_invalid_data_is_local_error() {
        let tls = io::Error::new(
            io::ErrorKind::InvalidData,
            "received corrupt message of type InvalidContentType",
        );
        assert_eq!(
            connect_operation(&[&tls], false),
            Operation::new(LOCAL_ERROR_OP, Inner::Other)
        );
    }

    #[test]
    fn test_connect_unrecognized_cause_is_bare_dial() {
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(
            connect_operation(&[&denied], false),
            Operation::new(DIAL_OP, Inner::Other)
        );
        assert_eq!(connect_operation(&[], false), Operation::new(DIAL_OP, Inner::Other));
    }

    #[test]
    fn test_chain_yields_every_level() {
        let err = RequestError::new(
            "Head",
            "http://example.com",
            OpError::new("read").with_source(io::Error::from(io::ErrorKind::UnexpectedEof)),
        );
        let levels: Vec<String> = chain(&err).map(|e| e.to_string()).collect();
        assert_eq!(levels.len(), 3);
        assert!(levels[1].starts_with("read"));
    }
}
