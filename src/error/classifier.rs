//! Network error classifier
//!
//! Maps any error onto a [`BasicErrorType`]. Structural rules (the shape of
//! the error chain) are always tried before the literal-message rules, since
//! the message rules are only a fallback for failures that carry no structure.

use std::error::Error as StdError;

use tracing::debug;

use super::classification::{BasicError, BasicErrorType, BoxError};
use super::shape::{self, Inner, Operation, Shape};

/// Operation label for establishing an outbound connection.
pub const DIAL_OP: &str = "dial";
/// Operation label for a failure raised locally while talking to the peer.
pub const LOCAL_ERROR_OP: &str = "local error";
/// Canonical connect marker used when lowering client errors.
pub const CONNECT_OP: &str = "connect";
/// Canonical receive marker used when lowering client errors.
pub const READ_OP: &str = "read";
/// Canonical address-resolution call used when lowering client errors.
pub const RESOLVE_SYSCALL: &str = "getaddrinfo";

/// Operation labels that mean the TCP connect itself failed.
pub const CONNECT_OPS: &[&str] = &["ConnectEx", CONNECT_OP];
/// System calls that perform host name resolution.
pub const RESOLVE_SYSCALLS: &[&str] = &["GetAddrInfoW", RESOLVE_SYSCALL];
/// Operation labels that mean a receive on an open connection failed.
pub const RECEIVE_OPS: &[&str] = &["WSARecv", READ_OP, "recv"];

/// Message produced when a connection closes before the response arrives.
pub const TRANSPORT_CLOSED: &str = "connection closed before message completed";
/// Prefix of messages reporting a response that is not valid HTTP.
pub const HTTP_MALFORMED_PREFIX: &str = "malformed HTTP response";

/// Classifies an error, keeping it as the cause of the returned [`BasicError`].
///
/// Never fails. Passing a `BasicError` returns it unchanged.
///
/// # Examples
///
/// ```
/// use std::io;
/// use whatnet::error::{classify, BasicErrorType};
///
/// let err = io::Error::from(io::ErrorKind::UnexpectedEof);
/// assert_eq!(classify(err).category(), BasicErrorType::UnexpectedEof);
/// ```
pub fn classify<E>(err: E) -> BasicError
where
    E: Into<BoxError>,
{
    match err.into().downcast::<BasicError>() {
        Ok(basic) => *basic,
        Err(err) => {
            let category = category_of(&*err);
            BasicError::new(category, err)
        }
    }
}

/// Returns the category of an error without taking ownership of it.
///
/// A `BasicError` keeps its existing category.
pub fn category_of(err: &(dyn StdError + 'static)) -> BasicErrorType {
    if let Some(basic) = err.downcast_ref::<BasicError>() {
        return basic.category();
    }

    let causes: Vec<String> = shape::chain(err).skip(1).map(|e| e.to_string()).collect();
    debug!(error = %err, detail = ?err, chain = ?causes, "classifying error");

    let category = decide(err, shape::inspect(err));
    debug!(category = %category, "classified error");
    category
}

/// Returns true if the error means the host could not be reached at all.
pub fn is_connection_error(err: &(dyn StdError + 'static)) -> bool {
    category_of(err).is_connectivity()
}

fn decide(err: &(dyn StdError + 'static), shape: Shape<'_>) -> BasicErrorType {
    match shape {
        Shape::Transport(op) => match transport_rule(&op) {
            Some(category) => category,
            None => message_rule(&err.to_string()),
        },
        Shape::Operation(op) => match operation_rule(&op) {
            Some(category) => category,
            None => message_rule(&err.to_string()),
        },
        Shape::EndOfStream => BasicErrorType::UnexpectedEof,
        Shape::Message(message) => message_rule(&message),
    }
}

fn transport_rule(op: &Operation<'_>) -> Option<BasicErrorType> {
    match op.label {
        DIAL_OP => Some(match op.inner {
            Inner::Operation(label) if CONNECT_OPS.contains(&label) => {
                BasicErrorType::CantConnectToHost
            }
            Inner::Syscall(name) if RESOLVE_SYSCALLS.contains(&name) => {
                BasicErrorType::CantResolveHost
            }
            // Unrecognized dial causes are treated as resolution failures.
            _ => BasicErrorType::CantResolveHost,
        }),
        LOCAL_ERROR_OP => Some(BasicErrorType::CantFindHost),
        label if RECEIVE_OPS.contains(&label) => Some(BasicErrorType::UnexpectedEof),
        _ => None,
    }
}

fn operation_rule(op: &Operation<'_>) -> Option<BasicErrorType> {
    match (op.label, &op.inner) {
        (DIAL_OP, Inner::Syscall(name)) if RESOLVE_SYSCALLS.contains(name) => {
            Some(BasicErrorType::CantResolveHost)
        }
        (DIAL_OP, Inner::Operation(label)) if CONNECT_OPS.contains(label) => {
            Some(BasicErrorType::CantConnectToHost)
        }
        (label, _) if RECEIVE_OPS.contains(&label) => Some(BasicErrorType::UnexpectedEof),
        _ => None,
    }
}

fn message_rule(message: &str) -> BasicErrorType {
    if message == TRANSPORT_CLOSED {
        BasicErrorType::UnexpectedEof
    } else if message.starts_with(HTTP_MALFORMED_PREFIX) {
        BasicErrorType::BadDataReceived
    } else {
        BasicErrorType::Unknown
    }
}
