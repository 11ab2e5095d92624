//! Structured network error chain
//!
//! The classifier works on the *shape* of an error chain: a request-level
//! failure wrapping a failed network operation, which may in turn wrap another
//! operation or a system call. Most Rust HTTP stacks flatten that structure, so
//! these types let transports (and tests) describe it explicitly.

use std::error::Error as StdError;
use std::fmt;
use std::io;

use super::classification::BoxError;

/// A failed request: the method and URL being fetched plus what went wrong.
#[derive(Debug)]
pub struct RequestError {
    /// HTTP method, e.g. `"Head"`.
    pub method: String,
    /// The URL that was requested.
    pub url: String,
    /// The underlying failure.
    pub source: BoxError,
}

impl RequestError {
    /// Creates a new request error.
    pub fn new(
        method: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            source: source.into(),
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\": {}", self.method, self.url, self.source)
    }
}

impl StdError for RequestError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.source)
    }
}

/// A failed network operation such as `dial`, `read` or `connect`.
#[derive(Debug)]
pub struct OpError {
    /// Operation label.
    pub op: String,
    /// Network type, e.g. `"tcp"`.
    pub net: Option<String>,
    /// Remote address, if known.
    pub addr: Option<String>,
    /// The underlying failure, if any.
    pub source: Option<BoxError>,
}

impl OpError {
    /// Creates an operation error with no further detail.
    pub fn new(op: impl Into<String>) -> Self {
        Self {
            op: op.into(),
            net: None,
            addr: None,
            source: None,
        }
    }

    /// Sets the network type.
    pub fn with_net(mut self, net: impl Into<String>) -> Self {
        self.net = Some(net.into());
        self
    }

    /// Sets the remote address.
    pub fn with_addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = Some(addr.into());
        self
    }

    /// Sets the underlying failure.
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the wrapped operation error, if the source is one.
    pub fn inner_op(&self) -> Option<&OpError> {
        self.source.as_ref()?.downcast_ref::<OpError>()
    }

    /// Returns the wrapped system-call error, if the source is one.
    pub fn inner_syscall(&self) -> Option<&SyscallError> {
        self.source.as_ref()?.downcast_ref::<SyscallError>()
    }
}

impl fmt::Display for OpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.op)?;
        if let Some(net) = &self.net {
            write!(f, " {net}")?;
        }
        if let Some(addr) = &self.addr {
            write!(f, " {addr}")?;
        }
        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

impl StdError for OpError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

/// A failed system call.
#[derive(Debug)]
pub struct SyscallError {
    /// Name of the call, e.g. `"getaddrinfo"`.
    pub syscall: String,
    /// The OS error it returned.
    pub source: io::Error,
}

impl SyscallError {
    /// Creates a new system-call error.
    pub fn new(syscall: impl Into<String>, source: io::Error) -> Self {
        Self {
            syscall: syscall.into(),
            source,
        }
    }
}

impl fmt::Display for SyscallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.syscall, self.source)
    }
}

impl StdError for SyscallError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.source)
    }
}
