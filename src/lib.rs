//! whatnet - what kind of network failure was that?
//!
//! This library classifies failed HTTP/network operations into a small set of
//! actionable categories, and checks whether basic internet connectivity is
//! present.
//!
//! ```no_run
//! # async fn run() -> Result<(), whatnet::connectivity::ConnectivityError> {
//! use whatnet::connectivity::{check_connection, ConnectionStatus};
//!
//! if check_connection().await? != ConnectionStatus::Connected {
//!     eprintln!("offline");
//! }
//! # Ok(())
//! # }
//! ```

pub mod connectivity;
pub mod error;
pub mod logging;

pub use connectivity::{
    check_connection, check_connection_and_host, ConnectionStatus, ConnectivityError,
    ConnectivityProber, ProbeConfig,
};
pub use error::{classify, is_connection_error, BasicError, BasicErrorType};
