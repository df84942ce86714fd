//! Unified error type.

use thiserror::Error;

/// The error type returned by fway's fallible operations.
///
/// A request that matches no route is not an `Error`: it is answered by the
/// not-found handler like any other request. This type surfaces the two
/// things that can go wrong outside of dispatch: a malformed route at
/// registration time and infrastructure failures in the server.
#[derive(Debug, Error)]
pub enum Error {
    /// Binding to a port or accepting a connection failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// The server address could not be parsed as `host:port`.
    #[error("invalid socket address `{addr}`: {source}")]
    Addr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// A route was registered with a blank method.
    #[error("empty method")]
    EmptyMethod,

    /// A route was registered with a method that is not a valid HTTP token.
    #[error("invalid method `{0}`")]
    InvalidMethod(String),

    /// A route path was empty or did not start with `/`.
    #[error("invalid route `{0}`: path must start with '/'")]
    InvalidPath(String),

    /// A route contained a bare `:` segment.
    #[error("invalid route `{0}`: wildcard segment without a name")]
    EmptyWildcard(String),

    /// A route binds a different wildcard name at a position that already
    /// has one. Only one wildcard child is allowed per node.
    #[error("invalid route `{path}`: wildcard `:{name}` conflicts with `:{existing}` at `{at}`")]
    WildcardConflict {
        path: String,
        name: String,
        existing: String,
        at: String,
    },
}
