use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the gossip and directory-service subsystems.
///
/// Variants are grouped by the propagation policy a caller must follow:
///
/// - [`Error::invariant`]-producing variants are fatal: the caller should
///   flush logs and abort the process.
/// - "rejection" variants are local and should be logged and dropped.
/// - [`Error::ConsensusTimeout`] is promoted to view-change.
/// - [`Error::Executor`] is recorded on the transaction receipt; the
///   surrounding block still commits.
#[derive(Error, Debug)]
pub enum Error {
    #[error("protocol invariant violated: {0}")]
    ProtocolInvariantViolation(String),

    #[error("message rejected: {0}")]
    MessageRejection(String),

    #[error("consensus timed out waiting for {0}")]
    ConsensusTimeout(String),

    #[error("executor reported an error: {0}")]
    Executor(String),

    #[error("transient I/O failure: {0}")]
    TransientIo(String),

    #[error("bloom filter parameters invalid: {0}")]
    InvalidBloomParameters(String),

    #[error("safe arithmetic overflow: {0}")]
    ArithmeticOverflow(String),

    #[error("channel closed")]
    ChannelClosed,

    #[error("operation timed out")]
    Timeout,
}

impl Error {
    /// Construct a [`Error::ProtocolInvariantViolation`] with a formatted
    /// message. Named so call sites read as "this should never happen".
    pub fn invariant(msg: impl Into<String>) -> Self {
        Error::ProtocolInvariantViolation(msg.into())
    }
}

impl From<smol::channel::RecvError> for Error {
    fn from(_: smol::channel::RecvError) -> Self {
        Error::ChannelClosed
    }
}
