use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    DeserializationError(#[from] serde_json::Error),

    /// A referenced node, edge or job is absent. Points at an inconsistency between
    /// the inventory and the graph and is never defaulted away.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The graph or the caller broke a structural assumption (e.g. a DTN without
    /// exactly one gateway edge, or fragment lists with different totals).
    #[error("Structural invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Not allowed to delete the gateway node")]
    GatewayRemoval,

    #[error("No running extra job attached to {0}")]
    NoEvictableJob(String),

    #[error("Persistence failure: {0}")]
    PersistenceError(String),

    #[error("Resource broker is unavailable: {0}")]
    MailboxError(#[from] actix::MailboxError),
}

impl Error {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound { kind, id: id.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
