use derive_more::{Display, Error};

/// Error contexts for the assertion broker.
///
/// Both variants are fatal to the request that raised them and surface as a
/// 5xx-class failure at the transport layer; nothing is retried internally
/// and no partial output is produced.
#[derive(Debug, Display, Error)]
pub enum AssertionBrokerError {
    /// Missing or invalid external configuration.
    #[display("Configuration error: {message}")]
    Configuration { message: String },

    /// A cryptographic signing operation failed.
    #[display("Signing error: {message}")]
    Signing { message: String },
}
