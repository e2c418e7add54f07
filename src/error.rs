use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The underlying client rejected the effective configuration at
    /// construction time. Not retried.
    #[error("invalid client configuration: {0}")]
    Config(rdkafka::error::KafkaError),

    /// A record failed to acknowledge. The whole send fails, even if only one
    /// of N records was rejected; no partial result is returned.
    #[error("produce failed: {0}")]
    Produce(rdkafka::error::KafkaError),

    /// Transactional init/begin/commit/abort protocol failure. Transaction
    /// state is left for the underlying client to resolve on next use.
    #[error("transaction failed: {0}")]
    Transaction(rdkafka::error::KafkaError),

    /// Transport or protocol failure while polling.
    #[error("consume failed: {0}")]
    Consume(rdkafka::error::KafkaError),

    /// Topic administration request failed at the broker.
    #[error("topic administration failed: {0}")]
    Admin(String),

    /// A record key or value could not be decoded with the configured codec.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The request violates a structural invariant (empty payloads, no topic
    /// entries) and was never handed to the client.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The desired number of matching records did not arrive before the
    /// deadline. This is an assertion-style failure for tests, distinct from
    /// transport errors; no partial result is returned.
    #[error("observed {observed} of {expected} expected records within {timeout:?}")]
    ObservationTimeout {
        expected: usize,
        observed: usize,
        timeout: Duration,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
