//! Synchronous Kafka record exchange for deterministic integration tests.
//!
//! Test authors produce records (plain or transactional, keyed or un-keyed)
//! and consume records (bounded by count, time, and content filters) without
//! hand-rolling polling loops, timeouts, or client lifecycle management.
//!
//! Features:
//!
//! - Plain sends: every record acknowledged in order, metadata returned in send order
//! - Transactional sends: single or multi-topic, with deliberate abort for
//!   isolation-level testing
//! - Bounded reads: drain what is currently available, an empty result is valid
//! - Deadline-bounded observations: block until N matching records arrived or
//!   fail with a distinct timeout error tests can assert on
//! - Filter pipelines over keys, values, and headers with AND semantics
//! - Topic administration: create, delete, existence checks
//!
//! ```rust,no_run
//! use kafka_test_kit::{KafkaExchange, ObserveRequest, SendValues};
//!
//! #[tokio::main]
//! async fn main() -> kafka_test_kit::Result<()> {
//!     let exchange = KafkaExchange::connect("localhost:9092");
//!
//!     exchange
//!         .send_values(SendValues::to("t1", ["a", "b", "c"]).use_defaults())
//!         .await?;
//!
//!     let values = exchange
//!         .observe_values(ObserveRequest::on("t1", 3).use_defaults())
//!         .await?;
//!     assert_eq!(values, ["a", "b", "c"]);
//!     Ok(())
//! }
//! ```
//!
//! All operations run their whole protocol on the calling task; nothing is
//! spawned in the background and the deadline is the only exit from an
//! unsatisfied observation. Cached clients are shared across sequential calls
//! only; the exchange does not guard one client against concurrent calls from
//! multiple tasks.

/// Topic create/delete/exists collaborator.
pub mod admin;

/// Key and value codecs; UTF-8 strings by default.
pub mod codec;

mod config;

/// Observation engine: bounded `read` and deadline-bounded `observe`.
pub mod consumer;

pub mod error;

/// One handle bundling producer, observer, and topic admin.
pub mod exchange;

/// Predicate filters over keys, values, and headers.
pub mod filter;

/// Read and observe request model.
pub mod observe;

/// Producer engine: plain and transactional sends.
pub mod producer;

/// Records, headers, and broker coordinates.
pub mod record;

/// Send request model.
pub mod send;

pub use admin::{TopicAdmin, TopicConfig};
pub use codec::{BytesDecoder, Decoder, Utf8Decoder};
pub use consumer::ObservationEngine;
pub use error::{Error, Result};
pub use exchange::KafkaExchange;
pub use filter::Filter;
pub use observe::{ObserveRequest, ReadRequest, DEFAULT_OBSERVE_TIMEOUT};
pub use producer::ProducerEngine;
pub use record::{Headers, KeyValue, RecordMetadata};
pub use send::{
    SendKeyValues, SendKeyValuesTransactional, SendRequest, SendValues, SendValuesTransactional,
};
