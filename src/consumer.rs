//! Observation engine: bounded reads and deadline-bounded observations.
//!
//! Both access modes share one polling core. `read` drains whatever is
//! currently available within a short fixed bound and may legitimately return
//! nothing. `observe` runs an explicit state machine
//! (`Seeking -> Polling -> Satisfied | TimedOut`) on the calling task: it
//! accumulates records that pass the filter pipeline until the expected count
//! is reached, and raises `ObservationTimeout` if the monotonic deadline
//! elapses first. No partial result leaves through the success path.
//!
//! Once the count target is reached, every record already admitted in that
//! poll cycle is returned as well; the result may exceed the expected count
//! and is never truncated.

use crate::error::{Error, Result};
use crate::observe::{ObserveRequest, ReadRequest};
use crate::record::{Headers, KeyValue, RecordMetadata};
use crate::{codec::Decoder, config, filter::Filter};
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::{BorrowedMessage, Message};
use rdkafka::{Offset, TopicPartitionList};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout, Instant};

/// Blocking slice for one poll against the broker.
const POLL_SLICE: Duration = Duration::from_millis(100);
/// Idle bound that ends the drain phase of a poll cycle.
const DRAIN_SLICE: Duration = Duration::from_millis(10);
/// Fixed upper bound on how long `read` keeps polling.
const READ_BOUND: Duration = Duration::from_secs(1);

enum ObserveState {
    Seeking,
    Polling,
    Satisfied,
    TimedOut,
}

pub struct ObservationEngine {
    brokers: String,
}

impl ObservationEngine {
    pub fn new(brokers: impl Into<String>) -> Self {
        Self {
            brokers: brokers.into(),
        }
    }

    /// Drains currently available matching records and returns immediately.
    /// An empty result is a valid outcome.
    pub async fn read<K, V>(&self, request: ReadRequest<K, V>) -> Result<Vec<KeyValue<K, V>>> {
        let consumer = self.open_consumer(&request.topic, &request.seek, &request.overrides)?;
        let pipeline = Pipeline::from_read(&request);

        let deadline = Instant::now() + READ_BOUND;
        let mut admitted = Vec::new();
        while Instant::now() < deadline {
            poll_cycle(&consumer, &pipeline, &mut admitted, deadline).await?;
        }
        tracing::debug!(topic = %request.topic, count = admitted.len(), "read drained");
        Ok(admitted)
    }

    /// Like [`read`](Self::read) but returns only the values, in order.
    pub async fn read_values<K, V>(&self, request: ReadRequest<K, V>) -> Result<Vec<V>> {
        let records = self.read(request).await?;
        Ok(records.into_iter().map(KeyValue::into_value).collect())
    }

    /// Blocks until the expected number of matching records arrived, or fails
    /// with [`Error::ObservationTimeout`] when the deadline elapses first.
    pub async fn observe<K, V>(&self, request: ObserveRequest<K, V>) -> Result<Vec<KeyValue<K, V>>> {
        let read = &request.read;
        let consumer = self.open_consumer(&read.topic, &read.seek, &read.overrides)?;
        let pipeline = Pipeline::from_read(read);

        let deadline = Instant::now() + request.timeout;
        let mut admitted = Vec::new();
        let mut state = ObserveState::Seeking;
        loop {
            state = match state {
                // Cursor positioning happened when the consumer was opened;
                // the transition to polling is unconditional.
                ObserveState::Seeking => ObserveState::Polling,
                ObserveState::Polling => {
                    if admitted.len() >= request.expected {
                        ObserveState::Satisfied
                    } else if Instant::now() >= deadline {
                        ObserveState::TimedOut
                    } else {
                        poll_cycle(&consumer, &pipeline, &mut admitted, deadline).await?;
                        ObserveState::Polling
                    }
                }
                ObserveState::Satisfied => {
                    tracing::debug!(
                        topic = %read.topic,
                        expected = request.expected,
                        observed = admitted.len(),
                        "observation satisfied"
                    );
                    return Ok(admitted);
                }
                ObserveState::TimedOut => {
                    return Err(Error::ObservationTimeout {
                        expected: request.expected,
                        observed: admitted.len(),
                        timeout: request.timeout,
                    });
                }
            };
        }
    }

    /// Like [`observe`](Self::observe) but returns only the values, in order.
    pub async fn observe_values<K, V>(&self, request: ObserveRequest<K, V>) -> Result<Vec<V>> {
        let records = self.observe(request).await?;
        Ok(records.into_iter().map(KeyValue::into_value).collect())
    }

    fn open_consumer(
        &self,
        topic: &str,
        seek: &[(i32, i64)],
        overrides: &BTreeMap<String, String>,
    ) -> Result<StreamConsumer> {
        let effective =
            config::effective_config(&self.brokers, config::consumer_defaults(), overrides);
        let consumer: StreamConsumer = config::to_client_config(&effective)
            .create()
            .map_err(Error::Config)?;

        if seek.is_empty() {
            consumer.subscribe(&[topic]).map_err(Error::Consume)?;
        } else {
            // Explicit offsets: assign the requested partitions directly
            // instead of joining the consumer group.
            let mut assignment = TopicPartitionList::new();
            for (partition, offset) in seek {
                assignment
                    .add_partition_offset(topic, *partition, Offset::Offset(*offset))
                    .map_err(Error::Consume)?;
            }
            consumer.assign(&assignment).map_err(Error::Consume)?;
        }
        Ok(consumer)
    }
}

/// Decoders, filters, and the metadata flag of one request, applied per
/// candidate record in arrival order.
struct Pipeline<'a, K, V> {
    key_decoder: &'a Arc<dyn Decoder<K>>,
    value_decoder: &'a Arc<dyn Decoder<V>>,
    key_filter: Option<&'a Filter<K>>,
    value_filter: &'a Filter<V>,
    headers_filter: &'a Filter<Headers>,
    include_metadata: bool,
}

impl<'a, K, V> Pipeline<'a, K, V> {
    fn from_read(request: &'a ReadRequest<K, V>) -> Self {
        Self {
            key_decoder: &request.key_decoder,
            value_decoder: &request.value_decoder,
            key_filter: request.key_filter.as_ref(),
            value_filter: &request.value_filter,
            headers_filter: &request.headers_filter,
            include_metadata: request.include_metadata,
        }
    }

    /// Decodes one candidate and evaluates the filter pipeline. Returns
    /// `None` when a filter rejects it.
    fn admit(&self, message: &BorrowedMessage<'_>) -> Result<Option<KeyValue<K, V>>> {
        let headers = message
            .headers()
            .map(Headers::from_rdkafka)
            .unwrap_or_default();
        let key = match message.key() {
            Some(raw) => Some(self.key_decoder.decode(raw)?),
            None => None,
        };
        let value = self.value_decoder.decode(message.payload().unwrap_or_default())?;

        // Records without a key never satisfy an explicitly set key filter.
        let key_admitted = match (self.key_filter, &key) {
            (None, _) => true,
            (Some(filter), Some(key)) => filter.test(key),
            (Some(_), None) => false,
        };
        if !(key_admitted && self.value_filter.test(&value) && self.headers_filter.test(&headers)) {
            return Ok(None);
        }

        let metadata = self.include_metadata.then(|| RecordMetadata {
            topic: message.topic().to_string(),
            partition: message.partition(),
            offset: message.offset(),
        });
        Ok(Some(KeyValue::from_parts(key, value, headers, metadata)))
    }
}

/// One poll cycle: wait up to one poll slice for a record, then drain
/// whatever else is immediately available. Never overshoots the deadline.
async fn poll_cycle<K, V>(
    consumer: &StreamConsumer,
    pipeline: &Pipeline<'_, K, V>,
    admitted: &mut Vec<KeyValue<K, V>>,
    deadline: Instant,
) -> Result<()> {
    let slice = POLL_SLICE.min(deadline.saturating_duration_since(Instant::now()));
    match timeout(slice, consumer.recv()).await {
        Ok(Ok(message)) => {
            if let Some(record) = pipeline.admit(&message)? {
                admitted.push(record);
            }
        }
        Ok(Err(e)) => return Err(Error::Consume(e)),
        // Slice elapsed with nothing available.
        Err(_) => return Ok(()),
    }

    loop {
        if Instant::now() >= deadline {
            return Ok(());
        }
        match timeout(DRAIN_SLICE, consumer.recv()).await {
            Ok(Ok(message)) => {
                if let Some(record) = pipeline.admit(&message)? {
                    admitted.push(record);
                }
            }
            Ok(Err(e)) => return Err(Error::Consume(e)),
            Err(_) => return Ok(()),
        }
    }
}
