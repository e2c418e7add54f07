//! Producer engine: plain synchronous sends and transactional sends.
//!
//! Every operation completes its whole protocol before returning: each record
//! is awaited to acknowledgment in input order and metadata is returned in
//! the same order. Plain producers are cached per effective configuration and
//! reused across calls; they are closed when the engine is dropped at test
//! teardown. A cached producer must not be driven from multiple tasks at
//! once; issue calls sequentially.
//!
//! Transactional init/commit/abort are blocking librdkafka round trips (up
//! to the 30 second transaction bound) issued on the calling thread.

use crate::config;
use crate::error::{Error, Result};
use crate::record::{Headers, KeyValue, RecordMetadata};
use crate::send::{
    SendKeyValues, SendKeyValuesTransactional, SendRequest, SendValues, SendValuesTransactional,
};
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

/// How long a single record may wait for its acknowledgment.
const ACK_TIMEOUT: Duration = Duration::from_secs(5);
/// Bound for transactional init/commit/abort round trips.
const TRANSACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// A pre-encoded record: key bytes, value bytes, headers.
type RawRecord = (Option<Vec<u8>>, Vec<u8>, Headers);

pub struct ProducerEngine {
    brokers: String,
    producers: Mutex<HashMap<String, FutureProducer>>,
}

impl ProducerEngine {
    pub fn new(brokers: impl Into<String>) -> Self {
        Self {
            brokers: brokers.into(),
            producers: Mutex::new(HashMap::new()),
        }
    }

    /// Executes any send request, dispatching over its variant.
    ///
    /// Keys and values are anything viewable as bytes: string literals,
    /// owned strings, byte vectors.
    pub async fn send<K: AsRef<[u8]>, V: AsRef<[u8]>>(
        &self,
        request: SendRequest<K, V>,
    ) -> Result<Vec<RecordMetadata>> {
        match request {
            SendRequest::Values(request) => self.send_values(request).await,
            SendRequest::KeyValues(request) => self.send_key_values(request).await,
            SendRequest::ValuesTransactional(request) => {
                self.send_values_transactional(request).await
            }
            SendRequest::KeyValuesTransactional(request) => {
                self.send_key_values_transactional(request).await
            }
        }
    }

    pub async fn send_values<V: AsRef<[u8]>>(
        &self,
        request: SendValues<V>,
    ) -> Result<Vec<RecordMetadata>> {
        if request.values.is_empty() {
            return Err(Error::InvalidRequest("no values to send".into()));
        }
        let records = encode_unkeyed(&request.values);
        self.send_plain(&request.topic, records, &request.overrides)
            .await
    }

    pub async fn send_key_values<K: AsRef<[u8]>, V: AsRef<[u8]>>(
        &self,
        request: SendKeyValues<K, V>,
    ) -> Result<Vec<RecordMetadata>> {
        if request.records.is_empty() {
            return Err(Error::InvalidRequest("no records to send".into()));
        }
        let records = encode_keyed(&request.records);
        self.send_plain(&request.topic, records, &request.overrides)
            .await
    }

    pub async fn send_values_transactional<V: AsRef<[u8]>>(
        &self,
        request: SendValuesTransactional<V>,
    ) -> Result<Vec<RecordMetadata>> {
        let entries: Vec<(String, Vec<RawRecord>)> = request
            .entries
            .iter()
            .map(|(topic, values)| (topic.clone(), encode_unkeyed(values)))
            .collect();
        self.send_transactional(entries, request.abort_on_completion, &request.overrides)
            .await
    }

    pub async fn send_key_values_transactional<K: AsRef<[u8]>, V: AsRef<[u8]>>(
        &self,
        request: SendKeyValuesTransactional<K, V>,
    ) -> Result<Vec<RecordMetadata>> {
        let entries: Vec<(String, Vec<RawRecord>)> = request
            .entries
            .iter()
            .map(|(topic, records)| (topic.clone(), encode_keyed(records)))
            .collect();
        self.send_transactional(entries, request.abort_on_completion, &request.overrides)
            .await
    }

    async fn send_plain(
        &self,
        topic: &str,
        records: Vec<RawRecord>,
        overrides: &BTreeMap<String, String>,
    ) -> Result<Vec<RecordMetadata>> {
        let effective = config::effective_config(&self.brokers, config::producer_defaults(), overrides);
        let producer = self.cached_producer(&effective).await?;

        let mut acks = Vec::with_capacity(records.len());
        for (key, value, headers) in &records {
            let ack = deliver(&producer, topic, key.as_deref(), value, headers).await?;
            acks.push(ack);
        }
        tracing::debug!(topic, count = acks.len(), "acknowledged plain send");
        Ok(acks)
    }

    async fn send_transactional(
        &self,
        entries: Vec<(String, Vec<RawRecord>)>,
        abort_on_completion: bool,
        overrides: &BTreeMap<String, String>,
    ) -> Result<Vec<RecordMetadata>> {
        if entries.is_empty() || entries.iter().all(|(_, records)| records.is_empty()) {
            return Err(Error::InvalidRequest(
                "transactional send requires at least one record".into(),
            ));
        }

        // A transactional.id binds a producer to one transactional session,
        // so transactional producers are built per request and never cached.
        let mut overrides = overrides.clone();
        overrides
            .entry("transactional.id".into())
            .or_insert_with(|| format!("kafka-test-kit-tx-{}", Uuid::new_v4()));
        overrides
            .entry("enable.idempotence".into())
            .or_insert_with(|| "true".into());

        let effective =
            config::effective_config(&self.brokers, config::producer_defaults(), &overrides);
        let producer: FutureProducer = config::to_client_config(&effective)
            .create()
            .map_err(Error::Config)?;

        producer
            .init_transactions(TRANSACTION_TIMEOUT)
            .map_err(Error::Transaction)?;
        producer.begin_transaction().map_err(Error::Transaction)?;

        let mut acks = Vec::new();
        for (topic, records) in &entries {
            for (key, value, headers) in records {
                match deliver(&producer, topic, key.as_deref(), value, headers).await {
                    Ok(ack) => acks.push(ack),
                    Err(e) => {
                        if let Err(abort_err) = producer.abort_transaction(TRANSACTION_TIMEOUT) {
                            tracing::warn!("failed to abort transaction after send error: {abort_err}");
                        }
                        return Err(e);
                    }
                }
            }
        }

        if abort_on_completion {
            producer
                .abort_transaction(TRANSACTION_TIMEOUT)
                .map_err(Error::Transaction)?;
            tracing::debug!(count = acks.len(), "transaction aborted on completion");
        } else {
            producer
                .commit_transaction(TRANSACTION_TIMEOUT)
                .map_err(Error::Transaction)?;
            tracing::debug!(count = acks.len(), "transaction committed");
        }
        Ok(acks)
    }

    async fn cached_producer(
        &self,
        effective: &BTreeMap<String, String>,
    ) -> Result<FutureProducer> {
        let fingerprint = config::fingerprint(effective);
        let mut producers = self.producers.lock().await;
        if let Some(producer) = producers.get(&fingerprint) {
            return Ok(producer.clone());
        }
        let producer: FutureProducer = config::to_client_config(effective)
            .create()
            .map_err(Error::Config)?;
        producers.insert(fingerprint, producer.clone());
        Ok(producer)
    }
}

async fn deliver(
    producer: &FutureProducer,
    topic: &str,
    key: Option<&[u8]>,
    value: &[u8],
    headers: &Headers,
) -> Result<RecordMetadata> {
    let mut record = FutureRecord::<[u8], [u8]>::to(topic).payload(value);
    if let Some(key) = key {
        record = record.key(key);
    }
    if !headers.is_empty() {
        record = record.headers(headers.to_rdkafka());
    }

    let (partition, offset) = producer
        .send(record, ACK_TIMEOUT)
        .await
        .map_err(|(e, _)| Error::Produce(e))?;

    Ok(RecordMetadata {
        topic: topic.to_string(),
        partition,
        offset,
    })
}

fn encode_unkeyed<V: AsRef<[u8]>>(values: &[V]) -> Vec<RawRecord> {
    values
        .iter()
        .map(|v| (None, v.as_ref().to_vec(), Headers::new()))
        .collect()
}

fn encode_keyed<K: AsRef<[u8]>, V: AsRef<[u8]>>(records: &[KeyValue<K, V>]) -> Vec<RawRecord> {
    records
        .iter()
        .map(|r| {
            (
                r.key().map(|k| k.as_ref().to_vec()),
                r.value().as_ref().to_vec(),
                r.headers().clone(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::send::SendKeyValuesTransactional;

    #[tokio::test]
    async fn empty_values_request_is_rejected_before_any_client_is_built() {
        let engine = ProducerEngine::new("localhost:1");
        let request: SendValues<&str> = SendValues::to("t1", []).build();
        let err = engine.send_values(request).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn empty_keyed_request_is_rejected() {
        let engine = ProducerEngine::new("localhost:1");
        let request: SendKeyValues<&str, &str> = SendKeyValues::to("t1", []).build();
        let err = engine.send_key_values(request).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn transactional_request_without_records_is_rejected() {
        let engine = ProducerEngine::new("localhost:1");
        let request: SendKeyValuesTransactional<&str, &str> =
            SendKeyValuesTransactional::in_transaction("t1", []).build();
        let err = engine.send_key_values_transactional(request).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[test]
    fn unkeyed_records_encode_without_key_in_order() {
        let raw = encode_unkeyed(&["a", "b"]);
        assert_eq!(raw.len(), 2);
        assert!(raw[0].0.is_none());
        assert_eq!(raw[0].1, b"a");
        assert_eq!(raw[1].1, b"b");
    }

    #[test]
    fn borrowed_and_owned_payloads_encode_alike() {
        // String literals, owned strings, and byte vectors are all accepted
        // payload types and encode to the same bytes.
        let from_literals = encode_unkeyed(&["a", "b"]);
        let from_owned = encode_unkeyed(&["a".to_string(), "b".to_string()]);
        let from_bytes = encode_unkeyed(&[b"a".to_vec(), b"b".to_vec()]);
        assert_eq!(from_literals, from_owned);
        assert_eq!(from_literals, from_bytes);

        let keyed = encode_keyed(&[KeyValue::new("k".to_string(), "v")]);
        assert_eq!(keyed[0].0.as_deref(), Some(b"k".as_slice()));
        assert_eq!(keyed[0].1, b"v");
    }

    #[test]
    fn keyed_records_carry_key_and_headers() {
        let record = KeyValue::new("k1", "v1").with_headers(Headers::new().insert("h", "x"));
        let raw = encode_keyed(&[record]);
        assert_eq!(raw[0].0.as_deref(), Some(b"k1".as_slice()));
        assert_eq!(raw[0].1, b"v1");
        assert_eq!(raw[0].2.get("h"), Some(b"x".as_slice()));
    }
}
