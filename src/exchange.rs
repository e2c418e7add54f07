//! One handle over the whole exchange layer.
//!
//! `KafkaExchange` bundles the producer engine, the observation engine, and
//! topic administration behind a single connection string. Construction does
//! no IO; clients are built lazily per request configuration. The cluster
//! itself is an external collaborator: the brokers must be reachable before
//! any call is issued, and dropping the exchange at test teardown disposes of
//! all cached clients.

use crate::admin::{TopicAdmin, TopicConfig};
use crate::consumer::ObservationEngine;
use crate::error::Result;
use crate::observe::{ObserveRequest, ReadRequest};
use crate::producer::ProducerEngine;
use crate::record::{KeyValue, RecordMetadata};
use crate::send::{
    SendKeyValues, SendKeyValuesTransactional, SendRequest, SendValues, SendValuesTransactional,
};
pub struct KafkaExchange {
    brokers: String,
    producer: ProducerEngine,
    observer: ObservationEngine,
    admin: TopicAdmin,
}

impl KafkaExchange {
    /// Binds the exchange to a comma-separated broker address list.
    pub fn connect(brokers: impl Into<String>) -> Self {
        let brokers = brokers.into();
        Self {
            producer: ProducerEngine::new(brokers.clone()),
            observer: ObservationEngine::new(brokers.clone()),
            admin: TopicAdmin::new(brokers.clone()),
            brokers,
        }
    }

    pub fn brokers(&self) -> &str {
        &self.brokers
    }

    pub async fn send<K: AsRef<[u8]>, V: AsRef<[u8]>>(
        &self,
        request: impl Into<SendRequest<K, V>>,
    ) -> Result<Vec<RecordMetadata>> {
        self.producer.send(request.into()).await
    }

    pub async fn send_values<V: AsRef<[u8]>>(
        &self,
        request: SendValues<V>,
    ) -> Result<Vec<RecordMetadata>> {
        self.producer.send_values(request).await
    }

    pub async fn send_key_values<K: AsRef<[u8]>, V: AsRef<[u8]>>(
        &self,
        request: SendKeyValues<K, V>,
    ) -> Result<Vec<RecordMetadata>> {
        self.producer.send_key_values(request).await
    }

    pub async fn send_values_transactional<V: AsRef<[u8]>>(
        &self,
        request: SendValuesTransactional<V>,
    ) -> Result<Vec<RecordMetadata>> {
        self.producer.send_values_transactional(request).await
    }

    pub async fn send_key_values_transactional<K: AsRef<[u8]>, V: AsRef<[u8]>>(
        &self,
        request: SendKeyValuesTransactional<K, V>,
    ) -> Result<Vec<RecordMetadata>> {
        self.producer.send_key_values_transactional(request).await
    }

    pub async fn read<K, V>(&self, request: ReadRequest<K, V>) -> Result<Vec<KeyValue<K, V>>> {
        self.observer.read(request).await
    }

    pub async fn read_values<K, V>(&self, request: ReadRequest<K, V>) -> Result<Vec<V>> {
        self.observer.read_values(request).await
    }

    pub async fn observe<K, V>(
        &self,
        request: ObserveRequest<K, V>,
    ) -> Result<Vec<KeyValue<K, V>>> {
        self.observer.observe(request).await
    }

    pub async fn observe_values<K, V>(&self, request: ObserveRequest<K, V>) -> Result<Vec<V>> {
        self.observer.observe_values(request).await
    }

    pub async fn create_topic(&self, name: &str, topic: TopicConfig) -> Result<()> {
        self.admin.create_topic(name, topic).await
    }

    pub async fn delete_topic(&self, name: &str) -> Result<()> {
        self.admin.delete_topic(name).await
    }

    pub async fn topic_exists(&self, name: &str) -> Result<bool> {
        self.admin.exists(name).await
    }
}
