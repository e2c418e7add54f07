//! Producer-side request model.
//!
//! Requests are immutable once built. Builders accept config overrides as
//! `(key, value)` string pairs and finish with `build()` (or its alias
//! `use_defaults()`). The producer engine dispatches over [`SendRequest`]
//! variants; convenience constructors wrap the per-variant structs.

use crate::record::KeyValue;
use std::collections::BTreeMap;

/// Un-keyed records for a single topic.
pub struct SendValues<V> {
    pub(crate) topic: String,
    pub(crate) values: Vec<V>,
    pub(crate) overrides: BTreeMap<String, String>,
}

impl<V> SendValues<V> {
    pub fn to(topic: impl Into<String>, values: impl IntoIterator<Item = V>) -> SendValuesBuilder<V> {
        SendValuesBuilder {
            topic: topic.into(),
            values: values.into_iter().collect(),
            overrides: BTreeMap::new(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }
}

pub struct SendValuesBuilder<V> {
    topic: String,
    values: Vec<V>,
    overrides: BTreeMap<String, String>,
}

impl<V> SendValuesBuilder<V> {
    /// Overrides a client configuration property for this request.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> SendValues<V> {
        SendValues {
            topic: self.topic,
            values: self.values,
            overrides: self.overrides,
        }
    }

    pub fn use_defaults(self) -> SendValues<V> {
        self.build()
    }
}

/// Keyed records for a single topic.
pub struct SendKeyValues<K, V> {
    pub(crate) topic: String,
    pub(crate) records: Vec<KeyValue<K, V>>,
    pub(crate) overrides: BTreeMap<String, String>,
}

impl<K, V> SendKeyValues<K, V> {
    pub fn to(
        topic: impl Into<String>,
        records: impl IntoIterator<Item = KeyValue<K, V>>,
    ) -> SendKeyValuesBuilder<K, V> {
        SendKeyValuesBuilder {
            topic: topic.into(),
            records: records.into_iter().collect(),
            overrides: BTreeMap::new(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn records(&self) -> &[KeyValue<K, V>] {
        &self.records
    }
}

pub struct SendKeyValuesBuilder<K, V> {
    topic: String,
    records: Vec<KeyValue<K, V>>,
    overrides: BTreeMap<String, String>,
}

impl<K, V> SendKeyValuesBuilder<K, V> {
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> SendKeyValues<K, V> {
        SendKeyValues {
            topic: self.topic,
            records: self.records,
            overrides: self.overrides,
        }
    }

    pub fn use_defaults(self) -> SendKeyValues<K, V> {
        self.build()
    }
}

/// Un-keyed records across one or more topics, written in one transaction.
///
/// With `abort_on_completion` the transaction is aborted after every record
/// has been acknowledged at the log level: the records are durably written
/// but never become visible to a committed-only consumer.
pub struct SendValuesTransactional<V> {
    pub(crate) entries: Vec<(String, Vec<V>)>,
    pub(crate) abort_on_completion: bool,
    pub(crate) overrides: BTreeMap<String, String>,
}

impl<V> SendValuesTransactional<V> {
    pub fn in_transaction(
        topic: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> SendValuesTransactionalBuilder<V> {
        SendValuesTransactionalBuilder {
            entries: vec![(topic.into(), values.into_iter().collect())],
            abort_on_completion: false,
            overrides: BTreeMap::new(),
        }
    }

    pub fn entries(&self) -> &[(String, Vec<V>)] {
        &self.entries
    }

    pub fn aborts_on_completion(&self) -> bool {
        self.abort_on_completion
    }
}

pub struct SendValuesTransactionalBuilder<V> {
    entries: Vec<(String, Vec<V>)>,
    abort_on_completion: bool,
    overrides: BTreeMap<String, String>,
}

impl<V> SendValuesTransactionalBuilder<V> {
    /// Adds another topic to the same transaction. Entries are emitted in the
    /// order given and commit or abort atomically.
    pub fn and_to(mut self, topic: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        self.entries
            .push((topic.into(), values.into_iter().collect()));
        self
    }

    /// Abort the transaction after all sends have been acknowledged, instead
    /// of committing it.
    pub fn abort_on_completion(mut self) -> Self {
        self.abort_on_completion = true;
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> SendValuesTransactional<V> {
        SendValuesTransactional {
            entries: self.entries,
            abort_on_completion: self.abort_on_completion,
            overrides: self.overrides,
        }
    }

    pub fn use_defaults(self) -> SendValuesTransactional<V> {
        self.build()
    }
}

/// Keyed records across one or more topics, written in one transaction.
pub struct SendKeyValuesTransactional<K, V> {
    pub(crate) entries: Vec<(String, Vec<KeyValue<K, V>>)>,
    pub(crate) abort_on_completion: bool,
    pub(crate) overrides: BTreeMap<String, String>,
}

impl<K, V> SendKeyValuesTransactional<K, V> {
    pub fn in_transaction(
        topic: impl Into<String>,
        records: impl IntoIterator<Item = KeyValue<K, V>>,
    ) -> SendKeyValuesTransactionalBuilder<K, V> {
        SendKeyValuesTransactionalBuilder {
            entries: vec![(topic.into(), records.into_iter().collect())],
            abort_on_completion: false,
            overrides: BTreeMap::new(),
        }
    }

    pub fn entries(&self) -> &[(String, Vec<KeyValue<K, V>>)] {
        &self.entries
    }

    pub fn aborts_on_completion(&self) -> bool {
        self.abort_on_completion
    }
}

pub struct SendKeyValuesTransactionalBuilder<K, V> {
    entries: Vec<(String, Vec<KeyValue<K, V>>)>,
    abort_on_completion: bool,
    overrides: BTreeMap<String, String>,
}

impl<K, V> SendKeyValuesTransactionalBuilder<K, V> {
    pub fn and_to(
        mut self,
        topic: impl Into<String>,
        records: impl IntoIterator<Item = KeyValue<K, V>>,
    ) -> Self {
        self.entries
            .push((topic.into(), records.into_iter().collect()));
        self
    }

    pub fn abort_on_completion(mut self) -> Self {
        self.abort_on_completion = true;
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> SendKeyValuesTransactional<K, V> {
        SendKeyValuesTransactional {
            entries: self.entries,
            abort_on_completion: self.abort_on_completion,
            overrides: self.overrides,
        }
    }

    pub fn use_defaults(self) -> SendKeyValuesTransactional<K, V> {
        self.build()
    }
}

/// Everything the producer engine can execute, dispatched by match.
pub enum SendRequest<K, V> {
    Values(SendValues<V>),
    KeyValues(SendKeyValues<K, V>),
    ValuesTransactional(SendValuesTransactional<V>),
    KeyValuesTransactional(SendKeyValuesTransactional<K, V>),
}

impl<K, V> From<SendValues<V>> for SendRequest<K, V> {
    fn from(request: SendValues<V>) -> Self {
        Self::Values(request)
    }
}

impl<K, V> From<SendKeyValues<K, V>> for SendRequest<K, V> {
    fn from(request: SendKeyValues<K, V>) -> Self {
        Self::KeyValues(request)
    }
}

impl<K, V> From<SendValuesTransactional<V>> for SendRequest<K, V> {
    fn from(request: SendValuesTransactional<V>) -> Self {
        Self::ValuesTransactional(request)
    }
}

impl<K, V> From<SendKeyValuesTransactional<K, V>> for SendRequest<K, V> {
    fn from(request: SendKeyValuesTransactional<K, V>) -> Self {
        Self::KeyValuesTransactional(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_values_builder_collects_payloads_in_order() {
        let request = SendValues::to("t1", ["a", "b", "c"])
            .with("linger.ms", "5")
            .build();

        assert_eq!(request.topic(), "t1");
        assert_eq!(request.values(), &["a", "b", "c"]);
        assert_eq!(
            request.overrides.get("linger.ms").map(String::as_str),
            Some("5")
        );
    }

    #[test]
    fn transactional_builder_keeps_topic_entry_order() {
        let request = SendValuesTransactional::in_transaction("t1", ["a"])
            .and_to("t2", ["b", "c"])
            .build();

        let topics: Vec<&str> = request.entries().iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(topics, vec!["t1", "t2"]);
        assert!(!request.aborts_on_completion());
    }

    #[test]
    fn abort_flag_defaults_off_and_can_be_set() {
        let keyed = SendKeyValuesTransactional::in_transaction(
            "t1",
            [KeyValue::new("k1", "a"), KeyValue::new("k1", "b")],
        )
        .abort_on_completion()
        .use_defaults();

        assert!(keyed.aborts_on_completion());
        assert_eq!(keyed.entries()[0].1.len(), 2);
    }
}
