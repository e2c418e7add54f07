//! Consumer-side request model.
//!
//! `ReadRequest` drains whatever is currently available; `ObserveRequest`
//! blocks until a target number of matching records arrived or a deadline
//! elapsed. Both default to UTF-8 string codecs for key and value and to
//! filters that admit everything.

use crate::codec::{Decoder, Utf8Decoder};
use crate::filter::Filter;
use crate::record::Headers;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Default deadline for [`ObserveRequest`] when `observe_for` is not called.
pub const DEFAULT_OBSERVE_TIMEOUT: Duration = Duration::from_secs(30);

/// A bounded, non-blocking drain of currently available matching records.
pub struct ReadRequest<K, V> {
    pub(crate) topic: String,
    pub(crate) key_decoder: Arc<dyn Decoder<K>>,
    pub(crate) value_decoder: Arc<dyn Decoder<V>>,
    pub(crate) overrides: BTreeMap<String, String>,
    pub(crate) key_filter: Option<Filter<K>>,
    pub(crate) value_filter: Filter<V>,
    pub(crate) headers_filter: Filter<Headers>,
    pub(crate) seek: Vec<(i32, i64)>,
    pub(crate) include_metadata: bool,
}

impl ReadRequest<String, String> {
    /// Reads string keys and values from the given topic.
    pub fn from_topic(topic: impl Into<String>) -> ReadRequestBuilder<String, String> {
        ReadRequestBuilder::new(topic.into(), Arc::new(Utf8Decoder), Arc::new(Utf8Decoder))
    }
}

impl<K: 'static, V: 'static> ReadRequest<K, V> {
    /// Reads with explicit key and value codecs.
    pub fn with_decoders(
        topic: impl Into<String>,
        key_decoder: Arc<dyn Decoder<K>>,
        value_decoder: Arc<dyn Decoder<V>>,
    ) -> ReadRequestBuilder<K, V> {
        ReadRequestBuilder::new(topic.into(), key_decoder, value_decoder)
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

pub struct ReadRequestBuilder<K, V> {
    topic: String,
    key_decoder: Arc<dyn Decoder<K>>,
    value_decoder: Arc<dyn Decoder<V>>,
    overrides: BTreeMap<String, String>,
    key_filters: Vec<Filter<K>>,
    value_filters: Vec<Filter<V>>,
    headers_filters: Vec<Filter<Headers>>,
    seek: Vec<(i32, i64)>,
    include_metadata: bool,
}

impl<K: 'static, V: 'static> ReadRequestBuilder<K, V> {
    fn new(
        topic: String,
        key_decoder: Arc<dyn Decoder<K>>,
        value_decoder: Arc<dyn Decoder<V>>,
    ) -> Self {
        Self {
            topic,
            key_decoder,
            value_decoder,
            overrides: BTreeMap::new(),
            key_filters: Vec::new(),
            value_filters: Vec::new(),
            headers_filters: Vec::new(),
            seek: Vec::new(),
            include_metadata: false,
        }
    }

    /// Overrides a client configuration property for this request.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    /// Admits only records whose key satisfies the predicate. Repeated calls
    /// AND their predicates. Records without a key never satisfy a key filter.
    pub fn filter_on_keys(mut self, predicate: impl Fn(&K) -> bool + Send + Sync + 'static) -> Self {
        self.key_filters.push(Filter::new(predicate));
        self
    }

    /// Admits only records whose value satisfies the predicate. Repeated
    /// calls AND their predicates.
    pub fn filter_on_values(
        mut self,
        predicate: impl Fn(&V) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.value_filters.push(Filter::new(predicate));
        self
    }

    /// Admits only records whose headers satisfy the predicate. Repeated
    /// calls AND their predicates.
    pub fn filter_on_headers(
        mut self,
        predicate: impl Fn(&Headers) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.headers_filters.push(Filter::new(predicate));
        self
    }

    /// Starts consuming the given partition at the given offset instead of
    /// the committed group position.
    pub fn seek_to(mut self, partition: i32, offset: i64) -> Self {
        self.seek.push((partition, offset));
        self
    }

    /// Attaches (topic, partition, offset) to every returned record.
    pub fn include_metadata(mut self) -> Self {
        self.include_metadata = true;
        self
    }

    pub fn build(self) -> ReadRequest<K, V> {
        ReadRequest {
            topic: self.topic,
            key_decoder: self.key_decoder,
            value_decoder: self.value_decoder,
            overrides: self.overrides,
            key_filter: if self.key_filters.is_empty() {
                None
            } else {
                Some(Filter::all(self.key_filters))
            },
            value_filter: Filter::all(self.value_filters),
            headers_filter: Filter::all(self.headers_filters),
            seek: self.seek,
            include_metadata: self.include_metadata,
        }
    }

    pub fn use_defaults(self) -> ReadRequest<K, V> {
        self.build()
    }
}

/// A blocking observation: accumulate matching records until the expected
/// count is reached or the deadline elapses.
///
/// `expected == 0` is legal and satisfied immediately.
pub struct ObserveRequest<K, V> {
    pub(crate) read: ReadRequest<K, V>,
    pub(crate) expected: usize,
    pub(crate) timeout: Duration,
}

impl ObserveRequest<String, String> {
    /// Observes string keys and values on the given topic.
    pub fn on(topic: impl Into<String>, expected: usize) -> ObserveRequestBuilder<String, String> {
        ObserveRequestBuilder {
            read: ReadRequest::from_topic(topic),
            expected,
            timeout: DEFAULT_OBSERVE_TIMEOUT,
        }
    }
}

impl<K: 'static, V: 'static> ObserveRequest<K, V> {
    /// Observes with explicit key and value codecs.
    pub fn with_decoders(
        topic: impl Into<String>,
        expected: usize,
        key_decoder: Arc<dyn Decoder<K>>,
        value_decoder: Arc<dyn Decoder<V>>,
    ) -> ObserveRequestBuilder<K, V> {
        ObserveRequestBuilder {
            read: ReadRequest::with_decoders(topic, key_decoder, value_decoder),
            expected,
            timeout: DEFAULT_OBSERVE_TIMEOUT,
        }
    }

    pub fn topic(&self) -> &str {
        &self.read.topic
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

pub struct ObserveRequestBuilder<K, V> {
    read: ReadRequestBuilder<K, V>,
    expected: usize,
    timeout: Duration,
}

impl<K: 'static, V: 'static> ObserveRequestBuilder<K, V> {
    /// Overrides the default 30 second observation deadline.
    pub fn observe_for(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.read = self.read.with(key, value);
        self
    }

    pub fn filter_on_keys(mut self, predicate: impl Fn(&K) -> bool + Send + Sync + 'static) -> Self {
        self.read = self.read.filter_on_keys(predicate);
        self
    }

    pub fn filter_on_values(
        mut self,
        predicate: impl Fn(&V) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.read = self.read.filter_on_values(predicate);
        self
    }

    pub fn filter_on_headers(
        mut self,
        predicate: impl Fn(&Headers) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.read = self.read.filter_on_headers(predicate);
        self
    }

    pub fn seek_to(mut self, partition: i32, offset: i64) -> Self {
        self.read = self.read.seek_to(partition, offset);
        self
    }

    pub fn include_metadata(mut self) -> Self {
        self.read = self.read.include_metadata();
        self
    }

    pub fn build(self) -> ObserveRequest<K, V> {
        ObserveRequest {
            read: self.read.build(),
            expected: self.expected,
            timeout: self.timeout,
        }
    }

    pub fn use_defaults(self) -> ObserveRequest<K, V> {
        self.build()
    }
}
