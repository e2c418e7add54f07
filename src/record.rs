use rdkafka::message::{Header, Headers as RdHeaders, OwnedHeaders};

/// Ordered Kafka record headers.
///
/// Entries keep their insertion order both when producing and when read back
/// from a consumed record. Values are raw bytes; a header produced with a null
/// value comes back as an empty value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Headers {
    entries: Vec<(String, Vec<u8>)>,
}

impl Headers {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a header, preserving insertion order.
    pub fn insert(mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.entries.push((name.into(), value.into()));
        self
    }

    /// Returns the value of the first header with the given name.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    pub(crate) fn to_rdkafka(&self) -> OwnedHeaders {
        let mut headers = OwnedHeaders::new_with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            headers = headers.insert(Header {
                key: name,
                value: Some(value.as_slice()),
            });
        }
        headers
    }

    pub(crate) fn from_rdkafka<H: RdHeaders>(kafka_headers: &H) -> Self {
        let mut entries = Vec::with_capacity(kafka_headers.count());
        for i in 0..kafka_headers.count() {
            let header = kafka_headers.get(i);
            entries.push((
                header.key.to_string(),
                header.value.map(|v| v.to_vec()).unwrap_or_default(),
            ));
        }
        Self { entries }
    }
}

/// Coordinates of a record on the broker.
///
/// Returned per acknowledged record by the producer engine (in send order) and
/// attached to consumed records when a request asks for metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMetadata {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}

/// One logical record: optional key, value, ordered headers, and optional
/// broker coordinates.
///
/// The metadata slot is populated if and only if the owning request asked for
/// metadata inclusion.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValue<K, V> {
    key: Option<K>,
    value: V,
    headers: Headers,
    metadata: Option<RecordMetadata>,
}

impl<K, V> KeyValue<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self {
            key: Some(key),
            value,
            headers: Headers::new(),
            metadata: None,
        }
    }

    /// A record without a key.
    pub fn unkeyed(value: V) -> Self {
        Self {
            key: None,
            value,
            headers: Headers::new(),
            metadata: None,
        }
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn metadata(&self) -> Option<&RecordMetadata> {
        self.metadata.as_ref()
    }

    pub fn into_value(self) -> V {
        self.value
    }

    pub(crate) fn from_parts(
        key: Option<K>,
        value: V,
        headers: Headers,
        metadata: Option<RecordMetadata>,
    ) -> Self {
        Self {
            key,
            value,
            headers,
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_preserve_insertion_order() {
        let headers = Headers::new()
            .insert("b", b"2".to_vec())
            .insert("a", b"1".to_vec())
            .insert("c", b"3".to_vec());

        let names: Vec<&str> = headers.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(headers.get("a"), Some(b"1".as_slice()));
        assert_eq!(headers.get("missing"), None);
    }

    #[test]
    fn headers_roundtrip_through_rdkafka() {
        let headers = Headers::new()
            .insert("source", b"test".to_vec())
            .insert("trace-id", b"abc-123".to_vec());

        let owned = headers.to_rdkafka();
        let back = Headers::from_rdkafka(&owned);
        assert_eq!(back, headers);
    }

    #[test]
    fn key_value_starts_without_metadata() {
        let record: KeyValue<String, String> = KeyValue::new("k".into(), "v".into());
        assert_eq!(record.key(), Some(&"k".to_string()));
        assert_eq!(record.value(), "v");
        assert!(record.metadata().is_none());
        assert!(record.headers().is_empty());
    }

    #[test]
    fn unkeyed_record_has_no_key() {
        let record: KeyValue<String, &str> = KeyValue::unkeyed("v");
        assert!(record.key().is_none());
        assert_eq!(record.into_value(), "v");
    }
}
