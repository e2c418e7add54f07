//! Client configuration merge.
//!
//! Callers hand the engines a set of property overrides; the engines combine
//! them with a baseline that yields a working client with no further input.
//! The broker address list is always injected last, so tests never need to
//! know cluster addresses. Keys are not validated here; librdkafka rejects
//! unknown or incompatible settings at client construction time.

use rdkafka::config::ClientConfig;
use std::collections::BTreeMap;

pub(crate) fn producer_defaults() -> BTreeMap<String, String> {
    let mut defaults = BTreeMap::new();
    defaults.insert("message.timeout.ms".into(), "5000".into());
    defaults.insert("acks".into(), "all".into());
    defaults.insert("enable.idempotence".into(), "false".into());
    defaults
}

pub(crate) fn consumer_defaults() -> BTreeMap<String, String> {
    let mut defaults = BTreeMap::new();
    defaults.insert("group.id".into(), "kafka-test-kit".into());
    defaults.insert("auto.offset.reset".into(), "earliest".into());
    defaults.insert("enable.auto.commit".into(), "false".into());
    defaults.insert("session.timeout.ms".into(), "6000".into());
    defaults.insert("enable.partition.eof".into(), "false".into());
    defaults.insert("isolation.level".into(), "read_committed".into());
    defaults
}

/// Overrides win over defaults; `bootstrap.servers` wins over both.
pub(crate) fn effective_config(
    brokers: &str,
    mut defaults: BTreeMap<String, String>,
    overrides: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    for (key, value) in overrides {
        defaults.insert(key.clone(), value.clone());
    }
    defaults.insert("bootstrap.servers".into(), brokers.into());
    defaults
}

pub(crate) fn to_client_config(effective: &BTreeMap<String, String>) -> ClientConfig {
    let mut config = ClientConfig::new();
    for (key, value) in effective {
        config.set(key, value);
    }
    config
}

/// Deterministic cache key for one effective configuration.
pub(crate) fn fingerprint(effective: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for (key, value) in effective {
        out.push_str(key);
        out.push('=');
        out.push_str(value);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_alone_yield_working_baseline() {
        let effective = effective_config("localhost:9092", consumer_defaults(), &BTreeMap::new());
        assert_eq!(
            effective.get("bootstrap.servers").map(String::as_str),
            Some("localhost:9092")
        );
        assert_eq!(
            effective.get("auto.offset.reset").map(String::as_str),
            Some("earliest")
        );
        assert_eq!(
            effective.get("isolation.level").map(String::as_str),
            Some("read_committed")
        );
    }

    #[test]
    fn override_wins_over_default() {
        let effective = effective_config(
            "localhost:9092",
            consumer_defaults(),
            &overrides(&[("auto.offset.reset", "latest"), ("linger.ms", "5")]),
        );
        assert_eq!(
            effective.get("auto.offset.reset").map(String::as_str),
            Some("latest")
        );
        assert_eq!(effective.get("linger.ms").map(String::as_str), Some("5"));
    }

    #[test]
    fn broker_list_cannot_be_overridden() {
        let effective = effective_config(
            "broker-a:9092,broker-b:9092",
            producer_defaults(),
            &overrides(&[("bootstrap.servers", "evil:1234")]),
        );
        assert_eq!(
            effective.get("bootstrap.servers").map(String::as_str),
            Some("broker-a:9092,broker-b:9092")
        );
    }

    #[test]
    fn fingerprint_is_stable_and_distinguishes_configs() {
        let a = effective_config("localhost:9092", producer_defaults(), &BTreeMap::new());
        let b = effective_config(
            "localhost:9092",
            producer_defaults(),
            &overrides(&[("linger.ms", "5")]),
        );
        assert_eq!(fingerprint(&a), fingerprint(&a));
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }
}
