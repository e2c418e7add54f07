//! Topic administration.
//!
//! A thin collaborator surface next to the engines: create a topic with
//! explicit partitions, replication, and config, mark one for deletion, or
//! check for existence. Deletion is not synchronous at the broker level and
//! `exists` reports true for topics still pending deletion.

use crate::error::{Error, Result};
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::config::ClientConfig;
use rdkafka::types::RDKafkaErrorCode;
use std::collections::BTreeMap;
use std::time::Duration;

const ADMIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Shape of a topic to create.
#[derive(Debug, Clone)]
pub struct TopicConfig {
    pub partitions: i32,
    pub replication: i32,
    pub overrides: BTreeMap<String, String>,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            partitions: 1,
            replication: 1,
            overrides: BTreeMap::new(),
        }
    }
}

impl TopicConfig {
    pub fn with_partitions(mut self, partitions: i32) -> Self {
        self.partitions = partitions;
        self
    }

    pub fn with_replication(mut self, replication: i32) -> Self {
        self.replication = replication;
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }
}

pub struct TopicAdmin {
    brokers: String,
}

impl TopicAdmin {
    pub fn new(brokers: impl Into<String>) -> Self {
        Self {
            brokers: brokers.into(),
        }
    }

    /// Creates a topic. A topic that already exists counts as success.
    pub async fn create_topic(&self, name: &str, topic: TopicConfig) -> Result<()> {
        let admin = self.admin_client()?;
        let mut new_topic = NewTopic::new(
            name,
            topic.partitions,
            TopicReplication::Fixed(topic.replication),
        );
        for (key, value) in &topic.overrides {
            new_topic = new_topic.set(key, value);
        }
        let opts = AdminOptions::new().operation_timeout(Some(ADMIN_TIMEOUT));

        let results = admin
            .create_topics(&[new_topic], &opts)
            .await
            .map_err(|e| Error::Admin(e.to_string()))?;
        for result in results {
            match result {
                Ok(created) => tracing::info!("topic '{created}' created"),
                Err((existing, RDKafkaErrorCode::TopicAlreadyExists)) => {
                    tracing::info!("topic '{existing}' already exists");
                }
                Err((failed, code)) => {
                    return Err(Error::Admin(format!(
                        "failed to create topic '{failed}': {code}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Marks a topic for deletion. The broker completes the deletion
    /// asynchronously.
    pub async fn delete_topic(&self, name: &str) -> Result<()> {
        let admin = self.admin_client()?;
        let opts = AdminOptions::new().operation_timeout(Some(ADMIN_TIMEOUT));

        let results = admin
            .delete_topics(&[name], &opts)
            .await
            .map_err(|e| Error::Admin(e.to_string()))?;
        for result in results {
            match result {
                Ok(deleted) => tracing::info!("topic '{deleted}' marked for deletion"),
                Err((failed, code)) => {
                    return Err(Error::Admin(format!(
                        "failed to delete topic '{failed}': {code}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Whether the topic is known to the broker. Listing all topics avoids
    /// triggering broker-side auto-creation for the probed name.
    pub async fn exists(&self, name: &str) -> Result<bool> {
        let admin = self.admin_client()?;
        let metadata = admin
            .inner()
            .fetch_metadata(None, ADMIN_TIMEOUT)
            .map_err(|e| Error::Admin(e.to_string()))?;
        Ok(metadata.topics().iter().any(|t| t.name() == name))
    }

    fn admin_client(&self) -> Result<AdminClient<DefaultClientContext>> {
        ClientConfig::new()
            .set("bootstrap.servers", &self.brokers)
            .create()
            .map_err(Error::Config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_config_defaults_to_single_partition_single_replica() {
        let config = TopicConfig::default();
        assert_eq!(config.partitions, 1);
        assert_eq!(config.replication, 1);
        assert!(config.overrides.is_empty());
    }

    #[test]
    fn topic_config_builder_sets_shape_and_overrides() {
        let config = TopicConfig::default()
            .with_partitions(5)
            .with_replication(3)
            .with("cleanup.policy", "compact");
        assert_eq!(config.partitions, 5);
        assert_eq!(config.replication, 3);
        assert_eq!(
            config.overrides.get("cleanup.policy").map(String::as_str),
            Some("compact")
        );
    }
}
