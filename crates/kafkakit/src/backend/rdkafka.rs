//! librdkafka-backed cluster admin.

use crate::backend::{ClusterAdmin, is_internal_topic};
use crate::connection::AdminConfig;
use crate::error::{Error, Result};
use crate::types::{ConfigEntry, ConfigMap, ConfigValue, TopicDetail};
use futures::executor::block_on;
use rdkafka::admin::{
    AdminClient, AdminOptions, AlterConfig, NewTopic, ResourceSpecifier, TopicReplication,
};
use rdkafka::client::DefaultClientContext;
use rdkafka::config::ClientConfig;
use std::collections::BTreeMap;
use std::time::Duration;

/// Admin backend talking to a real cluster through librdkafka.
pub struct RdKafkaAdmin {
    client: AdminClient<DefaultClientContext>,
    timeout: Duration,
}

impl RdKafkaAdmin {
    /// Open an admin client for the configured brokers.
    pub fn connect(config: &AdminConfig) -> Result<Self> {
        let api_version_request = config.version.supports_api_versions();
        let client = ClientConfig::new()
            .set("bootstrap.servers", config.brokers.join(","))
            .set("broker.version.fallback", config.version.to_string())
            .set("api.version.request", api_version_request.to_string())
            .create()
            .map_err(|e| Error::Connection {
                message: format!("failed to create admin client: {e}"),
            })?;

        log::debug!(
            "Admin client for {} (version {})",
            config.brokers.join(","),
            config.version
        );

        Ok(Self {
            client,
            timeout: config.operation_timeout,
        })
    }

    fn options(&self, validate_only: bool) -> AdminOptions {
        AdminOptions::new()
            .operation_timeout(Some(self.timeout))
            .request_timeout(Some(self.timeout))
            .validate_only(validate_only)
    }

    /// Describe several topics in one request.
    ///
    /// The outer error is a failed request; each topic carries its own
    /// result so one denied topic does not hide the others.
    fn describe_many(&self, topics: &[&str]) -> Result<Vec<(String, Result<Vec<ConfigEntry>>)>> {
        let specifiers: Vec<ResourceSpecifier<'_>> =
            topics.iter().map(|t| ResourceSpecifier::Topic(*t)).collect();
        let results = block_on(self.client.describe_configs(&specifiers, &self.options(false)))
            .map_err(|e| Error::from_kafka("describe config", &topics.join(","), e))?;

        Ok(topics
            .iter()
            .zip(results)
            .map(|(topic, result)| {
                let entries = result
                    .map(|resource| {
                        resource
                            .entries
                            .into_iter()
                            .map(|e| ConfigEntry {
                                name: e.name,
                                value: e.value,
                                is_default: e.is_default,
                                is_read_only: e.is_read_only,
                                is_sensitive: e.is_sensitive,
                            })
                            .collect()
                    })
                    .map_err(|code| Error::from_code("describe config", topic, code));
                ((*topic).to_string(), entries)
            })
            .collect())
    }
}

/// Copy described overrides into the listed topics.
///
/// Describe failures are not fatal here: the topic keeps an empty config
/// and its own describe during the run reports the error.
fn fill_overrides(
    topics: &mut BTreeMap<String, TopicDetail>,
    described: Vec<(String, Result<Vec<ConfigEntry>>)>,
) {
    for (name, entries) in described {
        let entries = match entries {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Could not describe {name} while listing: {e}");
                continue;
            }
        };
        if let Some(detail) = topics.get_mut(&name) {
            detail.config = entries
                .into_iter()
                .filter(ConfigEntry::is_override)
                .filter_map(|e| e.value.map(|v| (e.name, v)))
                .collect();
        }
    }
}

impl ClusterAdmin for RdKafkaAdmin {
    fn list_topics(&self) -> Result<BTreeMap<String, TopicDetail>> {
        let metadata = self
            .client
            .inner()
            .fetch_metadata(None, self.timeout)
            .map_err(|e| Error::Connection {
                message: format!("failed to fetch metadata: {e}"),
            })?;

        let mut topics = BTreeMap::new();
        for topic in metadata.topics() {
            if is_internal_topic(topic.name()) {
                continue;
            }
            let partitions = topic.partitions();
            let replication = partitions.first().map_or(0, |p| p.replicas().len());
            topics.insert(
                topic.name().to_string(),
                TopicDetail::new(
                    i32::try_from(partitions.len()).unwrap_or(i32::MAX),
                    i16::try_from(replication).unwrap_or(i16::MAX),
                ),
            );
        }

        if topics.is_empty() {
            return Ok(topics);
        }

        let names: Vec<&str> = topics.keys().map(String::as_str).collect();
        match self.describe_many(&names) {
            Ok(described) => fill_overrides(&mut topics, described),
            Err(e) => log::warn!("Could not describe listed topics: {e}"),
        }

        log::debug!("Listed {} topics", topics.len());
        Ok(topics)
    }

    fn describe_config(&self, topic: &str) -> Result<Vec<ConfigEntry>> {
        self.describe_many(&[topic])?
            .pop()
            .map_or_else(|| Ok(Vec::new()), |(_, entries)| entries)
    }

    fn create_topic(
        &self,
        topic: &str,
        num_partitions: i32,
        replication_factor: i16,
        validate_only: bool,
    ) -> Result<()> {
        let new_topic = NewTopic::new(
            topic,
            num_partitions,
            TopicReplication::Fixed(i32::from(replication_factor)),
        );
        let results = block_on(
            self.client
                .create_topics([&new_topic], &self.options(validate_only)),
        )
        .map_err(|e| Error::from_kafka("create topic", topic, e))?;

        for result in results {
            result.map_err(|(name, code)| Error::from_code("create topic", &name, code))?;
        }
        Ok(())
    }

    fn alter_config(&self, topic: &str, config: &ConfigMap, validate_only: bool) -> Result<()> {
        // The legacy AlterConfigs request replaces the whole set; omitting a
        // key resets it.
        let mut alter = AlterConfig::new(ResourceSpecifier::Topic(topic));
        for (key, value) in config {
            if let ConfigValue::Set(value) = value {
                alter = alter.set(key, value);
            }
        }

        let results = block_on(
            self.client
                .alter_configs([&alter], &self.options(validate_only)),
        )
        .map_err(|e| Error::from_kafka("alter config", topic, e))?;

        for result in results {
            result.map_err(|(_, code)| Error::from_code("alter config", topic, code))?;
        }
        Ok(())
    }

    fn delete_topic(&self, topic: &str) -> Result<()> {
        let results = block_on(self.client.delete_topics(&[topic], &self.options(false)))
            .map_err(|e| Error::from_kafka("delete topic", topic, e))?;

        for result in results {
            result.map_err(|(name, code)| Error::from_code("delete topic", &name, code))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_overrides_skips_failed_topics() {
        let mut topics: BTreeMap<String, TopicDetail> = ["orders", "secret"]
            .into_iter()
            .map(|n| (n.to_string(), TopicDetail::new(3, 2)))
            .collect();
        let described = vec![
            (
                "orders".to_string(),
                Ok(vec![
                    ConfigEntry::dynamic("retention.ms", "60000"),
                    ConfigEntry::default_value("cleanup.policy", "delete"),
                ]),
            ),
            (
                "secret".to_string(),
                Err(Error::Authorization {
                    message: "describe config secret: denied".into(),
                }),
            ),
        ];

        fill_overrides(&mut topics, described);

        assert_eq!(topics["orders"].config.len(), 1);
        assert_eq!(topics["orders"].config["retention.ms"], "60000");
        assert!(topics["secret"].config.is_empty());
        assert_eq!(topics["secret"].num_partitions, 3);
    }
}
