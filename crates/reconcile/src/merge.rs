//! Config merging for full-overwrite alter calls.
//!
//! An alter replaces a topic's whole configuration, so the submitted map
//! has to say something about every live override: keep it (lenient) or
//! reset it (strict). Declared keys always win; default and read-only
//! keys are never echoed back.

use kafkakit::{ConfigEntry, ConfigMap, ConfigValue};

/// Compute the map to submit for a topic.
///
/// `live` is `None` for topics that do not exist yet; the desired map is
/// then submitted as is.
pub fn merge_config(
    topic: &str,
    desired: &ConfigMap,
    live: Option<&[ConfigEntry]>,
    strict: bool,
) -> ConfigMap {
    let mut merged = desired.clone();
    let Some(live) = live else {
        return merged;
    };

    for entry in live {
        if !entry.is_override() || desired.contains_key(&entry.name) {
            continue;
        }

        log::info!("Property {} is not declared for {topic}", entry.name);

        if strict {
            log::info!("Property {} of {topic} will be reset", entry.name);
            merged.insert(entry.name.clone(), ConfigValue::Reset);
        } else if let Some(value) = &entry.value {
            merged.insert(entry.name.clone(), ConfigValue::Set(value.clone()));
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desired(pairs: &[(&str, Option<&str>)]) -> ConfigMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), ConfigValue::from(v.map(str::to_string))))
            .collect()
    }

    fn live() -> Vec<ConfigEntry> {
        vec![
            ConfigEntry::dynamic("max.message.bytes", "2000000"),
            ConfigEntry::dynamic("retention.ms", "60000"),
            ConfigEntry::default_value("cleanup.policy", "delete"),
            ConfigEntry::read_only("segment.bytes", "1073741824"),
        ]
    }

    #[test]
    fn test_absent_topic_submits_desired_map() {
        let want = desired(&[("retention.ms", Some("1000")), ("cleanup.policy", None)]);
        assert_eq!(merge_config("t", &want, None, true), want);
        assert_eq!(merge_config("t", &want, None, false), want);
    }

    #[test]
    fn test_lenient_carries_live_overrides_forward() {
        let want = desired(&[("retention.ms", Some("86400000"))]);
        let merged = merge_config("t", &want, Some(live().as_slice()), false);

        assert_eq!(
            merged,
            desired(&[
                ("max.message.bytes", Some("2000000")),
                ("retention.ms", Some("86400000")),
            ])
        );
    }

    #[test]
    fn test_strict_resets_undeclared_overrides() {
        let want = desired(&[("retention.ms", Some("86400000"))]);
        let merged = merge_config("t", &want, Some(live().as_slice()), true);

        assert_eq!(
            merged,
            desired(&[("max.message.bytes", None), ("retention.ms", Some("86400000"))])
        );
    }

    #[test]
    fn test_default_and_read_only_never_echoed() {
        for strict in [false, true] {
            let merged = merge_config("t", &ConfigMap::new(), Some(live().as_slice()), strict);
            assert!(!merged.contains_key("cleanup.policy"));
            assert!(!merged.contains_key("segment.bytes"));
        }
    }

    #[test]
    fn test_declared_keys_pass_through_unchanged() {
        let want = desired(&[
            ("max.message.bytes", None),
            ("retention.ms", Some("")),
            ("cleanup.policy", Some("compact")),
        ]);
        for strict in [false, true] {
            let merged = merge_config("t", &want, Some(live().as_slice()), strict);
            assert_eq!(merged, want);
        }
    }

    #[test]
    fn test_lenient_skips_overrides_without_value() {
        let mut entries = live();
        entries.push(ConfigEntry {
            value: None,
            is_sensitive: true,
            ..ConfigEntry::dynamic("sasl.secret", "")
        });

        let merged = merge_config("t", &ConfigMap::new(), Some(entries.as_slice()), false);
        assert!(!merged.contains_key("sasl.secret"));

        let merged = merge_config("t", &ConfigMap::new(), Some(entries.as_slice()), true);
        assert_eq!(merged["sasl.secret"], ConfigValue::Reset);
    }

    #[test]
    fn test_lenient_merge_is_idempotent() {
        let want = desired(&[("retention.ms", Some("86400000"))]);
        let first = merge_config("t", &want, Some(live().as_slice()), false);

        // Live state after the first alter: every submitted key is an override.
        let after: Vec<ConfigEntry> = first
            .iter()
            .filter_map(|(k, v)| v.as_set().map(|v| ConfigEntry::dynamic(k.as_str(), v)))
            .chain([
                ConfigEntry::default_value("cleanup.policy", "delete"),
                ConfigEntry::read_only("segment.bytes", "1073741824"),
            ])
            .collect();
        let second = merge_config("t", &want, Some(after.as_slice()), false);

        assert_eq!(first, second);
    }
}
