//! Desired-state building.
//!
//! Turns raw records into the [`DesiredState`] map. Bad records are
//! dropped with a reason instead of failing the whole build, and later
//! records for the same name replace earlier ones wholesale.

use crate::record::{ConfigRecord, KEY_NAME, KEY_PARTITIONS, KEY_REPLICATION, scalar_text};
use crate::types::{DesiredState, DropReason, DroppedRecord, TopicState};
use kafkakit::{ConfigMap, ConfigValue};
use serde::Serialize;
use serde_yaml::Value;

/// Diagnostics gathered while building the desired state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    /// Names of accepted records, in input order (repeats included)
    pub entries: Vec<String>,
    /// Records that were dropped
    pub dropped: Vec<DroppedRecord>,
    /// Names declared more than once; the last declaration won
    pub duplicates: Vec<String>,
    /// Records with no topic fields at all
    pub empty: usize,
}

/// Result of building: the desired state and its diagnostics.
#[derive(Debug, Clone, Default)]
pub struct Build {
    /// Declared topics
    pub desired: DesiredState,
    /// What was dropped or overwritten
    pub report: BuildReport,
}

/// Build the desired state from records in order.
pub fn build(records: impl IntoIterator<Item = ConfigRecord>) -> Build {
    let mut out = Build::default();

    for record in records {
        if record.is_empty() {
            out.report.empty += 1;
            continue;
        }

        match to_topic(&record) {
            Ok(topic) => {
                out.report.entries.push(topic.name.clone());
                if let Some(previous) = out.desired.insert(topic.name.clone(), topic) {
                    log::warn!("{}: overrides earlier declaration of {}", record.origin, previous.name);
                    if !out.report.duplicates.contains(&previous.name) {
                        out.report.duplicates.push(previous.name);
                    }
                }
            }
            Err(reason) => {
                let dropped = DroppedRecord {
                    origin: record.origin.clone(),
                    name: record.name(),
                    reason,
                };
                log::warn!("Dropping {dropped}");
                out.report.dropped.push(dropped);
            }
        }
    }

    out
}

fn to_topic(record: &ConfigRecord) -> Result<TopicState, DropReason> {
    for (key, value) in &record.topic {
        if matches!(value, Value::Sequence(_) | Value::Mapping(_)) {
            return Err(DropReason::InvalidTopicField(key.clone()));
        }
    }

    let partitions = field(record, KEY_PARTITIONS);
    let partitions = parse_int(&partitions, 32)
        .and_then(|n| i32::try_from(n).ok())
        .ok_or(DropReason::InvalidPartitions(partitions))?;

    let replication = field(record, KEY_REPLICATION);
    let replication = parse_int(&replication, 16)
        .and_then(|n| i16::try_from(n).ok())
        .ok_or(DropReason::InvalidReplication(replication))?;

    let name = field(record, KEY_NAME);
    if name.is_empty() {
        return Err(DropReason::MissingName);
    }

    let mut config = ConfigMap::new();
    for (key, value) in &record.config {
        let value = match value {
            Value::Null => ConfigValue::Reset,
            other => scalar_text(other)
                .map(ConfigValue::Set)
                .ok_or_else(|| DropReason::InvalidConfigValue(key.clone()))?,
        };
        config.insert(key.clone(), value);
    }

    Ok(TopicState {
        name,
        num_partitions: (partitions > 0).then_some(partitions),
        replication_factor: (replication > 0).then_some(replication),
        config,
    })
}

// Missing, null and empty fields all read as "0" for the counts.
fn field(record: &ConfigRecord, key: &str) -> String {
    let text = record.topic.get(key).and_then(scalar_text).unwrap_or_default();
    if text.is_empty() && key != KEY_NAME {
        "0".to_string()
    } else {
        text
    }
}

/// Parse a signed integer with base detection and a bit-size limit.
///
/// Accepts an optional sign, then `0x`/`0X` (hex), `0o`/`0O` (octal),
/// `0b`/`0B` (binary), a leading `0` (octal) or plain decimal.
/// Underscores may separate digits, and may follow a base prefix.
pub fn parse_int(text: &str, bits: u32) -> Option<i64> {
    let (negative, unsigned) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    if !underscores_ok(unsigned) {
        return None;
    }

    let lower = unsigned.to_ascii_lowercase();
    let (radix, digits) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, &lower[1..])
    } else {
        (10, lower.as_str())
    };

    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let magnitude = i128::from_str_radix(&cleaned, radix).ok()?;
    let value = if negative { -magnitude } else { magnitude };

    let max = (1i128 << (bits - 1)) - 1;
    let min = -(1i128 << (bits - 1));
    if value < min || value > max {
        return None;
    }
    i64::try_from(value).ok()
}

/// Every underscore must sit between two digits, where a `0x`/`0o`/`0b`
/// prefix counts as a digit.
fn underscores_ok(unsigned: &str) -> bool {
    #[derive(PartialEq)]
    enum Seen {
        Start,
        Digit,
        Underscore,
        Other,
    }

    let bytes = unsigned.as_bytes();
    let mut seen = Seen::Start;
    let mut hex = false;
    let mut i = 0;
    if let [b'0', prefix, ..] = bytes
        && matches!(prefix.to_ascii_lowercase(), b'b' | b'o' | b'x')
    {
        hex = prefix.to_ascii_lowercase() == b'x';
        seen = Seen::Digit;
        i = 2;
    }

    for &b in &bytes[i..] {
        if b.is_ascii_digit() || (hex && b.is_ascii_hexdigit()) {
            seen = Seen::Digit;
        } else if b == b'_' {
            if seen != Seen::Digit {
                return false;
            }
            seen = Seen::Underscore;
        } else if seen == Seen::Underscore {
            return false;
        } else {
            seen = Seen::Other;
        }
    }
    seen != Seen::Underscore
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::parse_str;

    fn build_yaml(yaml: &str) -> Build {
        let (records, failure) = parse_str(yaml, "test.yaml");
        assert!(failure.is_none(), "{failure:?}");
        build(records)
    }

    #[test]
    fn test_parse_int_bases() {
        assert_eq!(parse_int("12", 32), Some(12));
        assert_eq!(parse_int("0x10", 32), Some(16));
        assert_eq!(parse_int("0o17", 32), Some(15));
        assert_eq!(parse_int("0b101", 32), Some(5));
        assert_eq!(parse_int("010", 32), Some(8));
        assert_eq!(parse_int("0", 32), Some(0));
        assert_eq!(parse_int("-3", 32), Some(-3));
        assert_eq!(parse_int("+7", 32), Some(7));
        assert_eq!(parse_int("0x1_0", 32), Some(16));
    }

    #[test]
    fn test_parse_int_underscores() {
        assert_eq!(parse_int("1_000", 32), Some(1000));
        assert_eq!(parse_int("0x_ff", 32), Some(255));
        assert_eq!(parse_int("0_10", 32), Some(8));
        assert_eq!(parse_int("-1_2", 32), Some(-12));
        assert_eq!(parse_int("_1", 32), None);
        assert_eq!(parse_int("1_", 32), None);
        assert_eq!(parse_int("1__0", 32), None);
        assert_eq!(parse_int("0x_", 32), None);
        assert_eq!(parse_int("_", 32), None);
    }

    #[test]
    fn test_parse_int_rejects() {
        assert_eq!(parse_int("", 32), None);
        assert_eq!(parse_int("three", 32), None);
        assert_eq!(parse_int("09", 32), None);
        assert_eq!(parse_int("1.5", 32), None);
        assert_eq!(parse_int("-", 32), None);
    }

    #[test]
    fn test_parse_int_range() {
        assert_eq!(parse_int("32767", 16), Some(32767));
        assert_eq!(parse_int("32768", 16), None);
        assert_eq!(parse_int("-32768", 16), Some(-32768));
        assert_eq!(parse_int("2147483648", 32), None);
    }

    #[test]
    fn test_build_topic() {
        let built = build_yaml(
            "topic:\n  name: orders\n  partitions: 3\n  replication: \"0x2\"\nconfig:\n  retention.ms: 86400000\n  compression.type: lz4\n  unclean.leader.election.enable: false\n  cleanup.policy: null\n",
        );

        let orders = &built.desired["orders"];
        assert_eq!(orders.num_partitions, Some(3));
        assert_eq!(orders.replication_factor, Some(2));
        assert_eq!(orders.config["retention.ms"], ConfigValue::from("86400000"));
        assert_eq!(orders.config["compression.type"], ConfigValue::from("lz4"));
        assert_eq!(
            orders.config["unclean.leader.election.enable"],
            ConfigValue::from("false")
        );
        assert!(orders.config["cleanup.policy"].is_reset());
        assert_eq!(built.report.entries, vec!["orders"]);
    }

    #[test]
    fn test_missing_and_non_positive_counts_are_unspecified() {
        let built = build_yaml(
            "topic:\n  name: a\n---\ntopic:\n  name: b\n  partitions: -1\n  replication: 0\n---\ntopic:\n  name: c\n  partitions: ''\n",
        );

        for name in ["a", "b", "c"] {
            let topic = &built.desired[name];
            assert_eq!(topic.num_partitions, None, "{name}");
            assert_eq!(topic.replication_factor, None, "{name}");
        }
    }

    #[test]
    fn test_empty_string_config_is_not_reset() {
        let built = build_yaml("topic:\n  name: a\nconfig:\n  message.format.version: ''\n");
        assert_eq!(
            built.desired["a"].config["message.format.version"],
            ConfigValue::Set(String::new())
        );
    }

    #[test]
    fn test_dropped_records() {
        let built = build_yaml(
            "topic:\n  partitions: 3\n---\ntopic:\n  name: big\n  replication: 40000\n---\ntopic:\n  name: words\n  partitions: three\n---\ntopic:\n  name: nested\nconfig:\n  retention.ms: [1, 2]\n---\ntopic:\n  name: ok\n",
        );

        assert_eq!(built.desired.keys().collect::<Vec<_>>(), vec!["ok"]);
        let reasons: Vec<_> = built.report.dropped.iter().map(|d| &d.reason).collect();
        assert_eq!(
            reasons,
            vec![
                &DropReason::MissingName,
                &DropReason::InvalidReplication("40000".into()),
                &DropReason::InvalidPartitions("three".into()),
                &DropReason::InvalidConfigValue("retention.ms".into()),
            ]
        );
        assert_eq!(built.report.dropped[1].name.as_deref(), Some("big"));
        assert_eq!(built.report.dropped[1].origin, "test.yaml#1");
    }

    #[test]
    fn test_empty_records_are_counted() {
        let built = build_yaml("config:\n  retention.ms: 1\n---\ntopic: {}\n---\ntopic:\n  name: a\n");
        assert_eq!(built.report.empty, 2);
        assert!(built.report.dropped.is_empty());
        assert_eq!(built.desired.len(), 1);
    }

    #[test]
    fn test_last_declaration_wins() {
        let built = build_yaml(
            "topic:\n  name: orders\n  partitions: 3\nconfig:\n  retention.ms: 1\n---\ntopic:\n  name: orders\nconfig:\n  cleanup.policy: compact\n",
        );

        let orders = &built.desired["orders"];
        assert_eq!(orders.num_partitions, None);
        assert!(!orders.config.contains_key("retention.ms"));
        assert_eq!(orders.config["cleanup.policy"], ConfigValue::from("compact"));
        assert_eq!(built.report.duplicates, vec!["orders"]);
        assert_eq!(built.report.entries, vec!["orders", "orders"]);
    }
}
