//! Per-device topic helpers on top of `rumqttc`'s filter matching.

/// The device id of a per-device topic such as `factory/<id>/vibration`:
/// the level matched by the first `+` of `filter`.
///
/// `None` when the topic does not match, the filter has no `+`, or the
/// matched level is empty.
///
/// ```
/// use api::messaging::topic::device_id;
///
/// assert_eq!(
///     device_id("factory/+/vibration", "factory/press-04/vibration"),
///     Some("press-04")
/// );
/// assert_eq!(device_id("factory/+/vibration", "factory/press-04/status"), None);
/// ```
pub fn device_id<'t>(filter: &str, topic: &'t str) -> Option<&'t str> {
    if !rumqttc::matches(topic, filter) {
        return None;
    }

    let level = filter.split('/').position(|level| level == "+")?;
    topic.split('/').nth(level).filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_device_id() {
        assert_eq!(
            device_id("factory/+/status", "factory/esp32-07/status"),
            Some("esp32-07")
        );
        assert_eq!(device_id("+/+/status", "factory/esp32-07/status"), Some("factory"));
    }

    #[test]
    fn rejects_non_matching_topics() {
        assert_eq!(device_id("factory/+/status", "factory/esp32-07/vibration"), None);
        assert_eq!(device_id("factory/+/status", "factory/line/esp32-07/status"), None);
        assert_eq!(device_id("factory/+/status", "$SYS/esp32-07/status"), None);
    }

    #[test]
    fn empty_or_missing_level_has_no_id() {
        assert_eq!(device_id("factory/+/status", "factory//status"), None);
        assert_eq!(device_id("factory/#", "factory/esp32-07/status"), None);
    }
}
