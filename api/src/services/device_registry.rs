use crate::models::telemetry::DeviceStatus;
use chrono::{DateTime, Utc};
use log::debug;
use std::{
    collections::HashMap,
    num::NonZeroUsize,
    sync::{Mutex, MutexGuard, PoisonError},
};

const REPORTING: &str = "reporting";

/// Presence information for sensor nodes, fed by accepted telemetry and
/// broker status messages.
///
/// Device ids come from clients, so the registry holds at most `capacity`
/// entries; admitting a new device past that evicts the least recently seen.
#[derive(Debug)]
pub struct DeviceRegistry {
    devices: Mutex<HashMap<String, DeviceStatus>>,
    capacity: NonZeroUsize,
}

impl DeviceRegistry {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            devices: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    /// Records a message published on a node's status topic.
    pub fn record_status(&self, device_id: &str, status: &str, at: DateTime<Utc>) {
        let mut devices = self.lock();
        self.make_room(&mut devices, device_id);
        devices.insert(
            device_id.to_string(),
            DeviceStatus {
                device_id: device_id.to_string(),
                status: status.to_string(),
                last_seen: at,
            },
        );
    }

    /// Refreshes `last_seen` after telemetry from a node, keeping its status.
    pub fn touch(&self, device_id: &str, at: DateTime<Utc>) {
        let mut devices = self.lock();
        self.make_room(&mut devices, device_id);
        devices
            .entry(device_id.to_string())
            .and_modify(|d| d.last_seen = d.last_seen.max(at))
            .or_insert_with(|| DeviceStatus {
                device_id: device_id.to_string(),
                status: REPORTING.to_string(),
                last_seen: at,
            });
    }

    /// All known nodes ordered by id.
    pub fn list(&self) -> Vec<DeviceStatus> {
        let devices = self.lock();
        let mut list: Vec<DeviceStatus> = devices.values().cloned().collect();
        list.sort_by(|a, b| a.device_id.cmp(&b.device_id));
        list
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Evicts the least recently seen device if `device_id` is new and the
    /// registry is full.
    fn make_room(&self, devices: &mut HashMap<String, DeviceStatus>, device_id: &str) {
        if devices.contains_key(device_id) || devices.len() < self.capacity.get() {
            return;
        }

        let oldest = devices
            .values()
            .min_by(|a, b| {
                a.last_seen
                    .cmp(&b.last_seen)
                    .then_with(|| a.device_id.cmp(&b.device_id))
            })
            .map(|d| d.device_id.clone());

        if let Some(oldest) = oldest {
            debug!("Device registry full, evicting {}", oldest);
            devices.remove(&oldest);
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, DeviceStatus>> {
        self.devices.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn registry(capacity: usize) -> DeviceRegistry {
        DeviceRegistry::new(NonZeroUsize::new(capacity).unwrap())
    }

    #[test]
    fn telemetry_registers_unknown_devices() {
        let registry = registry(8);
        registry.touch("node-b", at(10));
        registry.touch("node-a", at(20));

        let list = registry.list();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].device_id, "node-a");
        assert_eq!(list[0].status, "reporting");
        assert_eq!(list[1].last_seen, at(10));
    }

    #[test]
    fn status_is_kept_across_telemetry() {
        let registry = registry(8);
        registry.record_status("node-a", "online", at(10));
        registry.touch("node-a", at(30));
        registry.touch("node-a", at(20));

        let list = registry.list();
        assert_eq!(list[0].status, "online");
        assert_eq!(list[0].last_seen, at(30));
    }

    #[test]
    fn full_registry_evicts_least_recently_seen() {
        let registry = registry(3);
        registry.touch("node-a", at(10));
        registry.record_status("node-b", "online", at(5));
        registry.touch("node-c", at(30));
        registry.touch("node-a", at(40));

        registry.touch("node-d", at(50));

        let ids: Vec<String> = registry.list().into_iter().map(|d| d.device_id).collect();
        assert_eq!(ids, vec!["node-a", "node-c", "node-d"]);
    }

    #[test]
    fn known_devices_never_evict() {
        let registry = registry(2);
        registry.touch("node-a", at(10));
        registry.touch("node-b", at(20));
        registry.record_status("node-a", "online", at(30));
        registry.touch("node-b", at(40));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.list()[0].status, "online");
    }

    #[test]
    fn many_distinct_ids_stay_bounded() {
        let registry = registry(16);
        for i in 0..500 {
            registry.touch(&format!("node-{i}"), at(i));
        }

        assert_eq!(registry.len(), 16);
        assert!(registry.list().iter().all(|d| d.last_seen >= at(484)));
    }
}
