//! Component B — DeviceTable, plus the UndefinedDeviceCounter from spec §3.
//!
//! Primary map `idCode -> DeviceRecord`. If two distinct records collide on
//! `idCode` during load, a secondary label map is created and every
//! subsequent colliding entry goes there instead — concentrators routinely
//! reuse idCode 1 for every child device, so the label is the only
//! disambiguator (spec §4.B rationale).

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;

use crate::error::SourceError;
use crate::model::DeviceRecord;

#[derive(Default)]
pub struct DeviceTable {
    by_id: HashMap<u16, DeviceRecord>,
    by_label: HashMap<String, DeviceRecord>,
    uses_label_table: bool,
}

impl DeviceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads devices in the order given. On an `idCode` collision the
    /// losing pair's member is moved into the label table (case-
    /// insensitive key); a device is rejected if it collides in *both*
    /// tables at once.
    pub fn load(devices: Vec<DeviceRecord>) -> Result<Self, Vec<SourceError>> {
        let mut table = Self::new();
        let mut errors = Vec::new();
        for device in devices {
            if let Err(e) = table.insert(device) {
                errors.push(e);
            }
        }
        if errors.is_empty() {
            Ok(table)
        } else if table.by_id.is_empty() && table.by_label.is_empty() {
            Err(errors)
        } else {
            // Partial load: still usable, but surface what was dropped.
            for e in &errors {
                log::error!("device table load error: {e}");
            }
            Ok(table)
        }
    }

    fn insert(&mut self, device: DeviceRecord) -> Result<(), SourceError> {
        let label_key = device.label.to_ascii_lowercase();
        let id_collision = self.by_id.contains_key(&device.id_code);
        let label_collision = self.by_label.contains_key(&label_key);

        if id_collision && label_collision {
            return Err(SourceError::DuplicateDevice {
                id_code: device.id_code,
                label: device.label,
            });
        }

        if id_collision {
            self.uses_label_table = true;
            // The device already holding this idCode also needs to move
            // into the label table, or it stops being reachable by idCode
            // for the duplicate check above without ever gaining a label
            // entry of its own.
            if let Some(incumbent) = self.by_id.remove(&device.id_code) {
                self.by_label.insert(incumbent.label.to_ascii_lowercase(), incumbent);
            }
            self.by_label.insert(label_key, device);
        } else {
            self.by_id.insert(device.id_code, device);
        }
        Ok(())
    }

    /// Resolution order per spec §4.B: label table first (if it exists),
    /// then idCode, then undefined.
    pub fn resolve(&self, id_code: u16, station_name: &str) -> Option<&DeviceRecord> {
        if self.uses_label_table {
            if let Some(d) = self.by_label.get(&station_name.to_ascii_lowercase()) {
                return Some(d);
            }
        }
        self.by_id.get(&id_code)
    }

    /// Resets every device's counters in place. Counters are atomics, so
    /// this needs only a shared reference (spec §5: counters mutate
    /// without locking the table structure).
    pub fn reset_statistics(&self) {
        for d in self.by_id.values() {
            d.reset_statistics();
        }
        for d in self.by_label.values() {
            d.reset_statistics();
        }
    }

    pub fn reset_device_statistics(&self, id_code: u16) {
        if let Some(d) = self.by_id.get(&id_code) {
            d.reset_statistics();
        }
        for d in self.by_label.values() {
            if d.id_code == id_code {
                d.reset_statistics();
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.by_id.values().chain(self.by_label.values())
    }

    pub fn len(&self) -> usize {
        self.by_id.len() + self.by_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `stationName -> frameCount` for devices observed in the stream but
/// absent from the `DeviceTable`. Append-only with counter increment;
/// shared across the mapper's event pipeline, so backed by a sharded
/// concurrent map rather than a single global mutex.
#[derive(Default)]
pub struct UndefinedDeviceCounter {
    counts: Arc<DashMap<String, u64>>,
}

impl UndefinedDeviceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a sighting, returning `true` if this is the first sighting
    /// of `station_name` (caller should log a warning only on `true`).
    pub fn record(&self, station_name: &str) -> bool {
        let mut first = false;
        self.counts
            .entry(station_name.to_string())
            .and_modify(|c| *c += 1)
            .or_insert_with(|| {
                first = true;
                1
            });
        first
    }

    pub fn count(&self, station_name: &str) -> u64 {
        self.counts.get(station_name).map(|r| *r).unwrap_or(0)
    }

    /// Grand total across every undefined station name seen so far, for
    /// status reporting. Not on the hot path, so a full scan is fine.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|r| *r.value()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dev(id: u16, label: &str) -> DeviceRecord {
        DeviceRecord::new(id, label.to_string(), format!("Station {label}"), 0)
    }

    #[test]
    fn resolves_by_id_when_no_collision() {
        let table = DeviceTable::load(vec![dev(7, "D7")]).unwrap();
        // Wire frames identify a cell by the device's label, e.g. "D7".
        assert!(table.resolve(7, "D7").is_some());
        assert!(table.resolve(8, "D7").is_none());
    }

    #[test]
    fn id_collision_routes_colliding_device_to_label_table() {
        let table = DeviceTable::load(vec![dev(1, "A"), dev(1, "B")]).unwrap();
        let a = table.resolve(1, "A").unwrap();
        let b = table.resolve(1, "B").unwrap();
        assert_eq!(a.label, "A");
        assert_eq!(b.label, "B");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn non_colliding_device_stays_in_id_table_after_an_unrelated_collision() {
        let table = DeviceTable::load(vec![dev(1, "A"), dev(1, "B"), dev(2, "C")]).unwrap();
        // idCode 2 never collided, so it must still resolve by id alone,
        // without needing its label passed in.
        assert!(table.resolve(2, "anything").is_some());
        assert_eq!(table.resolve(2, "anything").unwrap().label, "C");
    }

    #[test]
    fn later_collision_on_a_previously_unique_id_is_still_detected() {
        let table = DeviceTable::load(vec![dev(1, "A"), dev(1, "B"), dev(2, "C"), dev(2, "D")]).unwrap();
        let c = table.resolve(2, "C").unwrap();
        let d = table.resolve(2, "D").unwrap();
        assert_eq!(c.label, "C");
        assert_eq!(d.label, "D");
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn undefined_device_counter_increments() {
        let counter = UndefinedDeviceCounter::new();
        assert!(counter.record("GHOST"));
        assert!(!counter.record("GHOST"));
        assert_eq!(counter.count("GHOST"), 2);
    }
}
