//! Component C — MeasurementCatalog.
//!
//! Loaded once from the external configuration source, filtered by
//! `deviceID = sharedMappingID` (spec §6). Absent entries are a silent
//! drop, not an error: not every wire signal is subscribed downstream.

use std::collections::HashMap;

use crate::model::MeasurementDescriptor;

#[derive(Default)]
pub struct MeasurementCatalog {
    by_signal_reference: HashMap<String, MeasurementDescriptor>,
}

impl MeasurementCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(descriptors: Vec<MeasurementDescriptor>) -> Self {
        let mut catalog = Self::new();
        for d in descriptors {
            catalog.by_signal_reference.insert(d.signal_reference.clone(), d);
        }
        catalog
    }

    pub fn get(&self, signal_reference: &str) -> Option<&MeasurementDescriptor> {
        self.by_signal_reference.get(signal_reference)
    }

    pub fn len(&self) -> usize {
        self.by_signal_reference.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_signal_reference.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MeasurementKey;
    use uuid::Uuid;

    #[test]
    fn unmapped_reference_returns_none() {
        let catalog = MeasurementCatalog::new();
        assert!(catalog.get("DEVICE!IS-FQ").is_none());
    }

    #[test]
    fn mapped_reference_round_trips() {
        let descriptor = MeasurementDescriptor {
            signal_id: Uuid::new_v4(),
            key: MeasurementKey { source: "HIST".into(), id: 1 },
            signal_reference: "DEVICE!IS-FQ".into(),
            adder: 0.0,
            multiplier: 1.0,
        };
        let catalog = MeasurementCatalog::load(vec![descriptor]);
        assert!(catalog.get("DEVICE!IS-FQ").is_some());
        assert_eq!(catalog.len(), 1);
    }
}
