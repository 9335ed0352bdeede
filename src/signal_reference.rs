//! Component A — SignalReferenceCache.
//!
//! Signal-reference generation runs on every measurement on every frame,
//! potentially tens of thousands of times a second. This cache removes
//! string formatting from that hot path while still tracking configuration
//! changes that alter a device's signal counts (spec invariant 4).

use std::collections::HashMap;

use crate::model::{encode_indexed_signal_reference, encode_signal_reference, SignalKind};

/// A cached slot is either a single scalar string or a fixed-length array
/// whose entries synthesize lazily, one at a time, on first access.
enum Slot {
    Scalar(String),
    Indexed(Vec<Option<String>>),
}

pub struct SignalReferenceCache {
    adapter_name: String,
    slots: HashMap<SignalKind, Slot>,
}

impl SignalReferenceCache {
    pub fn new(adapter_name: impl Into<String>) -> Self {
        Self {
            adapter_name: adapter_name.into(),
            slots: HashMap::new(),
        }
    }

    /// Scalar lookup: synthesizes on first call, then returns the cached
    /// string on every subsequent call.
    pub fn get(&mut self, kind: SignalKind) -> &str {
        let needs_replace = !matches!(self.slots.get(&kind), Some(Slot::Scalar(_)));
        if needs_replace {
            let encoded = encode_signal_reference(&self.adapter_name, kind);
            self.slots.insert(kind, Slot::Scalar(encoded));
        }
        match self.slots.get(&kind).unwrap() {
            Slot::Scalar(s) => s.as_str(),
            Slot::Indexed(_) => unreachable!(),
        }
    }

    /// Indexed lookup: if a cached array of length `count` exists, returns
    /// the (lazily synthesized) string at `index`; if the cached length
    /// differs from `count`, the whole array is discarded and replaced.
    pub fn get_indexed(&mut self, kind: SignalKind, index: usize, count: usize) -> &str {
        let needs_replace = match self.slots.get(&kind) {
            Some(Slot::Indexed(v)) => v.len() != count,
            Some(Slot::Scalar(_)) => true,
            None => true,
        };
        if needs_replace {
            self.slots.insert(kind, Slot::Indexed(vec![None; count]));
        }
        let adapter_name = &self.adapter_name;
        match self.slots.get_mut(&kind).unwrap() {
            Slot::Indexed(v) => {
                let slot = &mut v[index];
                if slot.is_none() {
                    *slot = Some(encode_indexed_signal_reference(adapter_name, kind, index + 1));
                }
                slot.as_deref().unwrap()
            }
            Slot::Scalar(_) => unreachable!(),
        }
    }

    /// Invalidates the cached array for `kind`, if any, forcing the next
    /// `get_indexed` call to resynthesize from scratch against the new
    /// count. Called when a configuration change is known to have altered
    /// a device's signal counts even before the first post-change access.
    pub fn invalidate(&mut self, kind: SignalKind) {
        self.slots.remove(&kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_is_stable_across_calls() {
        let mut cache = SignalReferenceCache::new("DEVICE");
        let a = cache.get(SignalKind::Frequency).to_string();
        let b = cache.get(SignalKind::Frequency).to_string();
        assert_eq!(a, b);
        assert_eq!(a, "DEVICE!IS-FQ");
    }

    #[test]
    fn indexed_entries_are_distinct_and_stable() {
        let mut cache = SignalReferenceCache::new("DEVICE");
        let refs: Vec<String> = (0..3)
            .map(|i| cache.get_indexed(SignalKind::Angle, i, 3).to_string())
            .collect();
        assert_eq!(refs, vec!["DEVICE!IS-PA1", "DEVICE!IS-PA2", "DEVICE!IS-PA3"]);

        // re-fetching with identical args is stable
        assert_eq!(cache.get_indexed(SignalKind::Angle, 1, 3), "DEVICE!IS-PA2");
    }

    #[test]
    fn count_mismatch_invalidates_whole_array() {
        let mut cache = SignalReferenceCache::new("DEVICE");
        let first = cache.get_indexed(SignalKind::Analog, 0, 2).to_string();
        assert_eq!(first, "DEVICE!IS-AV1");
        // device now reports 3 analogs; old 2-length array must be discarded
        let second = cache.get_indexed(SignalKind::Analog, 2, 3).to_string();
        assert_eq!(second, "DEVICE!IS-AV3");
        assert_eq!(cache.get_indexed(SignalKind::Analog, 0, 3), "DEVICE!IS-AV1");
    }
}
