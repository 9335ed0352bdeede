//! External configuration store boundary: spec §6's `InputAdapters`,
//! `InputStreamDevices`, `ActiveMeasurements` tables, modeled as an
//! injected `ConfigurationSource` trait so tests can substitute an
//! in-memory source instead of a real persistent store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::model::MeasurementDescriptor;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputAdapterRow {
    pub id: u32,
    pub adapter_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputStreamDeviceRow {
    pub parent_id: u32,
    pub access_id: u16,
    pub acronym: String,
    pub name: String,
    pub id: u32,
}

#[async_trait]
pub trait ConfigurationSource: Send + Sync {
    async fn resolve_adapter_id(&self, adapter_name: &str) -> Result<Option<u32>, SourceError>;
    async fn devices_for_parent(&self, parent_id: u32) -> Result<Vec<InputStreamDeviceRow>, SourceError>;
    async fn measurements_for_device(&self, device_id: u32) -> Result<Vec<MeasurementDescriptor>, SourceError>;
}

/// Test/fixture double backing the three tables from spec §6 with plain
/// in-memory vectors. Also doubles as the standalone binary's
/// configuration source, loaded from a JSON fixture file.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct InMemoryConfigurationSource {
    pub adapters: Vec<InputAdapterRow>,
    pub devices: Vec<InputStreamDeviceRow>,
    pub measurements: Vec<(u32, MeasurementDescriptor)>,
}

impl InMemoryConfigurationSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load_json(path: &std::path::Path) -> Result<Self, SourceError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| SourceError::Unavailable(format!("reading '{}': {e}", path.display())))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| SourceError::Unavailable(format!("parsing '{}': {e}", path.display())))
    }
}

#[async_trait]
impl ConfigurationSource for InMemoryConfigurationSource {
    async fn resolve_adapter_id(&self, adapter_name: &str) -> Result<Option<u32>, SourceError> {
        Ok(self
            .adapters
            .iter()
            .find(|a| a.adapter_name.eq_ignore_ascii_case(adapter_name))
            .map(|a| a.id))
    }

    async fn devices_for_parent(&self, parent_id: u32) -> Result<Vec<InputStreamDeviceRow>, SourceError> {
        Ok(self
            .devices
            .iter()
            .filter(|d| d.parent_id == parent_id)
            .cloned()
            .collect())
    }

    async fn measurements_for_device(&self, device_id: u32) -> Result<Vec<MeasurementDescriptor>, SourceError> {
        Ok(self
            .measurements
            .iter()
            .filter(|(id, _)| *id == device_id)
            .map(|(_, d)| d.clone())
            .collect())
    }
}
