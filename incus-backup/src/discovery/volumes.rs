use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::incus::{IncusClient, StorageVolumeRecord};

/// Instance name → names of its attached custom block volumes
pub type VolumeMap = BTreeMap<String, Vec<String>>;

pub struct VolumeDiscovery {
    client: Arc<IncusClient>,
    storage_pool: String,
    project: String,
}

impl VolumeDiscovery {
    pub fn new(
        client: Arc<IncusClient>,
        storage_pool: impl Into<String>,
        project: impl Into<String>,
    ) -> Self {
        Self {
            client,
            storage_pool: storage_pool.into(),
            project: project.into(),
        }
    }

    /// Block volumes per instance; an empty map when the query fails
    pub async fn discover(&self) -> VolumeMap {
        let volumes = match self.client.list_storage_volumes(&self.storage_pool).await {
            Ok(volumes) => volumes,
            Err(e) => {
                error!(
                    "Failed to list storage volumes in pool '{}', exporting instances only: {}",
                    self.storage_pool, e
                );
                return VolumeMap::new();
            }
        };

        let map = map_block_volumes(&volumes, &self.project);
        info!(
            "Found block volumes for {} instances in pool '{}' (project '{}')",
            map.len(),
            self.storage_pool,
            self.project
        );
        map
    }
}

/// Keep custom block volumes of `project` and index them by instance
pub fn map_block_volumes(volumes: &[StorageVolumeRecord], project: &str) -> VolumeMap {
    let mut map = VolumeMap::new();

    for volume in volumes {
        if volume.project != project
            || volume.volume_type != "custom"
            || volume.content_type != "block"
        {
            continue;
        }

        for reference in volume.used_by.iter().flatten() {
            if let Some(instance) = instance_from_reference(reference) {
                debug!("Volume {} is used by instance {}", volume.name, instance);
                map.entry(instance.to_string())
                    .or_insert_with(Vec::new)
                    .push(volume.name.clone());
            }
        }
    }

    for names in map.values_mut() {
        names.sort();
        names.dedup();
    }

    map
}

/// Instance named by a `used_by` reference such as `/1.0/instances/web1`.
///
/// The segment after `instances` is the name; a query string
/// (`?project=...`) is dropped. References to anything else yield `None`.
pub fn instance_from_reference(reference: &str) -> Option<&str> {
    let path = reference.split('?').next().unwrap_or(reference);
    let mut segments = path.split('/');
    segments.find(|segment| *segment == "instances")?;
    segments.next().filter(|name| !name.is_empty())
}
