use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::InstanceListing;
use crate::incus::IncusClient;

pub struct InstanceDiscovery {
    client: Arc<IncusClient>,
    listing: InstanceListing,
}

impl InstanceDiscovery {
    pub fn new(client: Arc<IncusClient>, listing: InstanceListing) -> Self {
        Self { client, listing }
    }

    /// Sorted, deduplicated instance names; empty when the query fails
    pub async fn discover(&self) -> Vec<String> {
        let names = match self.listing {
            InstanceListing::Json => match self.client.list_instances().await {
                Ok(records) => Some(dedup(records.into_iter().map(|r| r.name))),
                Err(e) => {
                    warn!("Structured instance listing failed, falling back to table: {}", e);
                    None
                }
            },
            InstanceListing::Table => None,
        };

        let names = match names {
            Some(names) => names,
            None => match self.client.list_instances_table().await {
                Ok(output) => parse_instance_table(&output),
                Err(e) => {
                    error!("Error running '{} list': {}", self.client.binary(), e);
                    return Vec::new();
                }
            },
        };

        info!("Total instances found: {:?}", names);
        names
    }
}

/// Extract instance names from the human-readable `incus list` table.
///
/// Data rows start with `|`; the first field after the leading delimiter is
/// the name. Header (`NAME`) and empty fields are skipped, as are border
/// lines.
pub fn parse_instance_table(output: &str) -> Vec<String> {
    let names = output.lines().filter_map(|line| {
        let line = line.trim();
        if !line.starts_with('|') {
            return None;
        }
        let name = line.split('|').nth(1)?.trim();
        if name.is_empty() || name == "NAME" {
            return None;
        }
        debug!("Found instance name: {}", name);
        Some(name.to_string())
    });

    dedup(names)
}

fn dedup(names: impl IntoIterator<Item = String>) -> Vec<String> {
    names
        .into_iter()
        .filter(|n| !n.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
