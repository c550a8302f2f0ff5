//! Inventory of what a run has to back up
//!
//! Both discoveries degrade instead of failing: an unreachable control plane
//! yields an empty inventory and an error in the log, and the orchestrator
//! decides what an empty inventory means for the run.

pub mod instances;
pub mod volumes;

pub use instances::{parse_instance_table, InstanceDiscovery};
pub use volumes::{instance_from_reference, map_block_volumes, VolumeDiscovery, VolumeMap};
