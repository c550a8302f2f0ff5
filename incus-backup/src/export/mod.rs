pub mod pipeline;

pub use pipeline::{throughput_mb_per_sec, ExportMetrics, ExportOptions, ExportPipeline};
