// Domain layer: document model and the ports loaders, splitters and sinks plug into.

pub mod model;
pub mod ports;
