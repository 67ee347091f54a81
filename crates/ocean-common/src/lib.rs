//! Common types shared across the ocean-monitor services.

pub mod bbox;
pub mod error;
pub mod model;
pub mod region;

pub use bbox::BoundingBox;
pub use error::{OceanError, OceanResult};
pub use model::{IngestionRun, Measurement, RunStatus, Station};
pub use region::Region;
