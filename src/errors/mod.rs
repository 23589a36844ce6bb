pub mod types;
pub mod classification;

pub use types::DashboardError;
pub use classification::ErrorClassification;
