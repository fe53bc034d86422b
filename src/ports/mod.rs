//! Port traits: the boundaries between the core and its collaborators.

pub mod config_port;
pub mod data_port;
pub mod model_port;
pub mod notify_port;
pub mod report_port;
