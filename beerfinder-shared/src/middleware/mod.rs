mod auth_extractor;
mod error_envelope;
mod json_body;
mod tracing_layer;
mod metrics_layer;

pub use auth_extractor::*;
pub use error_envelope::*;
pub use json_body::*;
pub use tracing_layer::*;
pub use metrics_layer::*;
