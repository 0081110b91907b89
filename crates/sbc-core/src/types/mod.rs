//! Validated value types.

mod api_version;
mod device_url;
mod element;
mod operation;
mod status;

pub use api_version::{ApiVersion, DEFAULT_API_VERSION};
pub use device_url::DeviceUrl;
pub use element::{ConfigElements, ElementType, KeyAttributes};
pub use operation::{OperationState, Stage, StageOutcome};
pub use status::{GlobalSessions, Role};
