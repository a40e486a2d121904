pub mod alert;
pub mod event;
pub mod fix;
pub mod geofence;

pub use alert::{Alert, AlertId, AlertKind};
pub use event::SystemEvent;
pub use fix::{Fix, FixQuality};
pub use geofence::{GeofenceConfig, GeofenceStatus};
