//! Port trait definitions
//!
//! These traits define the collaborators the tracking engine drives:
//! where raw positioning bytes come from, where alert text goes and where
//! fixes are forwarded.

pub mod notify;
pub mod source;
pub mod upload;

pub use notify::Notifier;
pub use source::PositionSource;
pub use upload::FixUploader;
