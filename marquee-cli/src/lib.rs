//! Shared plumbing for the `marquee` and `sab-postprocess` binaries.

pub mod logging;
pub mod postprocess;
pub mod remote;

pub use postprocess::{NO_FOLDER_MESSAGE, PostProcessRequest};
pub use remote::{OfflineProvider, build_cache};
