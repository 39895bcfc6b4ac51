// Core transcoding engine - independent of the CLI surface

pub mod encode;
pub mod job;
pub mod orchestrator;
pub mod policy;
pub mod probe;
pub mod scan;
pub mod validate;

pub use job::{EncodeJob, OUTPUT_EXTENSION};
pub use orchestrator::{Orchestrator, QUARANTINE_DIR, quarantine_source};
pub use policy::target_bitrate_kbps;
pub use probe::{ColorInfo, ProbeError, ProbeResult, ResolutionClass};
pub use scan::{is_video_file, relocate, scan, scan_streaming};
pub use validate::{RejectReason, ValidationOutcome};
