//! In-memory runtime state: the status fabric, the slide-job progress
//! accounting, the avatar video job records, and the FIFO slide worker.

pub mod jobs;
pub mod status_store;
pub mod video_jobs;
pub mod worker;
