pub mod outcome;
pub mod video;

pub use outcome::{PageInfo, ScrapeOutcome};
pub use video::VideoRecord;
