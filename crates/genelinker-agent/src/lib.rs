//! genelinker-agent — session orchestration, preferences and report export
//! behind the `genelinker` binary.

pub mod notice;
pub mod prefs;
pub mod report;
pub mod session;

pub use notice::{Notice, NoticeLevel};
pub use prefs::PreferenceStore;
pub use report::AnalysisReport;
pub use session::{Delivery, InFlight, LatestSlot, RequestSequencer, ResearchSession, Ticket};
