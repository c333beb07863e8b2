/// Concurrent search across the system and media databases
///
/// One task per database feeds a single channel; the session merges what
/// arrives and the controller makes sure only one session runs at a time.

pub mod cancel;
pub mod controller;
pub mod merger;
pub mod session;
pub mod source;

pub use cancel::CancellationToken;
pub use controller::SearchController;
pub use merger::{ResultMerger, SessionUpdate, SourceError};
pub use session::{SearchOutcome, SearchSession};
pub use source::{spawn_source, SourceEvent};
