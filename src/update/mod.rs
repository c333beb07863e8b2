/// Database maintenance
///
/// Runs updatedb for the system and removable-media databases.

pub mod updater;

pub use updater::{UpdateCommand, UpdateReport, Updater};
