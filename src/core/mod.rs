/// Core search model
///
/// Requests, categories, result entries and the command builder that
/// turns a request into plocate invocations.

pub mod category;
pub mod command_builder;
pub mod entry;
pub mod request;

pub use category::Category;
pub use command_builder::{CommandBuilder, SearchCommand};
pub use entry::{sort_entries, ResultEntry, SortColumn};
pub use request::{DatabaseKind, SearchRequest};
