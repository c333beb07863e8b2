/// Search controller
///
/// Holds the one active session. A new search replaces it wholesale: the
/// old session is cancelled and dropped before anything new is spawned.

use crate::config::Config;
use crate::core::{CommandBuilder, SearchRequest};
use crate::error::Result;
use crate::search::{SearchOutcome, SearchSession};

pub struct SearchController {
    builder: CommandBuilder,
    session: Option<SearchSession>,
    next_id: u64,
}

impl SearchController {
    pub fn new(config: &Config) -> Self {
        Self {
            builder: CommandBuilder::new(config),
            session: None,
            next_id: 0,
        }
    }

    /// Start a search, cancelling whatever was running
    ///
    /// # Returns
    /// * `Ok(&mut SearchSession)` - The new active session
    /// * `Err(LocateError)` - Request was rejected; the current session keeps running
    pub async fn submit(&mut self, request: SearchRequest) -> Result<&mut SearchSession> {
        let commands = self.builder.build(&request)?;

        if let Some(mut previous) = self.session.take() {
            previous.cancel().await;
        }

        self.next_id += 1;
        let session = SearchSession::start(self.next_id, request, commands)?;
        Ok(self.session.insert(session))
    }

    /// Cancel and drop the active session, returning what it had delivered
    pub async fn cancel(&mut self) -> Option<SearchOutcome> {
        let mut session = self.session.take()?;
        session.cancel().await;
        Some(session.finish().await)
    }

    pub fn session(&self) -> Option<&SearchSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut SearchSession> {
        self.session.as_mut()
    }

    /// Drive the active session to completion and release it
    pub async fn finish(&mut self) -> Option<SearchOutcome> {
        let session = self.session.take()?;
        Some(session.finish().await)
    }
}
