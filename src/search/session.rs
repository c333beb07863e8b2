/// Search session
///
/// Owns the source tasks for one search, the channel they feed and the
/// merged result list. The session is the only writer of that list.

use crate::core::command_builder::compile;
use crate::core::{ResultEntry, SearchCommand, SearchRequest};
use crate::error::Result;
use crate::search::{
    spawn_source, CancellationToken, ResultMerger, SessionUpdate, SourceError, SourceEvent,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Final state of a session once it stops producing updates
#[derive(Debug)]
pub struct SearchOutcome {
    pub entries: Vec<ResultEntry>,
    pub errors: Vec<SourceError>,
    pub cancelled: bool,
}

pub struct SearchSession {
    id: u64,
    request: SearchRequest,
    token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
    events: mpsc::UnboundedReceiver<SourceEvent>,
    merger: ResultMerger,
    cancelled: bool,
}

impl SearchSession {
    /// Spawn one source task per command
    ///
    /// Must be called from inside a Tokio runtime.
    pub fn start(id: u64, request: SearchRequest, commands: Vec<SearchCommand>) -> Result<Self> {
        let filter = request
            .filter
            .as_deref()
            .map(|f| compile(f.trim()))
            .transpose()?;

        let merger = ResultMerger::new(
            commands.iter().map(|c| c.database),
            request.category,
            filter,
        );

        let token = CancellationToken::new();
        let (tx, events) = mpsc::unbounded_channel();

        info!(
            session = id,
            pattern = %request.pattern.trim(),
            sources = commands.len(),
            "search started"
        );

        let tasks = commands
            .into_iter()
            .map(|command| spawn_source(command, tx.clone(), token.clone()))
            .collect();

        Ok(Self {
            id,
            request,
            token,
            tasks,
            events,
            merger,
            cancelled: false,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn request(&self) -> &SearchRequest {
        &self.request
    }

    /// A handle that can cancel this session from elsewhere
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Entries delivered so far, in arrival order
    pub fn results(&self) -> &[ResultEntry] {
        self.merger.entries()
    }

    pub fn errors(&self) -> &[SourceError] {
        self.merger.errors()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled || self.token.is_cancelled()
    }

    /// All sources are done, or the session was cancelled
    pub fn is_complete(&self) -> bool {
        self.is_cancelled() || self.merger.is_complete()
    }

    /// Wait for the next visible change
    ///
    /// Returns `None` once every source has finished or the session has
    /// been cancelled. Nothing is delivered after cancellation.
    pub async fn next_update(&mut self) -> Option<SessionUpdate> {
        loop {
            if self.is_complete() {
                return None;
            }

            let event = tokio::select! {
                biased;
                _ = self.token.cancelled() => {
                    self.cancelled = true;
                    return None;
                }
                event = self.events.recv() => event,
            };

            match event {
                Some(event) => {
                    if let Some(update) = self.merger.push(event) {
                        return Some(update);
                    }
                }
                None => {
                    // every sender dropped without reporting back
                    warn!(session = self.id, "source tasks exited early");
                    self.merger.abandon();
                    return None;
                }
            }
        }
    }

    /// Stop both processes and discard anything still in flight
    ///
    /// Waits for every source task, so the processes are gone when this
    /// returns. Entries already delivered stay available.
    pub async fn cancel(&mut self) {
        if !self.cancelled {
            info!(
                session = self.id,
                delivered = self.merger.entries().len(),
                "search cancelled"
            );
        }

        self.cancelled = true;
        self.token.cancel();

        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                warn!(session = self.id, error = %e, "source task failed");
            }
        }

        self.events.close();
        while self.events.try_recv().is_ok() {}
    }

    /// Drive the session to the end and collect what it produced
    pub async fn finish(mut self) -> SearchOutcome {
        while self.next_update().await.is_some() {}

        if self.is_cancelled() {
            self.cancel().await;
        } else {
            for task in self.tasks.drain(..) {
                if let Err(e) = task.await {
                    warn!(session = self.id, error = %e, "source task failed");
                }
            }
        }

        let cancelled = self.is_cancelled();
        let (entries, errors) = self.merger.take();
        SearchOutcome {
            entries,
            errors,
            cancelled,
        }
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        // tasks notice and kill their processes; kill_on_drop covers the rest
        self.token.cancel();
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::core::{Category, CommandBuilder, DatabaseKind};
    use crate::error::LocateError;
    use crate::testing::fake_plocate;
    use std::time::{Duration, Instant};

    fn start(config: &crate::config::Config, request: SearchRequest) -> SearchSession {
        let commands = CommandBuilder::new(config).build(&request).unwrap();
        SearchSession::start(1, request, commands).unwrap()
    }

    fn both(pattern: &str) -> SearchRequest {
        SearchRequest::new(pattern).targets([DatabaseKind::System, DatabaseKind::Media])
    }

    #[tokio::test]
    async fn test_results_follow_arrival_order() {
        let (_dir, config) = fake_plocate(
            "sleep 0.5; echo /home/al/a.txt",
            "echo /run/media/usb/b.txt",
        );

        let outcome = start(&config, both("txt")).finish().await;

        assert!(!outcome.cancelled);
        assert!(outcome.errors.is_empty());
        let paths: Vec<_> = outcome.entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/run/media/usb/b.txt", "/home/al/a.txt"]);
        assert_eq!(outcome.entries[0].source, DatabaseKind::Media);
        assert_eq!(outcome.entries[1].source, DatabaseKind::System);
    }

    #[tokio::test]
    async fn test_failed_system_does_not_hide_media() {
        let (_dir, config) = fake_plocate(
            "echo 'plocate: system.db: No such file or directory' >&2; exit 1",
            "echo /run/media/usb/report.pdf",
        );

        let outcome = start(&config, both("report")).finish().await;

        assert_eq!(outcome.entries.len(), 1);
        assert_eq!(outcome.entries[0].source, DatabaseKind::Media);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].database, DatabaseKind::System);
        match outcome.errors[0].error.as_ref() {
            LocateError::ExitStatus { stderr, .. } => assert!(stderr.contains("No such file")),
            other => panic!("Expected ExitStatus error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_partial_results_kept_on_failure() {
        let (_dir, config) = fake_plocate("echo /etc/hosts; exit 3", "");

        let request = SearchRequest::new("hosts");
        let outcome = start(&config, request).finish().await;

        assert_eq!(outcome.entries.len(), 1);
        assert_eq!(outcome.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_no_match_exit_is_not_an_error() {
        let (_dir, config) = fake_plocate("exit 1", "exit 1");

        let outcome = start(&config, both("nothing-here")).finish().await;

        assert!(outcome.entries.is_empty());
        assert!(outcome.errors.is_empty());
    }

    #[tokio::test]
    async fn test_missing_tool_reported_per_database() {
        let (dir, mut config) = fake_plocate("", "");
        config.search_tool = dir.path().join("not-installed");

        let outcome = start(&config, both("x")).finish().await;

        assert_eq!(outcome.errors.len(), 2);
        let databases: Vec<_> = outcome.errors.iter().map(|e| e.database).collect();
        assert!(databases.contains(&DatabaseKind::System));
        assert!(databases.contains(&DatabaseKind::Media));
        assert!(outcome
            .errors
            .iter()
            .all(|e| matches!(e.error.as_ref(), LocateError::Spawn { .. })));
    }

    #[tokio::test]
    async fn test_category_and_filter_hide_lines() {
        let (_dir, config) = fake_plocate(
            "echo /home/al/Pictures/cat.png; echo /home/al/Pictures/list.txt; echo /tmp/dog.png",
            "",
        );

        let request = SearchRequest::new("a")
            .category(Some(Category::Images))
            .filter(Some("Pictures".to_string()));
        let outcome = start(&config, request).finish().await;

        assert_eq!(outcome.entries.len(), 1);
        assert_eq!(outcome.entries[0].path, "/home/al/Pictures/cat.png");
    }

    #[tokio::test]
    async fn test_cancel_stops_both_processes() {
        let (dir, config) = fake_plocate(
            r#"echo $$ > "$(dirname "$0")/system.pid"; echo /first/system; exec sleep 10"#,
            r#"echo $$ > "$(dirname "$0")/media.pid"; echo /first/media; exec sleep 10"#,
        );

        let mut session = start(&config, both("first"));

        match tokio::time::timeout(Duration::from_secs(5), session.next_update()).await {
            Ok(Some(SessionUpdate::Entry(_))) => {}
            other => panic!("Expected a first entry, got {:?}", other),
        }

        let started = Instant::now();
        session.cancel().await;
        assert!(started.elapsed() < Duration::from_secs(5));

        assert!(session.is_cancelled());
        assert!(session.next_update().await.is_none());
        let delivered = session.results().len();
        assert!((1..=2).contains(&delivered));

        #[cfg(target_os = "linux")]
        for name in ["system.pid", "media.pid"] {
            let pid = std::fs::read_to_string(dir.path().join(name))
                .ok()
                .and_then(|raw| raw.trim().parse::<u32>().ok());
            if let Some(pid) = pid {
                assert!(
                    !std::path::Path::new(&format!("/proc/{}", pid)).exists(),
                    "process {} from {} still running",
                    pid,
                    name
                );
            }
        }

        let outcome = session.finish().await;
        assert!(outcome.cancelled);
        assert_eq!(outcome.entries.len(), delivered);
        drop(dir);
    }

    #[tokio::test]
    async fn test_external_token_cancels_session() {
        let (_dir, config) = fake_plocate("exec sleep 10", "exec sleep 10");
        let mut session = start(&config, both("x"));
        let token = session.cancellation_token();

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        });

        let update = tokio::time::timeout(Duration::from_secs(5), session.next_update())
            .await
            .expect("cancellation should wake the session");
        assert!(update.is_none());
        canceller.await.unwrap();

        let outcome = tokio::time::timeout(Duration::from_secs(5), session.finish())
            .await
            .unwrap();
        assert!(outcome.cancelled);
        assert!(outcome.entries.is_empty());
    }
}
