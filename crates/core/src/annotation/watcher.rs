//! Rescans after the page changes.

use std::sync::Arc;

use log::{debug, info};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use super::controller::AnnotationController;
use super::debounce::Debouncer;
use super::span::ANNOTATION_CLASS;
use crate::document::{MutationBatch, MutationOrigin};
use crate::settings::ExtensionSettings;

/// A batch warrants a rescan when the page, not the annotator, added at
/// least one node that is not itself an annotation.
pub fn is_relevant(batch: &MutationBatch) -> bool {
    batch.records.iter().any(|record| {
        record.origin != MutationOrigin::Annotator
            && record
                .added
                .iter()
                .any(|node| !node.has_class(ANNOTATION_CLASS))
    })
}

/// Running watcher. Dropping the handle stops it.
pub struct WatcherHandle {
    task: JoinHandle<()>,
}

impl WatcherHandle {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl AnnotationController {
    /// Start watching the document and the settings.
    ///
    /// When annotating, the first scan runs after `initial_delay`. Relevant
    /// mutation batches then re-arm a trailing debounce of `debounce`.
    pub fn watch(self: &Arc<Self>) -> WatcherHandle {
        let controller = Arc::clone(self);
        let mutations = controller.lock_document().subscribe();
        let settings = controller.settings.subscribe();
        let task = tokio::spawn(async move {
            controller.run_watcher(mutations, settings).await;
        });
        WatcherHandle { task }
    }

    async fn run_watcher(
        &self,
        mut mutations: broadcast::Receiver<MutationBatch>,
        mut settings: watch::Receiver<ExtensionSettings>,
    ) {
        let mut debouncer = Debouncer::new(self.config.debounce);
        if self.settings.get().annotates() {
            debouncer.arm_at(Instant::now() + self.config.initial_delay);
        }
        info!("Annotation watcher started");

        loop {
            let deadline = debouncer.deadline();
            tokio::select! {
                received = mutations.recv() => match received {
                    Ok(batch) => {
                        if is_relevant(&batch) {
                            debouncer.touch(Instant::now());
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        debug!("Watcher lagged by {} batches; rescanning", skipped);
                        debouncer.touch(Instant::now());
                    }
                    Err(RecvError::Closed) => break,
                },
                changed = settings.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let current = settings.borrow_and_update().clone();
                    debouncer.cancel();
                    self.apply_settings(&current).await;
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if debouncer.fire(Instant::now()) {
                        self.scan().await;
                    }
                }
            }
        }
        info!("Annotation watcher stopped");
    }
}
