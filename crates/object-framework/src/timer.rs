//! # Timer Queue
//!
//! Deferred work owned by one object instance. A scheduled task does not run on
//! its own: when the delay elapses it is posted back to the instance mailbox as
//! [`ObjectRequest::Deferred`] and handled in turn like any other request.
//!
//! Timers hold only a weak mailbox sender, so a pending timer never keeps an
//! instance alive. Dropping the queue (instance teardown) aborts every timer.

use crate::entity::ObjectEntity;
use crate::message::ObjectRequest;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::debug;

pub struct TimerQueue<T: ObjectEntity> {
    mailbox: mpsc::WeakSender<ObjectRequest<T>>,
    tasks: JoinSet<()>,
}

impl<T: ObjectEntity> TimerQueue<T> {
    pub(crate) fn new(mailbox: mpsc::WeakSender<ObjectRequest<T>>) -> Self {
        Self {
            mailbox,
            tasks: JoinSet::new(),
        }
    }

    /// Delivers `task` to the instance after `delay`.
    pub fn schedule(&mut self, delay: Duration, task: T::Deferred) {
        self.reap();
        debug!(?delay, ?task, "Deferred task scheduled");
        let mailbox = self.mailbox.clone();
        self.tasks.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(sender) = mailbox.upgrade() {
                // The instance may have shut down in the meantime.
                let _ = sender.send(ObjectRequest::Deferred { task }).await;
            }
        });
    }

    /// Number of timers that have not fired yet.
    pub fn pending(&mut self) -> usize {
        self.reap();
        self.tasks.len()
    }

    /// Aborts every pending timer.
    pub fn cancel_all(&mut self) {
        if !self.tasks.is_empty() {
            debug!(pending = self.tasks.len(), "Cancelling deferred tasks");
        }
        self.tasks.abort_all();
    }

    fn reap(&mut self) {
        while self.tasks.try_join_next().is_some() {}
    }
}
