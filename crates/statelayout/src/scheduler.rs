#![forbid(unsafe_code)]

//! UI-thread message loop.
//!
//! Everything that touches a [`StateLayout`](crate::StateLayout) has to run
//! on the UI thread. [`UiLoop`] is the single place messages come from:
//!
//! - `post` queues a message for the next drain,
//! - `post_at` / `post_delayed` schedule one for later and hand back a
//!   [`TaskHandle`] that can cancel it,
//! - `spawn` runs a job on a worker thread and marshals its result back
//!   through the loop's inbox.
//!
//! The loop belongs to a screen. [`UiLoop::shutdown`] (also run on drop)
//! discards every pending timer and cancels every worker's token, so nothing
//! scheduled by the screen can fire after the screen is gone.

use std::collections::VecDeque;
use std::fmt;
use std::sync::mpsc;
use std::thread;

use web_time::{Duration, Instant};

use crate::cancellation::{CancellationSource, CancellationToken};

/// Identifies a delayed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

struct Timer<M> {
    handle: TaskHandle,
    deadline: Instant,
    msg: M,
}

/// Message loop owned by one screen.
pub struct UiLoop<M> {
    ready: VecDeque<M>,
    timers: Vec<Timer<M>>,
    next_handle: u64,
    inbox_tx: mpsc::Sender<M>,
    inbox_rx: mpsc::Receiver<M>,
    lifetime: CancellationSource,
    shut_down: bool,
}

impl<M> UiLoop<M> {
    pub fn new() -> Self {
        let (inbox_tx, inbox_rx) = mpsc::channel();
        Self {
            ready: VecDeque::new(),
            timers: Vec::new(),
            next_handle: 0,
            inbox_tx,
            inbox_rx,
            lifetime: CancellationSource::new(),
            shut_down: false,
        }
    }

    /// Queue `msg` for the next drain.
    pub fn post(&mut self, msg: M) {
        if self.shut_down {
            return;
        }
        self.ready.push_back(msg);
    }

    /// Deliver `msg` once `deadline` has passed.
    pub fn post_at(&mut self, deadline: Instant, msg: M) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        if !self.shut_down {
            self.timers.push(Timer {
                handle,
                deadline,
                msg,
            });
            tracing::trace!(task = handle.0, "delayed message scheduled");
        }
        handle
    }

    /// Deliver `msg` after `delay` from now.
    pub fn post_delayed(&mut self, delay: Duration, msg: M) -> TaskHandle {
        self.post_at(Instant::now() + delay, msg)
    }

    /// Drop a delayed message. Returns `false` if it already fired or was
    /// cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.handle != handle);
        let removed = self.timers.len() != before;
        if removed {
            tracing::debug!(task = handle.0, "delayed message cancelled");
        }
        removed
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.iter().map(|timer| timer.deadline).min()
    }

    /// Token cancelled when this loop shuts down.
    pub fn token(&self) -> CancellationToken {
        self.lifetime.token()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Everything deliverable at `now`: queued messages, then worker
    /// results, then due timers in deadline order.
    pub fn drain_due(&mut self, now: Instant) -> Vec<M> {
        if self.shut_down {
            return Vec::new();
        }
        let mut out: Vec<M> = self.ready.drain(..).collect();
        out.extend(self.inbox_rx.try_iter());

        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.timers)
            .into_iter()
            .partition(|timer| timer.deadline <= now);
        self.timers = pending;
        due.sort_by_key(|timer| (timer.deadline, timer.handle.0));
        out.extend(due.into_iter().map(|timer| timer.msg));
        out
    }

    /// Block until a worker result arrives or `deadline` passes, whichever
    /// is first. A received result is queued for the next drain.
    pub fn wait_until(&mut self, deadline: Instant) {
        if self.shut_down || !self.ready.is_empty() {
            return;
        }
        let now = Instant::now();
        if deadline <= now {
            return;
        }
        if let Ok(msg) = self.inbox_rx.recv_timeout(deadline - now) {
            self.ready.push_back(msg);
        }
    }

    /// Cancel everything this loop scheduled.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.lifetime.cancel();
        let dropped_timers = self.timers.len();
        self.timers.clear();
        self.ready.clear();
        let dropped_results = self.inbox_rx.try_iter().count();
        tracing::debug!(dropped_timers, dropped_results, "ui loop shut down");
    }
}

impl<M: Send + 'static> UiLoop<M> {
    /// A handle worker threads can use to send messages to this loop.
    pub fn sender(&self) -> mpsc::Sender<M> {
        self.inbox_tx.clone()
    }

    /// Run `job` on a worker thread. Its result, if any, is delivered
    /// through the inbox unless the loop shut down in the meantime.
    ///
    /// The job receives the loop's token and should return early once it is
    /// cancelled.
    pub fn spawn<F>(&self, job: F) -> thread::JoinHandle<()>
    where
        F: FnOnce(CancellationToken) -> Option<M> + Send + 'static,
    {
        let token = self.lifetime.token();
        let tx = self.inbox_tx.clone();
        thread::spawn(move || {
            let result = job(token.clone());
            if token.is_cancelled() {
                return;
            }
            if let Some(msg) = result {
                // The loop may be gone; nothing to deliver to.
                let _ = tx.send(msg);
            }
        })
    }
}

impl<M> Default for UiLoop<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Drop for UiLoop<M> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<M> fmt::Debug for UiLoop<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiLoop")
            .field("ready", &self.ready.len())
            .field("timers", &self.timers.len())
            .field("shut_down", &self.shut_down)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posted_messages_drain_in_order() {
        let mut ui = UiLoop::new();
        ui.post(1);
        ui.post(2);
        assert_eq!(ui.drain_due(Instant::now()), vec![1, 2]);
        assert!(ui.drain_due(Instant::now()).is_empty());
    }

    #[test]
    fn delayed_message_waits_for_deadline() {
        let start = Instant::now();
        let mut ui = UiLoop::new();
        ui.post_at(start + Duration::from_secs(3), "done");
        assert!(ui.drain_due(start + Duration::from_secs(2)).is_empty());
        assert_eq!(ui.next_deadline(), Some(start + Duration::from_secs(3)));
        assert_eq!(ui.drain_due(start + Duration::from_secs(3)), vec!["done"]);
        assert_eq!(ui.pending_timers(), 0);
    }

    #[test]
    fn due_timers_fire_in_deadline_order() {
        let start = Instant::now();
        let mut ui = UiLoop::new();
        ui.post_at(start + Duration::from_millis(30), 'c');
        ui.post_at(start + Duration::from_millis(10), 'a');
        ui.post_at(start + Duration::from_millis(20), 'b');
        assert_eq!(
            ui.drain_due(start + Duration::from_millis(50)),
            vec!['a', 'b', 'c']
        );
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let start = Instant::now();
        let mut ui = UiLoop::new();
        let handle = ui.post_at(start, "stale");
        assert!(ui.cancel(handle));
        assert!(!ui.cancel(handle));
        assert!(ui.drain_due(start + Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn shutdown_discards_everything() {
        let start = Instant::now();
        let mut ui = UiLoop::new();
        let token = ui.token();
        ui.post(0);
        ui.post_at(start, 1);
        ui.shutdown();
        assert!(token.is_cancelled());
        assert!(ui.is_shut_down());
        assert_eq!(ui.pending_timers(), 0);
        ui.post(2);
        ui.post_at(start, 3);
        assert!(ui.drain_due(start + Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn drop_cancels_token() {
        let ui: UiLoop<()> = UiLoop::new();
        let token = ui.token();
        drop(ui);
        assert!(token.is_cancelled());
    }

    #[test]
    fn worker_result_is_marshaled_back() {
        let mut ui = UiLoop::new();
        ui.spawn(|_token| Some(42)).join().unwrap();
        assert_eq!(ui.drain_due(Instant::now()), vec![42]);
    }

    #[test]
    fn wait_until_picks_up_worker_result() {
        let mut ui = UiLoop::new();
        ui.spawn(|_token| {
            thread::sleep(Duration::from_millis(10));
            Some("late")
        });
        ui.wait_until(Instant::now() + Duration::from_secs(5));
        assert_eq!(ui.drain_due(Instant::now()), vec!["late"]);
    }

    #[test]
    fn cancelled_worker_delivers_nothing() {
        let mut ui = UiLoop::new();
        let worker = ui.spawn(|token| {
            if token.wait_timeout(Duration::from_secs(10)) {
                return None;
            }
            Some("too late")
        });
        ui.shutdown();
        worker.join().unwrap();
        assert!(ui.drain_due(Instant::now()).is_empty());
    }

    #[test]
    fn sender_reaches_the_loop() {
        let mut ui = UiLoop::new();
        let tx = ui.sender();
        thread::spawn(move || tx.send("hello").unwrap())
            .join()
            .unwrap();
        assert_eq!(ui.drain_due(Instant::now()), vec!["hello"]);
    }
}
