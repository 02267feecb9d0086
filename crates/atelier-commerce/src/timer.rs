//! Cancellable delayed callbacks.
//!
//! The price filter's debounced commit is the only deferred work in the
//! engine. It goes through [`Scheduler`] so hosts can pick the timer source:
//!
//! - [`ManualScheduler`]: virtual time advanced explicitly. Deterministic;
//!   used by tests and synchronous hosts.
//! - [`TokioScheduler`]: real timers on a tokio `LocalSet`.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::time::Duration;

/// Work to run when a timer fires.
pub type Task = Box<dyn FnOnce()>;

/// Identifies a scheduled task so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// Schedules single-shot delayed tasks.
pub trait Scheduler {
    /// Run `task` once `delay` has elapsed.
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle;

    /// Cancel a pending task. Returns false if it already ran or was cancelled.
    fn cancel(&self, handle: TimerHandle) -> bool;
}

impl<S: Scheduler + ?Sized> Scheduler for Rc<S> {
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        (**self).schedule(delay, task)
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        (**self).cancel(handle)
    }
}

/// Scheduler driven by an explicit virtual clock.
///
/// Clones share the same clock and queue.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Rc<ManualInner>,
}

#[derive(Default)]
struct ManualInner {
    now: Cell<Duration>,
    next_id: Cell<u64>,
    // Ordered by deadline, then by scheduling order.
    queue: RefCell<BTreeMap<(Duration, u64), Task>>,
    deadlines: RefCell<HashMap<u64, Duration>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.inner.now.get()
    }

    /// Number of tasks waiting to fire.
    pub fn pending(&self) -> usize {
        self.inner.queue.borrow().len()
    }

    /// Move the clock forward, firing every task that falls due on the way
    /// in deadline order. Tasks may schedule or cancel other tasks.
    pub fn advance(&self, by: Duration) {
        let target = self.now().saturating_add(by);
        while let Some(((deadline, id), task)) = self.pop_due(target) {
            self.inner.deadlines.borrow_mut().remove(&id);
            self.inner.now.set(deadline);
            task();
        }
        self.inner.now.set(target);
    }

    /// Fire everything that is pending, including tasks scheduled by the
    /// tasks that run.
    pub fn run_until_idle(&self) {
        loop {
            let next = self.inner.queue.borrow().keys().next().map(|(d, _)| *d);
            match next {
                Some(deadline) => self.advance(deadline.saturating_sub(self.now())),
                None => break,
            }
        }
    }

    fn pop_due(&self, target: Duration) -> Option<((Duration, u64), Task)> {
        let mut queue = self.inner.queue.borrow_mut();
        let key = *queue.keys().next()?;
        if key.0 > target {
            return None;
        }
        queue.remove(&key).map(|task| (key, task))
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        let deadline = self.now().saturating_add(delay);
        self.inner.queue.borrow_mut().insert((deadline, id), task);
        self.inner.deadlines.borrow_mut().insert(id, deadline);
        TimerHandle(id)
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        let Some(deadline) = self.inner.deadlines.borrow_mut().remove(&handle.0) else {
            return false;
        };
        self.inner
            .queue
            .borrow_mut()
            .remove(&(deadline, handle.0))
            .is_some()
    }
}

/// Scheduler backed by tokio timers.
///
/// Tasks are spawned with `spawn_local`, so every call must happen inside a
/// `tokio::task::LocalSet`.
#[cfg(feature = "tokio")]
#[derive(Clone, Default)]
pub struct TokioScheduler {
    inner: Rc<TokioInner>,
}

#[cfg(feature = "tokio")]
#[derive(Default)]
struct TokioInner {
    next_id: Cell<u64>,
    handles: RefCell<HashMap<u64, tokio::task::AbortHandle>>,
}

#[cfg(feature = "tokio")]
impl TokioScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting to fire.
    pub fn pending(&self) -> usize {
        self.inner.handles.borrow().len()
    }
}

#[cfg(feature = "tokio")]
impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);

        let registry = Rc::downgrade(&self.inner);
        let join = tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = registry.upgrade() {
                inner.handles.borrow_mut().remove(&id);
            }
            task();
        });
        self.inner
            .handles
            .borrow_mut()
            .insert(id, join.abort_handle());
        TimerHandle(id)
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        match self.inner.handles.borrow_mut().remove(&handle.0) {
            Some(abort) => {
                abort.abort();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Task) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        let make = move |name: &'static str| -> Task {
            let l = l.clone();
            Box::new(move || l.borrow_mut().push(name))
        };
        (log, make)
    }

    #[test]
    fn test_manual_fires_in_deadline_order() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();

        scheduler.schedule(Duration::from_millis(300), task("late"));
        scheduler.schedule(Duration::from_millis(100), task("early"));
        scheduler.advance(Duration::from_millis(99));
        assert!(log.borrow().is_empty());

        scheduler.advance(Duration::from_millis(1));
        assert_eq!(*log.borrow(), vec!["early"]);

        scheduler.advance(Duration::from_millis(500));
        assert_eq!(*log.borrow(), vec!["early", "late"]);
        assert_eq!(scheduler.now(), Duration::from_millis(600));
    }

    #[test]
    fn test_manual_cancel() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();

        let handle = scheduler.schedule(Duration::from_millis(300), task("cancelled"));
        assert_eq!(scheduler.pending(), 1);
        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
        scheduler.run_until_idle();

        assert!(log.borrow().is_empty());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_manual_task_can_schedule_more_work() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();

        let inner = scheduler.clone();
        let follow_up = task("second");
        let first = task("first");
        scheduler.schedule(
            Duration::from_millis(10),
            Box::new(move || {
                first();
                inner.schedule(Duration::from_millis(10), follow_up);
            }),
        );

        scheduler.run_until_idle();
        assert_eq!(*log.borrow(), vec!["first", "second"]);
        assert_eq!(scheduler.now(), Duration::from_millis(20));
    }

    #[cfg(feature = "tokio")]
    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_fires_and_cancels() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let scheduler = TokioScheduler::new();
                let (log, task) = recorder();

                let cancelled = scheduler.schedule(Duration::from_millis(300), task("cancelled"));
                scheduler.schedule(Duration::from_millis(300), task("kept"));
                assert!(scheduler.cancel(cancelled));
                assert_eq!(scheduler.pending(), 1);

                tokio::time::sleep(Duration::from_millis(301)).await;
                assert_eq!(*log.borrow(), vec!["kept"]);
                assert_eq!(scheduler.pending(), 0);
            })
            .await;
    }
}
