//! The range filter controller.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::catalog::ProductRef;
use crate::filter::{PricePreset, PriceRange, RangeBounds};
use crate::money::Money;
use crate::persistence::Repository;
use crate::store::{ListenerId, Notification, StateStore};
use crate::timer::{Scheduler, TimerHandle};
use tracing::{debug, info};

/// Delay between the last edit and its commit.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Which end of the range an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSide {
    Min,
    Max,
}

/// Keys that move a range thumb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKey {
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
}

impl StepKey {
    /// Parse a DOM-style key name (`ArrowLeft`, `Home`, ...).
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            "ArrowLeft" => Some(StepKey::Left),
            "ArrowRight" => Some(StepKey::Right),
            "ArrowUp" => Some(StepKey::Up),
            "ArrowDown" => Some(StepKey::Down),
            "Home" => Some(StepKey::Home),
            "End" => Some(StepKey::End),
            _ => None,
        }
    }
}

/// Pointer interaction state. Independent of the debounce timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    Dragging(RangeSide),
}

struct FilterState {
    bounds: RangeBounds,
    live: StateStore<PriceRange>,
    committed: StateStore<PriceRange>,
    pending: Option<TimerHandle>,
    interaction: Interaction,
    repository: Box<dyn Repository<PriceRange>>,
}

impl FilterState {
    /// Promote the live value. The returned notification must run after
    /// the state borrow is released.
    fn commit(&mut self) -> Option<Notification<PriceRange>> {
        self.pending = None;
        let value = *self.live.get();
        if value == *self.committed.get() {
            return None;
        }
        info!(min = value.min, max = value.max, "price range committed");
        self.repository.save(&value);
        Some(self.committed.replace(value))
    }
}

/// Holds a clamped `[min, max]` price interval.
///
/// Every edit updates the live value at once. The committed value, which
/// drives persistence and product filtering, follows after the debounce
/// delay; each new edit restarts that delay so a burst of edits commits
/// once, with the last value. Presets and [`reset`](Self::reset) commit
/// immediately.
///
/// Invariant: `global_min <= min <= max <= global_max` for both values.
pub struct RangeFilterController {
    state: Rc<RefCell<FilterState>>,
    scheduler: Rc<dyn Scheduler>,
    debounce: Duration,
}

impl RangeFilterController {
    /// Create a controller, restoring the persisted range when it is usable.
    pub fn new(
        bounds: RangeBounds,
        repository: impl Repository<PriceRange> + 'static,
        scheduler: impl Scheduler + 'static,
    ) -> Self {
        let initial = Self::load(&bounds, &repository);
        debug!(min = initial.min, max = initial.max, "price range restored");
        Self {
            state: Rc::new(RefCell::new(FilterState {
                bounds,
                live: StateStore::new(initial),
                committed: StateStore::new(initial),
                pending: None,
                interaction: Interaction::Idle,
                repository: Box::new(repository),
            })),
            scheduler: Rc::new(scheduler),
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    /// Override the debounce delay.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    fn load(bounds: &RangeBounds, repository: &dyn Repository<PriceRange>) -> PriceRange {
        repository
            .load()
            .map(|range| bounds.sanitize(range))
            .unwrap_or_else(|| bounds.full())
    }

    pub fn bounds(&self) -> RangeBounds {
        self.state.borrow().bounds
    }

    /// Value for visual feedback while editing.
    pub fn live(&self) -> PriceRange {
        *self.state.borrow().live.get()
    }

    /// Value that filters products and is persisted.
    pub fn committed(&self) -> PriceRange {
        *self.state.borrow().committed.get()
    }

    /// True while a commit is scheduled.
    pub fn is_pending(&self) -> bool {
        self.state.borrow().pending.is_some()
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Move the lower bound toward `candidate`, keeping one step below max.
    pub fn set_min(&self, candidate: i64) -> PriceRange {
        let (bounds, live) = self.current();
        let min = bounds.clamp_min(candidate, live.max);
        self.edit(PriceRange::new(min, live.max))
    }

    /// Move the upper bound toward `candidate`, keeping one step above min.
    pub fn set_max(&self, candidate: i64) -> PriceRange {
        let (bounds, live) = self.current();
        let max = bounds.clamp_max(candidate, live.min);
        self.edit(PriceRange::new(live.min, max))
    }

    /// Set one side from a key press. The result goes through the same
    /// clamping as a direct edit.
    pub fn step_by_keyboard(&self, side: RangeSide, key: StepKey) -> PriceRange {
        let (bounds, live) = self.current();
        let step = bounds.step();
        match side {
            RangeSide::Min => {
                let candidate = match key {
                    StepKey::Left | StepKey::Down => live.min.saturating_sub(step),
                    StepKey::Right | StepKey::Up => live.min.saturating_add(step),
                    StepKey::Home => bounds.global_min(),
                    StepKey::End => live.max.saturating_sub(step),
                };
                self.set_min(candidate)
            }
            RangeSide::Max => {
                let candidate = match key {
                    StepKey::Left | StepKey::Down => live.max.saturating_sub(step),
                    StepKey::Right | StepKey::Up => live.max.saturating_add(step),
                    StepKey::Home => live.min.saturating_add(step),
                    StepKey::End => bounds.global_max(),
                };
                self.set_max(candidate)
            }
        }
    }

    /// Apply a preset range and commit it now.
    ///
    /// Both ends are clamped into the global bounds but not snapped or
    /// clamped against each other.
    pub fn set_from_preset(&self, range: PriceRange) -> PriceRange {
        let (bounds, _) = self.current();
        self.apply_now(bounds.clamp_range(range))
    }

    /// Return to the full bounds and commit now.
    pub fn reset(&self) -> PriceRange {
        let (bounds, _) = self.current();
        self.apply_now(bounds.full())
    }

    /// Commit a pending edit immediately. Returns whether one was pending.
    pub fn flush(&self) -> bool {
        let pending = self.state.borrow_mut().pending.take();
        match pending {
            Some(handle) => {
                self.scheduler.cancel(handle);
                let committed = self.state.borrow_mut().commit();
                notify(committed);
                true
            }
            None => false,
        }
    }

    /// Re-read the persisted range, dropping any pending edit.
    pub fn reload(&self) {
        self.cancel_pending();
        let (live, committed) = {
            let mut state = self.state.borrow_mut();
            let range = Self::load(&state.bounds, state.repository.as_ref());
            let live = (*state.live.get() != range).then(|| state.live.replace(range));
            let committed =
                (*state.committed.get() != range).then(|| state.committed.replace(range));
            (live, committed)
        };
        notify(live);
        notify(committed);
    }

    pub fn begin_interaction(&self, side: RangeSide) {
        debug!(?side, "range interaction started");
        self.state.borrow_mut().interaction = Interaction::Dragging(side);
    }

    pub fn end_interaction(&self) {
        self.state.borrow_mut().interaction = Interaction::Idle;
    }

    pub fn interaction(&self) -> Interaction {
        self.state.borrow().interaction
    }

    /// The first preset equal to the committed range.
    pub fn active_preset<'a>(&self, presets: &'a [PricePreset]) -> Option<&'a PricePreset> {
        let committed = self.committed();
        presets.iter().find(|p| p.matches(committed))
    }

    pub fn is_preset_active(&self, preset: &PricePreset) -> bool {
        preset.matches(self.committed())
    }

    /// True when the committed range is narrower than the full bounds.
    pub fn is_filtered(&self) -> bool {
        let state = self.state.borrow();
        *state.committed.get() != state.bounds.full()
    }

    /// True when `price` passes the committed range.
    pub fn matches(&self, price: Money) -> bool {
        !self.is_filtered() || self.committed().contains_price(price)
    }

    /// Products whose unit price passes the committed range.
    pub fn filter_products<'a>(&self, products: &'a [ProductRef]) -> Vec<&'a ProductRef> {
        products
            .iter()
            .filter(|p| self.matches(p.unit_price))
            .collect()
    }

    /// Listen to every live change.
    pub fn subscribe_live(&self, listener: impl Fn(&PriceRange) + 'static) -> ListenerId {
        self.state.borrow_mut().live.subscribe(listener)
    }

    /// Listen to commits.
    pub fn subscribe_committed(&self, listener: impl Fn(&PriceRange) + 'static) -> ListenerId {
        self.state.borrow_mut().committed.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut state = self.state.borrow_mut();
        state.live.unsubscribe(id) || state.committed.unsubscribe(id)
    }

    fn current(&self) -> (RangeBounds, PriceRange) {
        let state = self.state.borrow();
        (state.bounds, *state.live.get())
    }

    fn edit(&self, next: PriceRange) -> PriceRange {
        let live = {
            let mut state = self.state.borrow_mut();
            if *state.live.get() == next {
                return next;
            }
            debug!(min = next.min, max = next.max, "price range edited");
            state.live.replace(next)
        };
        self.schedule_commit();
        live.run();
        next
    }

    fn apply_now(&self, range: PriceRange) -> PriceRange {
        self.cancel_pending();
        let (live, committed) = {
            let mut state = self.state.borrow_mut();
            let live = (*state.live.get() != range).then(|| state.live.replace(range));
            (live, state.commit())
        };
        notify(live);
        notify(committed);
        range
    }

    fn cancel_pending(&self) {
        let pending = self.state.borrow_mut().pending.take();
        if let Some(handle) = pending {
            self.scheduler.cancel(handle);
        }
    }

    fn schedule_commit(&self) {
        self.cancel_pending();
        let weak: Weak<RefCell<FilterState>> = Rc::downgrade(&self.state);
        let handle = self.scheduler.schedule(
            self.debounce,
            Box::new(move || {
                if let Some(state) = weak.upgrade() {
                    let committed = state.borrow_mut().commit();
                    notify(committed);
                }
            }),
        );
        self.state.borrow_mut().pending = Some(handle);
    }
}

fn notify(notification: Option<Notification<PriceRange>>) {
    if let Some(notification) = notification {
        notification.run();
    }
}

impl Drop for RangeFilterController {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
