//! Observable state container.
//!
//! Each engine owns one `StateStore` for the state it exposes to the UI.
//! The store is constructed per session and passed around by reference, so
//! there is no process-wide singleton.

use std::fmt;
use std::rc::Rc;

/// Handle returned by [`StateStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<T> = Rc<dyn Fn(&T)>;

/// A value plus the listeners interested in its changes.
///
/// Listeners run synchronously, in subscription order, after every `set`
/// or `update`. An owner that keeps the store behind a `RefCell` uses
/// [`replace`](Self::replace) instead and runs the returned
/// [`Notification`] once the borrow is released, so listeners may read
/// back through the owner.
pub struct StateStore<T> {
    value: T,
    listeners: Vec<(ListenerId, Listener<T>)>,
    next_id: u64,
}

impl<T> StateStore<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Current value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replace the value and notify listeners.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.notify();
    }

    /// Mutate the value in place and notify listeners.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = f(&mut self.value);
        self.notify();
        result
    }

    /// Mutate without notifying. The caller decides whether the change is
    /// worth announcing.
    pub fn update_silently<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.value)
    }

    /// Register a listener.
    pub fn subscribe(&mut self, listener: impl Fn(&T) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() < before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Run every listener against the current value.
    pub fn notify(&self) {
        for (_, listener) in &self.listeners {
            listener(&self.value);
        }
    }
}

impl<T: Clone> StateStore<T> {
    /// Replace the value and hand back the notification instead of running it.
    pub fn replace(&mut self, value: T) -> Notification<T> {
        self.value = value;
        Notification {
            value: self.value.clone(),
            listeners: self.listeners.iter().map(|(_, l)| Rc::clone(l)).collect(),
        }
    }
}

/// Listeners captured at a change, with the value they are owed.
#[must_use = "listeners only run when `run` is called"]
pub struct Notification<T> {
    value: T,
    listeners: Vec<Listener<T>>,
}

impl<T> Notification<T> {
    pub fn run(self) {
        for listener in &self.listeners {
            listener(&self.value);
        }
    }
}

impl<T: Default> Default for StateStore<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for StateStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateStore")
            .field("value", &self.value)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_set_notifies_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = StateStore::new(0);

        let a = seen.clone();
        store.subscribe(move |v| a.borrow_mut().push(("a", *v)));
        let b = seen.clone();
        store.subscribe(move |v| b.borrow_mut().push(("b", *v)));

        store.set(7);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_unsubscribe() {
        let hits = Rc::new(RefCell::new(0));
        let mut store = StateStore::new(String::new());

        let h = hits.clone();
        let id = store.subscribe(move |_| *h.borrow_mut() += 1);
        store.update(|s| s.push('x'));
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.set("y".into());

        assert_eq!(*hits.borrow(), 1);
        assert_eq!(store.get(), "y");
    }

    #[test]
    fn test_replace_defers_listeners() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = StateStore::new(1);
        let s = seen.clone();
        store.subscribe(move |v| s.borrow_mut().push(*v));

        let note = store.replace(2);
        assert!(seen.borrow().is_empty());
        store.replace(3).run();
        note.run();
        assert_eq!(*seen.borrow(), vec![3, 2]);
        assert_eq!(*store.get(), 3);
    }

    #[test]
    fn test_silent_update() {
        let hits = Rc::new(RefCell::new(0));
        let mut store = StateStore::new(1);
        let h = hits.clone();
        store.subscribe(move |_| *h.borrow_mut() += 1);

        store.update_silently(|v| *v = 2);
        assert_eq!(*hits.borrow(), 0);
        assert_eq!(*store.get(), 2);
    }
}
