//! Tick-driven deferred actions owned by a single session.
//!
//! Actions are plain values rather than closures: the owner advances the queue,
//! receives whatever came due, and interprets each action against its own state.
//! Actions scheduled while the owner is handling a batch wait for the next advance.

/// One scheduled action with its own tick counter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DelayedAction<A> {
    pub action: A,
    pub delay: u32,
    pub elapsed: u32,
    pub repeating: bool,
}

impl<A> DelayedAction<A> {
    pub fn once(action: A, delay: u32) -> Self {
        Self {
            action,
            delay,
            elapsed: 0,
            repeating: false,
        }
    }

    pub fn repeating(action: A, delay: u32) -> Self {
        Self {
            action,
            delay,
            elapsed: 0,
            repeating: true,
        }
    }

    /// Counts one tick. Returns true when the action is due on this tick.
    fn advance(&mut self) -> bool {
        self.elapsed = self.elapsed.saturating_add(1);
        if self.elapsed < self.delay {
            return false;
        }
        if self.repeating {
            self.elapsed = 0;
        }
        true
    }
}

/// Ordered list of [`DelayedAction`]s.
#[derive(Clone, Debug)]
pub struct ActionQueue<A> {
    entries: Vec<DelayedAction<A>>,
}

impl<A> Default for ActionQueue<A> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<A: Clone> ActionQueue<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `action` to fire once after `delay` ticks.
    pub fn schedule(&mut self, action: A, delay: u32) {
        self.entries.push(DelayedAction::once(action, delay));
    }

    /// Schedules `action` to fire every `delay` ticks until cleared.
    pub fn schedule_repeating(&mut self, action: A, delay: u32) {
        self.entries.push(DelayedAction::repeating(action, delay));
    }

    /// Advances every entry by one tick and returns the actions that came due,
    /// in scheduling order. Non-repeating entries that fired are dropped.
    pub fn advance(&mut self) -> Vec<A> {
        let mut due = Vec::new();
        self.entries.retain_mut(|entry| {
            if !entry.advance() {
                return true;
            }
            due.push(entry.action.clone());
            entry.repeating
        });
        due
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
