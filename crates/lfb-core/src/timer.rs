use std::collections::{BTreeMap, HashMap};

/// Opaque token for one armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// Cancelable one-shot timers keyed by absolute deadline.
///
/// The queue never sleeps on its own: the owner asks for
/// [`TimerQueue::next_deadline`], waits, then drains with [`TimerQueue::pop_due`].
/// Timers with equal deadlines fire in arming order.
#[derive(Debug)]
pub struct TimerQueue<T> {
    next_id: u64,
    armed: BTreeMap<(u64, TimerHandle), T>,
    deadlines: HashMap<TimerHandle, u64>,
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            armed: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    /// Arm a timer firing at `fire_at` (unix ms).
    pub fn schedule(&mut self, fire_at: u64, payload: T) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.armed.insert((fire_at, handle), payload);
        self.deadlines.insert(handle, fire_at);
        handle
    }

    /// Disarm a timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.deadlines.remove(&handle) {
            Some(fire_at) => self.armed.remove(&(fire_at, handle)).is_some(),
            None => false,
        }
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.armed.keys().next().map(|(fire_at, _)| *fire_at)
    }

    /// Remove and return every timer with `fire_at <= now`, earliest first.
    pub fn pop_due(&mut self, now: u64) -> Vec<(TimerHandle, T)> {
        let mut due = Vec::new();
        while let Some(entry) = self.armed.first_entry() {
            let (fire_at, handle) = *entry.key();
            if fire_at > now {
                break;
            }
            let payload = entry.remove();
            self.deadlines.remove(&handle);
            due.push((handle, payload));
        }
        due
    }

    pub fn len(&self) -> usize {
        self.armed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.armed.is_empty()
    }

    pub fn clear(&mut self) {
        self.armed.clear();
        self.deadlines.clear();
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
