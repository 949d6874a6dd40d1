use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Duration, Utc};

/// Source of wall-clock time for timing answers and stamping records.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Clones share the same time, so a
/// test can keep one handle and give another to the engine.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance_millis(&self, millis: i64) {
        self.now.set(self.now.get() + Duration::milliseconds(millis));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}
