use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Nominal period of the animation loop (~60 FPS).
pub const TICK_PERIOD: Duration = Duration::from_millis(16);

/// Handle for a scheduled callback. Callers keep the token to cancel;
/// re-registering without cancelling first would duplicate work.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

enum Job {
    Repeat(Option<Box<dyn FnMut()>>),
    Once {
        remaining: u64,
        callback: Option<Box<dyn FnOnce()>>,
    },
}

struct Entry {
    token: TimerToken,
    job: Job,
}

struct Inner {
    next_token: u64,
    entries: Vec<Entry>,
}

/// Cooperative timer loop. All per-tick and delayed callbacks run on the
/// single thread that calls [`Scheduler::tick`]; none may block. Delays
/// are rounded up to whole ticks, so a one-shot never fires earlier than
/// requested.
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<RefCell<Inner>>,
    period: Duration,
}

impl Scheduler {
    pub fn new(period: Duration) -> Self {
        Scheduler {
            inner: Rc::new(RefCell::new(Inner {
                next_token: 0,
                entries: Vec::new(),
            })),
            period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Registers a callback invoked on every tick until cancelled.
    pub fn every_tick(&self, callback: impl FnMut() + 'static) -> TimerToken {
        self.push(Job::Repeat(Some(Box::new(callback))))
    }

    /// Schedules a one-shot callback no earlier than `delay` from now.
    /// The entry removes itself after firing.
    pub fn after(&self, delay: Duration, callback: impl FnOnce() + 'static) -> TimerToken {
        let period = self.period.as_nanos().max(1);
        let ticks = delay.as_nanos().div_ceil(period).max(1) as u64;
        self.push(Job::Once {
            remaining: ticks,
            callback: Some(Box::new(callback)),
        })
    }

    /// Removes a scheduled callback. Idempotent: cancelling a token that
    /// already fired or was already cancelled does nothing. Once this
    /// returns, the callback will not run again.
    pub fn cancel(&self, token: TimerToken) {
        self.inner
            .borrow_mut()
            .entries
            .retain(|entry| entry.token != token);
    }

    pub fn is_scheduled(&self, token: TimerToken) -> bool {
        self.inner
            .borrow()
            .entries
            .iter()
            .any(|entry| entry.token == token)
    }

    /// Runs one tick: every repeating callback plus any one-shot whose
    /// delay has elapsed. Callbacks may register or cancel entries;
    /// entries added during a tick first run on a later tick, and an
    /// entry cancelled by an earlier callback on this tick never runs.
    pub fn tick(&self) {
        enum Due {
            Repeat(Box<dyn FnMut()>),
            Once(Box<dyn FnOnce()>),
        }

        let due: Vec<TimerToken> = {
            let mut inner = self.inner.borrow_mut();
            let mut due = Vec::new();
            for entry in inner.entries.iter_mut() {
                match &mut entry.job {
                    Job::Repeat(_) => due.push(entry.token),
                    Job::Once { remaining, .. } => {
                        *remaining = remaining.saturating_sub(1);
                        if *remaining == 0 {
                            due.push(entry.token);
                        }
                    }
                }
            }
            due
        };

        // Each callback is taken out of its entry only at this point,
        // with the borrow released while it runs. A token cancelled by
        // a sibling callback earlier in the same tick has no entry left
        // here, so its callback is never invoked.
        for token in due {
            let job = {
                let mut inner = self.inner.borrow_mut();
                let Some(entry) = inner.entries.iter_mut().find(|entry| entry.token == token)
                else {
                    continue;
                };
                match &mut entry.job {
                    Job::Repeat(slot) => slot.take().map(Due::Repeat),
                    Job::Once { callback, .. } => callback.take().map(Due::Once),
                }
            };
            match job {
                Some(Due::Repeat(mut callback)) => {
                    callback();
                    let mut inner = self.inner.borrow_mut();
                    if let Some(entry) =
                        inner.entries.iter_mut().find(|entry| entry.token == token)
                        && let Job::Repeat(slot) = &mut entry.job
                    {
                        // Re-arm unless the callback cancelled itself.
                        *slot = Some(callback);
                    }
                }
                Some(Due::Once(callback)) => callback(),
                None => {}
            }
        }

        self.inner.borrow_mut().entries.retain(|entry| match &entry.job {
            Job::Once { callback, .. } => callback.is_some(),
            Job::Repeat(_) => true,
        });
    }

    fn push(&self, job: Job) -> TimerToken {
        let mut inner = self.inner.borrow_mut();
        let token = TimerToken(inner.next_token);
        inner.next_token += 1;
        inner.entries.push(Entry { token, job });
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn test_scheduler() -> Scheduler {
        Scheduler::new(TICK_PERIOD)
    }

    #[test]
    fn repeating_callback_runs_every_tick() {
        let scheduler = test_scheduler();
        let hits = Rc::new(Cell::new(0));
        let hits_cb = hits.clone();
        let token = scheduler.every_tick(move || hits_cb.set(hits_cb.get() + 1));
        for _ in 0..5 {
            scheduler.tick();
        }
        assert_eq!(hits.get(), 5);
        scheduler.cancel(token);
        scheduler.tick();
        assert_eq!(hits.get(), 5);
    }

    #[test]
    fn cancel_is_idempotent() {
        let scheduler = test_scheduler();
        let token = scheduler.every_tick(|| {});
        scheduler.cancel(token);
        scheduler.cancel(token);
        assert!(!scheduler.is_scheduled(token));
    }

    #[test]
    fn one_shot_fires_once_no_earlier_than_requested() {
        let scheduler = test_scheduler();
        let hits = Rc::new(Cell::new(0));
        let hits_cb = hits.clone();
        // 50 ms at 16 ms/tick rounds up to 4 ticks.
        let token = scheduler.after(Duration::from_millis(50), move || {
            hits_cb.set(hits_cb.get() + 1)
        });
        for _ in 0..3 {
            scheduler.tick();
            assert_eq!(hits.get(), 0);
        }
        scheduler.tick();
        assert_eq!(hits.get(), 1);
        assert!(!scheduler.is_scheduled(token));
        scheduler.tick();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn cancelled_one_shot_never_fires() {
        let scheduler = test_scheduler();
        let hits = Rc::new(Cell::new(0));
        let hits_cb = hits.clone();
        let token = scheduler.after(Duration::from_millis(16), move || {
            hits_cb.set(hits_cb.get() + 1)
        });
        scheduler.cancel(token);
        for _ in 0..3 {
            scheduler.tick();
        }
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn callback_can_cancel_itself() {
        let scheduler = test_scheduler();
        let hits = Rc::new(Cell::new(0));
        let token_cell: Rc<Cell<Option<TimerToken>>> = Rc::new(Cell::new(None));

        let hits_cb = hits.clone();
        let token_cb = token_cell.clone();
        let scheduler_cb = scheduler.clone();
        let token = scheduler.every_tick(move || {
            hits_cb.set(hits_cb.get() + 1);
            if let Some(token) = token_cb.get() {
                scheduler_cb.cancel(token);
            }
        });
        token_cell.set(Some(token));

        scheduler.tick();
        scheduler.tick();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn cancel_from_a_sibling_callback_suppresses_it_within_the_same_tick() {
        let scheduler = test_scheduler();
        let victim_hits = Rc::new(Cell::new(0));
        let victim_token: Rc<Cell<Option<TimerToken>>> = Rc::new(Cell::new(None));

        let scheduler_cb = scheduler.clone();
        let victim_token_cb = victim_token.clone();
        scheduler.every_tick(move || {
            if let Some(token) = victim_token_cb.get() {
                scheduler_cb.cancel(token);
            }
        });

        let victim_hits_cb = victim_hits.clone();
        let token = scheduler.every_tick(move || victim_hits_cb.set(victim_hits_cb.get() + 1));
        victim_token.set(Some(token));

        // The canceller runs first on the very tick the victim is due.
        scheduler.tick();
        scheduler.tick();
        assert_eq!(victim_hits.get(), 0);
        assert!(!scheduler.is_scheduled(token));
    }

    #[test]
    fn one_shot_cancelled_by_a_sibling_on_its_due_tick_never_fires() {
        let scheduler = test_scheduler();
        let fired = Rc::new(Cell::new(false));
        let victim_token: Rc<Cell<Option<TimerToken>>> = Rc::new(Cell::new(None));

        let scheduler_cb = scheduler.clone();
        let victim_token_cb = victim_token.clone();
        scheduler.every_tick(move || {
            if let Some(token) = victim_token_cb.get() {
                scheduler_cb.cancel(token);
            }
        });

        let fired_cb = fired.clone();
        let token = scheduler.after(TICK_PERIOD, move || fired_cb.set(true));
        victim_token.set(Some(token));

        // The one-shot comes due on this tick, but the canceller runs
        // ahead of it.
        scheduler.tick();
        scheduler.tick();
        assert!(!fired.get());
    }

    #[test]
    fn registration_from_inside_a_tick_runs_on_a_later_tick() {
        let scheduler = test_scheduler();
        let inner_hits = Rc::new(Cell::new(0));
        let registered = Rc::new(Cell::new(false));

        let scheduler_cb = scheduler.clone();
        let inner_hits_cb = inner_hits.clone();
        let registered_cb = registered.clone();
        scheduler.every_tick(move || {
            if !registered_cb.get() {
                registered_cb.set(true);
                let inner_hits = inner_hits_cb.clone();
                scheduler_cb.every_tick(move || inner_hits.set(inner_hits.get() + 1));
            }
        });

        scheduler.tick();
        assert_eq!(inner_hits.get(), 0);
        scheduler.tick();
        assert_eq!(inner_hits.get(), 1);
    }
}
