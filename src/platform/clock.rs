//! Fixed-rate tick pacing

use std::time::{Duration, Instant};

/// Sleeps so consecutive `wait` calls are at least one period apart
#[derive(Debug, Clone)]
pub struct TickClock {
    period: Duration,
    last: Option<Instant>,
}

impl TickClock {
    pub fn new(ticks_per_second: u32) -> Self {
        Self {
            period: Duration::from_secs_f64(1.0 / ticks_per_second.max(1) as f64),
            last: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Block until the next tick boundary; returns the time slept
    pub fn wait(&mut self) -> Duration {
        let now = Instant::now();
        let slept = match self.last {
            Some(last) => {
                let due = last + self.period;
                if due > now {
                    let remaining = due - now;
                    std::thread::sleep(remaining);
                    remaining
                } else {
                    // Running behind: don't try to catch up
                    Duration::ZERO
                }
            }
            None => Duration::ZERO,
        };
        self.last = Some(Instant::now());
        slept
    }
}
