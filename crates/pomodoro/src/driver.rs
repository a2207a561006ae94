//! Scheduling driver
//!
//! Cadence source for the timer: while the timer is running the driver yields
//! one tick per period. It holds at most one interval, created when the timer
//! starts running and dropped as soon as it stops, so a paused or idle timer
//! never receives a stray tick and repeated starts never stack intervals.

use std::time::Duration;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::trace;

use crate::timer::TimerStatus;

/// One tick per second
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Owns the cancellable tick interval
pub struct Driver {
    period: Duration,
    interval: Option<Interval>,
}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver {
    pub fn new() -> Self {
        Self::with_period(TICK_PERIOD)
    }

    pub fn with_period(period: Duration) -> Self {
        Self {
            period,
            interval: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    /// Start ticking. The first tick lands one full period from now.
    /// Does nothing if already armed.
    pub fn arm(&mut self) {
        if self.interval.is_some() {
            return;
        }
        let mut interval = time::interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
        trace!("driver armed");
    }

    /// Stop ticking immediately
    pub fn disarm(&mut self) {
        if self.interval.take().is_some() {
            trace!("driver disarmed");
        }
    }

    /// Arm while the timer runs, disarm otherwise
    pub fn sync(&mut self, status: TimerStatus) {
        if status == TimerStatus::Running {
            self.arm();
        } else {
            self.disarm();
        }
    }

    /// Wait for the next tick. Never resolves while disarmed.
    ///
    /// Cancel safe, so it can sit in a `select!` next to other events.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::store::MemoryStore;
    use crate::timer::Timer;

    const PERIOD: Duration = Duration::from_millis(20);

    #[tokio::test]
    async fn test_sync_follows_status() {
        let mut driver = Driver::with_period(PERIOD);
        assert!(!driver.is_armed());

        driver.sync(TimerStatus::Running);
        assert!(driver.is_armed());

        driver.sync(TimerStatus::Paused);
        assert!(!driver.is_armed());

        driver.sync(TimerStatus::Running);
        driver.sync(TimerStatus::Idle);
        assert!(!driver.is_armed());
    }

    #[tokio::test]
    async fn test_disarmed_driver_never_ticks() {
        let mut driver = Driver::with_period(PERIOD);
        let result = time::timeout(PERIOD * 5, driver.tick()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_armed_driver_ticks() {
        let mut driver = Driver::with_period(PERIOD);
        driver.arm();
        let result = time::timeout(PERIOD * 10, driver.tick()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_rearming_does_not_double_schedule() {
        let mut driver = Driver::with_period(Duration::from_millis(50));
        driver.arm();
        let started = Instant::now();
        driver.arm();
        driver.arm();

        driver.tick().await;
        driver.tick().await;
        // two ticks of a single interval take at least two periods
        assert!(started.elapsed() >= Duration::from_millis(95));
    }

    #[tokio::test]
    async fn test_drives_timer_to_completion() {
        let settings = Settings {
            focus_duration: 1,
            ..Default::default()
        };
        let store = MemoryStore::new();
        let mut timer = Timer::new(settings, Vec::new(), Box::new(store.clone()));
        // shorten the session so the test stays fast
        timer.start();
        for _ in 0..55 {
            timer.tick();
        }

        let mut driver = Driver::with_period(Duration::from_millis(5));
        driver.sync(timer.status());

        let mut ticks = 0;
        while driver.is_armed() {
            driver.tick().await;
            timer.tick();
            ticks += 1;
            driver.sync(timer.status());
        }

        assert_eq!(ticks, 5);
        assert_eq!(timer.status(), TimerStatus::Idle);
        assert_eq!(store.sessions().len(), 1);

        // disarmed with the timer idle: no further ticks arrive
        assert!(time::timeout(Duration::from_millis(30), driver.tick()).await.is_err());
        assert_eq!(timer.remaining_seconds(), 300);
    }
}
