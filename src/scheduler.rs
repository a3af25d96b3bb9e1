//! Daily run-window scheduler
//!
//! Polls the local clock and tells an [`IntervalHandler`] when a run window
//! opens and closes. Typical use is a publisher that starts pushing data
//! through the message client during trading hours and stops outside them.

use chrono::{Local, NaiveTime};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Default poll interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Shortest poll interval; tokio intervals cannot have a zero period
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Callbacks fired when a run window opens or closes
///
/// Called inline from the scheduler loop; a slow callback delays the next
/// poll.
pub trait IntervalHandler: Send + Sync {
    fn on_interval_start(&self);
    fn on_interval_end(&self);
}

/// A daily time range, inclusive at both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl RunWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// 00:00:00 through 23:59:59
    pub fn all_day() -> Self {
        Self {
            start: NaiveTime::default(),
            end: NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default(),
        }
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.start && time <= self.end
    }
}

/// What a tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    None,
    Started,
    Ended,
}

/// Polls run windows and drives an [`IntervalHandler`]
pub struct ScheduleRunner {
    windows: Vec<RunWindow>,
    poll_interval: Duration,
    running: bool,
    handler: Arc<dyn IntervalHandler>,
}

impl ScheduleRunner {
    /// Runner over the whole day, polling every minute
    pub fn new(handler: Arc<dyn IntervalHandler>) -> Self {
        Self {
            windows: vec![RunWindow::all_day()],
            poll_interval: DEFAULT_POLL_INTERVAL,
            running: false,
            handler,
        }
    }

    pub fn with_windows(mut self, windows: Vec<RunWindow>) -> Self {
        self.windows = windows;
        self
    }

    /// Set the poll interval, clamped to [`MIN_POLL_INTERVAL`]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval.max(MIN_POLL_INTERVAL);
        self
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn in_window(&self, time: NaiveTime) -> bool {
        self.windows.iter().any(|w| w.contains(time))
    }

    /// Evaluate the windows at `now` and fire a callback on a state change
    pub fn tick(&mut self, now: NaiveTime) -> Transition {
        match (self.running, self.in_window(now)) {
            (false, true) => {
                self.running = true;
                info!("Entering run window at {}", now.format("%H:%M:%S"));
                self.handler.on_interval_start();
                Transition::Started
            }
            (true, false) => {
                self.running = false;
                info!("Leaving run window at {}", now.format("%H:%M:%S"));
                self.handler.on_interval_end();
                Transition::Ended
            }
            _ => Transition::None,
        }
    }

    /// Poll until `shutdown` resolves
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut ticker = tokio::time::interval(self.poll_interval);

        info!("Scheduler started, waiting for run window");
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Scheduler stopping");
                    break;
                }
                _ = ticker.tick() => {
                    self.tick(Local::now().time());
                }
            }
        }
    }
}
