//! Time sources and the periodic sweep loop

use async_trait::async_trait;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{error, info};

use crate::expiry::normalize_to_midnight;
use crate::sweep::{ExpirySweep, SweepOutcome};

/// Local wall-clock time source
pub trait Clock: Send + Sync {
    /// Current local date and time
    fn now(&self) -> NaiveDateTime;

    /// The calendar day a sweep evaluates against
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Host local time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn today(&self) -> NaiveDate {
        normalize_to_midnight(&Local::now())
    }
}

/// A clock pinned to a settable instant
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<NaiveDateTime>,
}

impl FixedClock {
    /// Pinned to midnight of `today`
    pub fn new(today: NaiveDate) -> Self {
        Self::at(today.and_time(NaiveTime::MIN))
    }

    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    pub fn set(&self, today: NaiveDate) {
        self.set_now(today.and_time(NaiveTime::MIN));
    }

    pub fn set_now(&self, now: NaiveDateTime) {
        if let Ok(mut guard) = self.now.write() {
            *guard = now;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        match self.now.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// First occurrence of `at` strictly after `now`
pub fn next_run_at(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + chrono::Duration::days(1)
    }
}

/// Source of sweep triggers
#[async_trait]
pub trait Ticker: Send {
    /// Wait for the next trigger. `false` means no more triggers will come.
    async fn tick(&mut self) -> bool;
}

/// Fires on a fixed period
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    /// With `immediate` the first tick completes at once, otherwise after one period
    pub fn new(period: Duration, immediate: bool) -> Self {
        let start = if immediate {
            Instant::now()
        } else {
            Instant::now() + period
        };
        let mut interval = time::interval_at(start, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

/// Fires once a day at a local wall-clock time
///
/// Never fires twice for the same calendar day, so a restart after the
/// daily run waits for the next day.
pub struct DailyTicker {
    clock: Arc<dyn Clock>,
    at: NaiveTime,
    fire_immediately: bool,
    last_fired: Option<NaiveDate>,
}

impl DailyTicker {
    /// With `immediate` the first tick completes at once
    pub fn new(clock: Arc<dyn Clock>, at: NaiveTime, immediate: bool) -> Self {
        Self {
            clock,
            at,
            fire_immediately: immediate,
            last_fired: None,
        }
    }

    /// Next scheduled run in local time
    pub fn next_run(&self) -> NaiveDateTime {
        let mut next = next_run_at(self.clock.now(), self.at);
        if Some(next.date()) == self.last_fired {
            next += chrono::Duration::days(1);
        }
        next
    }

    /// Time left until [`next_run`](Self::next_run)
    pub fn next_delay(&self) -> Duration {
        (self.next_run() - self.clock.now())
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

#[async_trait]
impl Ticker for DailyTicker {
    async fn tick(&mut self) -> bool {
        if self.fire_immediately {
            self.fire_immediately = false;
            return true;
        }

        let next = self.next_run();
        let delay = self.next_delay();
        info!(next_run = %next, delay_secs = delay.as_secs(), "Waiting for next daily sweep");

        time::sleep_until(Instant::now() + delay).await;
        self.last_fired = Some(next.date());
        true
    }
}

/// Fires whenever its paired [`ManualTrigger`] is pulled
pub struct ManualTicker {
    rx: mpsc::Receiver<()>,
}

#[derive(Clone)]
pub struct ManualTrigger {
    tx: mpsc::Sender<()>,
}

impl ManualTrigger {
    /// Returns `false` once the ticker is gone
    pub async fn fire(&self) -> bool {
        self.tx.send(()).await.is_ok()
    }
}

pub fn manual_ticker(buffer: usize) -> (ManualTrigger, ManualTicker) {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    (ManualTrigger { tx }, ManualTicker { rx })
}

#[async_trait]
impl Ticker for ManualTicker {
    async fn tick(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }
}

/// Run the sweep on every tick until shutdown is signalled or the ticker ends
///
/// Each sweep runs to completion before the next tick is awaited. Returns
/// the number of completed sweeps.
pub async fn run_scheduler<T: Ticker>(
    sweep: Arc<ExpirySweep>,
    mut ticker: T,
    mut shutdown: watch::Receiver<bool>,
) -> usize {
    info!(
        thresholds = ?sweep.thresholds().days(),
        "Starting expiry reminder scheduler"
    );

    let mut completed = 0;

    loop {
        if *shutdown.borrow() {
            break;
        }

        tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            more = ticker.tick() => {
                if !more {
                    break;
                }

                match sweep.run_once().await {
                    Ok(SweepOutcome::Completed(report)) => {
                        completed += 1;
                        info!(
                            sent = report.sent,
                            failed = report.failed,
                            "Scheduled sweep finished"
                        );
                    }
                    Ok(SweepOutcome::Skipped) => {
                        info!("Scheduled sweep skipped, previous run still in flight");
                    }
                    Err(e) => {
                        error!(error = %e, "Scheduled sweep failed");
                    }
                }
            }
        }
    }

    info!(completed, "Expiry reminder scheduler stopped");
    completed
}
