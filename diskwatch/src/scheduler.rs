//! Wall-clock aligned recurring tasks
//!
//! A [`RecurringTask`] recomputes its next firing from the [`Clock`] before
//! every sleep, so it stays pinned to wall-clock boundaries instead of
//! accumulating drift from a fixed-period interval. Sleeps are measured
//! between instants, not between local times, so a firing still lands on
//! the configured wall-clock time when a daylight saving transition falls
//! inside the sleep.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, LocalResult, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Source of the current instant and of the local time zone rules
pub trait Clock: Send + Sync {
    /// The current instant
    fn now(&self) -> DateTime<Utc>;

    /// What the local wall clock reads at `instant`
    fn local(&self, instant: DateTime<Utc>) -> NaiveDateTime;

    /// The instants at which the local wall clock reads `local`
    ///
    /// `None` inside a spring-forward gap, `Ambiguous` inside a fall-back
    /// overlap.
    fn resolve(&self, local: NaiveDateTime) -> LocalResult<DateTime<Utc>>;
}

/// The real clock in the system time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&Local).naive_local()
    }

    fn resolve(&self, local: NaiveDateTime) -> LocalResult<DateTime<Utc>> {
        Local
            .from_local_datetime(&local)
            .map(|t| t.with_timezone(&Utc))
    }
}

/// When a recurring task fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// On every multiple of `minutes` since local midnight
    Aligned { minutes: u32 },
    /// Once a day at the given local time
    DailyAt { time: NaiveTime },
}

impl Schedule {
    /// The first wall-clock firing strictly after the wall-clock time `now`
    pub fn next_after(&self, now: NaiveDateTime) -> NaiveDateTime {
        match *self {
            Schedule::Aligned { minutes } => {
                let period = TimeDelta::minutes(i64::from(minutes.max(1)));
                let midnight = now.date().and_time(NaiveTime::default());
                let elapsed = now - midnight;
                // Nanosecond precision keeps a firing at 14:30:00.000 from
                // scheduling 14:30:00 again
                let (Some(elapsed_ns), Some(period_ns)) =
                    (elapsed.num_nanoseconds(), period.num_nanoseconds())
                else {
                    return now + period;
                };
                let slots = elapsed_ns / period_ns + 1;
                midnight + TimeDelta::nanoseconds(slots * period_ns)
            }
            Schedule::DailyAt { time } => {
                let today = now.date().and_time(time);
                if today > now {
                    today
                } else {
                    today + TimeDelta::days(1)
                }
            }
        }
    }

    /// The first firing instant strictly after `after`
    ///
    /// A wall-clock time skipped by a spring-forward transition fires once
    /// the clock has jumped past it. A time repeated by a fall-back
    /// transition fires on each pass.
    pub fn next_firing(&self, clock: &dyn Clock, after: DateTime<Utc>) -> DateTime<Utc> {
        // Transitions move the wall clock by at most this much
        let window = TimeDelta::hours(3);
        let local_after = clock.local(after);
        let mut cursor = local_after - window;
        let mut best: Option<DateTime<Utc>> = None;

        loop {
            let boundary = self.next_after(cursor);
            let resolved = match clock.resolve(boundary) {
                LocalResult::None => clock.resolve(boundary + TimeDelta::hours(1)),
                other => other,
            };
            let candidates = match resolved {
                LocalResult::Single(t) => [Some(t), None],
                LocalResult::Ambiguous(earlier, later) => [Some(earlier), Some(later)],
                LocalResult::None => [None, None],
            };
            for instant in candidates.into_iter().flatten() {
                if instant > after && best.map_or(true, |b| instant < b) {
                    best = Some(instant);
                }
            }

            if let Some(best) = best {
                if boundary > local_after + window {
                    return best;
                }
            }
            cursor = boundary;
        }
    }

    /// The next firing and how long to sleep from `now` until it
    ///
    /// `last` is the firing that just ran. The clock may still read a hair
    /// before it; the same firing never runs twice.
    pub fn delay_from(
        &self,
        clock: &dyn Clock,
        now: DateTime<Utc>,
        last: Option<DateTime<Utc>>,
    ) -> (DateTime<Utc>, Duration) {
        let from = match last {
            Some(last) if last > now => last,
            _ => now,
        };
        let target = self.next_firing(clock, from);
        let delay = (target - now).to_std().unwrap_or(Duration::ZERO);
        (target, delay)
    }
}

impl std::fmt::Display for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Schedule::Aligned { minutes } => write!(f, "every {} minutes", minutes),
            Schedule::DailyAt { time } => write!(f, "daily at {}", time.format("%H:%M:%S")),
        }
    }
}

/// Work performed on every firing
#[async_trait]
pub trait Job: Send + 'static {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Run one firing. Failures are the job's to log.
    async fn run(&mut self);
}

/// A job bound to a schedule, running until cancelled
pub struct RecurringTask<J: Job> {
    job: J,
    schedule: Schedule,
    clock: Arc<dyn Clock>,
    cancel: CancellationToken,
}

impl<J: Job> RecurringTask<J> {
    pub fn new(job: J, schedule: Schedule, clock: Arc<dyn Clock>, cancel: CancellationToken) -> Self {
        Self {
            job,
            schedule,
            clock,
            cancel,
        }
    }

    /// Spawn onto the runtime; the handle yields the job back on shutdown
    pub fn spawn(self) -> JoinHandle<J> {
        tokio::spawn(self.run())
    }

    /// Sleep until each firing and run the job, until the token is cancelled
    pub async fn run(mut self) -> J {
        let mut last_target: Option<DateTime<Utc>> = None;

        loop {
            let now = self.clock.now();
            let (target, delay) = self
                .schedule
                .delay_from(self.clock.as_ref(), now, last_target);

            tracing::debug!(
                job = self.job.name(),
                next = %self.clock.local(target),
                delay_secs = delay.as_secs(),
                "Scheduled next run"
            );

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!(job = self.job.name(), "Recurring task shutting down");
                    break;
                }
                _ = tokio::time::sleep(delay) => {
                    last_target = Some(target);
                    self.job.run().await;
                }
            }
        }

        self.job
    }
}
