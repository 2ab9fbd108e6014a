use super::reading::{CongestionSample, FlowProvider, FlowReading, MonitoredStreet};
use super::retry::{CancellationToken, CollectorSchedule, RetryPolicy};
use super::sink::SampleSink;
use crate::error::CollectorError;
use chrono::{DateTime, FixedOffset, Local, TimeZone, Timelike, Utc};
use std::thread::JoinHandle;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Wall-clock time of day stamped on samples
pub trait Clock: Send + Sync {
    /// Current `(hour, minute)`
    fn now_hm(&self) -> (u8, u8);
}

fn time_of_day<Tz: TimeZone>(at: &DateTime<Tz>) -> (u8, u8) {
    (at.hour() as u8, at.minute() as u8)
}

/// Local time of day from the system clock and time zone
///
/// Samples must be stamped in the city's local time, since the simulation
/// indexes congestion profiles by local hour.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_hm(&self) -> (u8, u8) {
        time_of_day(&Local::now())
    }
}

/// Time of day at a fixed UTC offset, for a collector hosted outside the
/// city's time zone
#[derive(Debug, Clone, Copy)]
pub struct ZonedClock {
    offset: FixedOffset,
}

impl ZonedClock {
    #[must_use]
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Offset east of UTC in whole hours; `None` outside ±23 h
    #[must_use]
    pub fn east_hours(hours: i32) -> Option<Self> {
        FixedOffset::east_opt(hours.checked_mul(3600)?).map(Self::new)
    }
}

impl Clock for ZonedClock {
    fn now_hm(&self) -> (u8, u8) {
        time_of_day(&Utc::now().with_timezone(&self.offset))
    }
}

/// Outcome of one polling round
#[derive(Debug, Default)]
pub struct RoundReport {
    pub recorded: usize,
    /// Streets skipped this round, one error each
    pub failures: Vec<CollectorError>,
}

/// Periodically polls a [`FlowProvider`] for every monitored street
///
/// Provider errors are retried with [`RetryPolicy`] backoff; a street that
/// still fails, or returns an unusable reading, is reported in the round's
/// [`RoundReport`] and the round carries on. Sink errors end the run.
pub struct CongestionCollector<P, C = SystemClock> {
    provider: P,
    clock: C,
    streets: Vec<MonitoredStreet>,
    retry: RetryPolicy,
    schedule: CollectorSchedule,
    token: CancellationToken,
}

impl<P: FlowProvider> CongestionCollector<P, SystemClock> {
    pub fn new(provider: P, streets: Vec<MonitoredStreet>) -> Self {
        Self {
            provider,
            clock: SystemClock,
            streets,
            retry: RetryPolicy::default(),
            schedule: CollectorSchedule::default(),
            token: CancellationToken::new(),
        }
    }
}

impl<P: FlowProvider, C: Clock> CongestionCollector<P, C> {
    #[must_use]
    pub fn with_clock<C2: Clock>(self, clock: C2) -> CongestionCollector<P, C2> {
        CongestionCollector {
            provider: self.provider,
            clock,
            streets: self.streets,
            retry: self.retry,
            schedule: self.schedule,
            token: self.token,
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_schedule(mut self, schedule: CollectorSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Share a token so several components stop together
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// Handle that stops this collector when cancelled
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn streets(&self) -> &[MonitoredStreet] {
        &self.streets
    }

    fn fetch_with_retry(&self, street: &MonitoredStreet) -> Result<FlowReading, CollectorError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            if self.token.is_cancelled() {
                return Err(CollectorError::Cancelled);
            }
            attempt += 1;
            match self.provider.flow_at(&street.location) {
                Ok(reading) => return Ok(reading),
                Err(CollectorError::Provider(message)) => {
                    if attempt >= max_attempts {
                        return Err(CollectorError::RetriesExhausted {
                            street: street.street.clone(),
                            attempts: attempt,
                            last_error: message,
                        });
                    }
                    let delay = self.retry.delay_after(attempt);
                    warn!(
                        "Flow request for `{}` failed (attempt {attempt}/{max_attempts}): {message}; retrying in {delay:?}",
                        street.street
                    );
                    if self.token.wait_timeout(delay) {
                        return Err(CollectorError::Cancelled);
                    }
                }
                Err(other) => return Err(other),
            }
        }
    }

    /// Poll every street once and record the samples
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::Cancelled`] if cancelled mid-round and
    /// [`CollectorError::Sink`] if the sink fails. Per-street failures are
    /// returned inside the [`RoundReport`] instead.
    pub fn collect_round<S: SampleSink + ?Sized>(
        &self,
        sink: &mut S,
    ) -> Result<RoundReport, CollectorError> {
        let mut report = RoundReport::default();
        for street in &self.streets {
            let pct = self
                .fetch_with_retry(street)
                .and_then(|reading| reading.congestion_pct(&street.street));
            match pct {
                Ok(congestion_pct) => {
                    let (hour, minute) = self.clock.now_hm();
                    sink.record(&CongestionSample {
                        street: street.street.clone(),
                        location: street.location,
                        hour,
                        minute,
                        congestion_pct,
                    })?;
                    debug!("{} at {hour:02}:{minute:02}: {congestion_pct}%", street.street);
                    report.recorded += 1;
                }
                Err(CollectorError::Cancelled) => return Err(CollectorError::Cancelled),
                Err(e) => {
                    warn!("Skipping `{}` this round: {e}", street.street);
                    report.failures.push(e);
                }
            }
        }
        sink.flush()?;
        Ok(report)
    }

    /// Run rounds on the schedule until cancelled or `max_rounds` is reached
    ///
    /// Returns the number of completed rounds. A round interrupted by
    /// cancellation is not counted.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::Sink`] if recording fails.
    pub fn run<S: SampleSink + ?Sized>(&self, sink: &mut S) -> Result<usize, CollectorError> {
        info!(
            "Collector polling {} streets every {:?}",
            self.streets.len(),
            self.schedule.interval
        );
        let mut rounds = 0;
        while !self.token.is_cancelled() {
            let started = Instant::now();
            match self.collect_round(sink) {
                Ok(report) => info!(
                    "Round {} done: {} recorded, {} failed",
                    rounds + 1,
                    report.recorded,
                    report.failures.len()
                ),
                Err(CollectorError::Cancelled) => break,
                Err(e) => return Err(e),
            }
            rounds += 1;
            if self.schedule.max_rounds.is_some_and(|max| rounds >= max) {
                break;
            }
            let wait = self.schedule.interval.saturating_sub(started.elapsed());
            if self.token.wait_timeout(wait) {
                break;
            }
        }
        info!("Collector stopped after {rounds} rounds");
        Ok(rounds)
    }
}

impl<P, C> CongestionCollector<P, C>
where
    P: FlowProvider + 'static,
    C: Clock + 'static,
{
    /// Run on a dedicated thread
    pub fn spawn<S: SampleSink + 'static>(self, mut sink: S) -> CollectorHandle<S> {
        let token = self.token.clone();
        let handle = std::thread::spawn(move || {
            let rounds = self.run(&mut sink)?;
            Ok((rounds, sink))
        });
        CollectorHandle { token, handle }
    }
}

/// A collector running on its own thread
pub struct CollectorHandle<S> {
    token: CancellationToken,
    handle: JoinHandle<Result<(usize, S), CollectorError>>,
}

impl<S> CollectorHandle<S> {
    /// Ask the collector to stop; wakes it if sleeping
    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the thread, returning the completed rounds and the sink
    ///
    /// # Errors
    ///
    /// Returns the error that ended the run.
    ///
    /// # Panics
    ///
    /// Resumes the collector thread's panic, if it panicked.
    pub fn join(self) -> Result<(usize, S), CollectorError> {
        match self.handle.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}
