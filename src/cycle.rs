//! The transmit loop: send, wait for the radio's verdict, show it, sleep, repeat.
//!
//! ```text
//! Idle -> Sending -> AwaitingResult -> Indicating -> Sleeping -+
//!           ^                                                  |
//!           +--------------------------------------------------+
//! ```
//!
//! The task suspends in exactly three places: the event wait and the two
//! holds. There is no timeout at this layer, the radio's own TX timeout is
//! the only one.

use core::convert::Infallible;

use crate::config::CycleTiming;
use crate::error::CycleError;
use crate::event::{EventBits, EventSignal};
use crate::indicator::{Indicator, Pattern};
use crate::radio::RadioLink;

/// Timed suspension of the calling task, in scheduler ticks.
#[allow(async_fn_in_trait)]
pub trait TaskSleep {
    async fn sleep_ticks(&mut self, ticks: u32);
}

#[allow(async_fn_in_trait)]
impl<T: TaskSleep + ?Sized> TaskSleep for &mut T {
    async fn sleep_ticks(&mut self, ticks: u32) {
        (**self).sleep_ticks(ticks).await
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleState {
    Idle,
    Sending,
    AwaitingResult,
    Indicating,
    Sleeping,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    Pending,
    Sent,
    TimedOut,
    /// Woke with no outcome bit, or with both. Should not happen with a sane driver.
    /// The empty case cannot come out of [`EventSignal::wait_any`], which only resolves on a set bit.
    Abnormal(EventBits),
}

impl Outcome {
    pub fn from_bits(bits: EventBits) -> Self {
        let tx = bits & EventBits::TX_ANY;

        if tx == EventBits::TX_DONE {
            Outcome::Sent
        } else if tx == EventBits::TX_TIMEOUT {
            Outcome::TimedOut
        } else {
            Outcome::Abnormal(bits)
        }
    }

    pub fn pattern(self) -> Pattern {
        match self {
            Outcome::Pending => Pattern::Off,
            Outcome::Sent => Pattern::Green,
            Outcome::TimedOut => Pattern::Red,
            Outcome::Abnormal(_) => Pattern::Both,
        }
    }
}

/// One pass through the loop.
#[derive(Debug, Clone, Copy)]
pub struct Cycle<'a> {
    pub payload: &'a [u8],
    pub timing: CycleTiming,
    outcome: Outcome,
}

impl<'a> Cycle<'a> {
    pub fn new(payload: &'a [u8], timing: CycleTiming) -> Self {
        Cycle {
            payload,
            timing,
            outcome: Outcome::Pending,
        }
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Settles the outcome from the consumed bits. Only the first call counts.
    pub fn resolve(&mut self, bits: EventBits) -> Outcome {
        if self.outcome == Outcome::Pending {
            self.outcome = Outcome::from_bits(bits);
        }

        self.outcome
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleStats {
    pub sent: u32,
    pub timed_out: u32,
    pub abnormal: u32,
}

impl CycleStats {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Sent => self.sent = self.sent.wrapping_add(1),
            Outcome::TimedOut => self.timed_out = self.timed_out.wrapping_add(1),
            Outcome::Abnormal(_) => self.abnormal = self.abnormal.wrapping_add(1),
            Outcome::Pending => {}
        }
    }

    pub fn total(&self) -> u32 {
        self.sent
            .wrapping_add(self.timed_out)
            .wrapping_add(self.abnormal)
    }
}

pub struct TransmitCycle<'a, R, I, S> {
    radio: R,
    indicator: I,
    sleeper: S,
    events: &'a EventSignal,
    payload: &'a [u8],
    timing: CycleTiming,
    state: CycleState,
    stats: CycleStats,
}

impl<'a, R, I, S> TransmitCycle<'a, R, I, S>
where
    R: RadioLink,
    I: Indicator,
    S: TaskSleep,
{
    pub fn new(
        radio: R,
        indicator: I,
        sleeper: S,
        events: &'a EventSignal,
        payload: &'a [u8],
        timing: CycleTiming,
    ) -> Self {
        TransmitCycle {
            radio,
            indicator,
            sleeper,
            events,
            payload,
            timing,
            state: CycleState::Idle,
            stats: CycleStats::default(),
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    /// Runs cycles until the radio driver fails.
    pub async fn run(&mut self) -> Result<Infallible, CycleError<R::Error>> {
        info!(
            "cycle: starting, hold {} ticks, idle {} ticks",
            self.timing.post_delay,
            self.timing.idle_delay
        );

        loop {
            self.run_cycle().await?;
        }
    }

    pub async fn run_cycle(&mut self) -> Result<Outcome, CycleError<R::Error>> {
        let mut cycle = Cycle::new(self.payload, self.timing);

        self.state = CycleState::Sending;
        // anything posted since the last consume belongs to an older frame
        if let Some(stale) = self.events.take(EventBits::TX_ANY) {
            warn!("cycle: dropping stale events {:?}", stale);
        }
        self.radio.send(cycle.payload).map_err(CycleError::Send)?;

        self.state = CycleState::AwaitingResult;
        let bits = self.events.wait_any(EventBits::TX_ANY).await;

        self.state = CycleState::Indicating;
        let outcome = cycle.resolve(bits);
        self.indicator.set_pattern(outcome.pattern());
        self.radio.sleep().map_err(CycleError::Sleep)?;

        self.stats.record(outcome);
        match outcome {
            Outcome::Sent => debug!("cycle {}: sent", self.stats.total()),
            Outcome::TimedOut => warn!("cycle {}: TX timeout", self.stats.total()),
            _ => error!("cycle {}: abnormal wake {:?}", self.stats.total(), bits),
        }

        self.state = CycleState::Sleeping;
        self.sleeper.sleep_ticks(cycle.timing.post_delay).await;
        self.indicator.set_pattern(Pattern::Off);
        self.sleeper.sleep_ticks(cycle.timing.idle_delay).await;

        Ok(outcome)
    }
}
