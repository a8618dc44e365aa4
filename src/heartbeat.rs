//! Radio-less blink loop: red, green, then a long dark phase.

use core::convert::Infallible;

use crate::config::ms_to_ticks;
use crate::cycle::TaskSleep;
use crate::indicator::{Indicator, Pattern};
use crate::radio::RadioLink;

/// Dark phase length, in phases.
const DARK_PHASES: u32 = 3;

pub struct Heartbeat<I, S> {
    indicator: I,
    sleeper: S,
    phase_ticks: u32,
}

impl<I: Indicator, S: TaskSleep> Heartbeat<I, S> {
    pub fn new(indicator: I, sleeper: S, phase_ms: u32, tick_hz: u32) -> Self {
        Heartbeat {
            indicator,
            sleeper,
            phase_ticks: ms_to_ticks(phase_ms, tick_hz),
        }
    }

    /// Parks the radio once, then blinks forever.
    pub async fn run<R: RadioLink>(&mut self, mut radio: R) -> Result<Infallible, R::Error> {
        radio.sleep()?;
        info!("heartbeat: radio asleep, phase {} ticks", self.phase_ticks);

        loop {
            self.run_cycle().await;
        }
    }

    pub async fn run_cycle(&mut self) {
        self.indicator.set_pattern(Pattern::Red);
        self.sleeper.sleep_ticks(self.phase_ticks).await;

        self.indicator.set_pattern(Pattern::Green);
        self.sleeper.sleep_ticks(self.phase_ticks).await;

        self.indicator.set_pattern(Pattern::Off);
        self.sleeper
            .sleep_ticks(self.phase_ticks.saturating_mul(DARK_PHASES))
            .await;
    }
}
