//! One-time startup: board init, radio configuration, pin acquisition.
//!
//! Any failure aborts the whole sequence; there is no degraded mode.

use crate::config::{CycleTiming, NodeConfig, Payload};
use crate::error::StartupError;
use crate::indicator::{Indicator, Pattern};
use crate::radio::RadioLink;
use crate::reset::{Edge, ResetGuard, SystemReset};

/// Board bring-up steps, in the order [`bring_up`] calls them.
pub trait Platform {
    type Leds: Indicator;
    type Button;
    type Radio: RadioLink;
    type Reset: SystemReset;

    /// Clocks and GPIO ports.
    fn init_general(&mut self) -> Result<(), StartupError>;

    /// The bus the radio hangs off. Must come before [`Platform::init_radio_stack`].
    fn init_spi(&mut self) -> Result<(), StartupError>;

    fn init_radio_stack(&mut self) -> Result<Self::Radio, StartupError>;

    fn open_leds(&mut self) -> Result<Self::Leds, StartupError>;

    /// Opens the button input with its interrupt on `edge`.
    fn open_button(&mut self, edge: Edge) -> Result<Self::Button, StartupError>;

    fn reset_controller(&mut self) -> Self::Reset;
}

pub struct Node<P: Platform> {
    pub radio: P::Radio,
    pub leds: P::Leds,
    pub reset_guard: ResetGuard<P::Button, P::Reset>,
    pub payload: Payload,
    pub timing: CycleTiming,
}

pub fn bring_up<P: Platform>(
    platform: &mut P,
    config: &NodeConfig,
    tick_hz: u32,
) -> Result<Node<P>, StartupError> {
    config.validate()?;

    platform.init_general()?;
    platform.init_spi()?;
    let mut radio = platform.init_radio_stack()?;

    radio
        .set_channel(config.channel_hz)
        .map_err(|_| StartupError::RadioConfig)?;
    radio
        .configure_tx(config.tx)
        .map_err(|_| StartupError::RadioConfig)?;

    let mut leds = platform.open_leds()?;
    leds.set_pattern(Pattern::Off);

    let button = platform.open_button(Edge::Falling)?;
    let reset_guard = ResetGuard::arm(button, platform.reset_controller());

    let payload = config.build_payload()?;
    let timing = config.timing(tick_hz);

    info!(
        "bootstrap: node up, {} Hz, {} byte payload",
        config.channel_hz,
        payload.len()
    );

    Ok(Node {
        radio,
        leds,
        reset_guard,
        payload,
        timing,
    })
}
