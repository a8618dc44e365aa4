//! Radio contract consumed by the transmit loop.
//!
//! `send` only arms the transmitter. The outcome arrives later through the
//! radio IRQ, which turns the SubGhz IRQ status into [`EventBits`] with
//! [`post_tx_events`].

use crate::config::TxConfig;
use crate::event::{EventBits, EventSignal};

#[cfg(feature = "embedded")]
pub mod subghz;

/// SubGhz IRQ status bit: packet transmission completed.
pub const IRQ_TX_DONE: u16 = 1 << 0;
/// SubGhz IRQ status bit: RX or TX timeout.
pub const IRQ_TIMEOUT: u16 = 1 << 9;

pub trait RadioLink {
    type Error;

    fn set_channel(&mut self, freq_hz: u32) -> Result<(), Self::Error>;

    fn configure_tx(&mut self, config: TxConfig) -> Result<(), Self::Error>;

    /// Arms one transmission and returns without waiting for it.
    fn send(&mut self, payload: &[u8]) -> Result<(), Self::Error>;

    fn sleep(&mut self) -> Result<(), Self::Error>;
}

impl<T: RadioLink + ?Sized> RadioLink for &mut T {
    type Error = T::Error;

    fn set_channel(&mut self, freq_hz: u32) -> Result<(), Self::Error> {
        (**self).set_channel(freq_hz)
    }

    fn configure_tx(&mut self, config: TxConfig) -> Result<(), Self::Error> {
        (**self).configure_tx(config)
    }

    fn send(&mut self, payload: &[u8]) -> Result<(), Self::Error> {
        (**self).send(payload)
    }

    fn sleep(&mut self) -> Result<(), Self::Error> {
        (**self).sleep()
    }
}

/// Maps a raw IRQ status word to the TX outcome bits it carries.
pub const fn tx_events(irq_status: u16) -> EventBits {
    let mut bits = 0;

    if irq_status & IRQ_TX_DONE != 0 {
        bits |= EventBits::TX_DONE.bits();
    }
    if irq_status & IRQ_TIMEOUT != 0 {
        bits |= EventBits::TX_TIMEOUT.bits();
    }

    EventBits::from_bits(bits)
}

/// Radio IRQ body. Runs in interrupt context: no logging, no blocking.
#[inline]
pub fn post_tx_events(irq_status: u16, events: &EventSignal) {
    events.post(tx_events(irq_status));
}

/// [`RadioLink`] over a radio shared with the IRQ handler through an RTIC lock.
#[cfg(feature = "embedded")]
pub struct SharedRadio<M>(pub M);

#[cfg(feature = "embedded")]
impl<M> RadioLink for SharedRadio<M>
where
    M: rtic::Mutex<T = subghz::SubGhzRadio>,
{
    type Error = stm32wlxx_hal::subghz::Error;

    fn set_channel(&mut self, freq_hz: u32) -> Result<(), Self::Error> {
        self.0.lock(|radio| radio.set_channel(freq_hz))
    }

    fn configure_tx(&mut self, config: TxConfig) -> Result<(), Self::Error> {
        self.0.lock(|radio| radio.configure_tx(config))
    }

    fn send(&mut self, payload: &[u8]) -> Result<(), Self::Error> {
        self.0.lock(|radio| radio.send(payload))
    }

    fn sleep(&mut self) -> Result<(), Self::Error> {
        self.0.lock(|radio| radio.sleep())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn irq_status_maps_to_outcome_bits() {
        assert_eq!(tx_events(IRQ_TX_DONE), EventBits::TX_DONE);
        assert_eq!(tx_events(IRQ_TIMEOUT), EventBits::TX_TIMEOUT);
        assert_eq!(tx_events(IRQ_TX_DONE | IRQ_TIMEOUT), EventBits::TX_ANY);
        // RxDone, CRC error and friends are not TX outcomes
        assert_eq!(tx_events(0b0000_0000_0100_0010), EventBits::NONE);
    }

    #[test]
    fn unrelated_irq_posts_nothing() {
        let events = EventSignal::new();

        post_tx_events(1 << 1, &events);
        assert!(events.pending().is_empty());

        post_tx_events(IRQ_TIMEOUT, &events);
        assert_eq!(events.pending(), EventBits::TX_TIMEOUT);
    }
}
