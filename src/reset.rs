//! Button-driven hard reset.
//!
//! The button handler preempts the controller at any instruction, so the
//! guard does nothing but request the reset: it never locks, logs, or
//! touches the LEDs, the radio or the event flags.

/// Input edge the button interrupt fires on.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Rising,
    Falling,
}

/// Irreversible restart of the whole device.
pub trait SystemReset {
    fn system_reset(&self) -> !;
}

pub struct ResetGuard<B, R> {
    _button: B,
    reset: R,
}

impl<B, R: SystemReset> ResetGuard<B, R> {
    /// Takes ownership of an edge-configured button so nothing else can reconfigure it.
    pub fn arm(button: B, reset: R) -> Self {
        ResetGuard {
            _button: button,
            reset,
        }
    }

    /// Called from the button interrupt.
    #[inline(always)]
    pub fn trigger(&self) -> ! {
        self.reset.system_reset()
    }
}

/// AIRCR-based reset through the Cortex-M SCB.
#[cfg(feature = "embedded")]
#[derive(Clone, Copy, Default)]
pub struct ScbReset;

#[cfg(feature = "embedded")]
impl SystemReset for ScbReset {
    fn system_reset(&self) -> ! {
        cortex_m::peripheral::SCB::sys_reset()
    }
}
