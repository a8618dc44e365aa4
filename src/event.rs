//! Interrupt-to-task event flags.
//!
//! The radio IRQ posts outcome bits with [`EventSignal::post`]; the single
//! consumer task suspends in [`EventSignal::wait_any`] and takes the bits it
//! asked for in one atomic step, so a bit is observed at most once.

use core::future::poll_fn;
use core::ops::{BitAnd, BitOr};
use core::sync::atomic::{AtomicU8, Ordering};
use core::task::Poll;

use rtic_common::waker_registration::CriticalSectionWakerRegistration;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventBits(u8);

impl EventBits {
    pub const NONE: Self = Self(0);
    /// Radio finished transmitting the armed frame.
    pub const TX_DONE: Self = Self(1 << 0);
    /// Radio gave up on the armed frame after its own TX timeout.
    pub const TX_TIMEOUT: Self = Self(1 << 1);
    pub const TX_ANY: Self = Self(Self::TX_DONE.0 | Self::TX_TIMEOUT.0);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for EventBits {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for EventBits {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

pub struct EventSignal {
    pending: AtomicU8,
    waker: CriticalSectionWakerRegistration,
}

impl EventSignal {
    pub const fn new() -> Self {
        Self {
            pending: AtomicU8::new(0),
            waker: CriticalSectionWakerRegistration::new(),
        }
    }

    /// Sets `bits` and wakes the waiting task. Safe to call from interrupt context.
    pub fn post(&self, bits: EventBits) {
        if bits.is_empty() {
            return;
        }

        self.pending.fetch_or(bits.0, Ordering::AcqRel);
        self.waker.wake();
    }

    /// Suspends until any bit in `mask` is set, then clears and returns those bits.
    ///
    /// Bits outside `mask` stay pending. Only one task may wait at a time.
    pub async fn wait_any(&self, mask: EventBits) -> EventBits {
        poll_fn(|cx| {
            if let Some(bits) = self.take(mask) {
                return Poll::Ready(bits);
            }

            self.waker.register(cx.waker());

            // a post may have landed between the first take and the register
            match self.take(mask) {
                Some(bits) => Poll::Ready(bits),
                None => Poll::Pending,
            }
        })
        .await
    }

    /// Clears and returns the bits of `mask` that are set, if any.
    pub fn take(&self, mask: EventBits) -> Option<EventBits> {
        let prev = self.pending.fetch_and(!mask.0, Ordering::AcqRel);
        let taken = EventBits(prev & mask.0);

        if taken.is_empty() {
            None
        } else {
            Some(taken)
        }
    }

    /// Current flags, without consuming them.
    pub fn pending(&self) -> EventBits {
        EventBits(self.pending.load(Ordering::Acquire))
    }
}

impl Default for EventSignal {
    fn default() -> Self {
        Self::new()
    }
}
