#![cfg_attr(feature = "embedded", no_main)]
#![cfg_attr(feature = "embedded", no_std)]

#[cfg(feature = "embedded")]
use defmt_rtt as _; // global logger

#[cfg(feature = "embedded")]
use panic_probe as _;
#[cfg(feature = "embedded")]
use stm32wlxx_hal as _; // memory layout

#[macro_use]
mod fmt;

pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod cycle;
pub mod error;
pub mod event;
pub mod heartbeat;
pub mod indicator;
pub mod radio;
pub mod reset;

#[cfg(feature = "embedded")]
pub mod board;

// same panicking *behavior* as `panic-probe` but doesn't print a panic message
// this prevents the panic message being printed *twice* when `defmt::panic` is invoked
#[cfg(feature = "embedded")]
#[defmt::panic_handler]
fn panic() -> ! {
    cortex_m::asm::udf()
}

/// Aborts startup: logs the cause and halts before the scheduler runs anything.
#[cfg(feature = "embedded")]
pub fn fatal(err: error::StartupError) -> ! {
    defmt::error!("startup aborted: {}", err);
    cortex_m::asm::udf()
}
