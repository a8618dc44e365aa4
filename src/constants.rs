use crate::config::{Bandwidth, CodingRate, NodeConfig, SpreadingFactor, TxConfig};

/// Scheduler tick rate (SysTick monotonic), 1 ms granularity.
pub const TICK_HZ: u32 = 1_000;

/// SYSCLK after `Board::init_general` (MSI range 16 MHz), feeds SysTick.
pub const SYSCLK_HZ: u32 = 16_000_000;

pub const RF_FREQUENCY_HZ: u32 = 915_000_000;

pub const PAYLOAD: &[u8] = b"Hello air space!";

pub const POST_DELAY_MS: u32 = 1_000;
pub const IDLE_DELAY_MS: u32 = 3_000;

/// One heartbeat phase; the dark phase lasts three of these.
pub const HEARTBEAT_PHASE_MS: u32 = 1_000;

pub const TX_CONFIG: TxConfig = TxConfig {
    power: 14,
    bandwidth: Bandwidth::Bw125,
    spreading_factor: SpreadingFactor::Sf7,
    coding_rate: CodingRate::Cr45,
    preamble_len: 8,
    fixed_length: false,
    crc_enabled: true,
    frequency_hopping: false,
    hop_period: 0,
    invert_iq: false,
    timeout_ms: 3_000,
};

pub const NODE_CONFIG: NodeConfig = NodeConfig {
    channel_hz: RF_FREQUENCY_HZ,
    tx: TX_CONFIG,
    payload: PAYLOAD,
    post_delay_ms: POST_DELAY_MS,
    idle_delay_ms: IDLE_DELAY_MS,
};

#[cfg(feature = "embedded")]
pub use self::gpio_args::*;

#[cfg(feature = "embedded")]
mod gpio_args {
    use stm32wlxx_hal::gpio;

    pub const RFSW_GPIO_OUTPUT_ARGS: gpio::OutputArgs = gpio::OutputArgs {
        level: gpio::PinState::Low,
        speed: gpio::Speed::High,
        ot: gpio::OutputType::PushPull,
        pull: gpio::Pull::Up,
    };

    pub const LED_GPIO_OUTPUT_ARGS: gpio::OutputArgs = gpio::OutputArgs {
        level: gpio::PinState::Low,
        speed: gpio::Speed::Low,
        ot: gpio::OutputType::PushPull,
        pull: gpio::Pull::None,
    };
}
