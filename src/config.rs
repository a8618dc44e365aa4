//! Fixed node configuration: LoRa TX parameters, payload and cycle timing.

use heapless::Vec;

use crate::error::ConfigError;

/// Largest LoRa payload the SubGhz buffer takes in one frame.
pub const MAX_PAYLOAD_LEN: usize = 255;

pub type Payload = Vec<u8, MAX_PAYLOAD_LEN>;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bandwidth {
    Bw125,
    Bw250,
    Bw500,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpreadingFactor {
    Sf5,
    Sf6,
    Sf7,
    Sf8,
    Sf9,
    Sf10,
    Sf11,
    Sf12,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodingRate {
    Cr45,
    Cr46,
    Cr47,
    Cr48,
}

/// LoRa transmit parameters, set once at startup.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxConfig {
    /// Output power in dBm.
    pub power: i8,
    pub bandwidth: Bandwidth,
    pub spreading_factor: SpreadingFactor,
    pub coding_rate: CodingRate,
    /// Preamble length in symbols.
    pub preamble_len: u16,
    /// Implicit header when set, explicit (variable length) otherwise.
    pub fixed_length: bool,
    pub crc_enabled: bool,
    pub frequency_hopping: bool,
    pub hop_period: u8,
    pub invert_iq: bool,
    /// The radio's own TX timeout; the controller never adds one of its own.
    pub timeout_ms: u32,
}

impl TxConfig {
    pub const MIN_POWER_DBM: i8 = -9;
    pub const MAX_POWER_DBM: i8 = 22;

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(Self::MIN_POWER_DBM..=Self::MAX_POWER_DBM).contains(&self.power) {
            return Err(ConfigError::PowerOutOfRange);
        }

        // the SubGhz modem has no FHSS
        if self.frequency_hopping {
            return Err(ConfigError::HoppingUnsupported);
        }

        if self.timeout_ms == 0 || self.timeout_ms == u32::MAX {
            return Err(ConfigError::NoTxTimeout);
        }

        if self.preamble_len == 0 {
            return Err(ConfigError::NoPreamble);
        }

        Ok(())
    }

    /// Low data rate optimisation is mandatory once a symbol exceeds 16 ms.
    pub fn low_data_rate_optimize(&self) -> bool {
        self.bandwidth == Bandwidth::Bw125 && self.spreading_factor >= SpreadingFactor::Sf11
    }
}

/// Everything the node needs to know before the scheduler starts.
#[derive(Debug, Clone, Copy)]
pub struct NodeConfig {
    pub channel_hz: u32,
    pub tx: TxConfig,
    pub payload: &'static [u8],
    /// How long the outcome pattern stays lit.
    pub post_delay_ms: u32,
    /// How long the LEDs stay dark before the next send.
    pub idle_delay_ms: u32,
}

impl NodeConfig {
    pub const MIN_CHANNEL_HZ: u32 = 150_000_000;
    pub const MAX_CHANNEL_HZ: u32 = 960_000_000;

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(Self::MIN_CHANNEL_HZ..=Self::MAX_CHANNEL_HZ).contains(&self.channel_hz) {
            return Err(ConfigError::FrequencyOutOfRange);
        }

        self.tx.validate()?;
        self.build_payload().map(|_| ())
    }

    pub fn build_payload(&self) -> Result<Payload, ConfigError> {
        if self.payload.is_empty() {
            return Err(ConfigError::EmptyPayload);
        }

        Vec::from_slice(self.payload).map_err(|_| ConfigError::PayloadTooLong)
    }

    pub fn timing(&self, tick_hz: u32) -> CycleTiming {
        CycleTiming::from_millis(self.post_delay_ms, self.idle_delay_ms, tick_hz)
    }
}

/// Converts wall-clock milliseconds to scheduler ticks, rounding up.
pub const fn ms_to_ticks(ms: u32, tick_hz: u32) -> u32 {
    let ticks = (ms as u64 * tick_hz as u64 + 999) / 1000;

    if ticks > u32::MAX as u64 {
        u32::MAX
    } else {
        ticks as u32
    }
}

/// Hold durations of one cycle, in scheduler ticks.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleTiming {
    pub post_delay: u32,
    pub idle_delay: u32,
}

impl CycleTiming {
    pub const fn from_millis(post_ms: u32, idle_ms: u32, tick_hz: u32) -> Self {
        CycleTiming {
            post_delay: ms_to_ticks(post_ms, tick_hz),
            idle_delay: ms_to_ticks(idle_ms, tick_hz),
        }
    }
}
