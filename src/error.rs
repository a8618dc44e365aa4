/// Rejected compile-time configuration.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    FrequencyOutOfRange,
    PowerOutOfRange,
    HoppingUnsupported,
    NoTxTimeout,
    NoPreamble,
    EmptyPayload,
    PayloadTooLong,
}

/// Startup failures. All of them abort before the scheduler starts.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartupError {
    Board,
    Spi,
    RadioStack,
    RadioConfig,
    LedPins,
    ButtonPin,
    Config(ConfigError),
}

impl From<ConfigError> for StartupError {
    fn from(e: ConfigError) -> Self {
        StartupError::Config(e)
    }
}

/// Radio driver fault inside the transmit loop.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleError<E> {
    Send(E),
    Sleep(E),
}
