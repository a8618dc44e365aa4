use stm32wlxx_hal::{
    gpio::{
        pins::{B8, C13},
        Output,
    },
    spi::{SgMiso, SgMosi},
    subghz::{
        self, CalibrateImage, CfgIrq, CodingRate as SgCodingRate, FallbackMode, HeaderType, Irq,
        LoRaBandwidth, LoRaModParams, LoRaPacketParams, LoRaSyncWord, Ocp, PaConfig, PaSel,
        PacketType, RampTime, RegMode, RfFreq, SleepCfg, SpreadingFactor as SgSpreadingFactor,
        StandbyClk, Startup, SubGhz, Timeout, TxParams,
    },
};

use super::{RadioLink, IRQ_TIMEOUT, IRQ_TX_DONE};
use crate::config::{Bandwidth, CodingRate, SpreadingFactor, TxConfig};

const TX_BUF_OFFSET: u8 = 128;
const RX_BUF_OFFSET: u8 = 0;

const IRQ_CFG: CfgIrq = CfgIrq::new()
    .irq_enable_all(Irq::TxDone)
    .irq_enable_all(Irq::Timeout);

const _: () = assert!(Irq::TxDone.mask() == IRQ_TX_DONE);
const _: () = assert!(Irq::Timeout.mask() == IRQ_TIMEOUT);

/// The two RF switch control lines.
pub struct RfSwitch {
    ctrl_1: Output<B8>,
    ctrl_2: Output<C13>,
}

impl RfSwitch {
    pub fn new(ctrl_1: Output<B8>, ctrl_2: Output<C13>) -> Self {
        let mut sw = RfSwitch { ctrl_1, ctrl_2 };
        sw.off();
        sw
    }

    pub fn tx(&mut self) {
        self.ctrl_1.set_level_low();
        self.ctrl_2.set_level_high();
    }

    pub fn off(&mut self) {
        self.ctrl_1.set_level_low();
        self.ctrl_2.set_level_low();
    }
}

/// The STM32WL sub-GHz radio driven as a LoRa transmitter.
pub struct SubGhzRadio {
    radio: SubGhz<SgMiso, SgMosi>,
    rf_sw: RfSwitch,
    pkt_params: LoRaPacketParams,
    tx_timeout: Timeout,
    asleep: bool,
}

impl SubGhzRadio {
    pub fn new(radio: SubGhz<SgMiso, SgMosi>, rf_sw: RfSwitch) -> Result<Self, subghz::Error> {
        let mut this = SubGhzRadio {
            radio,
            rf_sw,
            pkt_params: LoRaPacketParams::new(),
            tx_timeout: Timeout::DISABLED,
            asleep: false,
        };
        this.setup()?;

        Ok(this)
    }

    fn setup(&mut self) -> Result<(), subghz::Error> {
        let radio = &mut self.radio;

        radio.set_standby(StandbyClk::Rc)?;
        radio.set_tx_rx_fallback_mode(FallbackMode::StandbyHse)?;
        radio.set_regulator_mode(RegMode::Smps)?;
        radio.set_buffer_base_address(TX_BUF_OFFSET, RX_BUF_OFFSET)?;
        radio.set_pa_ocp(Ocp::Max140m)?;
        radio.set_packet_type(PacketType::LoRa)?;
        radio.set_lora_sync_word(LoRaSyncWord::Public)?;
        radio.set_irq_cfg(&IRQ_CFG)?;

        defmt::info!("radio: SubGhz up, LoRa packet type");
        Ok(())
    }

    /// Reads and acknowledges the pending IRQ status. Called from the radio IRQ.
    pub fn take_irq_status(&mut self) -> Result<u16, subghz::Error> {
        let (_, irq) = self.radio.irq_status()?;
        self.radio.clear_irq_status(irq)?;

        Ok(irq)
    }

    fn wake(&mut self) -> Result<(), subghz::Error> {
        if self.asleep {
            // SAFETY: the radio is owned here and no SPI transfer is in flight
            unsafe { subghz::wakeup() };
            self.asleep = false;
        }

        self.radio.set_standby(StandbyClk::Rc)
    }
}

fn calibrate_image_for(freq_hz: u32) -> CalibrateImage {
    match freq_hz {
        902_000_000.. => CalibrateImage::ISM_902_928,
        863_000_000.. => CalibrateImage::ISM_863_870,
        779_000_000.. => CalibrateImage::ISM_779_787,
        470_000_000.. => CalibrateImage::ISM_470_510,
        _ => CalibrateImage::ISM_430_440,
    }
}

/// HP PA duty cycle and `hp_max` presets, picked by requested power.
fn pa_config_for(power: i8) -> PaConfig {
    let (duty, hp_max) = match power {
        21.. => (0x04, 0x07),
        18..=20 => (0x03, 0x05),
        15..=17 => (0x02, 0x03),
        _ => (0x02, 0x02),
    };

    PaConfig::new()
        .set_pa_duty_cycle(duty)
        .set_hp_max(hp_max)
        .set_pa(PaSel::Hp)
}

fn lora_mod_params(config: &TxConfig) -> LoRaModParams {
    let sf = match config.spreading_factor {
        SpreadingFactor::Sf5 => SgSpreadingFactor::Sf5,
        SpreadingFactor::Sf6 => SgSpreadingFactor::Sf6,
        SpreadingFactor::Sf7 => SgSpreadingFactor::Sf7,
        SpreadingFactor::Sf8 => SgSpreadingFactor::Sf8,
        SpreadingFactor::Sf9 => SgSpreadingFactor::Sf9,
        SpreadingFactor::Sf10 => SgSpreadingFactor::Sf10,
        SpreadingFactor::Sf11 => SgSpreadingFactor::Sf11,
        SpreadingFactor::Sf12 => SgSpreadingFactor::Sf12,
    };

    let bw = match config.bandwidth {
        Bandwidth::Bw125 => LoRaBandwidth::Bw125,
        Bandwidth::Bw250 => LoRaBandwidth::Bw250,
        Bandwidth::Bw500 => LoRaBandwidth::Bw500,
    };

    let cr = match config.coding_rate {
        CodingRate::Cr45 => SgCodingRate::Cr45,
        CodingRate::Cr46 => SgCodingRate::Cr46,
        CodingRate::Cr47 => SgCodingRate::Cr47,
        CodingRate::Cr48 => SgCodingRate::Cr48,
    };

    LoRaModParams::new()
        .set_sf(sf)
        .set_bw(bw)
        .set_cr(cr)
        .set_ldro_en(config.low_data_rate_optimize())
}

impl RadioLink for SubGhzRadio {
    type Error = subghz::Error;

    fn set_channel(&mut self, freq_hz: u32) -> Result<(), Self::Error> {
        self.wake()?;
        self.radio.calibrate_image(calibrate_image_for(freq_hz))?;
        self.radio.set_rf_frequency(&RfFreq::from_frequency(freq_hz))?;
        self.radio.set_standby(StandbyClk::Hse)?;

        defmt::info!("radio: channel {} Hz", freq_hz);
        Ok(())
    }

    fn configure_tx(&mut self, config: TxConfig) -> Result<(), Self::Error> {
        let header_type = if config.fixed_length {
            HeaderType::Fixed
        } else {
            HeaderType::Variable
        };

        let pa_config = pa_config_for(config.power);
        let tx_params = TxParams::new()
            .set_ramp_time(RampTime::Micros40)
            .set_power(config.power as u8);
        let mod_params = lora_mod_params(&config);

        self.pkt_params = LoRaPacketParams::new()
            .set_preamble_len(config.preamble_len)
            .set_header_type(header_type)
            .set_payload_len(0)
            .set_crc_en(config.crc_enabled)
            .set_invert_iq(config.invert_iq);
        self.tx_timeout = Timeout::from_millis_sat(config.timeout_ms);

        self.wake()?;
        self.radio.set_pa_config(&pa_config)?;
        self.radio.set_tx_params(&tx_params)?;
        self.radio.set_lora_mod_params(&mod_params)?;
        self.radio.set_lora_packet_params(&self.pkt_params)?;

        defmt::info!(
            "radio: TX config OK, PA config: {:?}, TxParams: {:?}, mod: {:?}",
            pa_config,
            tx_params,
            mod_params
        );
        Ok(())
    }

    fn send(&mut self, payload: &[u8]) -> Result<(), Self::Error> {
        self.wake()?;

        self.pkt_params = self.pkt_params.set_payload_len(payload.len() as u8);
        self.radio.set_lora_packet_params(&self.pkt_params)?;
        self.radio.write_buffer(TX_BUF_OFFSET, payload)?;

        // drop anything left over so the IRQ only reports this frame
        let (_, irq) = self.radio.irq_status()?;
        self.radio.clear_irq_status(irq)?;

        self.rf_sw.tx();
        self.radio.set_tx(self.tx_timeout)?;

        Ok(())
    }

    fn sleep(&mut self) -> Result<(), Self::Error> {
        self.rf_sw.off();

        if !self.asleep {
            let cfg = SleepCfg::new()
                .set_startup(Startup::Warm)
                .set_rtc_wakeup_en(false);
            // SAFETY: the next access is `send`, which wakes the radio first,
            // and the loop holds for far longer than the 500 us sleep settle time
            unsafe { self.radio.set_sleep(cfg)? };
            self.asleep = true;
        }

        Ok(())
    }
}
