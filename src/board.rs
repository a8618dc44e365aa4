//! STM32WLE5 node: LEDs on PB5 (red) / PB4 (green), active-low button on PA0
//! with an external pull-up, RF switch on PB8 / PC13.

use cortex_m::interrupt;
use stm32wlxx_hal::{
    gpio::{pins, Exti, ExtiTrg, Input, Output, PortA, PortB, PortC, Pull},
    pac, rcc,
    spi::{SgMiso, SgMosi},
    subghz::SubGhz,
};

use crate::bootstrap::Platform;
use crate::constants::{LED_GPIO_OUTPUT_ARGS, RFSW_GPIO_OUTPUT_ARGS};
use crate::error::StartupError;
use crate::indicator::LedPair;
use crate::radio::subghz::{RfSwitch, SubGhzRadio};
use crate::reset::{Edge, ScbReset};

pub type BoardLeds = LedPair<Output<pins::B5>, Output<pins::B4>>;

/// The reset button. Its EXTI line stays configured for as long as this lives.
pub struct Button {
    _pin: Input<pins::A0>,
}

pub struct Board {
    rcc: pac::RCC,
    flash: pac::FLASH,
    pwr: pac::PWR,
    exti: pac::EXTI,
    syscfg: pac::SYSCFG,
    gpioa: Option<pac::GPIOA>,
    gpiob: Option<pac::GPIOB>,
    gpioc: Option<pac::GPIOC>,
    spi3: Option<pac::SPI3>,
    subghz: Option<SubGhz<SgMiso, SgMosi>>,
    led_pins: Option<(pins::B5, pins::B4)>,
    button_pin: Option<pins::A0>,
    rf_sw_pins: Option<(pins::B8, pins::C13)>,
}

impl Board {
    pub fn new(dp: pac::Peripherals) -> Self {
        Board {
            rcc: dp.RCC,
            flash: dp.FLASH,
            pwr: dp.PWR,
            exti: dp.EXTI,
            syscfg: dp.SYSCFG,
            gpioa: Some(dp.GPIOA),
            gpiob: Some(dp.GPIOB),
            gpioc: Some(dp.GPIOC),
            spi3: Some(dp.SPI3),
            subghz: None,
            led_pins: None,
            button_pin: None,
            rf_sw_pins: None,
        }
    }
}

impl Platform for Board {
    type Leds = BoardLeds;
    type Button = Button;
    type Radio = SubGhzRadio;
    type Reset = ScbReset;

    fn init_general(&mut self) -> Result<(), StartupError> {
        let (gpioa, gpiob, gpioc) = match (self.gpioa.take(), self.gpiob.take(), self.gpioc.take()) {
            (Some(a), Some(b), Some(c)) => (a, b, c),
            _ => return Err(StartupError::Board),
        };

        interrupt::free(|cs| unsafe {
            // 16 MHz MSI needs no flash wait states
            rcc::set_sysclk_msi(
                &mut self.flash,
                &mut self.pwr,
                &mut self.rcc,
                rcc::MsiRange::Range16M,
                cs,
            );
        });

        // HSE32 clocks the radio, no TCXO on this board
        if self.rcc.cr.read().hserdy().bit_is_clear() {
            self.rcc.cr.modify(|_, w| w.hseon().set_bit());
            while self.rcc.cr.read().hserdy().bit_is_clear() {}
        }

        let io_a = PortA::split(gpioa, &mut self.rcc);
        let io_b = PortB::split(gpiob, &mut self.rcc);
        let io_c = PortC::split(gpioc, &mut self.rcc);

        self.led_pins = Some((io_b.b5, io_b.b4));
        self.button_pin = Some(io_a.a0);
        self.rf_sw_pins = Some((io_b.b8, io_c.c13));

        defmt::info!("board: clocks up, GPIO split");
        Ok(())
    }

    fn init_spi(&mut self) -> Result<(), StartupError> {
        let spi3 = self.spi3.take().ok_or(StartupError::Spi)?;
        self.subghz = Some(SubGhz::new(spi3, &mut self.rcc));

        Ok(())
    }

    fn init_radio_stack(&mut self) -> Result<SubGhzRadio, StartupError> {
        let radio = self.subghz.take().ok_or(StartupError::RadioStack)?;
        let (sw_1, sw_2) = self.rf_sw_pins.take().ok_or(StartupError::RadioStack)?;

        let rf_sw = interrupt::free(|cs| {
            RfSwitch::new(
                Output::new(sw_1, &RFSW_GPIO_OUTPUT_ARGS, cs),
                Output::new(sw_2, &RFSW_GPIO_OUTPUT_ARGS, cs),
            )
        });

        SubGhzRadio::new(radio, rf_sw).map_err(|e| {
            defmt::error!("board: SubGhz setup failed: {}", e);
            StartupError::RadioStack
        })
    }

    fn open_leds(&mut self) -> Result<BoardLeds, StartupError> {
        let (red, green) = self.led_pins.take().ok_or(StartupError::LedPins)?;

        Ok(interrupt::free(|cs| {
            LedPair::new(
                Output::new(red, &LED_GPIO_OUTPUT_ARGS, cs),
                Output::new(green, &LED_GPIO_OUTPUT_ARGS, cs),
            )
        }))
    }

    fn open_button(&mut self, edge: Edge) -> Result<Button, StartupError> {
        let pin = self.button_pin.take().ok_or(StartupError::ButtonPin)?;
        let pin = interrupt::free(|cs| Input::new(pin, Pull::None, cs));

        let trg = match edge {
            Edge::Rising => ExtiTrg::Rising,
            Edge::Falling => ExtiTrg::Falling,
        };
        pins::A0::setup_exti_c1(&mut self.exti, &mut self.syscfg, trg);
        pins::A0::clear_exti();

        Ok(Button { _pin: pin })
    }

    fn reset_controller(&mut self) -> ScbReset {
        ScbReset
    }
}
