use core::convert::Infallible;

use embedded_hal::digital::v2::OutputPin;

/// What the red/green LED pair shows.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pattern {
    Off,
    Red,
    Green,
    Both,
}

impl Pattern {
    pub const fn red(self) -> bool {
        matches!(self, Pattern::Red | Pattern::Both)
    }

    pub const fn green(self) -> bool {
        matches!(self, Pattern::Green | Pattern::Both)
    }
}

/// Write-only status output. Only the controller task drives it.
pub trait Indicator {
    fn set_pattern(&mut self, pattern: Pattern);
}

impl<T: Indicator + ?Sized> Indicator for &mut T {
    fn set_pattern(&mut self, pattern: Pattern) {
        (**self).set_pattern(pattern)
    }
}

/// Two active-high LEDs on plain GPIO outputs.
pub struct LedPair<R, G> {
    red: R,
    green: G,
}

impl<R, G> LedPair<R, G>
where
    R: OutputPin<Error = Infallible>,
    G: OutputPin<Error = Infallible>,
{
    pub fn new(red: R, green: G) -> Self {
        let mut leds = LedPair { red, green };
        leds.set_pattern(Pattern::Off);
        leds
    }
}

fn drive<P: OutputPin<Error = Infallible>>(pin: &mut P, on: bool) {
    let res = if on { pin.set_high() } else { pin.set_low() };
    res.unwrap_or_else(|e| match e {})
}

impl<R, G> Indicator for LedPair<R, G>
where
    R: OutputPin<Error = Infallible>,
    G: OutputPin<Error = Infallible>,
{
    fn set_pattern(&mut self, pattern: Pattern) {
        drive(&mut self.red, pattern.red());
        drive(&mut self.green, pattern.green());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Pin {
        high: bool,
        writes: usize,
    }

    impl OutputPin for Pin {
        type Error = Infallible;

        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            self.writes += 1;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn new_pair_starts_dark() {
        let leds = LedPair::new(Pin { high: true, writes: 0 }, Pin::default());

        assert!(!leds.red.high);
        assert!(!leds.green.high);
        assert_eq!(leds.red.writes, 1);
    }

    #[test]
    fn patterns_map_to_pin_levels() {
        let mut leds = LedPair::new(Pin::default(), Pin::default());

        for (pattern, red, green) in [
            (Pattern::Red, true, false),
            (Pattern::Green, false, true),
            (Pattern::Both, true, true),
            (Pattern::Off, false, false),
        ] {
            leds.set_pattern(pattern);
            assert_eq!(leds.red.high, red, "{:?}", pattern);
            assert_eq!(leds.green.high, green, "{:?}", pattern);
        }
    }
}
