//! Turns a charge bucket into levels for the LED bar.

use embedded_hal::digital::v2::OutputPin;

use crate::charge::ChargeBucket;

/// Indicators on the bar
pub const INDICATORS: usize = 5;

/// One position on the bar, or one output of the indicator bank
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Indicator {
    Led0,
    Led1,
    Led2,
    Led3,
    Led4,
}

impl Indicator {
    pub const ALL: [Indicator; INDICATORS] = [
        Indicator::Led0,
        Indicator::Led1,
        Indicator::Led2,
        Indicator::Led3,
        Indicator::Led4,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// One level per indicator, slot 0 being the most significant
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OutputPattern {
    levels: [bool; INDICATORS],
}

impl OutputPattern {
    pub const OFF: OutputPattern = OutputPattern {
        levels: [false; INDICATORS],
    };

    /// The first `lit` slots on, the rest off
    pub fn bar(lit: usize) -> Self {
        let mut pattern = OutputPattern::OFF;
        for level in pattern.levels.iter_mut().take(lit) {
            *level = true;
        }
        pattern
    }

    pub fn level(&self, slot: Indicator) -> bool {
        self.levels[slot.index()]
    }

    pub fn lit(&self) -> usize {
        self.levels.iter().filter(|&&level| level).count()
    }

    /// `(slot, level)` pairs in slot order
    pub fn iter(&self) -> impl Iterator<Item = (Indicator, bool)> + '_ {
        Indicator::ALL.iter().copied().zip(self.levels.iter().copied())
    }
}

/// Renders buckets, keeping the blink state for the invalid pattern.
///
/// `Invalid` lights only the diagnostic slot, on every other call starting with the first.
/// All other slots are driven off.
pub struct StatusRenderer {
    diagnostic_slot: Indicator,
    blink: u8,
}

impl StatusRenderer {
    pub const fn new(diagnostic_slot: Indicator) -> Self {
        StatusRenderer {
            diagnostic_slot,
            blink: 0,
        }
    }

    pub fn render(&mut self, bucket: ChargeBucket) -> OutputPattern {
        match bucket {
            ChargeBucket::Invalid => {
                self.blink = self.blink.wrapping_add(1);
                let mut pattern = OutputPattern::OFF;
                pattern.levels[self.diagnostic_slot.index()] = self.blink % 2 == 1;
                pattern
            }
            bucket => OutputPattern::bar(bucket.lit()),
        }
    }
}

/// Something that can drive the five indicator outputs
pub trait Indicators {
    type Error;

    fn set_level(&mut self, output: Indicator, level: bool) -> Result<(), Self::Error>;
}

/// Writes every slot of `pattern` to the output `wiring[slot]`
pub fn apply<I: Indicators>(
    pattern: &OutputPattern,
    wiring: &[Indicator; INDICATORS],
    indicators: &mut I,
) -> Result<(), I::Error> {
    for (slot, level) in pattern.iter() {
        indicators.set_level(wiring[slot.index()], level)?;
    }
    Ok(())
}

/// Five output pins used as a bar, `Led0` being field 0
pub struct IndicatorPins<P0, P1, P2, P3, P4>(pub P0, pub P1, pub P2, pub P3, pub P4);

impl<E, P0, P1, P2, P3, P4> Indicators for IndicatorPins<P0, P1, P2, P3, P4>
where
    P0: OutputPin<Error = E>,
    P1: OutputPin<Error = E>,
    P2: OutputPin<Error = E>,
    P3: OutputPin<Error = E>,
    P4: OutputPin<Error = E>,
{
    type Error = E;

    fn set_level(&mut self, output: Indicator, level: bool) -> Result<(), E> {
        match output {
            Indicator::Led0 => drive(&mut self.0, level),
            Indicator::Led1 => drive(&mut self.1, level),
            Indicator::Led2 => drive(&mut self.2, level),
            Indicator::Led3 => drive(&mut self.3, level),
            Indicator::Led4 => drive(&mut self.4, level),
        }
    }
}

fn drive<P: OutputPin>(pin: &mut P, level: bool) -> Result<(), P::Error> {
    if level {
        pin.set_high()
    } else {
        pin.set_low()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fake::FakeLeds;
    use super::Indicator::*;

    const STRAIGHT: [Indicator; INDICATORS] = [Led0, Led1, Led2, Led3, Led4];
    const REVERSED: [Indicator; INDICATORS] = [Led4, Led3, Led2, Led1, Led0];

    #[derive(Default)]
    struct Pin {
        high: bool,
    }

    impl OutputPin for Pin {
        type Error = ();

        fn set_low(&mut self) -> Result<(), ()> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), ()> {
            self.high = true;
            Ok(())
        }
    }

    #[test]
    fn buckets_light_a_shrinking_bar() {
        let mut renderer = StatusRenderer::new(Led0);
        let expected = [
            (ChargeBucket::Full, [true, true, true, true, true]),
            (ChargeBucket::Under80, [true, true, true, true, false]),
            (ChargeBucket::Under60, [true, true, true, false, false]),
            (ChargeBucket::Under40, [true, true, false, false, false]),
            (ChargeBucket::Under20, [true, false, false, false, false]),
        ];
        for &(bucket, levels) in expected.iter() {
            assert_eq!(renderer.render(bucket), OutputPattern { levels });
        }
    }

    #[test]
    fn invalid_blinks_the_diagnostic_slot() {
        let mut renderer = StatusRenderer::new(Led4);

        let first = renderer.render(ChargeBucket::Invalid);
        let second = renderer.render(ChargeBucket::Invalid);
        let third = renderer.render(ChargeBucket::Invalid);

        assert!(first.level(Led4));
        assert!(!second.level(Led4));
        assert!(third.level(Led4));
        for pattern in [first, second, third].iter() {
            assert!(pattern.iter().all(|(slot, level)| slot == Led4 || !level));
        }
    }

    #[test]
    fn valid_bucket_does_not_reset_blink() {
        let mut renderer = StatusRenderer::new(Led0);
        assert!(renderer.render(ChargeBucket::Invalid).level(Led0));
        renderer.render(ChargeBucket::Full);
        assert!(!renderer.render(ChargeBucket::Invalid).level(Led0));
    }

    #[test]
    fn apply_follows_wiring() {
        let mut leds = FakeLeds::default();
        apply(&OutputPattern::bar(2), &REVERSED, &mut leds).unwrap();
        assert_eq!(leds.levels, [false, false, false, true, true]);
        assert_eq!(leds.writes, INDICATORS);
    }

    #[test]
    fn apply_stops_on_error() {
        let mut leds = FakeLeds {
            fail: true,
            ..FakeLeds::default()
        };
        assert_eq!(apply(&OutputPattern::bar(5), &STRAIGHT, &mut leds), Err(()));
        assert_eq!(leds.writes, 0);
    }

    #[test]
    fn pins_follow_levels() {
        let mut pins = IndicatorPins(
            Pin::default(),
            Pin::default(),
            Pin::default(),
            Pin::default(),
            Pin::default(),
        );
        apply(&OutputPattern::bar(3), &STRAIGHT, &mut pins).unwrap();
        assert!(pins.0.high && pins.1.high && pins.2.high);
        assert!(!pins.3.high && !pins.4.high);

        pins.set_level(Led4, true).unwrap();
        assert!(pins.4.high);
    }

    #[test]
    fn every_slot_is_renderable_as_diagnostic() {
        for (position, &slot) in Indicator::ALL.iter().enumerate() {
            assert_eq!(slot.index(), position);

            let mut renderer = StatusRenderer::new(slot);
            let pattern = renderer.render(ChargeBucket::Invalid);
            assert_eq!(pattern.lit(), 1);
            assert!(pattern.level(slot));
        }
    }

    #[test]
    fn bar_counts() {
        assert_eq!(OutputPattern::bar(3).lit(), 3);
        assert_eq!(OutputPattern::bar(9).lit(), INDICATORS);
        assert_eq!(OutputPattern::OFF.lit(), 0);
    }
}
