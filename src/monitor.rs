//! The control loop: sample both dividers, classify, drive the bar, report.

use embedded_hal::blocking::delay::DelayMs;

use crate::adc::{AdcPeripheral, Channel, Polling, Precision, Sample, SampleSink};
use crate::cells::{classify_cells, CellCount};
use crate::charge::{classify, ChargeBucket};
use crate::diag::{self, Transmit};
use crate::status::{self, Indicators, OutputPattern, StatusRenderer};
use crate::target::Target;

/// Everything one cycle measured and decided
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Reading {
    /// Raw selector divider sample
    pub selector: Sample,
    /// Raw pack voltage sample
    pub ubat: Sample,
    pub voltage: f32,
    pub cells: Option<CellCount>,
    pub bucket: ChargeBucket,
    pub pattern: OutputPattern,
}

pub struct Monitor<'a> {
    target: &'a Target,
    renderer: StatusRenderer,
}

impl<'a> Monitor<'a> {
    pub fn new(target: &'a Target) -> Self {
        Monitor {
            target,
            renderer: StatusRenderer::new(target.diagnostic_slot),
        }
    }

    pub fn target(&self) -> &Target {
        self.target
    }

    /// Classifies a pair of raw samples and renders the result
    pub fn evaluate(&mut self, selector: Sample, ubat: Sample) -> Reading {
        let calibration = &self.target.calibration;
        let voltage = calibration.digits_to_volts(ubat);
        let cells = classify_cells(calibration, selector);
        let bucket = classify(calibration, cells, voltage);

        Reading {
            selector,
            ubat,
            voltage,
            cells,
            bucket,
            pattern: self.renderer.render(bucket),
        }
    }

    /// Runs one full cycle, including the trailing delay
    pub fn cycle<P, S, I, T, D>(
        &mut self,
        adc: &mut Polling<P, S>,
        indicators: &mut I,
        tx: &mut T,
        delay: &mut D,
    ) -> Result<Reading, I::Error>
    where
        P: AdcPeripheral,
        S: SampleSink,
        I: Indicators,
        T: Transmit,
        D: DelayMs<u32>,
    {
        let selector = self.acquire(adc, self.target.selector, delay);
        let ubat = self.acquire(adc, self.target.voltage, delay);
        let reading = self.evaluate(selector, ubat);

        diag::report(&reading, tx);
        status::apply(&reading.pattern, &self.target.wiring, indicators)?;

        delay.delay_ms(self.target.delays.cycle_ms);
        Ok(reading)
    }

    fn acquire<P, S, D>(&self, adc: &mut Polling<P, S>, channel: Channel, delay: &mut D) -> Sample
    where
        P: AdcPeripheral,
        S: SampleSink,
        D: DelayMs<u32>,
    {
        adc.set_channel(channel);
        if self.target.delays.settle_ms > 0 {
            delay.delay_ms(self.target.delays.settle_ms);
        }
        adc.read_averaged(Precision::Ten)
    }
}
