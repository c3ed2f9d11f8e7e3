//! Driver for the analog-to-digital converter.
//!
//! [`Adc`] owns the configuration mirror and sequences the converter through the
//! [`AdcPeripheral`] trait, which maps each step onto the actual register block. Every
//! option is an enum, so reserved register patterns can't be expressed.

use core::sync::atomic::{AtomicU16, Ordering};

/// A raw conversion result. 0..=1023 for 10 bit reads, 0..=255 for 8 bit reads.
pub type Sample = u16;

/// Analog input routed to the converter
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Channel {
    Ch0 = 0,
    Ch1 = 1,
    Ch2 = 2,
    Ch3 = 3,
    Ch4 = 4,
    Ch5 = 5,
    Ch6 = 6,
    Ch7 = 7,
}

impl Channel {
    pub const fn index(self) -> u8 {
        self as u8
    }
}

/// Converter clock divider
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Prescaler {
    Div2,
    Div4,
    Div8,
    Div16,
    Div32,
    Div64,
    Div128,
}

impl Prescaler {
    pub const fn divisor(self) -> u16 {
        2 << (self as u16)
    }
}

/// What starts a conversion. Everything but `SingleShot` is an auto-trigger source.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Trigger {
    SingleShot,
    FreeRunning,
    AnalogComparator,
    ExternalInterrupt0,
    Timer0CompareMatch,
    Timer0Overflow,
    Timer1CompareMatch,
    Timer1Overflow,
    Timer1CaptureEvent,
}

impl Trigger {
    pub const fn is_auto(self) -> bool {
        !matches!(self, Trigger::SingleShot)
    }
}

/// Voltage reference for the conversion
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Reference {
    /// External AREF pin
    External,
    /// Analog supply
    Supply,
    Internal1V1,
    Internal2V56,
}

/// Number of consecutive reads averaged by [`Adc::read_averaged`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Averaging {
    None = 0,
    Samples2 = 1,
    Samples4 = 2,
    Samples8 = 3,
    Samples16 = 4,
    Samples32 = 5,
}

impl Averaging {
    pub const fn shift(self) -> u8 {
        self as u8
    }

    pub const fn samples(self) -> u16 {
        1 << (self as u16)
    }
}

/// Set of analog pins whose digital input buffer is switched off
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DigitalInputMask(u8);

impl DigitalInputMask {
    pub const NONE: Self = DigitalInputMask(0);
    pub const ALL: Self = DigitalInputMask(0xFF);

    pub const fn channel(channel: Channel) -> Self {
        DigitalInputMask(1 << channel.index())
    }

    pub const fn with(self, channel: Channel) -> Self {
        DigitalInputMask(self.0 | (1 << channel.index()))
    }

    pub const fn contains(self, channel: Channel) -> bool {
        self.0 & (1 << channel.index()) != 0
    }

    pub const fn bits(self) -> u8 {
        self.0
    }
}

/// Result width of a single read
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Precision {
    Eight,
    Ten,
}

impl Precision {
    /// Scales a raw 10 bit result down to this precision
    pub const fn scale(self, raw: u16) -> Sample {
        match self {
            Precision::Eight => raw >> 2,
            Precision::Ten => raw,
        }
    }
}

/// Everything `Adc::init` programs into the converter
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AdcConfig {
    pub enabled: bool,
    /// Deliver results through the sample sink instead of polling
    pub interrupt_mode: bool,
    pub prescaler: Prescaler,
    pub trigger: Trigger,
    pub reference: Reference,
    pub default_channel: Channel,
    pub digital_input_disable: DigitalInputMask,
    pub averaging: Averaging,
}

impl AdcConfig {
    /// Polling single-shot reads on channel 0 against the supply, slowest clock
    pub const DEFAULT: AdcConfig = AdcConfig {
        enabled: true,
        interrupt_mode: false,
        prescaler: Prescaler::Div128,
        trigger: Trigger::SingleShot,
        reference: Reference::Supply,
        default_channel: Channel::Ch0,
        digital_input_disable: DigitalInputMask::NONE,
        averaging: Averaging::None,
    };
}

impl Default for AdcConfig {
    fn default() -> Self {
        AdcConfig::DEFAULT
    }
}

/// Register level access to a converter.
///
/// Implementations do no sequencing of their own, the driver decides the order.
pub trait AdcPeripheral {
    /// Enable (or disable) the converter and set its clock and reference
    fn configure(&mut self, enabled: bool, prescaler: Prescaler, reference: Reference);
    /// Route `channel` to the converter input
    fn select_channel(&mut self, channel: Channel);
    /// Select the auto-trigger source. Never called with `Trigger::SingleShot`.
    fn set_trigger_source(&mut self, trigger: Trigger);
    fn set_auto_trigger(&mut self, enabled: bool);
    fn auto_trigger(&self) -> bool;
    /// Request a software triggered conversion
    fn start_conversion(&mut self);
    fn conversion_in_progress(&self) -> bool;
    /// Completion flag, stays set until `clear_complete`
    fn conversion_complete(&self) -> bool;
    fn clear_complete(&mut self);
    /// Last result, right aligned 10 bits
    fn result(&self) -> u16;
    fn set_interrupt(&mut self, enabled: bool);
    fn disable_digital_input(&mut self, mask: DigitalInputMask);
}

/// Receives results completed in interrupt mode
pub trait SampleSink {
    fn on_sample(&mut self, sample: Sample);
}

/// Sink that drops every sample, used when no callback is registered
#[derive(Copy, Clone, Debug, Default)]
pub struct Discard;

impl SampleSink for Discard {
    fn on_sample(&mut self, _sample: Sample) {}
}

const NO_SAMPLE: u16 = u16::MAX;

/// Single slot holding the most recent interrupt-delivered sample.
///
/// Written from the completion interrupt, read from the main loop. Plain loads and stores only,
/// so it works on cores without compare-and-swap.
pub struct LatestSample(AtomicU16);

impl LatestSample {
    pub const fn new() -> Self {
        LatestSample(AtomicU16::new(NO_SAMPLE))
    }

    pub fn get(&self) -> Option<Sample> {
        match self.0.load(Ordering::Acquire) {
            NO_SAMPLE => None,
            sample => Some(sample),
        }
    }

    pub fn clear(&self) {
        self.0.store(NO_SAMPLE, Ordering::Release);
    }
}

impl Default for LatestSample {
    fn default() -> Self {
        LatestSample::new()
    }
}

impl SampleSink for &LatestSample {
    fn on_sample(&mut self, sample: Sample) {
        self.0.store(sample, Ordering::Release);
    }
}

/// The converter driver
pub struct Adc<P, S = Discard> {
    peripheral: P,
    config: AdcConfig,
    sink: S,
}

impl<P: AdcPeripheral> Adc<P, Discard> {
    /// Initializes the converter with no sample sink
    pub fn new(peripheral: P, config: AdcConfig) -> Self {
        Adc::with_sink(peripheral, config, Discard)
    }
}

impl<P: AdcPeripheral, S: SampleSink> Adc<P, S> {
    /// Initializes the converter, delivering interrupt mode results to `sink`
    pub fn with_sink(peripheral: P, config: AdcConfig, sink: S) -> Self {
        let mut adc = Adc {
            peripheral,
            config,
            sink,
        };
        adc.init(config);
        adc
    }

    /// Programs every field of `config` into the converter.
    ///
    /// Must run with interrupts globally disabled. The first conversion after enabling is
    /// inaccurate, so one is run and thrown away before the completion interrupt is armed.
    pub fn init(&mut self, config: AdcConfig) {
        self.config = config;

        self.peripheral.set_interrupt(false);
        self.peripheral.set_auto_trigger(false);
        self.peripheral
            .configure(config.enabled, config.prescaler, config.reference);
        self.peripheral.select_channel(config.default_channel);

        if config.enabled {
            self.peripheral.start_conversion();
            while !self.peripheral.conversion_complete() {}
            self.peripheral.clear_complete();
        }

        if config.trigger.is_auto() {
            self.peripheral.set_trigger_source(config.trigger);
            self.peripheral.set_auto_trigger(true);
        }

        if config.digital_input_disable != DigitalInputMask::NONE {
            self.peripheral
                .disable_digital_input(config.digital_input_disable);
        }

        self.peripheral.set_interrupt(config.interrupt_mode);
    }

    /// Switches off the digital input buffer of the given pins
    pub fn disable_digital_input(&mut self, mask: DigitalInputMask) {
        self.peripheral.disable_digital_input(mask);
        self.config.digital_input_disable = mask;
    }

    /// Routes `channel` to the converter.
    ///
    /// Auto-triggering is paused and any running conversion is waited out first, so the
    /// input never changes mid-conversion.
    pub fn set_channel(&mut self, channel: Channel) {
        let auto_trigger = self.peripheral.auto_trigger();
        if auto_trigger {
            self.peripheral.set_auto_trigger(false);
        }

        while self.peripheral.conversion_in_progress() {}

        self.config.default_channel = channel;
        self.peripheral.select_channel(channel);

        if auto_trigger {
            self.peripheral.set_auto_trigger(true);
        }
    }

    /// Runs one conversion and busy-waits for the result.
    ///
    /// In interrupt mode the conversion is only started, its result goes to the sink and
    /// `None` is returned.
    pub fn read_blocking(&mut self, precision: Precision) -> Option<Sample> {
        if self.config.interrupt_mode {
            self.peripheral.start_conversion();
            return None;
        }
        Some(self.convert(precision))
    }

    /// Mean of `2^shift` consecutive blocking reads
    pub fn read_averaged(&mut self, precision: Precision) -> Option<Sample> {
        if self.config.interrupt_mode {
            self.peripheral.start_conversion();
            return None;
        }
        Some(self.average(precision))
    }

    fn convert(&mut self, precision: Precision) -> Sample {
        self.peripheral.start_conversion();
        while !self.peripheral.conversion_complete() {}
        let raw = self.peripheral.result();
        self.peripheral.clear_complete();
        precision.scale(raw)
    }

    fn average(&mut self, precision: Precision) -> Sample {
        let averaging = self.config.averaging;
        let mut sum: u32 = 0;
        for _ in 0..averaging.samples() {
            sum += u32::from(self.convert(precision));
        }
        (sum >> averaging.shift()) as Sample
    }

    /// Hands the finished result to the sink. Call from the converter's interrupt handler.
    ///
    /// Does nothing in polling mode, where the result belongs to `read_blocking`.
    pub fn on_conversion_complete(&mut self) {
        if !self.config.interrupt_mode {
            return;
        }
        let raw = self.peripheral.result();
        self.peripheral.clear_complete();
        self.sink.on_sample(raw);
    }

    pub fn config(&self) -> &AdcConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn peripheral(&self) -> &P {
        &self.peripheral
    }
}

/// A driver known to be in polling mode, so every read yields a sample.
///
/// Only built from an [`Adc`] whose configuration has `interrupt_mode` off, and it never
/// reprograms the converter, so it stays that way.
pub struct Polling<P, S = Discard> {
    adc: Adc<P, S>,
}

impl<P: AdcPeripheral, S: SampleSink> Polling<P, S> {
    /// Hands `adc` back when it is configured for interrupt mode
    pub fn new(adc: Adc<P, S>) -> Result<Self, Adc<P, S>> {
        if adc.config.interrupt_mode {
            Err(adc)
        } else {
            Ok(Polling { adc })
        }
    }

    pub fn set_channel(&mut self, channel: Channel) {
        self.adc.set_channel(channel);
    }

    /// Runs one conversion and busy-waits for the result
    pub fn read(&mut self, precision: Precision) -> Sample {
        self.adc.convert(precision)
    }

    /// Mean of `2^shift` consecutive reads
    pub fn read_averaged(&mut self, precision: Precision) -> Sample {
        self.adc.average(precision)
    }

    pub fn adc(&self) -> &Adc<P, S> {
        &self.adc
    }

    pub fn into_inner(self) -> Adc<P, S> {
        self.adc
    }
}
