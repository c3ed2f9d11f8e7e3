//! Host-side stand-ins for the hardware collaborators, used by the unit tests.

extern crate std;

use core::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::vec::Vec;

use crate::adc::{AdcPeripheral, Channel, DigitalInputMask, Prescaler, Reference, Trigger};
use crate::diag::Transmit;
use crate::status::{Indicator, Indicators};

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Op {
    Configure {
        enabled: bool,
        prescaler: Prescaler,
        reference: Reference,
    },
    Select(Channel),
    TriggerSource(Trigger),
    AutoTrigger(bool),
    Start,
    Clear,
    Interrupt(bool),
    DigitalInput(DigitalInputMask),
}

/// Simulated converter. A conversion stays busy for `busy_polls` status polls, then latches the
/// next queued value for the selected channel (or that channel's steady level).
pub struct FakeAdc {
    pub ops: Vec<Op>,
    pub busy_polls: u32,
    pub channel: Channel,
    pub auto: bool,
    pub interrupt: bool,
    pub switched_mid_conversion: bool,
    pub complete: Cell<bool>,
    converting: Cell<bool>,
    remaining: Cell<u32>,
    result: Cell<u16>,
    levels: [u16; 8],
    queues: RefCell<[VecDeque<u16>; 8]>,
}

impl FakeAdc {
    pub fn new() -> Self {
        FakeAdc {
            ops: Vec::new(),
            busy_polls: 3,
            channel: Channel::Ch0,
            auto: false,
            interrupt: false,
            switched_mid_conversion: false,
            complete: Cell::new(false),
            converting: Cell::new(false),
            remaining: Cell::new(0),
            result: Cell::new(0),
            levels: [0; 8],
            queues: RefCell::new(Default::default()),
        }
    }

    /// Value every conversion on `channel` yields once its queue is empty
    pub fn set_level(&mut self, channel: Channel, value: u16) {
        self.levels[channel.index() as usize] = value;
    }

    pub fn queue(&mut self, channel: Channel, values: &[u16]) {
        self.queues.borrow_mut()[channel.index() as usize].extend(values.iter().copied());
    }

    pub fn starts(&self) -> usize {
        self.ops.iter().filter(|op| **op == Op::Start).count()
    }

    /// Completes the running conversion immediately
    pub fn finish(&self) {
        if self.converting.get() {
            self.remaining.set(0);
            self.poll();
        }
    }

    fn poll(&self) {
        if !self.converting.get() {
            return;
        }
        if self.remaining.get() == 0 {
            let index = self.channel.index() as usize;
            let value = self.queues.borrow_mut()[index]
                .pop_front()
                .unwrap_or(self.levels[index]);
            self.result.set(value);
            self.converting.set(false);
            self.complete.set(true);
        } else {
            self.remaining.set(self.remaining.get() - 1);
        }
    }
}

impl AdcPeripheral for FakeAdc {
    fn configure(&mut self, enabled: bool, prescaler: Prescaler, reference: Reference) {
        self.ops.push(Op::Configure {
            enabled,
            prescaler,
            reference,
        });
    }

    fn select_channel(&mut self, channel: Channel) {
        if self.converting.get() {
            self.switched_mid_conversion = true;
        }
        self.channel = channel;
        self.ops.push(Op::Select(channel));
    }

    fn set_trigger_source(&mut self, trigger: Trigger) {
        self.ops.push(Op::TriggerSource(trigger));
    }

    fn set_auto_trigger(&mut self, enabled: bool) {
        self.auto = enabled;
        self.ops.push(Op::AutoTrigger(enabled));
    }

    fn auto_trigger(&self) -> bool {
        self.auto
    }

    fn start_conversion(&mut self) {
        self.converting.set(true);
        self.remaining.set(self.busy_polls);
        self.ops.push(Op::Start);
    }

    fn conversion_in_progress(&self) -> bool {
        self.poll();
        self.converting.get()
    }

    fn conversion_complete(&self) -> bool {
        self.poll();
        self.complete.get()
    }

    fn clear_complete(&mut self) {
        self.complete.set(false);
        self.ops.push(Op::Clear);
    }

    fn result(&self) -> u16 {
        self.result.get()
    }

    fn set_interrupt(&mut self, enabled: bool) {
        self.interrupt = enabled;
        self.ops.push(Op::Interrupt(enabled));
    }

    fn disable_digital_input(&mut self, mask: DigitalInputMask) {
        self.ops.push(Op::DigitalInput(mask));
    }
}

/// Indicator bank that records the last level written to each output
#[derive(Default)]
pub struct FakeLeds {
    pub levels: [bool; 5],
    pub writes: usize,
    pub fail: bool,
}

impl Indicators for FakeLeds {
    type Error = ();

    fn set_level(&mut self, output: Indicator, level: bool) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.levels[output.index()] = level;
        self.writes += 1;
        Ok(())
    }
}

/// Transmit capability that keeps everything it was handed
#[derive(Default)]
pub struct FakeTx {
    pub bytes: Vec<u8>,
}

impl FakeTx {
    pub fn text(&self) -> &str {
        core::str::from_utf8(&self.bytes).unwrap()
    }
}

impl Transmit for FakeTx {
    fn transmit(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }
}

/// Delay that only counts the time it was asked to wait
#[derive(Default)]
pub struct FakeDelay {
    pub waited_ms: u32,
    pub calls: usize,
}

impl embedded_hal::blocking::delay::DelayMs<u32> for FakeDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.waited_ms += ms;
        self.calls += 1;
    }
}
