//! `AdcPeripheral` for the SAMD21 ADC.
//!
//! Channel `n` is routed from AINn and results are 10 bit. Free running maps onto CTRLB.FREERUN,
//! every other auto-trigger source starts conversions through the event system, which the board
//! code has to route to the ADC start event.

use feather_m0 as hal;
use hal::pac::ADC;

use crate::adc::{AdcPeripheral, Channel, DigitalInputMask, Prescaler, Reference, Trigger};

pub struct SamdAdc {
    adc: ADC,
    source: Trigger,
    auto: bool,
    /// A conversion was requested and its result not yet cleared
    pending: bool,
}

fn sync(adc: &ADC) {
    while adc.status.read().syncbusy().bit_is_set() {}
}

impl SamdAdc {
    /// Resets the ADC. Its APB and GCLK clocks must already be running.
    pub fn new(adc: ADC) -> Self {
        adc.ctrla.modify(|_, w| w.enable().clear_bit());
        sync(&adc);
        adc.ctrla.modify(|_, w| w.swrst().set_bit());
        while adc.ctrla.read().swrst().bit_is_set() || adc.status.read().syncbusy().bit_is_set() {}

        adc.ctrlb.modify(|_, w| w.ressel()._10bit());
        sync(&adc);
        adc.sampctrl.modify(|_, w| unsafe { w.samplen().bits(5) });
        adc.inputctrl.modify(|_, w| w.muxneg().gnd());
        sync(&adc);

        SamdAdc {
            adc,
            source: Trigger::SingleShot,
            auto: false,
            pending: false,
        }
    }
}

impl AdcPeripheral for SamdAdc {
    fn configure(&mut self, enabled: bool, prescaler: Prescaler, reference: Reference) {
        self.adc.ctrla.modify(|_, w| w.enable().clear_bit());
        sync(&self.adc);

        // no divide by 2 on the SAMD21, 4 is the fastest
        self.adc.ctrlb.modify(|_, w| match prescaler {
            Prescaler::Div2 | Prescaler::Div4 => w.prescaler().div4(),
            Prescaler::Div8 => w.prescaler().div8(),
            Prescaler::Div16 => w.prescaler().div16(),
            Prescaler::Div32 => w.prescaler().div32(),
            Prescaler::Div64 => w.prescaler().div64(),
            Prescaler::Div128 => w.prescaler().div128(),
        });
        sync(&self.adc);

        // 2.56V has no internal source here, the board feeds it into AREFB
        self.adc.refctrl.modify(|_, w| match reference {
            Reference::External => w.refsel().arefa(),
            Reference::Supply => w.refsel().intvcc1(),
            Reference::Internal1V1 => w.refsel().int1v(),
            Reference::Internal2V56 => w.refsel().arefb(),
        });

        // INTVCC1 is half the supply, halve the input too for a full rail span
        self.adc.inputctrl.modify(|_, w| match reference {
            Reference::Supply => w.gain().div2(),
            _ => w.gain()._1x(),
        });
        sync(&self.adc);

        if enabled {
            self.adc.ctrla.modify(|_, w| w.enable().set_bit());
            sync(&self.adc);
        }
    }

    fn select_channel(&mut self, channel: Channel) {
        self.adc
            .inputctrl
            .modify(|_, w| unsafe { w.muxpos().bits(channel.index()) });
        sync(&self.adc);
    }

    fn set_trigger_source(&mut self, trigger: Trigger) {
        self.source = trigger;
    }

    fn set_auto_trigger(&mut self, enabled: bool) {
        let free_running = enabled && self.source == Trigger::FreeRunning;
        let event = enabled && !free_running;

        self.adc.ctrlb.modify(|_, w| w.freerun().bit(free_running));
        sync(&self.adc);
        self.adc.evctrl.modify(|_, w| w.startei().bit(event));

        self.auto = enabled;
        if free_running {
            self.pending = true;
        }
    }

    fn auto_trigger(&self) -> bool {
        self.auto
    }

    fn start_conversion(&mut self) {
        self.adc.swtrig.modify(|_, w| w.start().set_bit());
        sync(&self.adc);
        self.pending = true;
    }

    fn conversion_in_progress(&self) -> bool {
        self.pending && !self.conversion_complete()
    }

    fn conversion_complete(&self) -> bool {
        self.adc.intflag.read().resrdy().bit_is_set()
    }

    fn clear_complete(&mut self) {
        self.adc.intflag.write(|w| w.resrdy().set_bit());
        self.pending = self.auto && self.source == Trigger::FreeRunning;
    }

    fn result(&self) -> u16 {
        self.adc.result.read().result().bits()
    }

    fn set_interrupt(&mut self, enabled: bool) {
        if enabled {
            self.adc.intenset.write(|w| w.resrdy().set_bit());
        } else {
            self.adc.intenclr.write(|w| w.resrdy().set_bit());
        }
    }

    fn disable_digital_input(&mut self, _mask: DigitalInputMask) {
        // Muxing a pin to its analog function already disconnects the digital input buffer
    }
}
