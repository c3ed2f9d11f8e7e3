//! Board revisions. Both run the same control loop and differ only in the data here.

use crate::adc::{AdcConfig, Averaging, Channel, DigitalInputMask, Prescaler, Reference, Trigger};
use crate::calibration::Calibration;
use crate::status::{Indicator, INDICATORS};

/// Waits inserted into each control loop cycle
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DelaySchedule {
    /// After every channel switch, 0 for none
    pub settle_ms: u32,
    /// At the end of the cycle
    pub cycle_ms: u32,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Target {
    pub name: &'static str,
    pub calibration: Calibration,
    pub adc: AdcConfig,
    /// Cell count selector divider
    pub selector: Channel,
    /// Pack voltage divider
    pub voltage: Channel,
    /// Output driven by each slot of the bar
    pub wiring: [Indicator; INDICATORS],
    /// Slot that blinks when no cell count is detected
    pub diagnostic_slot: Indicator,
    pub delays: DelaySchedule,
}

/// 5V referenced board with a 34.8:1 pack divider
pub const REV_A: Target = Target {
    name: "rev-a",
    calibration: Calibration {
        cell_digits: [355, 490, 568, 600, 632, 644],
        tolerance: 5,
        // 80%, 60%, 40%, 20% of n * 3.7V
        thresholds: [
            [2.96, 2.22, 1.5, 0.7],
            [5.9, 4.4, 3.0, 1.5],
            [8.9, 6.7, 4.4, 2.2],
            [11.8, 8.9, 5.9, 3.0],
            [14.8, 11.1, 7.4, 3.7],
            [17.7, 13.3, 8.9, 4.4],
        ],
        reference_voltage: 5.0,
        full_scale_digits: 4095.0,
        divider_ratio: 34.8,
    },
    adc: AdcConfig {
        enabled: true,
        interrupt_mode: false,
        prescaler: Prescaler::Div128,
        trigger: Trigger::SingleShot,
        reference: Reference::Supply,
        default_channel: Channel::Ch4,
        digital_input_disable: DigitalInputMask::channel(Channel::Ch4).with(Channel::Ch5),
        averaging: Averaging::None,
    },
    selector: Channel::Ch4,
    voltage: Channel::Ch5,
    wiring: Indicator::ALL,
    diagnostic_slot: Indicator::Led0,
    delays: DelaySchedule {
        settle_ms: 0,
        cycle_ms: 500,
    },
};

/// 3.3V referenced board with an 8:1 pack divider and the bar mounted upside down
pub const REV_B: Target = Target {
    name: "rev-b",
    calibration: Calibration {
        // Placeholder calibration apart from the 3 cell selector (572) and its row
        cell_digits: [360, 496, 572, 620, 652, 676],
        tolerance: 8,
        // n * 4.02V, 3.84V, 3.66V, 3.48V
        thresholds: [
            [4.02, 3.84, 3.66, 3.48],
            [8.04, 7.68, 7.32, 6.96],
            [12.06, 11.52, 10.98, 10.44],
            [16.08, 15.36, 14.64, 13.92],
            [20.10, 19.20, 18.30, 17.40],
            [24.12, 23.04, 21.96, 20.88],
        ],
        reference_voltage: 3.3,
        full_scale_digits: 1023.0,
        divider_ratio: 8.0,
    },
    adc: AdcConfig {
        enabled: true,
        interrupt_mode: false,
        prescaler: Prescaler::Div64,
        trigger: Trigger::SingleShot,
        reference: Reference::Supply,
        default_channel: Channel::Ch2,
        digital_input_disable: DigitalInputMask::channel(Channel::Ch2).with(Channel::Ch3),
        averaging: Averaging::Samples4,
    },
    selector: Channel::Ch2,
    voltage: Channel::Ch3,
    wiring: [
        Indicator::Led4,
        Indicator::Led3,
        Indicator::Led2,
        Indicator::Led1,
        Indicator::Led0,
    ],
    diagnostic_slot: Indicator::Led4,
    delays: DelaySchedule {
        settle_ms: 2,
        cycle_ms: 500,
    },
};

/// The revision this firmware is built for
#[cfg(not(feature = "rev-b"))]
pub const ACTIVE: &Target = &REV_A;
#[cfg(feature = "rev-b")]
pub const ACTIVE: &Target = &REV_B;
