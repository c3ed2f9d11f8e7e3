//! Battery powered LiPo pack monitor with a five LED charge bar.

#![no_std]
#![no_main]
#![warn(rust_2018_idioms)]
#![warn(clippy::all)]

use panic_semihosting as _; // Panic handler

use lipo_monitor::{
    adc::{Adc, Polling},
    diag,
    monitor::Monitor,
    samd_adc::SamdAdc,
    status::IndicatorPins,
    target,
};

use core::sync::atomic;
use cortex_m::peripheral::NVIC;
use embedded_hal::digital::v2::OutputPin;
use feather_m0 as hal;
use hal::clock::{enable_internal_32kosc, ClockGenId, ClockSource, GenericClockController};
use hal::entry;
use hal::pac::{interrupt, CorePeripherals, Peripherals, TC4};

/// boolean indicating if our timer interrupt has fired
#[allow(unused)]
static INTERRUPT_FIRED: atomic::AtomicBool = atomic::AtomicBool::new(false);

/// Main function, controlling all of our logic
#[entry]
fn main() -> ! {
    #[allow(unused_mut)] // Only used when usbserial is enabled
    let mut core = CorePeripherals::take().unwrap();
    let mut peripherals = Peripherals::take().unwrap();
    let mut pins = hal::Pins::new(peripherals.PORT);
    let target = target::ACTIVE;

    // just 8 MHz for lower power consumption
    #[cfg(not(feature = "usbserial"))]
    let mut clocks = GenericClockController::with_internal_8mhz(
        peripherals.GCLK,
        &mut peripherals.PM,
        &mut peripherals.SYSCTRL,
        &mut peripherals.NVMCTRL,
    );

    // 48 MHz needed for USB
    #[cfg(feature = "usbserial")]
    let mut clocks = GenericClockController::with_external_32kosc(
        peripherals.GCLK,
        &mut peripherals.PM,
        &mut peripherals.SYSCTRL,
        &mut peripherals.NVMCTRL,
    );

    let mut red_led = pins.d13.into_open_drain_output(&mut pins.port);
    red_led.set_high().unwrap();

    // The ADC comes up before any interrupt is unmasked, its first conversion is discarded.
    // The control loop only ever polls it.
    let _analog_inputs = (
        pins.a1.into_function_b(&mut pins.port), // AIN2
        pins.a2.into_function_b(&mut pins.port), // AIN3
        pins.a3.into_function_b(&mut pins.port), // AIN4
        pins.a4.into_function_b(&mut pins.port), // AIN5
    );
    peripherals.PM.apbcmask.modify(|_, w| w.adc_().set_bit());
    let gclk0 = clocks.gclk0();
    clocks.adc(&gclk0).unwrap();
    let mut adc = match Polling::new(Adc::new(SamdAdc::new(peripherals.ADC), target.adc)) {
        Ok(adc) => adc,
        Err(_) => panic!("{} samples by polling", target.name),
    };

    let mut leds = IndicatorPins(
        pins.d5.into_push_pull_output(&mut pins.port),
        pins.d6.into_push_pull_output(&mut pins.port),
        pins.d10.into_push_pull_output(&mut pins.port),
        pins.d11.into_push_pull_output(&mut pins.port),
        pins.d12.into_push_pull_output(&mut pins.port),
    );

    #[cfg(feature = "usbserial")]
    let mut tx = {
        use lipo_monitor::usbserial::{USBSerial, UsbTransmit};
        USBSerial::init(
            &mut peripherals.PM,
            peripherals.USB,
            &mut core.NVIC,
            &mut clocks,
            pins.usb_dm,
            pins.usb_dp,
            &mut pins.port,
        );
        UsbTransmit
    };

    #[cfg(not(feature = "usbserial"))]
    let mut tx = diag::Silent;

    #[cfg(feature = "sleeping-delay")]
    let mut runner_delay = {
        use hal::sleeping_delay::SleepingDelay;
        use hal::timer;

        // Get a clock & make a sleeping delay object. use internal 32k clock that runs
        // in standby
        enable_internal_32kosc(&mut peripherals.SYSCTRL);
        let timer_clock = clocks
            .configure_gclk_divider_and_source(ClockGenId::GCLK1, 1, ClockSource::OSC32K, false)
            .unwrap();
        clocks.configure_standby(ClockGenId::GCLK1, true);
        let tc45 = &clocks.tc4_tc5(&timer_clock).unwrap();
        let timer = timer::TimerCounter::tc4_(tc45, peripherals.TC4, &mut peripherals.PM);
        // We can also use it in standby mode, if all of the clocks are configured to
        //   opperate in standby, for even more power savings
        core.SCB.set_sleepdeep();

        unsafe {
            // enable interrupts
            core.NVIC.set_priority(interrupt::TC4, 2);
            NVIC::unmask(interrupt::TC4);
        }

        SleepingDelay::new(timer, &INTERRUPT_FIRED)
    };

    #[cfg(not(feature = "sleeping-delay"))]
    let mut runner_delay = {
        use hal::delay::Delay;

        Delay::new(core.SYST, &mut clocks)
    };

    red_led.set_low().unwrap();
    diag::banner(target, &mut tx);

    let mut monitor = Monitor::new(target);

    loop {
        if monitor
            .cycle(&mut adc, &mut leds, &mut tx, &mut runner_delay)
            .is_err()
        {
            error(&mut red_led, &mut runner_delay);
        }
    }
}

/// Blinks an SOS pattern indicating an error
///
/// # Parameters
/// * `red_led`: The LED pin to blink
/// * `delay`: The `Delay` instance to wait
fn error<PIN, T>(red_led: &mut PIN, delay: &mut T)
where
    PIN: OutputPin<Error = ()>,
    T: embedded_hal::blocking::delay::DelayMs<u32>,
{
    const SHORT_BLIP_MS: u32 = 250;
    const LONG_BLIP_MS: u32 = 500;
    const SOS: [u32; 9] = [
        SHORT_BLIP_MS,
        SHORT_BLIP_MS,
        SHORT_BLIP_MS,
        LONG_BLIP_MS,
        LONG_BLIP_MS,
        LONG_BLIP_MS,
        SHORT_BLIP_MS,
        SHORT_BLIP_MS,
        SHORT_BLIP_MS,
    ];

    for &blip in SOS.iter() {
        red_led.set_high().ok();
        delay.delay_ms(blip);
        red_led.set_low().ok();
        delay.delay_ms(blip);
    }

    delay.delay_ms(2 * LONG_BLIP_MS);
}

/// The sleeping timer interrupt that wakes us up
#[interrupt]
fn TC4() {
    // Let the sleepingtimer know that the interrupt fired, and clear it
    INTERRUPT_FIRED.store(true, atomic::Ordering::Relaxed);
    unsafe {
        if let Some(tc4) = TC4::ptr().as_ref() {
            tc4.count16().intflag.modify(|_, w| w.ovf().set_bit());
        }
    }
}
