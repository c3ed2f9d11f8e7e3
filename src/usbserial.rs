extern crate feather_m0 as hal;
extern crate usb_device;
extern crate usbd_serial;

use cortex_m::peripheral::NVIC;
use hal::clock::GenericClockController;
use hal::gpio::{Floating, Input, Port};
use hal::pac::{interrupt, PM, USB};
use hal::usb::UsbBus;
use usb_device::bus::UsbBusAllocator;
use usb_device::prelude::*;
use usbd_serial::{SerialPort, USB_CLASS_CDC};

use crate::diag::Transmit;

pub struct USBSerial {
    usb_bus: UsbDevice<'static, UsbBus>,
    usb_serial: SerialPort<'static, UsbBus>,
}

static mut USB_SERIAL: Option<USBSerial> = None;
static mut BUS_ALLOCATOR: Option<UsbBusAllocator<UsbBus>> = None;

impl USBSerial {
    /// Initializes the `USBSerial` singleton.
    ///
    /// # Arguments
    ///  * pm_perph: The power management peripheral
    ///  * usb_perph: The USB peripheral
    ///  * nvic: The NVIC, to unmask the USB interrupt
    ///  * clocks: The clocks instance for USB peripheral clocking
    ///  * dm: The d- GPIO pad
    ///  * dp: The d+ GPIO pad
    ///  * port: the GPIO port
    pub fn init(
        pm_perph: &mut PM,
        usb_perph: USB,
        nvic: &mut NVIC,
        clocks: &mut GenericClockController,
        dm: hal::gpio::Pa24<Input<Floating>>,
        dp: hal::gpio::Pa25<Input<Floating>>,
        port: &mut Port,
    ) {
        unsafe {
            if USB_SERIAL.is_none() {
                BUS_ALLOCATOR = Some(hal::usb_allocator(
                    usb_perph, clocks, pm_perph, dm, dp, port,
                ));
                if let Some(allocator) = BUS_ALLOCATOR.as_ref() {
                    USB_SERIAL = Some(USBSerial {
                        usb_bus: UsbDeviceBuilder::new(allocator, UsbVidPid(0x16c0, 0x27dd))
                            .manufacturer("Holmes Engineering")
                            .product("LiPo monitor")
                            .serial_number("LIPO")
                            .device_class(USB_CLASS_CDC)
                            .build(),
                        usb_serial: SerialPort::new(allocator),
                    });
                }

                nvic.set_priority(interrupt::USB, 1);
                NVIC::unmask(interrupt::USB);
            }
        }
    }

    /// Writes bytes over USB serial. Dropped if the host isn't reading.
    ///
    /// # Arguments
    /// * bytes: The bytes to write to the USB port
    pub fn write_to_usb(bytes: &[u8]) {
        cortex_m::interrupt::free(|_| unsafe {
            if let Some(usbserial) = USB_SERIAL.as_mut() {
                usbserial.usb_serial.write(bytes).ok();
            }
        });
    }

    /// Services the USB peripheral. The diagnostic stream is one way, so anything the
    /// host sends is read out and dropped.
    fn poll_usb() {
        unsafe {
            if let Some(usbserial) = USB_SERIAL.as_mut() {
                usbserial.usb_bus.poll(&mut [&mut usbserial.usb_serial]);

                let mut read_buf = [0u8; 64];
                while let Ok(bytes_read) = usbserial.usb_serial.read(&mut read_buf) {
                    if bytes_read == 0 {
                        break;
                    }
                }
            }
        }
    }
}

/// Diagnostics over the USB serial singleton
pub struct UsbTransmit;

impl Transmit for UsbTransmit {
    fn transmit(&mut self, bytes: &[u8]) {
        USBSerial::write_to_usb(bytes);
    }
}

#[interrupt]
fn USB() {
    USBSerial::poll_usb();
}
