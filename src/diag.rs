//! One line of human readable diagnostics per cycle.
//!
//! Lines are built with `ufmt` in a fixed size buffer and handed over in one piece:
//!
//! ```text
//! sel: 572 ubat: 426 volt: 10.99 cells: 3 level: under60
//! ```

use heapless::String;
use ufmt::{uDisplay, uWrite, uwrite, Formatter};

use crate::cells::CellCount;
use crate::charge::ChargeBucket;
use crate::monitor::Reading;
use crate::target::Target;

/// Widest value of every field. Voltages saturate at `u32::MAX` centivolts.
const LONGEST_LINE: &str =
    "sel: 65535 ubat: 65535 volt: 42949672.95 cells: none level: invalid\r\n";

/// Bytes needed for any line the monitor produces
pub const LINE_CAPACITY: usize = LONGEST_LINE.len();

/// Best effort byte sink for diagnostics, such as a serial port
pub trait Transmit {
    fn transmit(&mut self, bytes: &[u8]);
}

/// Drops everything
pub struct Silent;

impl Transmit for Silent {
    fn transmit(&mut self, _bytes: &[u8]) {}
}

/// Volts with two decimals, since ufmt can't print floats
struct Volts(f32);

impl uDisplay for Volts {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        // negative readings saturate to 0
        let centivolts = (self.0 * 100.0 + 0.5) as u32;
        uwrite!(
            f,
            "{}.{}{}",
            centivolts / 100,
            (centivolts / 10) % 10,
            centivolts % 10
        )
    }
}

impl uDisplay for CellCount {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        uwrite!(f, "{}", self.cells())
    }
}

impl uDisplay for ChargeBucket {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        f.write_str(match self {
            ChargeBucket::Full => "full",
            ChargeBucket::Under80 => "under80",
            ChargeBucket::Under60 => "under60",
            ChargeBucket::Under40 => "under40",
            ChargeBucket::Under20 => "under20",
            ChargeBucket::Invalid => "invalid",
        })
    }
}

impl uDisplay for Reading {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        uwrite!(
            f,
            "sel: {} ubat: {} volt: {} cells: ",
            self.selector,
            self.ubat,
            Volts(self.voltage)
        )?;
        match self.cells {
            Some(cells) => uwrite!(f, "{}", cells)?,
            None => f.write_str("none")?,
        }
        uwrite!(f, " level: {}", self.bucket)
    }
}

/// Formats `reading` as a `\r\n` terminated line
pub fn line(reading: &Reading) -> String<LINE_CAPACITY> {
    let mut line = String::new();
    let written = uwrite!(line, "{}\r\n", reading);
    debug_assert!(written.is_ok(), "diagnostic line truncated");
    line
}

pub fn report<T: Transmit>(reading: &Reading, tx: &mut T) {
    tx.transmit(line(reading).as_bytes());
}

/// Startup line naming the board revision
pub fn banner<T: Transmit>(target: &Target, tx: &mut T) {
    tx.transmit(b"lipo-monitor ");
    tx.transmit(target.name.as_bytes());
    tx.transmit(b"\r\n");
}
