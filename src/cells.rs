//! Works out the pack's cell count from the selector divider reading.

use crate::adc::Sample;
use crate::calibration::{Calibration, CELL_COUNTS};

/// Number of series cells in the attached pack
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum CellCount {
    One = 1,
    Two,
    Three,
    Four,
    Five,
    Six,
}

impl CellCount {
    pub const ALL: [CellCount; CELL_COUNTS] = [
        CellCount::One,
        CellCount::Two,
        CellCount::Three,
        CellCount::Four,
        CellCount::Five,
        CellCount::Six,
    ];

    pub const fn cells(self) -> u8 {
        self as u8
    }

    /// Row of this cell count in the calibration tables
    pub const fn index(self) -> usize {
        self as usize - 1
    }
}

/// Returns the first cell count, lowest first, whose open window
/// `(digits - tolerance, digits + tolerance)` holds `sample`.
///
/// There is no hysteresis. A reading sitting on a window edge flips between
/// a count and `None` from one cycle to the next.
pub fn classify_cells(calibration: &Calibration, sample: Sample) -> Option<CellCount> {
    calibration
        .cell_digits
        .iter()
        .zip(CellCount::ALL.iter())
        .find(|&(&digits, _)| in_window(sample, digits, calibration.tolerance))
        .map(|(_, &cells)| cells)
}

fn in_window(sample: Sample, digits: u16, tolerance: u16) -> bool {
    let sample = i32::from(sample);
    let digits = i32::from(digits);
    let tolerance = i32::from(tolerance);
    sample > digits - tolerance && sample < digits + tolerance
}
