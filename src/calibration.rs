//! Per-board calibration data shared by the classifiers.

use crate::adc::Sample;

/// Number of pack sizes the selector can encode
pub const CELL_COUNTS: usize = 6;

/// Threshold columns: 80%, 60%, 40% and 20% of capacity
pub const LEVELS: usize = 4;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Calibration {
    /// Selector reading expected for 1..=6 cells
    pub cell_digits: [u16; CELL_COUNTS],
    /// Half width of each selector window
    pub tolerance: u16,
    /// Pack voltage thresholds per cell count, each row strictly descending
    pub thresholds: [[f32; LEVELS]; CELL_COUNTS],
    /// Effective converter reference in volts
    pub reference_voltage: f32,
    /// Digit count the reference maps to
    pub full_scale_digits: f32,
    /// Ratio of the pack voltage divider
    pub divider_ratio: f32,
}

impl Calibration {
    /// Converts a raw pack-voltage reading to volts at the pack terminals
    pub fn digits_to_volts(&self, digits: Sample) -> f32 {
        f32::from(digits) * self.reference_voltage / self.full_scale_digits * self.divider_ratio
    }

    /// True when every threshold row is strictly descending and the selector
    /// windows are ascending with at least two tolerances between neighbours.
    pub fn is_consistent(&self) -> bool {
        let rows_descending = self
            .thresholds
            .iter()
            .all(|row| row.windows(2).all(|pair| pair[0] > pair[1]));

        let windows_apart = self
            .cell_digits
            .windows(2)
            .all(|pair| pair[1] > pair[0] && pair[1] - pair[0] >= 2 * self.tolerance);

        rows_descending && windows_apart
    }
}
