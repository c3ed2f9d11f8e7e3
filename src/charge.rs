//! Charge level of the pack, bucketed by the calibration thresholds for its cell count.

use crate::calibration::Calibration;
use crate::cells::CellCount;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChargeBucket {
    Full,
    Under80,
    Under60,
    Under40,
    Under20,
    /// No cell count could be detected
    Invalid,
}

impl ChargeBucket {
    /// 0 for `Full`, rising as the pack empties
    pub const fn severity(self) -> u8 {
        self as u8
    }

    /// How many indicators of the bar are lit
    pub const fn lit(self) -> usize {
        match self {
            ChargeBucket::Full => 5,
            ChargeBucket::Under80 => 4,
            ChargeBucket::Under60 => 3,
            ChargeBucket::Under40 => 2,
            ChargeBucket::Under20 => 1,
            ChargeBucket::Invalid => 0,
        }
    }
}

const DOWNGRADES: [ChargeBucket; 4] = [
    ChargeBucket::Under80,
    ChargeBucket::Under60,
    ChargeBucket::Under40,
    ChargeBucket::Under20,
];

/// Buckets `voltage` against the threshold row for `cells`.
///
/// Every threshold is compared on its own and each one the voltage is below downgrades
/// the bucket, so the result is the lowest bucket any comparison implies.
pub fn classify_charge(calibration: &Calibration, cells: CellCount, voltage: f32) -> ChargeBucket {
    let row = &calibration.thresholds[cells.index()];

    let mut bucket = ChargeBucket::Full;
    for (&threshold, &downgrade) in row.iter().zip(DOWNGRADES.iter()) {
        if voltage < threshold {
            bucket = downgrade;
        }
    }
    bucket
}

/// Like [`classify_charge`], mapping an undetected cell count to `Invalid`
pub fn classify(calibration: &Calibration, cells: Option<CellCount>, voltage: f32) -> ChargeBucket {
    match cells {
        Some(cells) => classify_charge(calibration, cells, voltage),
        None => ChargeBucket::Invalid,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::target::{REV_A, REV_B};

    #[test]
    fn three_cell_buckets() {
        let calibration = &REV_B.calibration;
        let check = |voltage, bucket| {
            assert_eq!(
                classify_charge(calibration, CellCount::Three, voltage),
                bucket,
                "{} V",
                voltage
            );
        };
        check(12.5, ChargeBucket::Full);
        check(12.06, ChargeBucket::Full);
        check(11.8, ChargeBucket::Under80);
        check(11.0, ChargeBucket::Under60);
        check(10.98, ChargeBucket::Under60);
        check(10.5, ChargeBucket::Under40);
        check(10.40, ChargeBucket::Under20);
        check(0.0, ChargeBucket::Under20);
    }

    #[test]
    fn rev_a_indexes_from_one_cell() {
        let calibration = &REV_A.calibration;
        assert_eq!(classify_charge(calibration, CellCount::One, 3.0), ChargeBucket::Full);
        assert_eq!(classify_charge(calibration, CellCount::One, 0.6), ChargeBucket::Under20);
        assert_eq!(classify_charge(calibration, CellCount::Six, 17.0), ChargeBucket::Under80);
    }

    #[test]
    fn lower_voltage_is_never_better() {
        for &calibration in [&REV_A.calibration, &REV_B.calibration].iter() {
            for &cells in CellCount::ALL.iter() {
                let mut previous = ChargeBucket::Full;
                // sweep from 30 V down in 10 mV steps
                for step in (0..=3000).rev() {
                    let bucket = classify_charge(calibration, cells, step as f32 / 100.0);
                    assert!(bucket.severity() >= previous.severity());
                    previous = bucket;
                }
                assert_eq!(previous, ChargeBucket::Under20);
            }
        }
    }

    #[test]
    fn missing_cell_count_is_invalid() {
        assert_eq!(classify(&REV_B.calibration, None, 12.0), ChargeBucket::Invalid);
        assert_eq!(
            classify(&REV_B.calibration, Some(CellCount::Three), 12.0),
            ChargeBucket::Under80
        );
    }

    #[test]
    fn lit_counts_shrink_with_charge() {
        assert_eq!(ChargeBucket::Full.lit(), 5);
        assert_eq!(ChargeBucket::Under20.lit(), 1);
        assert_eq!(ChargeBucket::Invalid.lit(), 0);
    }
}
