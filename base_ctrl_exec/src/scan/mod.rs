//! # Range scan module
//!
//! Cleans the readings of a laser range scanner and checks them for
//! obstacles close to the base.
//!
//! Sanitising happens in two steps. First, any reading which is NaN or
//! infinite is replaced by the scan's maximum range, so unknown readings are
//! treated as free space. Second, a 3-sample median filter is run over the
//! interior of the scan to remove single-sample spikes. The first and last
//! samples are left untouched.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use ordered_float::OrderedFloat;
use util::maths::median3;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single sweep of a laser range scanner.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RangeScan {
    /// Range readings in scan order.
    ///
    /// Units: meters
    pub ranges: Vec<f32>,

    /// Minimum valid range of the scanner.
    ///
    /// Units: meters
    pub range_min: f32,

    /// Maximum valid range of the scanner.
    ///
    /// Units: meters
    pub range_max: f32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RangeScan {
    pub fn new(ranges: Vec<f32>, range_min: f32, range_max: f32) -> Self {
        Self {
            ranges,
            range_min,
            range_max,
        }
    }

    /// The smallest reading in the scan, ignoring NaNs.
    pub fn closest(&self) -> Option<f32> {
        self.ranges
            .iter()
            .filter(|r| !r.is_nan())
            .map(|r| OrderedFloat(*r))
            .min()
            .map(|r| r.into_inner())
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Replace invalid readings and median-filter the scan in place.
pub fn sanitize(scan: &mut RangeScan) {
    replace_invalid(scan);
    median_filter(&mut scan.ranges);
}

/// Replace NaN and infinite readings with the scan's maximum range.
pub fn replace_invalid(scan: &mut RangeScan) {
    let range_max = scan.range_max;

    for r in scan.ranges.iter_mut().filter(|r| !r.is_finite()) {
        *r = range_max;
    }
}

/// Apply a centred 3-sample median filter to the interior samples.
///
/// Filtering is done in place, left to right, so each window sees the already
/// filtered left neighbour. Scans with fewer than three samples are left
/// unchanged.
pub fn median_filter(ranges: &mut [f32]) {
    if ranges.len() < 3 {
        return;
    }

    for i in 1..ranges.len() - 1 {
        ranges[i] = median3(ranges[i - 1], ranges[i], ranges[i + 1]);
    }
}

/// Returns true if any reading is strictly closer than `threshold_m`.
///
/// The scan should be sanitised first, NaN readings are never obstacles.
pub fn detect_obstacle(scan: &RangeScan, threshold_m: f32) -> bool {
    scan.ranges.iter().any(|r| *r < threshold_m)
}
