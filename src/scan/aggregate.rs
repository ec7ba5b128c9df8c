//! Merging the primary and image scan outcomes.

use super::error::ScanFailure;
use crate::error::StepError;

/// Combine the outcomes of both scan passes.
///
/// | primary | image | result                    |
/// |---------|-------|---------------------------|
/// | ok      | ok    | `None`                    |
/// | failed  | ok    | `PrimaryScan`             |
/// | ok      | failed| `ImageScan`               |
/// | failed  | failed| `CombinedScan` (keeps both) |
pub fn merge_scan_errors(
    primary: Option<ScanFailure>,
    image: Option<ScanFailure>,
) -> Option<StepError> {
    match (primary, image) {
        (None, None) => None,
        (Some(primary), None) => Some(StepError::PrimaryScan(primary)),
        (None, Some(image)) => Some(StepError::ImageScan(image)),
        (Some(primary), Some(image)) => Some(StepError::CombinedScan { primary, image }),
    }
}
