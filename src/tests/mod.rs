//! Integration testing module
//!
//! Detection scenarios run against synthetic score series:
//! - Exact segment boundaries for known inputs
//! - Brief-dip merging and splitting
//! - Margin clamping and forced closes
//! - Threshold calibration and fallback
