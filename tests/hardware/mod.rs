//! Tests against a physically attached GMC detector.
//!
//! Set `TEST_PORT` to the device node, or leave it unset to use discovery.

pub mod detector_tests;
