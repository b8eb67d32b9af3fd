//! Integration test driver for `tests/pipeline/`.
//!
//! Each `mod` below maps to a file that exercises the acquisition →
//! queue → delivery pipeline against mock port adapters. All tests run
//! on the host (x86_64) with no real hardware required.

mod mock_ports;
mod pipeline_tests;
