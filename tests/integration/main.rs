//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters or a temporary sysfs tree. All tests run on the
//! host with no real LED hardware required.

mod hal_tests;
