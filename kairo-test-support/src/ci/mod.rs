//! Environment-driven knobs shared by the workspace's CI test suites.

pub mod property_test_profile;
