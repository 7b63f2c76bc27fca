//! CI-facing helpers shared by property suites.

pub mod property_test_profile;
