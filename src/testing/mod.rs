//! Test support: scripted middleware client and comparator plus configuration
//! factories, shared by unit and integration tests.

pub mod mocks;
