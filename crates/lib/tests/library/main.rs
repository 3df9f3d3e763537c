//! Library integration tests: whole release runs against a scratch project.

mod common;
mod config_tests;
mod release_tests;
