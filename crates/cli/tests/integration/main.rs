//! CLI integration tests: full release runs with a stand-in `go` binary.

mod common;
mod release_tests;
