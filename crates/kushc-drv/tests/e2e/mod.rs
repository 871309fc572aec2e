//! End-to-end tests for the `kushc` driver binary: CLI surface and the
//! full compile pipeline exercised as a subprocess, the way the
//! teacher's own `e2e` suite drives its compiler binary with
//! `assert_cmd` rather than calling library internals directly.

mod cli_tests;
mod compilation_tests;
