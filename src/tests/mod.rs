//! Match-level tests that need access to crate internals.

mod scenarios;
