//! Unit tests for coinfall modules
//!
//! These tests drive the sequencing core in virtual time; only the runtime
//! tests touch tokio, and those run on a paused clock.

mod test_intro;
mod test_page;
mod test_runtime;
