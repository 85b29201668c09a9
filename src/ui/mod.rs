//! User interface

pub mod tui;
