//! Gate logic, kept separate from the HTTP middleware that drives it.

pub mod key_gate;
