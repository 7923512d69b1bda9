//! Payment SDK sandbox
//!
//! A declarative form engine (values, touched and dirty tracking, rule-driven
//! validation, guarded submission) and a simulated payment SDK that the
//! sample checkout submits to.

pub mod checkout;
pub mod config;
pub mod console;
pub mod form;
pub mod sdk;
