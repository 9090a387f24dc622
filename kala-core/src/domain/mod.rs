//! Core domain types
//!
//! These types mirror the coordinator's own model. The agent forwards and
//! receives them but never interprets the scheduling fields.

pub mod job;
pub mod stat;
pub mod status;
