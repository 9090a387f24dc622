//! Kala Core
//!
//! Shared types for the Kala execution agent and its tooling.
//!
//! This crate contains:
//! - Domain types: job definitions, execution statistics and execution status
//! - DTOs: request/response bodies exchanged with the coordinator

pub mod domain;
pub mod dto;
