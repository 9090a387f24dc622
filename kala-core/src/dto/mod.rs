//! Data Transfer Objects for coordinator communication

pub mod job;
