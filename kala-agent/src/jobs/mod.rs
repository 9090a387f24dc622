//! Built-in jobs

pub mod hello;

pub use hello::{HELLO_JOB, HelloJob};
