//! HTTP client for the chat backend
//!
//! Both endpoints answer with the same line-delimited message log, delivered
//! as a streamed body.

pub mod client;

pub use client::*;
