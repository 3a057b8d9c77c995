//! Library exports for the link shortener service
//!
//! This module exposes internal components for testing and potential library usage.

pub mod allocator;
pub mod error;
pub mod handler;
pub mod model;
pub mod route;
pub mod store;
