//! Core library for TaskKit
//!
//! This crate contains the to-do list state, including:
//! - The ordered task collection and its store
//! - The priority filter and the filtered view
//! - Key-value persistence

pub mod error;
pub mod filter;
pub mod storage;
pub mod task;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
