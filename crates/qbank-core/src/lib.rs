//! qbank-core — Question normalization, view-model derivation, and state machines.
//!
//! This crate defines the data model, the derivation engine that turns
//! inconsistently-shaped question records into render-ready view models,
//! the edit and upload state machines, and the `QuestionStore` trait the
//! rest of the qbank system builds on.

pub mod answer;
pub mod bank;
pub mod error;
pub mod image;
pub mod model;
pub mod options;
pub mod session;
pub mod statistics;
pub mod traits;
pub mod upload;
pub mod view;
