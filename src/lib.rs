//! Multiplication-table quiz engine: question generation, scoring,
//! per-table mastery, achievements and persistence. The terminal
//! interface in `main.rs` is one front end over [`engine::quiz_engine::QuizEngine`].

pub mod config;
pub mod engine;
pub mod error;
pub mod session;
pub mod store;
