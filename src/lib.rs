// src/lib.rs

//! Campus notice notifier library
//!
//! Collects the notice board, detects notices not seen before, summarises
//! them and delivers one notification per run.

pub mod config;
pub mod error;
pub mod history;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
