#![forbid(unsafe_code)]

pub mod app;
pub mod bookmarks;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod error;
pub mod keys;
pub mod library;
pub mod logging;
pub mod model;
pub mod pagination;
pub mod progress;
pub mod service;
pub mod session;
pub mod stats;
pub mod storage;
pub mod store;
