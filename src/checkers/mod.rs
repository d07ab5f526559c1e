// src/checkers/mod.rs
mod http;

pub use http::HttpChecker;
