//! Client code for pitwall.
//!
//! This crate provides the HTTP fetch pipeline and tabular parsing shared by
//! the session board.

pub mod fetch;
pub mod parse;

pub use fetch::{Fetch, FetchClient, FetchConfig, FetchResponse, UrlError, resolve};
pub use parse::{CsvParser, ParseConfig, TableParser, parse_table};

// Response building blocks, re-exported for downstream fakes.
pub use bytes::Bytes;
pub use reqwest::StatusCode;
