//! HTTP surface of the customer intelligence API

pub mod api;
pub mod config;
pub mod error;
