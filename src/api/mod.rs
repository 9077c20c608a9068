//! HTTP/JSON surface over the tracker

pub mod rest;

pub use rest::{ApiResponse, RestApi};
