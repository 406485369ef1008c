//! HTTP acquisition: fetching pages and pulling links out of them.

pub mod http_client;
pub mod links;

pub use http_client::{FetchFailure, FetchOutcome, HttpClient, Page, PageSource};
