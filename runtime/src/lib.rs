// Copyright 2026 Roster Scout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Roster Scout: college athletics roster discovery and extraction.
//!
//! Two entry points carry the weight of the crate:
//!
//! - [`discovery::Discoverer`] turns a sport plus a region (or explicit state
//!   list) into resolved athletics programs with roster URLs, through directory
//!   enumeration, association filtering, link resolution, and roster probing.
//! - [`extraction::RosterExtractor`] turns a roster URL into a de-duplicated
//!   list of player name/position records.
//!
//! Both sit behind in-memory TTL caches ([`cache::TtlCache`]).

#![allow(clippy::new_without_default)]

pub mod acquisition;
pub mod cache;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod extraction;
pub mod matching;
pub mod normalize;
pub mod rest;

pub use config::ScoutConfig;
pub use discovery::{Discoverer, Discovery, DiscoveryRequest};
pub use error::{ScoutError, ScoutResult};
pub use extraction::{Extraction, PlayerRecord, RosterExtractor};
