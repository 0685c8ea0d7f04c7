//! # Core Module
//!
//! This module provides the stateless building blocks of PymolFold: the data
//! passed in and out of prediction services, sequence handling, confidence
//! scoring and file I/O.
//!
//! ## Architecture
//!
//! - **Data Models** ([`models`]) - Requests, results, structure records and job handles
//! - **Sequences** ([`sequence`]) - Input cleaning, default naming and alphabet checks
//! - **Confidence** ([`confidence`]) - pLDDT extraction, banding and coloring commands
//! - **File I/O** ([`io`]) - Collision-safe structure saving, FASTA input and CSV summaries
//!
//! Nothing in this layer talks to the network.

pub mod confidence;
pub mod io;
pub mod models;
pub mod sequence;
