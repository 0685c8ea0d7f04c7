//! # Workflows Module
//!
//! High-level entry points that tie predictors, the NVCF client and structure
//! I/O together. Each workflow cleans its input, runs the remote call, writes
//! the returned structures into the [`session::Session`] working directory and
//! registers them as viewer objects.
//!
//! - **Fold** ([`fold`]) - One sequence through any [`crate::predictors::StructurePredictor`]
//! - **Complex** ([`complex`]) - A multi-entity Boltz2 job with affinity readout
//! - **Batch** ([`batch`]) - FASTA input routed between ESMFold and PymolFold
//! - **Fetch** ([`fetch`]) - Precomputed models from AlphaFold DB and AlphaMissense
//! - **Design** ([`design`]) - ProteinMPNN designs, point-mutation scores and mutational scans
//! - **Session** ([`session`]) - Working directory, server address and object registry

pub mod batch;
pub mod complex;
pub mod design;
pub mod fetch;
pub mod fold;
pub mod session;
