//! # PymolFold Core Library
//!
//! A client library for remote protein-structure prediction services. Sequences
//! are sent to ESMFold, the CloudMol PymolFold server or Boltz2 on NVIDIA Cloud
//! Functions; the returned PDB/mmCIF text is written to collision-safe files
//! and scored by pLDDT. The folding itself always happens on the remote side.
//!
//! ## Architectural Philosophy
//!
//! The library keeps the same layered split throughout, so that each piece can
//! be tested on its own and the network can be replaced by a scripted stand-in.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`PredictionRequest`,
//!   `PredictionResult`, `JobHandle`), sequence cleaning, pLDDT confidence and
//!   file I/O.
//!
//! - **[`engine`]: The Network Core.** The long-poll client for NVIDIA Cloud
//!   Functions, the async `Transport` seam, credentials, configuration and
//!   progress reporting.
//!
//! - **[`predictors`]: The Backends.** One `StructurePredictor` per service,
//!   each owning its request format and response normalization.
//!
//! - **[`workflows`]: The Public API.** Fold, complex, batch and fetch
//!   procedures that run a prediction end to end against a `Session`.

pub mod core;
pub mod engine;
pub mod predictors;
pub mod workflows;
