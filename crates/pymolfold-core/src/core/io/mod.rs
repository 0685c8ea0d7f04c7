//! Provides file input/output for prediction results and batch inputs.
//!
//! Structures returned by a service are written as PDB or mmCIF text under a
//! working directory without ever overwriting an existing file. The module
//! also covers the small formats around a fold: FASTA input for batch runs,
//! the CSV summary those runs produce, JSON dumps of raw results, FASTA files
//! of designed sequences, and the CSV table of a deep mutational scan.

pub mod dms;
pub mod fasta;
pub mod naming;
pub mod structure;
pub mod summary;
