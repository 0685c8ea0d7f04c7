//! # Engine Module
//!
//! This module implements the network side of PymolFold: the long-poll client for
//! NVIDIA Cloud Functions and everything it needs to run.
//!
//! ## Overview
//!
//! A prediction call is submitted once. The service either answers right away
//! (`200`) or accepts the job (`202`) and hands back a task id in the
//! `nvcf-reqid` header, after which the client polls a status endpoint until the
//! job reaches a terminal outcome. Every call ends in exactly one result or one
//! [`error::NvcfError`].
//!
//! ## Architecture
//!
//! - **Client** ([`nvcf`]) - Submission, task id extraction and the poll loop
//! - **Transport** ([`transport`]) - The async HTTP seam and its `reqwest` implementation
//! - **Configuration** ([`config`]) - Poll and timeout settings, status URL and terminal status policy
//! - **Credentials** ([`credentials`]) - Bearer token lookup with redacted output
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Error Handling** ([`error`]) - Configuration, protocol, service, transport and budget failures
//!
//! ## Guarantees
//!
//! - A missing token is reported before any request leaves the process
//! - Each HTTP call is bounded by the configured timeout and the whole poll loop by `max_wait`
//! - Result bodies are returned exactly as the service sent them
//! - No state is shared between calls; dropping the future abandons the job locally

pub mod config;
pub mod credentials;
pub mod error;
pub mod nvcf;
pub mod progress;
pub mod transport;
