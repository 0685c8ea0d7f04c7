//! # Core Models Module
//!
//! Plain data passed between the prediction client, the predictors and the
//! workflows.
//!
//! ## Key Components
//!
//! - [`request`] - The opaque JSON payload of one prediction call
//! - [`result`] - The service's answer and the structure records inside it
//! - [`job`] - Task handles and the lifecycle of an asynchronous job
//!
//! None of these types touch the network or the filesystem.

pub mod job;
pub mod request;
pub mod result;
