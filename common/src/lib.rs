//! Shared model and offline-tolerant submission pipeline for the field data
//! collection client and its backend.

pub mod model;
pub mod requests;
pub mod submission;
