//! Offline-tolerant form submission pipeline.
//!
//! The pieces are host-agnostic: browser specifics (local storage, the
//! geolocation API, online/offline events, HTTP) live behind the traits in
//! `store`, `geolocation`, `connectivity` and `gateway`, and the frontend
//! provides the implementations.
//!
//! - `validation`: required-field gating and the progress indicator.
//! - `device`: mobile/tablet vs desktop classification driving the GPS policy.
//! - `store`: the device-local queue of unsent submissions.
//! - `geolocation`: tiered high/low accuracy fix acquisition and watches.
//! - `connectivity`: online/offline state tracking.
//! - `gateway`: the remote submit boundary.
//! - `orchestrator`: the form-filling state machine.
//! - `flusher`: replays the queue against the gateway.

pub mod connectivity;
pub mod device;
pub mod flusher;
pub mod gateway;
pub mod geolocation;
pub mod orchestrator;
pub mod store;
pub mod validation;
