//! Client constants.

use log::LevelFilter;

/// Base path of the form template endpoints.
pub const TEMPLATES_PATH: &str = "/api/forms/templates";

/// Remote submit endpoint.
pub const SUBMISSIONS_PATH: &str = "/api/forms/submissions";

pub const LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// How long success and info toasts stay on screen.
pub const TOAST_MILLIS: u32 = 3000;
