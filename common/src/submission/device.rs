//! Coarse device classification. Handhelds are expected to carry GPS
//! hardware, so a fix is mandatory there; desktops submit with `(0, 0)` when
//! no fix can be obtained.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceClass {
    MobileOrTablet,
    Desktop,
}

impl DeviceClass {
    pub fn requires_gps(&self) -> bool {
        matches!(self, DeviceClass::MobileOrTablet)
    }
}

/// Signature of an injected classifier, resolved once per session.
pub type DeviceClassifier = fn(&str) -> DeviceClass;

const HANDHELD_MARKERS: [&str; 12] = [
    "android",
    "iphone",
    "ipad",
    "ipod",
    "mobile",
    "tablet",
    "silk",
    "kindle",
    "opera mini",
    "blackberry",
    "iemobile",
    "webos",
];

/// Classifies a user agent string by looking for handheld markers.
pub fn classify_user_agent(user_agent: &str) -> DeviceClass {
    let ua = user_agent.to_ascii_lowercase();
    if HANDHELD_MARKERS.iter().any(|marker| ua.contains(marker)) {
        DeviceClass::MobileOrTablet
    } else {
        DeviceClass::Desktop
    }
}
