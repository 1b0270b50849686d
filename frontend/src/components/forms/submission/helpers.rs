//! Utility functions for the form submission screen.
//!
//! - **Device detection**: classifying the browser from its user agent.
//! - **User feedback**: toast notices for transient pipeline results.
//! - **Formatting**: GPS fix and progress display helpers.

use common::model::location::{AccuracyTier, GpsFix};
use common::submission::device::{classify_user_agent, DeviceClass, DeviceClassifier};
use common::submission::orchestrator::{Notice, NoticeLevel};
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

use crate::config::TOAST_MILLIS;

/// Classifies the current browser with the given classifier. Without a
/// readable user agent the device is treated as a desktop.
pub fn classify_browser(classifier: DeviceClassifier) -> DeviceClass {
    web_sys::window()
        .and_then(|w| w.navigator().user_agent().ok())
        .map(|ua| classifier(&ua))
        .unwrap_or(DeviceClass::Desktop)
}

pub fn detect_device() -> DeviceClass {
    classify_browser(classify_user_agent)
}

fn notice_background(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Success => "rgba(46, 125, 50, 0.95)",
        NoticeLevel::Info => "rgba(0, 0, 0, 0.8)",
        NoticeLevel::Warning => "rgba(237, 108, 2, 0.95)",
        NoticeLevel::Error => "rgba(198, 40, 40, 0.95)",
    }
}

/// Displays a notice as a toast at the bottom of the screen.
///
/// Transient notices remove themselves after `TOAST_MILLIS`; error notices
/// stay twice as long since the screen also renders them inline until
/// resolved.
pub fn show_notice(notice: &Notice) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let (Ok(toast), Some(body)) = (document.create_element("div"), document.body()) else {
        return;
    };

    toast.set_text_content(Some(&notice.message));
    let html_toast: HtmlElement = toast.unchecked_into();
    let style = html_toast.style();
    style.set_property("position", "fixed").ok();
    style.set_property("bottom", "20px").ok();
    style.set_property("left", "50%").ok();
    style.set_property("transform", "translateX(-50%)").ok();
    style.set_property("background", notice_background(notice.level)).ok();
    style.set_property("color", "#fff").ok();
    style.set_property("padding", "10px 20px").ok();
    style.set_property("border-radius", "4px").ok();
    style.set_property("z-index", "10000").ok();
    style.set_property("font-family", "Arial, sans-serif").ok();

    let millis = if notice.is_transient() {
        TOAST_MILLIS
    } else {
        TOAST_MILLIS * 2
    };

    if body.append_child(&html_toast).is_ok() {
        wasm_bindgen_futures::spawn_local(async move {
            gloo_timers::future::TimeoutFuture::new(millis).await;
            if let Some(parent) = html_toast.parent_node() {
                parent.remove_child(&html_toast).ok();
            }
        });
    }
}

pub fn format_fix(fix: &GpsFix) -> String {
    let tier = match fix.accuracy {
        Some(AccuracyTier::High) => " (high accuracy)",
        Some(AccuracyTier::Low) => " (low accuracy)",
        None => "",
    };
    format!("{:.5}, {:.5}{}", fix.latitude, fix.longitude, tier)
}

pub fn progress_color(progress: u8) -> &'static str {
    match progress {
        100 => "#2e7d32",
        50..=99 => "#1976d2",
        _ => "#9e9e9e",
    }
}
