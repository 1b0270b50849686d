//! Runtime state of the form submission screen.

use common::submission::device::DeviceClass;
use common::submission::geolocation::WatchHandle;
use common::submission::orchestrator::FormSession;

use crate::services::geolocation::BrowserPositionSource;

pub struct FormSubmissionComponent {
    /// `None` until the template has been fetched.
    pub session: Option<FormSession>,

    /// Resolved once when the component is created.
    pub device: DeviceClass,

    /// Set when the template could not be loaded.
    pub load_error: Option<String>,

    /// Live GPS subscription, released on destroy.
    pub watch: Option<WatchHandle<BrowserPositionSource>>,

    /// Guard to avoid running first-render initialization more than once.
    pub loaded: bool,
}

impl FormSubmissionComponent {
    pub fn new(device: DeviceClass) -> Self {
        Self {
            session: None,
            device,
            load_error: None,
            watch: None,
            loaded: false,
        }
    }
}
