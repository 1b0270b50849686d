//! Properties of the form submission screen.

use common::model::submission::EntityRef;
use common::submission::device::DeviceClass;
use yew::prelude::*;

use crate::services::Services;

#[derive(Properties, PartialEq, Clone)]
pub struct FormSubmissionProps {
    /// Template fetched once when the component is first rendered.
    pub template_id: AttrValue,

    /// Project, sub-project or activity the answers are attached to.
    pub entity: EntityRef,

    pub services: Services,

    /// Forces a device class instead of classifying the browser user agent.
    /// Mainly for administrative desktop kiosks that do carry GPS hardware.
    #[prop_or_default]
    pub device: Option<DeviceClass>,

    /// Fired after a submission was either sent or queued on the device, so
    /// the parent can refresh its queue indicator.
    #[prop_or_default]
    pub on_saved: Callback<()>,
}
