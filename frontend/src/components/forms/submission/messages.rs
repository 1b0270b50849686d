use common::model::location::GpsFix;
use common::model::template::FormTemplate;
use common::submission::geolocation::GeolocationError;
use common::submission::orchestrator::DeliveryOutcome;

pub enum Msg {
    TemplateLoaded(FormTemplate),
    TemplateFailed(String),
    SetText { name: String, value: String },
    SetNumber { name: String, raw: String },
    ToggleOption { name: String, option: String, checked: bool },
    WatchFix(GpsFix),
    WatchFailed(GeolocationError),
    RequestLocation,
    LocationRefreshed(Result<GpsFix, GeolocationError>),
    Submit,
    LocationAcquired(GpsFix),
    LocationFailed(GeolocationError),
    Delivered(DeliveryOutcome),
    NewEntry,
}
