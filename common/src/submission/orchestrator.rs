//! Form-filling state machine.
//!
//! ```text
//! Editing -> Validating -> (AcquiringLocation) -> Submitting -> Succeeded
//!               |                 |                   |      -> QueuedOffline
//!               +-----------------+-------------------+-> Editing
//! ```
//!
//! `FormSession` holds the pure state and transitions, so a UI can drive it
//! one message at a time. `deliver` performs the side-effecting tail (remote
//! attempt, then local fallback) and `SubmissionOrchestrator` chains the
//! whole flow for callers that can hold the session across awaits.
//!
//! Only missing answers and, on handhelds, a missing fix block the user.
//! Every remote failure other than a server-side validation rejection ends
//! with the submission saved on the device.

use crate::model::form_data::{FieldErrors, FieldValue, FormData};
use crate::model::location::GpsFix;
use crate::model::submission::{EntityRef, QueuedSubmission, SubmissionPayload, SubmissionReceipt};
use crate::model::template::FormTemplate;
use crate::requests::SubmissionRequest;
use crate::submission::connectivity::Connectivity;
use crate::submission::device::DeviceClass;
use crate::submission::gateway::{GatewayError, SubmissionGateway};
use crate::submission::geolocation::{GeolocationAcquirer, GeolocationError, PositionSource};
use crate::submission::store::{new_submission_id, SubmissionStore};
use crate::submission::validation::{progress, validate};
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use thiserror::Error;

pub const SUBMITTED_MESSAGE: &str = "Submission complete.";
pub const SAVED_OFFLINE_MESSAGE: &str =
    "Saved offline. It will sync automatically when the connection returns.";
pub const NETWORK_FALLBACK_MESSAGE: &str =
    "Network issue: submission saved offline. It will sync automatically.";
pub const INCOMPLETE_MESSAGE: &str = "Please complete the required fields.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Editing,
    Validating,
    AcquiringLocation,
    Submitting,
    Succeeded,
    QueuedOffline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A user-facing message. Error notices block until the condition is
/// resolved; every other level is shown briefly and dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        !matches!(self.level, NoticeLevel::Error)
    }
}

/// Everything needed to send or queue one submission.
///
/// The client id is minted once per attempt and reused if the attempt ends
/// up in the offline queue, so the backend can recognise a replay.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionDraft {
    pub client_submission_id: String,
    pub template_id: String,
    pub payload: SubmissionPayload,
    pub captured_at: DateTime<Utc>,
}

impl SubmissionDraft {
    pub fn request(&self) -> SubmissionRequest {
        SubmissionRequest {
            template_id: self.template_id.clone(),
            payload: self.payload.clone(),
            client_submission_id: Some(self.client_submission_id.clone()),
        }
    }

    pub fn into_record(self) -> QueuedSubmission {
        QueuedSubmission {
            id: self.client_submission_id,
            template_id: self.template_id,
            payload: self.payload,
            captured_at: self.captured_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NextStep {
    AcquireLocation,
    Deliver(SubmissionDraft),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueReason {
    Offline,
    RemoteFailed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RemoteAttempt {
    /// Connectivity was down; no request was made.
    NotAttempted,
    Finished(Result<SubmissionReceipt, GatewayError>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Complete(SubmissionReceipt),
    Enqueue(EnqueueReason),
    Reject(FieldErrors),
}

/// Maps a remote attempt to what happens next. A failure observed while the
/// device has since gone offline is reported as an offline save.
pub fn decide(attempt: &RemoteAttempt, online: bool) -> Decision {
    match attempt {
        RemoteAttempt::NotAttempted => Decision::Enqueue(EnqueueReason::Offline),
        RemoteAttempt::Finished(Ok(receipt)) => Decision::Complete(receipt.clone()),
        RemoteAttempt::Finished(Err(GatewayError::Rejected(errors))) => {
            Decision::Reject(errors.clone())
        }
        RemoteAttempt::Finished(Err(_)) if online => Decision::Enqueue(EnqueueReason::RemoteFailed),
        RemoteAttempt::Finished(Err(_)) => Decision::Enqueue(EnqueueReason::Offline),
    }
}

pub async fn attempt_remote<G, C>(gateway: &G, connectivity: &C, draft: &SubmissionDraft) -> RemoteAttempt
where
    G: SubmissionGateway + ?Sized,
    C: Connectivity + ?Sized,
{
    if !connectivity.is_online() {
        return RemoteAttempt::NotAttempted;
    }
    RemoteAttempt::Finished(gateway.submit(&draft.request()).await)
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryOutcome {
    Submitted(SubmissionReceipt),
    Queued {
        reason: EnqueueReason,
        record_id: String,
    },
    /// The server refused the answers; the user must fix them.
    Rejected(FieldErrors),
    /// Neither the server nor the device storage accepted the submission.
    NotSaved(String),
}

/// Sends the draft, or keeps it on the device when it cannot be sent.
pub async fn deliver<S, G, C>(
    draft: SubmissionDraft,
    store: &S,
    gateway: &G,
    connectivity: &C,
) -> DeliveryOutcome
where
    S: SubmissionStore + ?Sized,
    G: SubmissionGateway + ?Sized,
    C: Connectivity + ?Sized,
{
    let attempt = attempt_remote(gateway, connectivity, &draft).await;
    if let RemoteAttempt::Finished(Err(e)) = &attempt {
        warn!("remote submit failed: {}", e);
    }

    match decide(&attempt, connectivity.is_online()) {
        Decision::Complete(receipt) => {
            info!("submission {} accepted", receipt.submission_id);
            DeliveryOutcome::Submitted(receipt)
        }
        Decision::Reject(errors) => DeliveryOutcome::Rejected(errors),
        Decision::Enqueue(reason) => {
            let record = draft.into_record();
            let record_id = record.id.clone();
            match store.persist(record) {
                Ok(()) => {
                    info!("submission {} queued ({:?})", record_id, reason);
                    DeliveryOutcome::Queued { reason, record_id }
                }
                Err(e) => {
                    error!("submission {} could not be queued: {}", record_id, e);
                    DeliveryOutcome::NotSaved(e.to_string())
                }
            }
        }
    }
}

/// State of one form-filling session on one screen.
#[derive(Debug, Clone)]
pub struct FormSession {
    template: FormTemplate,
    entity: EntityRef,
    device: DeviceClass,
    data: FormData,
    fix: Option<GpsFix>,
    gps_loading: bool,
    state: SessionState,
    errors: FieldErrors,
    location_error: Option<GeolocationError>,
    notice: Option<Notice>,
}

impl FormSession {
    pub fn new(template: FormTemplate, entity: EntityRef, device: DeviceClass) -> Self {
        Self {
            template,
            entity,
            device,
            data: FormData::new(),
            fix: None,
            gps_loading: false,
            state: SessionState::Editing,
            errors: FieldErrors::new(),
            location_error: None,
            notice: None,
        }
    }

    pub fn template(&self) -> &FormTemplate {
        &self.template
    }

    pub fn entity(&self) -> &EntityRef {
        &self.entity
    }

    pub fn device(&self) -> DeviceClass {
        self.device
    }

    pub fn data(&self) -> &FormData {
        &self.data
    }

    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.data.get(name)
    }

    pub fn fix(&self) -> Option<GpsFix> {
        self.fix
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn location_error(&self) -> Option<&GeolocationError> {
        self.location_error.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn is_gps_loading(&self) -> bool {
        self.gps_loading
    }

    /// Stores an answer. NaN and infinities have no JSON form, so they clear
    /// the field instead of reaching the queue or the wire.
    pub fn set_field(&mut self, name: &str, value: FieldValue) {
        self.errors.remove(name);
        if matches!(value, FieldValue::Number(n) if !n.is_finite()) {
            self.data.remove(name);
            return;
        }
        self.data.insert(name.to_string(), value);
    }

    pub fn clear_field(&mut self, name: &str) {
        self.data.remove(name);
    }

    /// Adds or removes one option of a checkbox-group answer.
    pub fn toggle_option(&mut self, name: &str, option: &str, checked: bool) {
        let mut selected = self
            .data
            .get(name)
            .and_then(FieldValue::as_list)
            .map(<[String]>::to_vec)
            .unwrap_or_default();
        selected.retain(|o| o != option);
        if checked {
            selected.push(option.to_string());
        }
        self.set_field(name, FieldValue::List(selected));
    }

    pub fn progress(&self) -> u8 {
        progress(&self.template, &self.data)
    }

    pub fn set_gps_loading(&mut self, loading: bool) {
        self.gps_loading = loading;
    }

    /// Holds a new fix; any previous location error is resolved.
    pub fn set_fix(&mut self, fix: GpsFix) {
        self.fix = Some(fix);
        self.gps_loading = false;
        self.location_error = None;
    }

    /// Records a watch failure. Ignored once a fix is held.
    pub fn watch_failed(&mut self, error: GeolocationError) {
        self.gps_loading = false;
        if self.fix.is_none() {
            self.location_error = Some(error);
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(
            self.state,
            SessionState::Validating | SessionState::AcquiringLocation | SessionState::Submitting
        )
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Succeeded | SessionState::QueuedOffline)
    }

    /// Handhelds cannot submit without a fix.
    pub fn missing_required_fix(&self) -> bool {
        self.device.requires_gps() && self.fix.is_none()
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        !self.is_busy()
            && !self.gps_loading
            && !self.missing_required_fix()
            && self.progress() >= 100
    }

    /// Validates and decides the next step. On missing answers the session
    /// returns to `Editing` with one error per field.
    pub fn begin_submit(&mut self) -> Result<NextStep, FieldErrors> {
        self.state = SessionState::Validating;
        if let Err(errors) = validate(&self.template, &self.data) {
            self.errors = errors.clone();
            self.state = SessionState::Editing;
            self.notice = Some(Notice::new(NoticeLevel::Error, INCOMPLETE_MESSAGE));
            return Err(errors);
        }
        self.errors.clear();
        self.notice = None;

        match self.fix {
            None if self.device.requires_gps() => {
                self.state = SessionState::AcquiringLocation;
                self.gps_loading = true;
                Ok(NextStep::AcquireLocation)
            }
            fix => {
                self.state = SessionState::Submitting;
                Ok(NextStep::Deliver(self.draft(fix.unwrap_or_else(GpsFix::origin))))
            }
        }
    }

    pub fn location_acquired(&mut self, fix: GpsFix) -> SubmissionDraft {
        self.set_fix(fix);
        self.state = SessionState::Submitting;
        self.draft(fix)
    }

    /// Handhelds go back to `Editing` with a blocking notice; desktops
    /// continue with `(0, 0)`.
    pub fn location_failed(&mut self, error: GeolocationError) -> Option<SubmissionDraft> {
        self.gps_loading = false;
        if self.device.requires_gps() {
            self.notice = Some(Notice::new(NoticeLevel::Error, error.to_string()));
            self.location_error = Some(error);
            self.state = SessionState::Editing;
            return None;
        }
        self.state = SessionState::Submitting;
        Some(self.draft(GpsFix::origin()))
    }

    pub fn finish(&mut self, outcome: &DeliveryOutcome) {
        match outcome {
            DeliveryOutcome::Submitted(_) => {
                self.state = SessionState::Succeeded;
                self.notice = Some(Notice::new(NoticeLevel::Success, SUBMITTED_MESSAGE));
                self.data.clear();
            }
            DeliveryOutcome::Queued { reason, .. } => {
                self.state = SessionState::QueuedOffline;
                self.notice = Some(match reason {
                    EnqueueReason::Offline => Notice::new(NoticeLevel::Info, SAVED_OFFLINE_MESSAGE),
                    EnqueueReason::RemoteFailed => {
                        Notice::new(NoticeLevel::Warning, NETWORK_FALLBACK_MESSAGE)
                    }
                });
                self.data.clear();
            }
            DeliveryOutcome::Rejected(errors) => {
                self.state = SessionState::Editing;
                self.errors = errors.clone();
                self.notice = Some(Notice::new(NoticeLevel::Error, INCOMPLETE_MESSAGE));
            }
            DeliveryOutcome::NotSaved(reason) => {
                self.state = SessionState::Editing;
                self.notice = Some(Notice::new(
                    NoticeLevel::Error,
                    format!("Submission could not be saved: {}", reason),
                ));
            }
        }
    }

    /// Starts a new entry for the same template and entity, keeping the fix.
    pub fn reset(&mut self) {
        self.data.clear();
        self.errors.clear();
        self.notice = None;
        self.state = SessionState::Editing;
    }

    fn draft(&self, fix: GpsFix) -> SubmissionDraft {
        SubmissionDraft {
            client_submission_id: new_submission_id(),
            template_id: self.template.id.clone(),
            payload: SubmissionPayload {
                entity_id: self.entity.entity_id.clone(),
                entity_type: self.entity.entity_type.clone(),
                data: self.data.clone(),
                latitude: fix.latitude,
                longitude: fix.longitude,
            },
            captured_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitBlocked {
    #[error("a submission is already in progress")]
    Busy,
    #[error("{} required field(s) missing", .0.len())]
    Invalid(FieldErrors),
    #[error(transparent)]
    Location(GeolocationError),
    #[error("submission could not be saved: {0}")]
    NotSaved(String),
}

/// Runs a whole submission against borrowed collaborators.
pub struct SubmissionOrchestrator<'a, S: ?Sized, G: ?Sized, P, C: ?Sized> {
    session: FormSession,
    store: &'a S,
    gateway: &'a G,
    geolocation: &'a GeolocationAcquirer<P>,
    connectivity: &'a C,
}

impl<'a, S, G, P, C> SubmissionOrchestrator<'a, S, G, P, C>
where
    S: SubmissionStore + ?Sized,
    G: SubmissionGateway + ?Sized,
    P: PositionSource,
    C: Connectivity + ?Sized,
{
    pub fn new(
        session: FormSession,
        store: &'a S,
        gateway: &'a G,
        geolocation: &'a GeolocationAcquirer<P>,
        connectivity: &'a C,
    ) -> Self {
        Self {
            session,
            store,
            gateway,
            geolocation,
            connectivity,
        }
    }

    pub fn session(&self) -> &FormSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut FormSession {
        &mut self.session
    }

    /// Returns `Submitted` or `Queued` on success. Remote failures never
    /// surface here; they end as `Queued`.
    pub async fn submit(&mut self) -> Result<DeliveryOutcome, SubmitBlocked> {
        if self.session.is_busy() {
            return Err(SubmitBlocked::Busy);
        }

        let draft = match self.session.begin_submit().map_err(SubmitBlocked::Invalid)? {
            NextStep::Deliver(draft) => draft,
            NextStep::AcquireLocation => match self.geolocation.acquire(self.connectivity).await {
                Ok(fix) => self.session.location_acquired(fix),
                Err(e) => match self.session.location_failed(e.clone()) {
                    Some(draft) => draft,
                    None => return Err(SubmitBlocked::Location(e)),
                },
            },
        };

        let outcome = deliver(draft, self.store, self.gateway, self.connectivity).await;
        self.session.finish(&outcome);
        match outcome {
            DeliveryOutcome::Rejected(errors) => Err(SubmitBlocked::Invalid(errors)),
            DeliveryOutcome::NotSaved(reason) => Err(SubmitBlocked::NotSaved(reason)),
            done => Ok(done),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::template::{FieldDefinition, FieldType};

    fn template() -> FormTemplate {
        FormTemplate {
            id: "tpl".into(),
            name: "Distribution".into(),
            fields: vec![
                FieldDefinition {
                    name: "name".into(),
                    label: "Name".into(),
                    field_type: FieldType::Text,
                    required: true,
                    options: vec![],
                },
                FieldDefinition {
                    name: "items".into(),
                    label: "Items".into(),
                    field_type: FieldType::CheckboxGroup,
                    required: false,
                    options: vec!["rice".into(), "oil".into()],
                },
            ],
        }
    }

    fn entity() -> EntityRef {
        EntityRef {
            entity_id: "p-1".into(),
            entity_type: "project".into(),
        }
    }

    fn receipt() -> SubmissionReceipt {
        SubmissionReceipt {
            submission_id: "srv-1".into(),
            duplicate: false,
        }
    }

    #[test]
    fn decide_covers_every_attempt() {
        let network = GatewayError::Network("timeout".into());
        let mut errors = FieldErrors::new();
        errors.insert("name".into(), "Name is required".into());

        assert_eq!(
            decide(&RemoteAttempt::NotAttempted, false),
            Decision::Enqueue(EnqueueReason::Offline)
        );
        assert_eq!(
            decide(&RemoteAttempt::Finished(Ok(receipt())), true),
            Decision::Complete(receipt())
        );
        assert_eq!(
            decide(&RemoteAttempt::Finished(Err(network.clone())), true),
            Decision::Enqueue(EnqueueReason::RemoteFailed)
        );
        assert_eq!(
            decide(&RemoteAttempt::Finished(Err(network)), false),
            Decision::Enqueue(EnqueueReason::Offline)
        );
        assert_eq!(
            decide(
                &RemoteAttempt::Finished(Err(GatewayError::Rejected(errors.clone()))),
                true
            ),
            Decision::Reject(errors)
        );
    }

    #[test]
    fn handheld_without_fix_cannot_submit() {
        let mut session = FormSession::new(template(), entity(), DeviceClass::MobileOrTablet);
        session.set_field("name", "Ana".into());
        assert_eq!(session.progress(), 100);
        assert!(!session.can_submit());

        session.set_fix(GpsFix::new(42.1, 20.9));
        assert!(session.can_submit());

        session.set_gps_loading(true);
        assert!(!session.can_submit());
    }

    #[test]
    fn desktop_submits_without_fix_at_origin() {
        let mut session = FormSession::new(template(), entity(), DeviceClass::Desktop);
        session.set_field("name", "Ana".into());
        assert!(session.can_submit());

        let NextStep::Deliver(draft) = session.begin_submit().unwrap() else {
            panic!("desktop should not wait for a fix");
        };
        assert_eq!(session.state(), SessionState::Submitting);
        assert_eq!((draft.payload.latitude, draft.payload.longitude), (0.0, 0.0));
        assert_eq!(draft.payload.entity_id, "p-1");
        assert!(!session.can_submit());
    }

    #[test]
    fn handheld_location_failure_returns_to_editing() {
        let mut session = FormSession::new(template(), entity(), DeviceClass::MobileOrTablet);
        session.set_field("name", "Ana".into());

        assert_eq!(session.begin_submit().unwrap(), NextStep::AcquireLocation);
        assert_eq!(session.state(), SessionState::AcquiringLocation);
        assert!(session.is_gps_loading());

        assert!(session.location_failed(GeolocationError::OfflineNoFix).is_none());
        assert_eq!(session.state(), SessionState::Editing);
        assert_eq!(session.location_error(), Some(&GeolocationError::OfflineNoFix));
        assert_eq!(session.notice().unwrap().level, NoticeLevel::Error);
        assert_eq!(session.value("name"), Some(&FieldValue::from("Ana")));
    }

    #[test]
    fn watch_errors_do_not_replace_a_held_fix() {
        let mut session = FormSession::new(template(), entity(), DeviceClass::MobileOrTablet);
        session.set_fix(GpsFix::new(1.0, 2.0));
        session.watch_failed(GeolocationError::Unavailable("timeout".into()));

        assert!(session.location_error().is_none());
        assert_eq!(session.fix(), Some(GpsFix::new(1.0, 2.0)));
    }

    #[test]
    fn toggling_options_builds_a_list() {
        let mut session = FormSession::new(template(), entity(), DeviceClass::Desktop);
        session.toggle_option("items", "rice", true);
        session.toggle_option("items", "oil", true);
        session.toggle_option("items", "rice", false);

        assert_eq!(
            session.value("items"),
            Some(&FieldValue::List(vec!["oil".to_string()]))
        );
    }

    #[test]
    fn finishing_clears_answers_and_sets_notice() {
        let mut session = FormSession::new(template(), entity(), DeviceClass::Desktop);
        session.set_field("name", "Ana".into());
        session.begin_submit().unwrap();

        session.finish(&DeliveryOutcome::Queued {
            reason: EnqueueReason::RemoteFailed,
            record_id: "r".into(),
        });
        assert_eq!(session.state(), SessionState::QueuedOffline);
        assert!(session.data().is_empty());
        assert_eq!(session.notice().unwrap().message, NETWORK_FALLBACK_MESSAGE);
        assert!(session.notice().unwrap().is_transient());

        session.reset();
        assert_eq!(session.state(), SessionState::Editing);
        assert!(session.notice().is_none());
    }

    #[test]
    fn server_rejection_keeps_answers() {
        let mut session = FormSession::new(template(), entity(), DeviceClass::Desktop);
        session.set_field("name", "Ana".into());
        session.begin_submit().unwrap();

        let mut errors = FieldErrors::new();
        errors.insert("name".into(), "Name is required".into());
        session.finish(&DeliveryOutcome::Rejected(errors));

        assert_eq!(session.state(), SessionState::Editing);
        assert!(session.errors().contains_key("name"));
        assert!(!session.data().is_empty());
    }
}
