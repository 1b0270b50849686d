#![allow(dead_code)]

use common::model::form_data::FormData;
use common::model::location::GpsFix;
use common::model::submission::{EntityRef, SubmissionPayload, SubmissionReceipt};
use common::model::template::{FieldDefinition, FieldType, FormTemplate};
use common::requests::SubmissionRequest;
use common::submission::gateway::{GatewayError, SubmissionGateway};
use common::submission::geolocation::{
    PositionError, PositionErrorKind, PositionOptions, PositionSource, WatchId,
};
use common::submission::store::{MemorySlot, StorageSlot, StoreError};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

type FailRule = Box<dyn Fn(&SubmissionRequest) -> Option<GatewayError>>;
type Hook = Box<dyn FnMut(&SubmissionRequest)>;

/// Records every request and answers according to an optional failure rule.
#[derive(Default)]
pub struct RecordingGateway {
    pub requests: RefCell<Vec<SubmissionRequest>>,
    fail_rule: Option<FailRule>,
    hook: RefCell<Option<Hook>>,
    served: Cell<usize>,
}

impl RecordingGateway {
    pub fn accepting() -> Self {
        Self::default()
    }

    pub fn failing(rule: impl Fn(&SubmissionRequest) -> Option<GatewayError> + 'static) -> Self {
        Self {
            fail_rule: Some(Box::new(rule)),
            ..Default::default()
        }
    }

    pub fn unreachable() -> Self {
        Self::failing(|_| Some(GatewayError::Network("connection refused".into())))
    }

    /// Runs `hook` on every request before answering.
    pub fn with_hook(self, hook: impl FnMut(&SubmissionRequest) + 'static) -> Self {
        *self.hook.borrow_mut() = Some(Box::new(hook));
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn entity_ids(&self) -> Vec<String> {
        self.requests
            .borrow()
            .iter()
            .map(|r| r.payload.entity_id.clone())
            .collect()
    }
}

impl SubmissionGateway for RecordingGateway {
    async fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionReceipt, GatewayError> {
        self.requests.borrow_mut().push(request.clone());
        if let Some(hook) = self.hook.borrow_mut().as_mut() {
            hook(request);
        }
        tokio::task::yield_now().await;

        if let Some(err) = self.fail_rule.as_ref().and_then(|rule| rule(request)) {
            return Err(err);
        }
        self.served.set(self.served.get() + 1);
        Ok(SubmissionReceipt {
            submission_id: format!("srv-{}", self.served.get()),
            duplicate: false,
        })
    }
}

/// Storage slot whose writes start failing once `fill_up` is called, the way
/// `localStorage` does when its quota is exhausted.
#[derive(Default)]
pub struct QuotaSlot {
    inner: MemorySlot,
    full: Cell<bool>,
}

impl QuotaSlot {
    pub fn fill_up(&self) {
        self.full.set(true);
    }
}

impl StorageSlot for QuotaSlot {
    fn read(&self) -> Option<String> {
        self.inner.read()
    }

    fn write(&self, value: &str) -> Result<(), StoreError> {
        if self.full.get() {
            return Err(StoreError::Write("QuotaExceededError".into()));
        }
        self.inner.write(value)
    }

    fn remove(&self) {
        self.inner.remove();
    }
}

/// Answers one-shot position requests from a script.
#[derive(Default)]
pub struct ScriptedPosition {
    answers: RefCell<VecDeque<Result<GpsFix, PositionError>>>,
    pub requests: RefCell<Vec<PositionOptions>>,
}

impl ScriptedPosition {
    pub fn answering(answers: Vec<Result<GpsFix, PositionError>>) -> Self {
        Self {
            answers: RefCell::new(answers.into()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn never() -> Self {
        Self::default()
    }
}

impl PositionSource for ScriptedPosition {
    async fn current_position(&self, options: PositionOptions) -> Result<GpsFix, PositionError> {
        self.requests.borrow_mut().push(options);
        self.answers.borrow_mut().pop_front().unwrap_or_else(|| {
            Err(PositionError::new(
                PositionErrorKind::PositionUnavailable,
                "Position unavailable",
            ))
        })
    }

    fn watch_position(
        &self,
        _options: PositionOptions,
        _on_fix: Box<dyn FnMut(GpsFix)>,
        _on_error: Box<dyn FnMut(PositionError)>,
    ) -> Result<WatchId, PositionError> {
        Err(PositionError::new(PositionErrorKind::Unsupported, "no watch in tests"))
    }

    fn clear_watch(&self, _id: WatchId) {}
}

pub fn field(name: &str, field_type: FieldType, required: bool) -> FieldDefinition {
    FieldDefinition {
        name: name.to_string(),
        label: name.to_string(),
        field_type,
        required,
        options: Vec::new(),
    }
}

/// Two required fields (`name`, `date`) and one optional (`notes`).
pub fn visit_template() -> FormTemplate {
    FormTemplate {
        id: "tpl-visit".to_string(),
        name: "Beneficiary visit".to_string(),
        fields: vec![
            field("name", FieldType::Text, true),
            field("date", FieldType::Date, true),
            field("notes", FieldType::Textarea, false),
        ],
    }
}

pub fn entity() -> EntityRef {
    EntityRef {
        entity_id: "sub-7".to_string(),
        entity_type: "subproject".to_string(),
    }
}

pub fn payload(entity_id: &str) -> SubmissionPayload {
    SubmissionPayload {
        entity_id: entity_id.to_string(),
        entity_type: "project".to_string(),
        data: FormData::new(),
        latitude: 0.0,
        longitude: 0.0,
    }
}
