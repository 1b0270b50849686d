//! Application shell.
//!
//! Owns the connectivity observer and the shared services. The offline queue
//! is flushed once on start when online, on every transition back online and
//! when the user presses "Sync Now"; the flusher itself collapses overlapping
//! requests.

use common::model::submission::EntityRef;
use common::submission::connectivity::{Connectivity, ConnectivityEvent, ConnectivityObserver, Transition};
use common::submission::flusher::FlushOutcome;
use common::submission::orchestrator::{Notice, NoticeLevel};
use common::submission::store::SubmissionStore;
use yew::platform::spawn_local;
use yew::{html, AttrValue, Component, Context, Html};

use crate::components::forms::submission::FormSubmissionComponent;
use crate::components::sync::SyncStatusComponent;
use crate::services::connectivity::{navigator_online, ConnectivityListener};
use crate::services::Services;

/// Which template to fill for which entity, read from the page query string
/// (`?template_id=..&entity_id=..&entity_type=..`).
struct SubmissionTarget {
    template_id: AttrValue,
    entity: EntityRef,
}

fn target_from_location() -> Option<SubmissionTarget> {
    let search = web_sys::window()?.location().search().ok()?;
    let params = web_sys::UrlSearchParams::new_with_str(&search).ok()?;
    Some(SubmissionTarget {
        template_id: params.get("template_id")?.into(),
        entity: EntityRef {
            entity_id: params.get("entity_id")?,
            entity_type: params.get("entity_type").unwrap_or_else(|| "project".to_string()),
        },
    })
}

pub enum Msg {
    Connectivity(ConnectivityEvent),
    SyncNow,
    SyncFinished(Result<FlushOutcome, String>),
    QueueChanged,
}

pub struct App {
    services: Services,
    observer: ConnectivityObserver,
    _listener: Option<ConnectivityListener>,
    target: Option<SubmissionTarget>,
    queued: usize,
    refused: usize,
    syncing: bool,
}

impl Component for App {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let services = Services::browser();
        let queued = services.store.len();
        Self {
            services,
            observer: ConnectivityObserver::new(navigator_online()),
            _listener: ConnectivityListener::attach(ctx.link().callback(Msg::Connectivity)),
            target: target_from_location(),
            queued,
            refused: 0,
            syncing: false,
        }
    }

    fn rendered(&mut self, ctx: &Context<Self>, first_render: bool) {
        if first_render && self.observer.is_online() {
            ctx.link().send_message(Msg::SyncNow);
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Connectivity(event) => {
                if self.observer.observe(event) == Some(Transition::CameOnline) {
                    ctx.link().send_message(Msg::SyncNow);
                }
                true
            }
            Msg::SyncNow => {
                if self.services.flusher.is_running() || !self.observer.is_online() {
                    return false;
                }
                self.syncing = true;
                let services = self.services.clone();
                let link = ctx.link().clone();
                spawn_local(async move {
                    let outcome = services
                        .flusher
                        .flush(services.store.as_ref(), services.gateway.as_ref())
                        .await
                        .map_err(|e| e.to_string());
                    link.send_message(Msg::SyncFinished(outcome));
                });
                true
            }
            Msg::SyncFinished(outcome) => {
                self.syncing = false;
                self.queued = self.services.store.len();
                match outcome {
                    Ok(FlushOutcome::Completed(report)) => {
                        self.refused = report.rejected;
                        if report.successes > 0 {
                            crate::components::forms::submission::show_notice(&Notice::new(
                                NoticeLevel::Success,
                                format!("Synced {} offline submission(s).", report.successes),
                            ));
                        }
                        if report.rejected > 0 {
                            crate::components::forms::submission::show_notice(&Notice::new(
                                NoticeLevel::Error,
                                format!(
                                    "{} offline submission(s) were refused by the server.",
                                    report.rejected
                                ),
                            ));
                        }
                    }
                    Ok(FlushOutcome::AlreadyRunning) => {}
                    Err(e) => {
                        log::error!("sync failed: {}", e);
                        crate::components::forms::submission::show_notice(&Notice::new(
                            NoticeLevel::Error,
                            format!("Sync failed: {}", e),
                        ));
                    }
                }
                true
            }
            Msg::QueueChanged => {
                self.queued = self.services.store.len();
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        html! {
            <div>
                <header class="app-header">
                    <SyncStatusComponent
                        online={self.observer.is_online()}
                        queued={self.queued}
                        refused={self.refused}
                        syncing={self.syncing}
                        on_sync={link.callback(|_| Msg::SyncNow)}
                    />
                </header>
                {
                    match &self.target {
                        Some(target) => html! {
                            <FormSubmissionComponent
                                template_id={target.template_id.clone()}
                                entity={target.entity.clone()}
                                services={self.services.clone()}
                                on_saved={link.callback(|_| Msg::QueueChanged)}
                            />
                        },
                        None => html! {
                            <div class="form-error">{"No form selected."}</div>
                        },
                    }
                }
            </div>
        }
    }
}
