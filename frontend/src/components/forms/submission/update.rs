//! Update function for the form submission screen.
//!
//! Elm-style: mutates the component for each `Msg` and returns whether the
//! view should re-render. Location requests and deliveries are spawned and
//! report back with `Msg::LocationAcquired`/`LocationFailed` and
//! `Msg::Delivered`.

use common::model::form_data::FieldValue;
use common::submission::orchestrator::{
    deliver, DeliveryOutcome, FormSession, NextStep, Notice, NoticeLevel, SubmissionDraft,
};
use yew::platform::spawn_local;
use yew::prelude::*;

use crate::services::connectivity::NavigatorConnectivity;

use super::helpers::show_notice;
use super::messages::Msg;
use super::state::FormSubmissionComponent;

pub fn update(component: &mut FormSubmissionComponent, ctx: &Context<FormSubmissionComponent>, msg: Msg) -> bool {
    match msg {
        Msg::TemplateLoaded(template) => {
            let entity = ctx.props().entity.clone();
            let mut session = FormSession::new(template, entity, component.device);
            start_watch(component, ctx, &mut session);
            component.session = Some(session);
            component.load_error = None;
            true
        }
        Msg::TemplateFailed(e) => {
            component.load_error = Some(e);
            true
        }
        Msg::SetText { name, value } => {
            let Some(session) = component.session.as_mut() else {
                return false;
            };
            if value.is_empty() {
                session.clear_field(&name);
            } else {
                session.set_field(&name, FieldValue::Text(value));
            }
            true
        }
        Msg::SetNumber { name, raw } => {
            let Some(session) = component.session.as_mut() else {
                return false;
            };
            // Number inputs report "" for anything they cannot parse, but
            // accept overflowing input such as "1e999".
            match raw.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => session.set_field(&name, FieldValue::Number(n)),
                _ => session.clear_field(&name),
            }
            true
        }
        Msg::ToggleOption { name, option, checked } => {
            let Some(session) = component.session.as_mut() else {
                return false;
            };
            session.toggle_option(&name, &option, checked);
            true
        }
        Msg::WatchFix(fix) => {
            if let Some(session) = component.session.as_mut() {
                session.set_fix(fix);
            }
            true
        }
        Msg::WatchFailed(e) => {
            log::warn!("position watch error: {}", e);
            if let Some(session) = component.session.as_mut() {
                session.watch_failed(e);
            }
            true
        }
        Msg::RequestLocation => {
            let Some(session) = component.session.as_mut() else {
                return false;
            };
            if session.is_gps_loading() || session.is_busy() {
                return false;
            }
            session.set_gps_loading(true);
            let link = ctx.link().clone();
            let geolocation = ctx.props().services.geolocation.clone();
            spawn_local(async move {
                let result = geolocation.acquire(&NavigatorConnectivity).await;
                link.send_message(Msg::LocationRefreshed(result));
            });
            true
        }
        Msg::LocationRefreshed(result) => {
            let Some(session) = component.session.as_mut() else {
                return false;
            };
            match result {
                Ok(fix) => session.set_fix(fix),
                Err(e) => {
                    show_notice(&Notice::new(NoticeLevel::Error, e.to_string()));
                    session.watch_failed(e);
                }
            }
            true
        }
        Msg::Submit => {
            let Some(session) = component.session.as_mut() else {
                return false;
            };
            if !session.can_submit() {
                return false;
            }
            match session.begin_submit() {
                Err(_) => {
                    if let Some(notice) = session.notice() {
                        show_notice(notice);
                    }
                }
                Ok(NextStep::AcquireLocation) => {
                    let link = ctx.link().clone();
                    let geolocation = ctx.props().services.geolocation.clone();
                    spawn_local(async move {
                        match geolocation.acquire(&NavigatorConnectivity).await {
                            Ok(fix) => link.send_message(Msg::LocationAcquired(fix)),
                            Err(e) => link.send_message(Msg::LocationFailed(e)),
                        }
                    });
                }
                Ok(NextStep::Deliver(draft)) => spawn_delivery(ctx, draft),
            }
            true
        }
        Msg::LocationAcquired(fix) => {
            if let Some(session) = component.session.as_mut() {
                let draft = session.location_acquired(fix);
                spawn_delivery(ctx, draft);
            }
            true
        }
        Msg::LocationFailed(e) => {
            if let Some(session) = component.session.as_mut() {
                match session.location_failed(e) {
                    Some(draft) => spawn_delivery(ctx, draft),
                    None => {
                        if let Some(notice) = session.notice() {
                            show_notice(notice);
                        }
                    }
                }
            }
            true
        }
        Msg::Delivered(outcome) => {
            let Some(session) = component.session.as_mut() else {
                return false;
            };
            session.finish(&outcome);
            if let Some(notice) = session.notice() {
                show_notice(notice);
            }
            if matches!(outcome, DeliveryOutcome::Submitted(_) | DeliveryOutcome::Queued { .. }) {
                ctx.props().on_saved.emit(());
            }
            true
        }
        Msg::NewEntry => {
            if let Some(session) = component.session.as_mut() {
                session.reset();
            }
            true
        }
    }
}

/// Sends the draft or queues it on the device, then reports back.
fn spawn_delivery(ctx: &Context<FormSubmissionComponent>, draft: SubmissionDraft) {
    let link = ctx.link().clone();
    let services = ctx.props().services.clone();
    spawn_local(async move {
        let outcome = deliver(
            draft,
            services.store.as_ref(),
            services.gateway.as_ref(),
            &NavigatorConnectivity,
        )
        .await;
        link.send_message(Msg::Delivered(outcome));
    });
}

/// Subscribes to position updates for the lifetime of the screen. Handhelds
/// show a loading state until the first fix or error arrives.
fn start_watch(
    component: &mut FormSubmissionComponent,
    ctx: &Context<FormSubmissionComponent>,
    session: &mut FormSession,
) {
    let on_fix = ctx.link().callback(Msg::WatchFix);
    let on_error = ctx.link().callback(Msg::WatchFailed);

    match ctx
        .props()
        .services
        .geolocation
        .watch(move |fix| on_fix.emit(fix), move |e| on_error.emit(e))
    {
        Ok(handle) => {
            session.set_gps_loading(session.device().requires_gps());
            component.watch = Some(handle);
        }
        Err(e) => {
            log::warn!("position watch unavailable: {}", e);
            session.watch_failed(e);
        }
    }
}
