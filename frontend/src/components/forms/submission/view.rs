//! View for the form submission screen: header with progress, one control per
//! template field, the GPS panel, inline errors and the submit action.

use common::model::form_data::FieldValue;
use common::model::template::{FieldDefinition, FieldType};
use common::submission::orchestrator::{FormSession, SessionState};
use web_sys::{HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};
use yew::html::Scope;
use yew::prelude::*;

use super::helpers::{format_fix, progress_color};
use super::messages::Msg;
use super::state::FormSubmissionComponent;

pub fn view(component: &FormSubmissionComponent, ctx: &Context<FormSubmissionComponent>) -> Html {
    let link = ctx.link();

    let Some(session) = &component.session else {
        return match &component.load_error {
            Some(e) => html! { <div class="form-error">{ e.clone() }</div> },
            None => html! { <div class="form-loading">{"Loading form..."}</div> },
        };
    };

    if session.is_finished() {
        return build_finished(session, link);
    }

    html! {
        <div class="form-submission">
            { build_header(session) }
            <form onsubmit={link.callback(|e: SubmitEvent| { e.prevent_default(); Msg::Submit })}>
                { for session.template().fields.iter().map(|field| build_field(session, field, link)) }
                { build_location_panel(session, link) }
                { build_error_summary(session) }
                { build_actions(session) }
            </form>
        </div>
    }
}

fn build_header(session: &FormSession) -> Html {
    let progress = session.progress();
    let bar_style = format!(
        "width:{}%;height:6px;background:{};transition:width 0.2s;",
        progress,
        progress_color(progress)
    );

    html! {
        <div class="form-header">
            <h2>{ session.template().name.clone() }</h2>
            <div class="progress" style="background:#eee;border-radius:3px;overflow:hidden;">
                <div style={bar_style}></div>
            </div>
            <span class="progress-label">{ format!("{}% of required fields", progress) }</span>
        </div>
    }
}

fn text_value(session: &FormSession, name: &str) -> String {
    match session.value(name) {
        Some(FieldValue::Text(s)) => s.clone(),
        Some(FieldValue::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn build_field(session: &FormSession, field: &FieldDefinition, link: &Scope<FormSubmissionComponent>) -> Html {
    let error = session.errors().get(&field.name).cloned();
    let input_id = format!("field-{}", field.name);
    let name = field.name.clone();
    let value = text_value(session, &field.name);

    let control = match field.field_type {
        FieldType::Text | FieldType::Date => {
            let input_type = if field.field_type == FieldType::Date { "date" } else { "text" };
            html! {
                <input
                    id={input_id.clone()}
                    type={input_type}
                    value={value}
                    oninput={link.callback(move |e: InputEvent| Msg::SetText {
                        name: name.clone(),
                        value: e.target_unchecked_into::<HtmlInputElement>().value(),
                    })}
                />
            }
        }
        FieldType::Number => html! {
            <input
                id={input_id.clone()}
                type="number"
                value={value}
                oninput={link.callback(move |e: InputEvent| Msg::SetNumber {
                    name: name.clone(),
                    raw: e.target_unchecked_into::<HtmlInputElement>().value(),
                })}
            />
        },
        FieldType::Textarea => html! {
            <textarea
                id={input_id.clone()}
                value={value}
                rows={3}
                oninput={link.callback(move |e: InputEvent| Msg::SetText {
                    name: name.clone(),
                    value: e.target_unchecked_into::<HtmlTextAreaElement>().value(),
                })}
            />
        },
        FieldType::Select => html! {
            <select
                id={input_id.clone()}
                onchange={link.callback(move |e: Event| Msg::SetText {
                    name: name.clone(),
                    value: e.target_unchecked_into::<HtmlSelectElement>().value(),
                })}
            >
                <option value="" selected={value.is_empty()}>{"—"}</option>
                { for field.options.iter().map(|option| html! {
                    <option value={option.clone()} selected={*option == value}>{ option.clone() }</option>
                }) }
            </select>
        },
        FieldType::Radio => html! {
            <div class="radio-group" id={input_id.clone()}>
                { for field.options.iter().map(|option| {
                    let name = name.clone();
                    let choice = option.clone();
                    html! {
                        <label>
                            <input
                                type="radio"
                                name={field.name.clone()}
                                checked={*option == value}
                                onchange={link.callback(move |_: Event| Msg::SetText {
                                    name: name.clone(),
                                    value: choice.clone(),
                                })}
                            />
                            { option.clone() }
                        </label>
                    }
                }) }
            </div>
        },
        FieldType::CheckboxGroup => {
            let selected = session
                .value(&field.name)
                .and_then(FieldValue::as_list)
                .map(<[String]>::to_vec)
                .unwrap_or_default();
            html! {
                <div class="checkbox-group" id={input_id.clone()}>
                    { for field.options.iter().map(|option| {
                        let name = name.clone();
                        let choice = option.clone();
                        html! {
                            <label>
                                <input
                                    type="checkbox"
                                    checked={selected.contains(option)}
                                    onchange={link.callback(move |e: Event| Msg::ToggleOption {
                                        name: name.clone(),
                                        option: choice.clone(),
                                        checked: e.target_unchecked_into::<HtmlInputElement>().checked(),
                                    })}
                                />
                                { option.clone() }
                            </label>
                        }
                    }) }
                </div>
            }
        }
    };

    html! {
        <div class={classes!("form-field", error.is_some().then_some("invalid"))}>
            <label for={input_id}>
                { field.label.clone() }
                if field.required {
                    <span class="required">{" *"}</span>
                }
            </label>
            { control }
            if let Some(message) = error {
                <div class="field-error" style="color:#c62828;font-size:12px;">{ message }</div>
            }
        </div>
    }
}

fn build_location_panel(session: &FormSession, link: &Scope<FormSubmissionComponent>) -> Html {
    let status = if session.is_gps_loading() {
        html! { <span class="gps-loading">{"Getting location..."}</span> }
    } else if let Some(fix) = session.fix() {
        html! { <span class="gps-fix">{ format_fix(&fix) }</span> }
    } else if session.device().requires_gps() {
        html! { <span class="gps-missing" style="color:#c62828;">{"Location required on this device"}</span> }
    } else {
        html! { <span class="gps-optional">{"Location optional: (0, 0) will be recorded"}</span> }
    };

    html! {
        <div class="location-panel">
            <i class="material-icons">{"my_location"}</i>
            { status }
            <button
                type="button"
                class="icon-btn"
                disabled={session.is_gps_loading() || session.is_busy()}
                onclick={link.callback(|_| Msg::RequestLocation)}
            >
                {"Retry location"}
            </button>
            if let Some(error) = session.location_error() {
                <div class="location-error" style="color:#c62828;font-size:12px;">{ error.to_string() }</div>
            }
        </div>
    }
}

fn build_error_summary(session: &FormSession) -> Html {
    if session.errors().is_empty() {
        return html! {};
    }
    html! {
        <ul class="error-summary" style="color:#c62828;">
            { for session.errors().values().map(|message| html! { <li>{ message.clone() }</li> }) }
        </ul>
    }
}

fn build_actions(session: &FormSession) -> Html {
    let label = match session.state() {
        SessionState::Validating => "Checking...",
        SessionState::AcquiringLocation => "Getting location...",
        SessionState::Submitting => "Submitting...",
        _ => "Submit",
    };
    html! {
        <div class="form-actions">
            <button type="submit" class="icon-btn wide" disabled={!session.can_submit()}>
                <i class="material-icons">{"send"}</i>
                <span class="icon-label">{ label }</span>
            </button>
        </div>
    }
}

fn build_finished(session: &FormSession, link: &Scope<FormSubmissionComponent>) -> Html {
    let (icon, title) = match session.state() {
        SessionState::QueuedOffline => ("cloud_off", "Saved on this device"),
        _ => ("check_circle", "Submitted"),
    };
    html! {
        <div class="form-finished">
            <i class="material-icons">{ icon }</i>
            <h2>{ title }</h2>
            if let Some(notice) = session.notice() {
                <p>{ notice.message.clone() }</p>
            }
            <button class="icon-btn wide" onclick={link.callback(|_| Msg::NewEntry)}>
                <i class="material-icons">{"add"}</i>
                <span class="icon-label">{"New entry"}</span>
            </button>
        </div>
    }
}
