//! Connectivity badge, count of submissions waiting on the device and the
//! manual "Sync Now" action.

use yew::{html, Callback, Component, Context, Html, Properties};

#[derive(Properties, PartialEq)]
pub struct SyncStatusProps {
    pub online: bool,
    pub queued: usize,
    /// Queued items the server refused during the last sync.
    #[prop_or_default]
    pub refused: usize,
    pub syncing: bool,
    pub on_sync: Callback<()>,
}

pub struct SyncStatusComponent;

impl Component for SyncStatusComponent {
    type Message = ();
    type Properties = SyncStatusProps;

    fn create(_ctx: &Context<Self>) -> Self {
        SyncStatusComponent
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let props = ctx.props();
        let (icon, label, color) = if props.online {
            ("cloud_done", "Online", "#2e7d32")
        } else {
            ("cloud_off", "Offline", "#c62828")
        };
        let on_sync = props.on_sync.reform(|_| ());

        html! {
            <div class="sync-status" style="display:flex;align-items:center;gap:12px;">
                <span style={format!("color:{};display:flex;align-items:center;", color)}>
                    <i class="material-icons">{ icon }</i>
                    <span class="icon-label">{ label }</span>
                </span>
                <span class="queued-count">
                    { format!("{} pending", props.queued) }
                </span>
                if props.refused > 0 {
                    <span class="refused-count" style="color:#c62828;" title="Refused by the server; resending will not help">
                        { format!("{} cannot be sent", props.refused) }
                    </span>
                }
                <button
                    class="icon-btn"
                    title="Sync Now"
                    disabled={!props.online || props.syncing || props.queued == 0}
                    onclick={on_sync}
                >
                    <i class="material-icons">{ if props.syncing { "hourglass_top" } else { "sync" } }</i>
                    <span class="icon-label">{"Sync Now"}</span>
                </button>
            </div>
        }
    }
}
