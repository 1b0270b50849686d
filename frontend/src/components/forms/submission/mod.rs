//! Form submission screen: root module wiring the Yew `Component`
//! implementation with submodules for state, update logic, view rendering and
//! helpers.
//!
//! On first render the template is fetched. Once it is in, a GPS watch is
//! started so the screen can show the current fix; the watch is released in
//! `destroy`. Submitting drives `FormSession` message by message: location
//! acquisition and delivery run in spawned tasks and report back through
//! `Msg`.

use yew::platform::spawn_local;
use yew::prelude::*;

mod helpers;
mod messages;
mod props;
mod state;
mod update;
mod view;

use helpers::detect_device;
pub use helpers::show_notice;
pub use messages::Msg;
pub use props::FormSubmissionProps;
pub use state::FormSubmissionComponent;

use common::submission::orchestrator::{Notice, NoticeLevel};

impl Component for FormSubmissionComponent {
    type Message = Msg;
    type Properties = FormSubmissionProps;

    fn create(ctx: &Context<Self>) -> Self {
        FormSubmissionComponent::new(ctx.props().device.unwrap_or_else(detect_device))
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        update::update(self, ctx, msg)
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        view::view(self, ctx)
    }

    fn rendered(&mut self, ctx: &Context<Self>, first_render: bool) {
        if first_render && !self.loaded {
            self.loaded = true;

            let link = ctx.link().clone();
            let gateway = ctx.props().services.gateway.clone();
            let template_id = ctx.props().template_id.clone();
            spawn_local(async move {
                match gateway.fetch_template(&template_id).await {
                    Ok(template) => link.send_message(Msg::TemplateLoaded(template)),
                    Err(e) => {
                        show_notice(&Notice::new(NoticeLevel::Error, e.clone()));
                        link.send_message(Msg::TemplateFailed(e));
                    }
                }
            });
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        if let Some(mut watch) = self.watch.take() {
            watch.release();
        }
    }
}
