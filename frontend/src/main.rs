use crate::app::App;

mod app;
mod components;
mod config;
mod logging;
mod services;

fn main() {
    logging::init(config::LOG_LEVEL);
    yew::Renderer::<App>::new().render();
}
