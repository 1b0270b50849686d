use common::submission::connectivity::{Connectivity, ConnectivityEvent};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Window;
use yew::Callback;

/// Reads `navigator.onLine` on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct NavigatorConnectivity;

impl Connectivity for NavigatorConnectivity {
    fn is_online(&self) -> bool {
        navigator_online()
    }
}

pub fn navigator_online() -> bool {
    // Without a window there is nothing to ask; assume online and let the
    // remote call decide.
    web_sys::window()
        .map(|w| w.navigator().on_line())
        .unwrap_or(true)
}

/// `online`/`offline` window listeners. Removed when dropped.
pub struct ConnectivityListener {
    window: Window,
    on_online: Closure<dyn FnMut()>,
    on_offline: Closure<dyn FnMut()>,
}

impl ConnectivityListener {
    pub fn attach(callback: Callback<ConnectivityEvent>) -> Option<Self> {
        let window = web_sys::window()?;

        let cb = callback.clone();
        let on_online = Closure::<dyn FnMut()>::new(move || cb.emit(ConnectivityEvent::Online));
        let on_offline =
            Closure::<dyn FnMut()>::new(move || callback.emit(ConnectivityEvent::Offline));

        window
            .add_event_listener_with_callback("online", on_online.as_ref().unchecked_ref())
            .ok()?;
        window
            .add_event_listener_with_callback("offline", on_offline.as_ref().unchecked_ref())
            .ok()?;

        Some(Self {
            window,
            on_online,
            on_offline,
        })
    }
}

impl Drop for ConnectivityListener {
    fn drop(&mut self) {
        self.window
            .remove_event_listener_with_callback("online", self.on_online.as_ref().unchecked_ref())
            .ok();
        self.window
            .remove_event_listener_with_callback("offline", self.on_offline.as_ref().unchecked_ref())
            .ok();
    }
}
