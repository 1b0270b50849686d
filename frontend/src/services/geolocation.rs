//! `navigator.geolocation` behind the `PositionSource` trait.
//!
//! The one-shot request is bridged to a future with a oneshot channel; the
//! callbacks stay alive until it resolves. Watch callbacks are kept in a map
//! keyed by watch id until `clear_watch`.

use common::model::location::GpsFix;
use common::submission::geolocation::{
    PositionError, PositionErrorKind, PositionOptions, PositionSource, WatchId,
};
use futures::channel::oneshot;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Geolocation, Position as GeolocationPosition, PositionError as GeolocationPositionError,
};

type PositionClosure = Closure<dyn FnMut(JsValue)>;

#[derive(Default)]
pub struct BrowserPositionSource {
    watches: RefCell<HashMap<WatchId, (PositionClosure, PositionClosure)>>,
}

fn geolocation() -> Result<Geolocation, PositionError> {
    web_sys::window()
        .and_then(|w| w.navigator().geolocation().ok())
        .ok_or_else(|| {
            PositionError::new(
                PositionErrorKind::Unsupported,
                "Geolocation is not supported by this browser",
            )
        })
}

fn js_options(options: PositionOptions) -> web_sys::PositionOptions {
    let js = web_sys::PositionOptions::new();
    js.set_enable_high_accuracy(options.high_accuracy);
    js.set_timeout(options.timeout.as_millis() as u32);
    js.set_maximum_age(options.maximum_age.as_millis() as u32);
    js
}

fn to_fix(value: JsValue) -> GpsFix {
    let coords = value.unchecked_into::<GeolocationPosition>().coords();
    GpsFix::new(coords.latitude(), coords.longitude())
}

fn to_error(value: JsValue) -> PositionError {
    let err = value.unchecked_into::<GeolocationPositionError>();
    let kind = match err.code() {
        GeolocationPositionError::PERMISSION_DENIED => PositionErrorKind::PermissionDenied,
        GeolocationPositionError::TIMEOUT => PositionErrorKind::Timeout,
        _ => PositionErrorKind::PositionUnavailable,
    };
    PositionError::new(kind, err.message())
}

fn js_failure(kind: PositionErrorKind, value: JsValue) -> PositionError {
    PositionError::new(kind, value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}

impl PositionSource for BrowserPositionSource {
    async fn current_position(&self, options: PositionOptions) -> Result<GpsFix, PositionError> {
        let geolocation = geolocation()?;
        let (tx, rx) = oneshot::channel::<Result<GpsFix, PositionError>>();
        let tx = Rc::new(RefCell::new(Some(tx)));

        let on_success = {
            let tx = Rc::clone(&tx);
            PositionClosure::new(move |value: JsValue| {
                if let Some(tx) = tx.borrow_mut().take() {
                    tx.send(Ok(to_fix(value))).ok();
                }
            })
        };
        let on_error = {
            let tx = Rc::clone(&tx);
            PositionClosure::new(move |value: JsValue| {
                if let Some(tx) = tx.borrow_mut().take() {
                    tx.send(Err(to_error(value))).ok();
                }
            })
        };

        geolocation
            .get_current_position_with_error_callback_and_options(
                on_success.as_ref().unchecked_ref(),
                Some(on_error.as_ref().unchecked_ref()),
                &js_options(options),
            )
            .map_err(|e| js_failure(PositionErrorKind::PositionUnavailable, e))?;

        let result = rx.await.unwrap_or_else(|_| {
            Err(PositionError::new(
                PositionErrorKind::PositionUnavailable,
                "geolocation request was dropped",
            ))
        });
        drop((on_success, on_error));
        result
    }

    fn watch_position(
        &self,
        options: PositionOptions,
        mut on_fix: Box<dyn FnMut(GpsFix)>,
        mut on_error: Box<dyn FnMut(PositionError)>,
    ) -> Result<WatchId, PositionError> {
        let geolocation = geolocation()?;
        let success = PositionClosure::new(move |value: JsValue| on_fix(to_fix(value)));
        let failure = PositionClosure::new(move |value: JsValue| on_error(to_error(value)));

        let id = geolocation
            .watch_position_with_error_callback_and_options(
                success.as_ref().unchecked_ref(),
                Some(failure.as_ref().unchecked_ref()),
                &js_options(options),
            )
            .map_err(|e| js_failure(PositionErrorKind::Unsupported, e))?;

        self.watches.borrow_mut().insert(id, (success, failure));
        Ok(id)
    }

    fn clear_watch(&self, id: WatchId) {
        if let Ok(geolocation) = geolocation() {
            geolocation.clear_watch(id);
        }
        self.watches.borrow_mut().remove(&id);
    }
}
