//! Best-effort GPS acquisition.
//!
//! A one-shot `acquire` tries a fresh high-accuracy fix first and falls back
//! once to a low-accuracy request that accepts a recent cached position.
//! `watch` keeps the displayed fix current while the form is open.

use crate::model::location::{AccuracyTier, GpsFix};
use crate::submission::connectivity::Connectivity;
use log::{debug, warn};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use thiserror::Error;

/// Request parameters handed to the host geolocation API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached position the host may return instead of a fresh one.
    pub maximum_age: Duration,
}

pub const HIGH_ACCURACY: PositionOptions = PositionOptions {
    high_accuracy: true,
    timeout: Duration::from_secs(15),
    maximum_age: Duration::ZERO,
};

pub const LOW_ACCURACY: PositionOptions = PositionOptions {
    high_accuracy: false,
    timeout: Duration::from_secs(60),
    maximum_age: Duration::from_secs(60),
};

pub const OFFLINE_GUIDANCE: &str = "Location unavailable while offline. This device has no GPS fix \
     and cannot fall back to network positioning: enable location services, move to open sky and try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionErrorKind {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    /// The host has no geolocation API at all.
    Unsupported,
}

/// A failure reported by the host for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PositionError {
    pub kind: PositionErrorKind,
    pub message: String,
}

impl PositionError {
    pub fn new(kind: PositionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    /// Both tiers failed while the device was offline.
    #[error("{}", OFFLINE_GUIDANCE)]
    OfflineNoFix,
    #[error("{0}")]
    Unavailable(String),
}

pub type WatchId = i32;

/// Host geolocation API.
#[allow(async_fn_in_trait)]
pub trait PositionSource {
    async fn current_position(&self, options: PositionOptions) -> Result<GpsFix, PositionError>;

    fn watch_position(
        &self,
        options: PositionOptions,
        on_fix: Box<dyn FnMut(GpsFix)>,
        on_error: Box<dyn FnMut(PositionError)>,
    ) -> Result<WatchId, PositionError>;

    fn clear_watch(&self, id: WatchId);
}

pub struct GeolocationAcquirer<P> {
    source: Rc<P>,
}

impl<P> Clone for GeolocationAcquirer<P> {
    fn clone(&self) -> Self {
        Self {
            source: Rc::clone(&self.source),
        }
    }
}

impl<P: PositionSource> GeolocationAcquirer<P> {
    pub fn new(source: P) -> Self {
        Self {
            source: Rc::new(source),
        }
    }

    pub fn source(&self) -> &P {
        &self.source
    }

    /// One high-accuracy attempt, then exactly one low-accuracy retry.
    ///
    /// The returned fix is tagged with the tier that produced it.
    pub async fn acquire<C: Connectivity + ?Sized>(
        &self,
        connectivity: &C,
    ) -> Result<GpsFix, GeolocationError> {
        match self.source.current_position(HIGH_ACCURACY).await {
            Ok(fix) => return Ok(fix.with_accuracy(AccuracyTier::High)),
            Err(e) => debug!("high accuracy fix failed ({:?}): {}", e.kind, e),
        }

        match self.source.current_position(LOW_ACCURACY).await {
            Ok(fix) => Ok(fix.with_accuracy(AccuracyTier::Low)),
            Err(e) => {
                warn!("low accuracy fix failed ({:?}): {}", e.kind, e);
                if connectivity.is_online() {
                    Err(GeolocationError::Unavailable(e.message))
                } else {
                    Err(GeolocationError::OfflineNoFix)
                }
            }
        }
    }

    /// Subscribes to position updates until the returned handle is dropped.
    ///
    /// `on_error` stops firing once a fix has been delivered, so a transient
    /// error never replaces a good fix.
    pub fn watch(
        &self,
        mut on_fix: impl FnMut(GpsFix) + 'static,
        mut on_error: impl FnMut(GeolocationError) + 'static,
    ) -> Result<WatchHandle<P>, GeolocationError> {
        let has_fix = Rc::new(Cell::new(false));
        let fix_seen = Rc::clone(&has_fix);

        let id = self
            .source
            .watch_position(
                HIGH_ACCURACY,
                Box::new(move |fix| {
                    fix_seen.set(true);
                    on_fix(fix.with_accuracy(AccuracyTier::High));
                }),
                Box::new(move |e| {
                    if !has_fix.get() {
                        on_error(GeolocationError::Unavailable(e.message));
                    }
                }),
            )
            .map_err(|e| GeolocationError::Unavailable(e.message))?;

        Ok(WatchHandle {
            source: Rc::clone(&self.source),
            id: Some(id),
        })
    }
}

/// Live position subscription. Clears the host watch when dropped.
pub struct WatchHandle<P: PositionSource> {
    source: Rc<P>,
    id: Option<WatchId>,
}

impl<P: PositionSource> WatchHandle<P> {
    pub fn is_active(&self) -> bool {
        self.id.is_some()
    }

    pub fn release(&mut self) {
        if let Some(id) = self.id.take() {
            debug!("clearing position watch {}", id);
            self.source.clear_watch(id);
        }
    }
}

impl<P: PositionSource> Drop for WatchHandle<P> {
    fn drop(&mut self) {
        self.release();
    }
}
