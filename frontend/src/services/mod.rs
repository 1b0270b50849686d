//! Browser implementations of the submission pipeline boundaries.
//!
//! - `storage`: `localStorage` slot backing the offline queue.
//! - `geolocation`: `navigator.geolocation` as a `PositionSource`.
//! - `connectivity`: `online`/`offline` window events and `navigator.onLine`.
//! - `gateway`: HTTP client for the form endpoints.

pub mod connectivity;
pub mod gateway;
pub mod geolocation;
pub mod storage;

use common::submission::flusher::QueueFlusher;
use common::submission::geolocation::GeolocationAcquirer;
use common::submission::store::{SlotStore, QUEUE_STORAGE_KEY};
use std::rc::Rc;

use self::gateway::HttpGateway;
use self::geolocation::BrowserPositionSource;
use self::storage::LocalStorageSlot;

pub type BrowserStore = SlotStore<LocalStorageSlot>;

/// Shared collaborators handed down to components. Cloning is cheap; every
/// clone points at the same store and flusher.
#[derive(Clone)]
pub struct Services {
    pub store: Rc<BrowserStore>,
    pub gateway: Rc<HttpGateway>,
    pub geolocation: GeolocationAcquirer<BrowserPositionSource>,
    pub flusher: Rc<QueueFlusher>,
}

impl Services {
    pub fn browser() -> Self {
        Self {
            store: Rc::new(SlotStore::new(LocalStorageSlot::new(QUEUE_STORAGE_KEY))),
            gateway: Rc::new(HttpGateway::default()),
            geolocation: GeolocationAcquirer::new(BrowserPositionSource::default()),
            flusher: Rc::new(QueueFlusher::new()),
        }
    }
}

impl PartialEq for Services {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.store, &other.store) && Rc::ptr_eq(&self.flusher, &other.flusher)
    }
}
