//! Online/offline state tracking.
//!
//! The observer only reports state. Whoever owns it decides what to do on a
//! transition (the client app flushes the queue on `CameOnline`).

use std::cell::Cell;

/// Read access to the current connectivity state.
pub trait Connectivity {
    fn is_online(&self) -> bool;
}

impl Connectivity for bool {
    fn is_online(&self) -> bool {
        *self
    }
}

impl Connectivity for Cell<bool> {
    fn is_online(&self) -> bool {
        self.get()
    }
}

/// Host environment connectivity events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    Online,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    CameOnline,
    WentOffline,
}

#[derive(Debug)]
pub struct ConnectivityObserver {
    online: Cell<bool>,
}

impl ConnectivityObserver {
    /// Starts from the state the host reports at startup.
    pub fn new(initially_online: bool) -> Self {
        Self {
            online: Cell::new(initially_online),
        }
    }

    /// Applies an event and reports a transition when the state changed.
    /// Repeated events of the same kind are absorbed.
    pub fn observe(&self, event: ConnectivityEvent) -> Option<Transition> {
        let now_online = event == ConnectivityEvent::Online;
        if self.online.replace(now_online) == now_online {
            return None;
        }
        log::info!(
            "connectivity changed: {}",
            if now_online { "online" } else { "offline" }
        );
        Some(if now_online {
            Transition::CameOnline
        } else {
            Transition::WentOffline
        })
    }
}

impl Connectivity for ConnectivityObserver {
    fn is_online(&self) -> bool {
        self.online.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_only_real_transitions() {
        let observer = ConnectivityObserver::new(false);
        assert!(!observer.is_online());

        assert_eq!(observer.observe(ConnectivityEvent::Offline), None);
        assert_eq!(
            observer.observe(ConnectivityEvent::Online),
            Some(Transition::CameOnline)
        );
        assert!(observer.is_online());
        assert_eq!(observer.observe(ConnectivityEvent::Online), None);
        assert_eq!(
            observer.observe(ConnectivityEvent::Offline),
            Some(Transition::WentOffline)
        );
        assert!(!observer.is_online());
    }
}
