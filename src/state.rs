use std::{
    sync::{
        atomic::{AtomicI64, AtomicU64, Ordering},
        Arc,
    },
    time::SystemTime,
};

use serde::Serialize;
use tokio::sync::watch;

use crate::{data::Vehicle, route_table::RouteTable};

/// The vehicle set of one successful poll. Replaced wholesale, never merged.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub vehicles: Vec<Vehicle>,
    pub fetched_at: Option<SystemTime>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PollStats {
    pub successful_polls: u64,
    pub failed_polls: u64,
}

/// Everything the render pass reads, shared between the poller and the server.
#[derive(Debug)]
pub struct LiveState {
    snapshot: watch::Sender<Arc<Snapshot>>,
    routes: watch::Sender<Arc<RouteTable>>,
    countdown: AtomicI64,
    reset_to: i64,
    revision: AtomicU64,
    successful_polls: AtomicU64,
    failed_polls: AtomicU64,
}

impl LiveState {
    /// `reset_to` is the countdown value after each successful poll.
    pub fn new(reset_to: i64) -> Self {
        Self {
            snapshot: watch::Sender::new(Arc::default()),
            routes: watch::Sender::new(Arc::default()),
            countdown: AtomicI64::new(reset_to),
            reset_to,
            revision: AtomicU64::new(0),
            successful_polls: AtomicU64::new(0),
            failed_polls: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn routes(&self) -> Arc<RouteTable> {
        self.routes.borrow().clone()
    }

    pub fn countdown(&self) -> i64 {
        self.countdown.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> PollStats {
        PollStats {
            successful_polls: self.successful_polls.load(Ordering::Relaxed),
            failed_polls: self.failed_polls.load(Ordering::Relaxed),
        }
    }

    /// Bumped whenever vehicles or routes change, i.e. whenever markers need repainting.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    /// Replaces the vehicle set and resets the countdown.
    pub fn publish_vehicles(&self, vehicles: Vec<Vehicle>) {
        self.snapshot.send_replace(Arc::new(Snapshot {
            vehicles,
            fetched_at: Some(SystemTime::now()),
        }));
        self.countdown.store(self.reset_to, Ordering::Relaxed);
        self.successful_polls.fetch_add(1, Ordering::Relaxed);
        self.revision.fetch_add(1, Ordering::Release);
    }

    pub fn record_failed_poll(&self) {
        self.failed_polls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn publish_routes(&self, routes: RouteTable) {
        self.routes.send_replace(Arc::new(routes));
        self.revision.fetch_add(1, Ordering::Release);
    }

    /// One second passed. Not clamped at zero.
    pub fn tick(&self) -> i64 {
        self.countdown.fetch_sub(1, Ordering::Relaxed) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Coordinates;

    fn vehicle(line: &str) -> Vehicle {
        Vehicle {
            coordinates: Coordinates {
                longitude: 14.4,
                latitude: 50.0,
            },
            line: line.into(),
            line_id: format!("L{line}"),
        }
    }

    #[test]
    fn vehicles_are_replaced_not_merged() {
        let state = LiveState::new(10);
        state.publish_vehicles(vec![vehicle("1"), vehicle("2")]);
        state.publish_vehicles(vec![vehicle("3")]);

        let snapshot = state.snapshot();
        assert_eq!(snapshot.vehicles, vec![vehicle("3")]);
        assert!(snapshot.fetched_at.is_some());
        assert_eq!(state.stats().successful_polls, 2);
    }

    #[test]
    fn countdown_goes_negative_until_reset() {
        let state = LiveState::new(2);
        assert_eq!(state.tick(), 1);
        assert_eq!(state.tick(), 0);
        assert_eq!(state.tick(), -1);

        state.publish_vehicles(Vec::new());
        assert_eq!(state.countdown(), 2);
    }

    #[test]
    fn revision_moves_on_vehicles_and_routes_but_not_on_ticks() {
        let state = LiveState::new(10);
        assert_eq!(state.revision(), 0);

        state.publish_vehicles(vec![vehicle("22")]);
        let after_vehicles = state.revision();
        assert!(after_vehicles > 0);

        state.tick();
        state.record_failed_poll();
        assert_eq!(state.revision(), after_vehicles);

        state.publish_routes(RouteTable::default());
        assert!(state.revision() > after_vehicles);
    }
}
