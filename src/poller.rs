use std::{path::PathBuf, sync::Arc, time::Duration};

use itertools::Itertools;
use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{client::TransitSource, route_table::RouteTable, state::LiveState};

pub const COUNTDOWN_STEP: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteSource {
    Api,
    File(PathBuf),
}

/// Drives the vehicle poll timer, the countdown timer and the one-off route load.
#[derive(Debug)]
pub struct Poller<S> {
    pub source: Arc<S>,
    pub state: Arc<LiveState>,
    pub poll_interval: Duration,
    pub route_source: RouteSource,
}

impl<S: TransitSource> Poller<S> {
    pub fn new(
        source: Arc<S>,
        state: Arc<LiveState>,
        poll_interval: Duration,
        route_source: RouteSource,
    ) -> Self {
        Self {
            source,
            state,
            poll_interval,
            route_source,
        }
    }

    pub fn spawn(self) -> PollerHandle {
        let cancel = CancellationToken::new();
        let poller = Arc::new(self);

        let tasks = vec![
            tokio::spawn(Arc::clone(&poller).load_routes(cancel.child_token())),
            tokio::spawn(Arc::clone(&poller).poll_loop(cancel.child_token())),
            tokio::spawn(poller.countdown_loop(cancel.child_token())),
        ];

        PollerHandle { cancel, tasks }
    }

    /// Fetches vehicles once. On failure the previous vehicle set stays in place.
    pub async fn poll_vehicles(&self) {
        match self.source.vehicle_positions().await {
            Ok(vehicles) => {
                info!(
                    vehicles = vehicles.len(),
                    lines = vehicles.iter().map(|v| &v.line_id).unique().count(),
                    "vehicle positions updated"
                );
                self.state.publish_vehicles(vehicles);
            }
            Err(err) => {
                error!(%err, "error fetching vehicle data");
                self.state.record_failed_poll();
            }
        }
    }

    async fn fetch_routes(&self) -> crate::error::Result<RouteTable> {
        match &self.route_source {
            RouteSource::Api => self.source.routes().await,
            RouteSource::File(path) => {
                let path = path.to_owned();
                tokio::task::spawn_blocking(move || RouteTable::from_gtfs_file(path)).await?
            }
        }
    }

    async fn load_routes(self: Arc<Self>, cancel: CancellationToken) {
        tokio::select! {
            _ = cancel.cancelled() => {}
            routes = self.fetch_routes() => match routes {
                Ok(routes) => {
                    info!(routes = routes.len(), "route table loaded");
                    self.state.publish_routes(routes);
                }
                Err(err) => error!(%err, "error fetching route data"),
            },
        }
    }

    async fn poll_loop(self: Arc<Self>, cancel: CancellationToken) {
        let mut ticker = time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = self.poll_vehicles() => {}
            }
        }
        debug!("vehicle poll timer stopped");
    }

    async fn countdown_loop(self: Arc<Self>, cancel: CancellationToken) {
        let mut ticker = time::interval_at(Instant::now() + COUNTDOWN_STEP, COUNTDOWN_STEP);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let remaining = self.state.tick();
                    debug!(remaining, "countdown");
                }
            }
        }
        debug!("countdown timer stopped");
    }
}

/// Owns the poller tasks. Dropping it cancels them; `shutdown` also waits for them.
#[derive(Debug)]
pub struct PollerHandle {
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl PollerHandle {
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        for task in std::mem::take(&mut self.tasks) {
            if let Err(err) = task.await {
                error!(%err, "poller task ended abnormally");
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
