// The status monitor ties fetching, presence and the pinned message together.
//
// It is the context object every entry point works through: the scheduler
// loop, `/force-update`, `/pin` and the read-only commands. One cycle is a
// straight pipeline: fetch, then presence, then pin refresh.

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::core::config::DisplayConfig;
use crate::core::pin::{
    ChannelHandle, ChatGateway, PinError, PinOutcome, PinReconciler, PinStore, RefreshOutcome,
};
use crate::core::presence::{PresenceSink, PresenceUpdater};
use crate::core::status::status_renderer::{display_ip, players_summary, render};
use crate::core::status::{RenderedStatus, ServerStatus, StatusFetcher, StatusQuery};

#[derive(Debug, Clone)]
pub struct CycleReport {
    pub status: ServerStatus,
    pub pin: RefreshOutcome,
}

pub struct StatusMonitor<Q, P, G, S>
where
    Q: StatusQuery,
    P: PresenceSink,
    G: ChatGateway,
    S: PinStore,
{
    config: DisplayConfig,
    fetcher: StatusFetcher<Q>,
    presence: PresenceUpdater<P>,
    pins: PinReconciler<G, S>,
}

impl<Q, P, G, S> StatusMonitor<Q, P, G, S>
where
    Q: StatusQuery + 'static,
    P: PresenceSink + 'static,
    G: ChatGateway + 'static,
    S: PinStore + 'static,
{
    pub fn new(
        config: DisplayConfig,
        fetcher: StatusFetcher<Q>,
        presence: PresenceUpdater<P>,
        pins: PinReconciler<G, S>,
    ) -> Self {
        Self {
            config,
            fetcher,
            presence,
            pins,
        }
    }

    /// Reply text for `/ip`.
    pub fn ip_text(&self) -> String {
        format!("Server ip: {}", display_ip(&self.config))
    }

    pub async fn fetch_status(&self) -> ServerStatus {
        self.fetcher.fetch().await
    }

    pub fn render_now(&self, status: &ServerStatus) -> RenderedStatus {
        render(status, &self.config, Utc::now())
    }

    /// Reply text for `/online`.
    pub fn online_text(&self, status: &ServerStatus) -> String {
        match players_summary(status, &self.config) {
            Some(summary) => format!("Online: {}", summary),
            None => "Offline".to_string(),
        }
    }

    /// One fetch-render-update pass. Used by the scheduler and `/force-update`.
    pub async fn run_cycle(&self) -> CycleReport {
        tracing::info!("Updating bot status");
        let status = self.fetcher.fetch().await;
        tracing::info!(
            "{} server online: {}",
            self.config.display_name(),
            status.is_online()
        );

        self.presence.update(&status).await;
        let pin = self.pins.refresh(&status, Utc::now()).await;

        CycleReport { status, pin }
    }

    /// `/pin`: post a fresh status message in `target` and track it from now on.
    pub async fn pin_here(&self, target: ChannelHandle) -> Result<PinOutcome, PinError> {
        let status = self.fetcher.fetch().await;
        self.pins.create_and_track(&status, &target, Utc::now()).await
    }

    /// Run a cycle now, then one per `pin_update_interval`, for as long as the
    /// process lives. Every tick gets its own task, so a slow cycle never
    /// holds up the next one.
    pub fn start_scheduler(self: Arc<Self>) -> JoinHandle<()> {
        let period = self.config.pin_update_interval;
        tracing::info!("Starting status updates every {:?}", period);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                // The first tick completes immediately
                ticker.tick().await;
                let monitor = Arc::clone(&self);
                tokio::spawn(async move {
                    monitor.run_cycle().await;
                });
            }
        })
    }
}
