use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use tokio::sync::{oneshot, Mutex};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

use crate::api::coinbase::PriceSource;
use crate::config::{AppConfig, OverlapPolicy};
use crate::models::ChartSeries;
use crate::services::chart_service::{build_series, render_chart};
use crate::utils::errors::CycleError;
use crate::utils::format::local_time_label;
use crate::utils::page::{publish_page, Node, Page, ERROR_MESSAGE};

/// Fetches every tracked coin, turns the responses into chart series and
/// repaints the page's chart section.
pub struct RefreshDriver<S> {
    source: S,
    coins: Vec<String>,
    interval: Duration,
    overlap: OverlapPolicy,
    output: Option<PathBuf>,
    page: Arc<Mutex<Page>>,
}

impl<S> RefreshDriver<S>
where
    S: PriceSource + 'static,
{
    pub fn new(source: S, config: &AppConfig) -> Self {
        RefreshDriver {
            source,
            coins: config.coins.clone(),
            interval: config.refresh_interval,
            overlap: config.overlap,
            output: config.output.clone(),
            page: Arc::new(Mutex::new(Page::new().with_reload(config.refresh_interval))),
        }
    }

    /// Shared handle to the page being painted
    #[cfg(test)]
    pub fn page(&self) -> Arc<Mutex<Page>> {
        Arc::clone(&self.page)
    }

    /// Run one full cycle: loader, fetch all, render all.
    ///
    /// Any failure replaces the chart section with the error message and is
    /// returned after being logged. Nothing is rendered on partial success.
    pub async fn refresh_all(&self) -> Result<(), CycleError> {
        debug!("🔄 Refreshing {} coins", self.coins.len());

        {
            let mut page = self.page.lock().await;
            page.chart_section_mut()?.replace_with(Node::Loader);
            self.publish(&page).await;
        }

        let result = self.run_cycle().await;
        if let Err(e) = &result {
            error!("❌ Refresh cycle failed: {}", e);
            self.show_error().await;
        }
        result
    }

    async fn run_cycle(&self) -> Result<(), CycleError> {
        let series = self.load_all().await?;

        // Clear and render under one lock so overlapping cycles never interleave
        let mut page = self.page.lock().await;
        page.chart_section_mut()?.clear();
        for s in &series {
            render_chart(&mut page, &s.coin_id, &s.labels, &s.data, &s.symbol)?;
        }
        let rendered = page.chart_section_mut()?.surface_ids().join(", ");
        self.publish(&page).await;

        info!("📈 Rendered {} charts: {}", series.len(), rendered);
        Ok(())
    }

    /// Fetch every coin concurrently; the first failure drops the rest
    async fn load_all(&self) -> Result<Vec<ChartSeries>, CycleError> {
        let fetches = self.coins.iter().cloned().map(|coin| self.load_one(coin));
        try_join_all(fetches).await
    }

    async fn load_one(&self, coin: String) -> Result<ChartSeries, CycleError> {
        let response = match self.source.fetch_prices(&coin).await {
            Ok(response) => response,
            Err(source) => return Err(CycleError::Fetch { coin, source }),
        };
        build_series(&coin, &response, local_time_label)
    }

    async fn show_error(&self) {
        let mut page = self.page.lock().await;
        if let Ok(section) = page.chart_section_mut() {
            section.replace_with(Node::Message(ERROR_MESSAGE.to_string()));
        }
        self.publish(&page).await;
    }

    async fn publish(&self, page: &Page) {
        let Some(path) = &self.output else {
            return;
        };
        if let Err(e) = publish_page(&page.to_html(), path).await {
            warn!("Failed to write {}: {}", path.display(), e);
        }
    }

    /// Run a cycle now and then once per interval until the handle is shut down
    pub fn start(self: Arc<Self>) -> RefreshHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            let mut cycles = JoinSet::new();

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        while let Some(res) = cycles.try_join_next() {
                            log_finished(res);
                        }

                        if self.overlap == OverlapPolicy::Skip && !cycles.is_empty() {
                            debug!("⏭️ Previous refresh still running, skipping tick");
                            continue;
                        }

                        let driver = Arc::clone(&self);
                        cycles.spawn(async move {
                            // Already logged and painted by refresh_all
                            let _ = driver.refresh_all().await;
                        });
                    }
                }
            }

            let in_flight = cycles.len();
            cycles.shutdown().await;
            info!("🛑 Refresh timer stopped ({} cycles cancelled)", in_flight);
        });

        RefreshHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

fn log_finished(res: Result<(), JoinError>) {
    if let Err(e) = res {
        if e.is_panic() {
            error!("Refresh cycle panicked: {}", e);
        }
    }
}

/// Owns the refresh timer. Dropping it also stops the timer.
pub struct RefreshHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Stop ticking, cancel in-flight cycles and wait for the timer task
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            warn!("Refresh timer ended abnormally: {}", e);
        }
    }
}
