//! Basemap orchestration.
//!
//! [`BasemapController`] ties the planner, worker pool, fetcher and
//! compositor together behind the host's viewport events. It runs
//! entirely on the host's control thread and never blocks on tile
//! completion: each redraw composites whatever is cached and polls the
//! current round's counters.
//!
//! # State machine
//!
//! ```text
//! Idle → Planning → Fetching → Ready
//!          ↑__________|           |
//!          ↑______________________|   (any viewport mutation)
//! ```
//!
//! A mutation while fetching replans immediately; the superseded round's
//! jobs are not cancelled. They finish against their own counters and
//! their cache writes stay valid, since the cache key space is
//! viewport-independent.

use std::sync::Arc;

use image::RgbaImage;
use thiserror::Error;
use tracing::{debug, info};

use crate::cache::{CacheError, TileDiskCache};
use crate::compose;
use crate::config::EngineConfig;
use crate::coord::GeoExtent;
use crate::executor::{FetchCounters, WorkerPool};
use crate::fetch::TileFetcher;
use crate::plan::{plan_viewport, TilePlan};
use crate::provider::{sniff_extension, HttpClient, HttpError, ReqwestClient, TileProvider};
use crate::viewport::{Viewport, ViewportPixels};
use crate::zoom::select_zoom;

/// Errors surfaced while wiring the engine up. Per-tile failures during
/// operation never reach this type.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Lifecycle of the basemap layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasemapState {
    /// Basemap disabled or no viewport yet.
    Idle,
    /// A viewport mutation is being turned into a tile plan.
    Planning,
    /// Fetch jobs for the current plan are in flight.
    Fetching,
    /// Every job of the current round has finished; persists until the
    /// next mutation.
    Ready,
}

/// Orchestrates planning, fetching and compositing for one provider.
pub struct BasemapController {
    viewport: Option<Viewport>,
    state: BasemapState,
    plan: Option<TilePlan>,
    round: Option<Arc<FetchCounters>>,
    fetcher: Arc<TileFetcher>,
    cache: TileDiskCache,
    pool: WorkerPool,
}

impl BasemapController {
    /// Build a controller with the real HTTP client.
    pub fn new(config: EngineConfig, provider: TileProvider) -> Result<Self, EngineError> {
        let client = Arc::new(ReqwestClient::new(
            config.connect_timeout,
            config.request_timeout,
        )?);
        Self::with_http_client(config, provider, client)
    }

    /// Build a controller around an injected HTTP client.
    ///
    /// Probes the provider once to sniff the tile file extension.
    pub fn with_http_client(
        config: EngineConfig,
        provider: TileProvider,
        client: Arc<dyn HttpClient>,
    ) -> Result<Self, EngineError> {
        let cache = TileDiskCache::open(&config.cache_dir)?;
        let ext = sniff_extension(client.as_ref(), &provider, &config.credentials);

        let pool = match config.workers {
            Some(n) => WorkerPool::with_workers(n),
            None => WorkerPool::new(),
        };

        info!(provider = %provider.id(), ext = %ext, workers = pool.worker_count(), "basemap engine ready");

        let fetcher = Arc::new(TileFetcher::new(
            provider,
            config.credentials,
            ext,
            cache.clone(),
            client,
        ));

        Ok(Self {
            viewport: None,
            state: BasemapState::Idle,
            plan: None,
            round: None,
            fetcher,
            cache,
            pool,
        })
    }

    pub fn state(&self) -> BasemapState {
        self.state
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    /// The current plan, if any round has been started.
    pub fn plan(&self) -> Option<&TilePlan> {
        self.plan.as_ref()
    }

    /// Enable the basemap with the host's current map extent.
    pub fn enable(&mut self, extent: GeoExtent, pixels: ViewportPixels) {
        self.viewport = Some(Viewport::new(extent, pixels));
        self.replan();
    }

    /// Drop the viewport and return to `Idle`. In-flight jobs finish on
    /// their own and keep warming the cache.
    pub fn disable(&mut self) {
        self.viewport = None;
        self.plan = None;
        self.round = None;
        self.state = BasemapState::Idle;
    }

    /// Pan by an already-computed pixel delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        if let Some(vp) = self.viewport.as_mut() {
            vp.pan_pixels(dx, dy);
            self.replan();
        }
    }

    pub fn zoom_in(&mut self) {
        if let Some(vp) = self.viewport.as_mut() {
            vp.zoom_in();
            self.replan();
        }
    }

    pub fn zoom_out(&mut self) {
        if let Some(vp) = self.viewport.as_mut() {
            vp.zoom_out();
            self.replan();
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(vp) = self.viewport.as_mut() {
            vp.resize(width, height);
            self.replan();
        }
    }

    pub fn reset(&mut self, extent: GeoExtent) {
        if let Some(vp) = self.viewport.as_mut() {
            vp.reset(extent);
            self.replan();
        }
    }

    /// Poll the current round and update the state machine. Never blocks.
    pub fn poll(&mut self) -> BasemapState {
        if self.state == BasemapState::Fetching {
            if let Some(round) = &self.round {
                if compose::is_round_complete(round.snapshot()) {
                    debug!("fetch round complete");
                    self.state = BasemapState::Ready;
                }
            }
        }
        self.state
    }

    /// Composite the current plan from cache into a fresh bitmap.
    ///
    /// Also polls completion, so a host that redraws on a timer needs no
    /// separate poll call. Returns `None` when idle.
    pub fn redraw(&mut self) -> Option<RgbaImage> {
        self.poll();
        let plan = self.plan.as_ref()?;
        Some(compose::composite(
            plan,
            &self.cache,
            self.fetcher.provider(),
            self.fetcher.ext(),
        ))
    }

    /// Shut the engine down, letting queued jobs drain first.
    pub fn shutdown(self) {
        self.pool.shutdown();
    }

    /// Recompute zoom + plan and start a fresh fetch round.
    fn replan(&mut self) {
        let Some(vp) = self.viewport.as_ref() else {
            self.state = BasemapState::Idle;
            return;
        };

        self.state = BasemapState::Planning;

        let zoom = select_zoom(vp.extent(), vp.pixels());
        let plan = plan_viewport(vp.extent(), vp.pixels(), zoom);

        // Fresh counters: total and completed reset together, and jobs of
        // any superseded round keep incrementing their own allocation
        let round = FetchCounters::new_round(plan.len());

        debug!(zoom = plan.zoom(), tiles = plan.len(), "starting fetch round");

        for tile in plan.tiles() {
            let fetcher = Arc::clone(&self.fetcher);
            let counters = Arc::clone(&round);
            let index = tile.index;
            self.pool.submit(move || fetcher.fetch(index, &counters));
        }

        self.plan = Some(plan);
        self.round = Some(round);
        self.state = BasemapState::Fetching;
    }
}
