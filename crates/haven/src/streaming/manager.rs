//! # Streaming Manager
//!
//! Keeps every chunk within Chebyshev distance `R` of the observer resident
//! and unloads the rest.
//!
//! ## Update flow
//!
//! ```text
//! position ─► center chunk ─┬─ unchanged ─► no-op
//!                           └─ changed ──► evict beyond R ─► load entering + pending
//!
//! load:   provider ─► background (local composite | remote) ─► Chunk ─► registry ─► on_chunk_ready
//! unload: registry ─► Chunk::destroy (texture back to pool) ─► on_chunk_unloaded
//! ```
//!
//! Eviction runs before loading so textures freed by departing chunks are
//! reused by arriving ones.
//!
//! An unreachable chunk source falls back to local generation. A payload that
//! arrives but fails validation leaves its key pending until the next
//! recompute.
//!
//! The manager is owned by the update loop. Positions from other threads go
//! through [`StreamingManager::attach_feed`] and are applied by
//! [`StreamingManager::pump`].

use std::collections::BTreeSet;
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use haven_procedural::{ChunkGenerator, ChunkStore, MemoryChunkStore};
use haven_rendering::{
    texture_pool, Chunk, ChunkRegistry, RenderTexture, TextureBuilder, TextureOrigin, TexturePool,
};
use haven_shared::{ChunkCoord, ChunkKey, WorldConstants, WorldPosition};
use tracing::{debug, info, warn};

use crate::config::{RenderMode, WorldConfig};
use crate::error::{FetchError, ProviderError};
use crate::events::{EntityCollaborator, NullCollaborator};
use crate::observer::{PositionFeed, Subscription};
use crate::provider::{ChunkData, ChunkProvider, StoreProvider, TextureFetcher};
use crate::streaming::window::VisibilityWindow;

/// Where the manager is in its session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamState {
    /// No position seen yet, or shut down.
    Idle,
    /// Keeping `window` resident.
    Tracking {
        /// Observer's chunk.
        center: ChunkCoord,
        /// Chunks kept resident.
        window: VisibilityWindow,
    },
}

/// Lifetime counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamingStats {
    /// Window recomputations.
    pub recomputes: u64,
    /// Chunks materialized.
    pub loaded: u64,
    /// Chunks unloaded.
    pub unloaded: u64,
    /// Remote textures replaced by a local composite.
    pub fallbacks: u64,
    /// Pending keys retried.
    pub retries: u64,
    /// Chunk requests that failed.
    pub failures: u64,
    /// Collaborator placement errors.
    pub placement_errors: u64,
}

/// Outcome of one position update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamUpdate {
    /// Observer's chunk.
    pub center: ChunkCoord,
    /// Whether the window was recomputed.
    pub recomputed: bool,
    /// Chunks materialized.
    pub loaded: usize,
    /// Chunks unloaded.
    pub unloaded: usize,
    /// Keys waiting for a retry.
    pub pending: usize,
    /// Remote fallbacks taken.
    pub fallbacks: u64,
}

/// Streams chunks around a moving observer.
pub struct StreamingManager {
    /// Shared sizes.
    constants: WorldConstants,
    /// Load radius in chunks.
    radius: u32,
    /// Background source.
    render_mode: RenderMode,
    /// Local authority, also the fallback tile source.
    store: Arc<dyn ChunkStore>,
    /// Chunk data source.
    provider: Box<dyn ChunkProvider>,
    /// Remote texture source.
    fetcher: Option<Box<dyn TextureFetcher>>,
    /// Lifecycle listener.
    collaborator: Box<dyn EntityCollaborator>,
    /// Composites backgrounds; owns the sprite pool.
    builder: TextureBuilder,
    /// Chunk background textures.
    textures: TexturePool,
    /// Resident chunks.
    registry: ChunkRegistry,
    /// Session state.
    state: StreamState,
    /// Keys whose load failed, retried on the next recompute.
    pending: BTreeSet<ChunkKey>,
    /// Position queue, fed by attached feeds.
    positions_tx: Sender<WorldPosition>,
    positions_rx: Receiver<WorldPosition>,
    /// Counters.
    stats: StreamingStats,
}

impl StreamingManager {
    /// Creates a manager over a fresh in-memory store for `config`.
    ///
    /// # Panics
    ///
    /// Panics if a pool or queue capacity in `config` is zero. Validated
    /// configs never are.
    #[must_use]
    pub fn from_config(config: &WorldConfig) -> Self {
        let generator = ChunkGenerator::new(config.world_seed(), config.constants, config.generation);
        Self::new(config, Arc::new(MemoryChunkStore::new(generator)))
    }

    /// Creates a manager reading chunks from `store`.
    ///
    /// # Panics
    ///
    /// Panics if a pool or queue capacity in `config` is zero.
    #[must_use]
    pub fn new(config: &WorldConfig, store: Arc<dyn ChunkStore>) -> Self {
        let streaming = &config.streaming;
        let (positions_tx, positions_rx) = bounded(streaming.position_queue);
        Self {
            constants: config.constants,
            radius: config.load_radius(),
            render_mode: streaming.render_mode,
            provider: Box::new(StoreProvider::new(Arc::clone(&store))),
            store,
            fetcher: None,
            collaborator: Box::new(NullCollaborator),
            builder: TextureBuilder::new(config.constants, config.sprite_pool_capacity()),
            textures: texture_pool(streaming.texture_pool_capacity),
            registry: ChunkRegistry::new(),
            state: StreamState::Idle,
            pending: BTreeSet::new(),
            positions_tx,
            positions_rx,
            stats: StreamingStats::default(),
        }
    }

    /// Reads chunk data from `provider` instead of the store.
    #[must_use]
    pub fn with_provider(mut self, provider: impl ChunkProvider + 'static) -> Self {
        self.provider = Box::new(provider);
        self
    }

    /// Fetches remote textures with `fetcher`.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: impl TextureFetcher + 'static) -> Self {
        self.fetcher = Some(Box::new(fetcher));
        self
    }

    /// Notifies `collaborator` of chunk lifecycle events.
    #[must_use]
    pub fn with_collaborator(mut self, collaborator: impl EntityCollaborator + 'static) -> Self {
        self.collaborator = Box::new(collaborator);
        self
    }

    /// Moves the observer to `position`.
    ///
    /// Does nothing unless the observer's chunk changed. Otherwise evicts
    /// chunks beyond the radius, then loads the chunks entering the window
    /// and retries pending keys that are still inside it.
    pub fn update_position(&mut self, position: WorldPosition) -> StreamUpdate {
        let center = ChunkCoord::from_world(position, self.constants.chunk_pixel_size());
        let window = VisibilityWindow::new(center, self.radius);

        let entering = match self.state {
            StreamState::Tracking {
                center: current, ..
            } if current == center => {
                return StreamUpdate {
                    center,
                    recomputed: false,
                    loaded: 0,
                    unloaded: 0,
                    pending: self.pending.len(),
                    fallbacks: 0,
                };
            }
            StreamState::Tracking {
                window: previous, ..
            } => previous.diff(&window).entering,
            StreamState::Idle => {
                info!(
                    %center,
                    radius = self.radius,
                    render_mode = ?self.render_mode,
                    "streaming session started"
                );
                window.coords()
            }
        };

        self.state = StreamState::Tracking { center, window };
        self.stats.recomputes += 1;

        let unloaded = self.evict_beyond(center);

        let mut keys: BTreeSet<ChunkKey> = entering.into_iter().map(ChunkCoord::key).collect();
        for key in std::mem::take(&mut self.pending) {
            if !window.contains(key.coord()) {
                debug!(%key, "pending chunk left the window, dropping retry");
                continue;
            }
            if keys.insert(key) {
                self.stats.retries += 1;
            }
        }

        let fallbacks_before = self.stats.fallbacks;
        let mut loaded = 0;
        for key in keys {
            if self.registry.has(key) {
                continue;
            }
            match self.materialize(key) {
                Ok(()) => loaded += 1,
                Err(err) => {
                    warn!(%key, %err, "chunk rejected, retrying on next recompute");
                    self.stats.failures += 1;
                    self.pending.insert(key);
                }
            }
        }

        StreamUpdate {
            center,
            recomputed: true,
            loaded,
            unloaded,
            pending: self.pending.len(),
            fallbacks: self.stats.fallbacks - fallbacks_before,
        }
    }

    /// Unloads every resident chunk farther than the radius from the tracked
    /// `center`. Returns how many were unloaded.
    fn evict_beyond(&mut self, center: ChunkCoord) -> usize {
        let doomed: Vec<ChunkKey> = self
            .registry
            .keys()
            .into_iter()
            .filter(|key| key.coord().chebyshev(center) > self.radius)
            .collect();
        for key in &doomed {
            self.unload(*key);
        }
        doomed.len()
    }

    /// Unloads everything and returns to [`StreamState::Idle`].
    pub fn shutdown(&mut self) {
        let resident = self.registry.len();
        for key in self.registry.keys() {
            self.unload(key);
        }
        self.pending.clear();
        self.state = StreamState::Idle;
        info!(
            resident,
            idle_textures = self.textures.idle_count(),
            loaded = self.stats.loaded,
            unloaded = self.stats.unloaded,
            "streaming session stopped"
        );
    }

    /// Subscribes to `feed`. Positions are queued and applied by
    /// [`StreamingManager::pump`]. When the queue is full, new positions are
    /// dropped.
    pub fn attach_feed(&self, feed: &PositionFeed) -> Subscription {
        let sender = self.positions_tx.clone();
        feed.on_position_changed(move |position| {
            if let Err(TrySendError::Full(position)) = sender.try_send(position) {
                warn!(?position, "position queue full, dropping update");
            }
        })
    }

    /// Applies queued positions in arrival order.
    pub fn pump(&mut self) -> Vec<StreamUpdate> {
        let positions: Vec<WorldPosition> = self.positions_rx.try_iter().collect();
        positions
            .into_iter()
            .map(|position| self.update_position(position))
            .collect()
    }

    fn materialize(&mut self, key: ChunkKey) -> Result<(), ProviderError> {
        let data = match self.provider.request(key) {
            Ok(data) => data,
            Err(ProviderError::Transport(err)) => {
                self.stats.fallbacks += 1;
                warn!(%key, %err, "chunk source unreachable, generating locally");
                self.store.get_or_generate(key).into()
            }
            Err(err) => return Err(err),
        };
        let attached = data.attached_object_ids().len();
        let (texture, origin) = self.resolve_background(key, data);

        let mut chunk = Chunk::new(key.coord(), self.constants.chunk_pixel_size());
        if let Some((replaced, TextureOrigin::Pooled)) = chunk.set_background(texture, origin) {
            self.textures.release(replaced);
        }
        if let Some(displaced) = self.registry.add(key, chunk) {
            displaced.destroy(&mut self.textures);
        }
        self.stats.loaded += 1;
        debug!(%key, ?origin, attached, resident = self.registry.len(), "materialized chunk");

        let chunk = self
            .registry
            .get_mut(key)
            .unwrap_or_else(|| panic!("chunk {key} missing from registry right after insertion"));
        if let Err(err) = self.collaborator.on_chunk_ready(key, chunk) {
            self.stats.placement_errors += 1;
            warn!(%key, %err, "entity placement failed");
        }
        Ok(())
    }

    fn resolve_background(&mut self, key: ChunkKey, data: ChunkData) -> (RenderTexture, TextureOrigin) {
        match data {
            ChunkData::Tiles { tiles, .. } => (
                self.builder.build_background(&tiles, &mut self.textures),
                TextureOrigin::Pooled,
            ),
            ChunkData::Texture { texture_url, .. } => {
                if self.render_mode == RenderMode::RemoteTexture {
                    match self.fetch_remote(&texture_url) {
                        Ok(texture) => return (texture, TextureOrigin::External),
                        Err(err) => {
                            self.stats.fallbacks += 1;
                            warn!(%key, %err, "remote texture unavailable, compositing locally");
                        }
                    }
                }
                let record = self.store.get_or_generate(key);
                (
                    self.builder.build_background(&record.tiles, &mut self.textures),
                    TextureOrigin::Pooled,
                )
            }
        }
    }

    fn fetch_remote(&self, url: &str) -> Result<RenderTexture, FetchError> {
        let expected = self.builder.texture_size();
        let Some(fetcher) = self.fetcher.as_deref() else {
            return Err(FetchError::Unavailable {
                url: url.to_owned(),
                reason: "no texture fetcher configured".to_owned(),
            });
        };
        let texture = fetcher.fetch(url, expected)?;
        if texture.size() != expected {
            return Err(FetchError::WrongSize {
                url: url.to_owned(),
                expected,
                found: texture.size(),
            });
        }
        Ok(texture)
    }

    fn unload(&mut self, key: ChunkKey) -> bool {
        let Some(chunk) = self.registry.remove(key) else {
            return false;
        };
        let orphans = chunk.destroy(&mut self.textures);
        self.stats.unloaded += 1;
        debug!(%key, orphans = orphans.len(), "unloaded chunk");
        self.collaborator.on_chunk_unloaded(key);
        true
    }

    /// Session state.
    #[must_use]
    pub const fn state(&self) -> StreamState {
        self.state
    }

    /// Current window, while tracking.
    #[must_use]
    pub const fn window(&self) -> Option<VisibilityWindow> {
        match self.state {
            StreamState::Tracking { window, .. } => Some(window),
            StreamState::Idle => None,
        }
    }

    /// Load radius in chunks.
    #[must_use]
    pub const fn radius(&self) -> u32 {
        self.radius
    }

    /// Resident chunks.
    #[must_use]
    pub const fn registry(&self) -> &ChunkRegistry {
        &self.registry
    }

    /// The background texture pool.
    #[must_use]
    pub const fn texture_pool(&self) -> &TexturePool {
        &self.textures
    }

    /// The background builder.
    #[must_use]
    pub const fn builder(&self) -> &TextureBuilder {
        &self.builder
    }

    /// The local store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn ChunkStore> {
        &self.store
    }

    /// Keys waiting for a retry, sorted.
    #[must_use]
    pub fn pending(&self) -> Vec<ChunkKey> {
        self.pending.iter().copied().collect()
    }

    /// Lifetime counters.
    #[must_use]
    pub const fn stats(&self) -> StreamingStats {
        self.stats
    }
}
