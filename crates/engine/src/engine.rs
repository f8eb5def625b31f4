//! The map engine: one context object owning projection, view, datasets and
//! layer state between mount and dispose.
//!
//! Input arrives as explicit commands (`on_gesture`, `on_resize`,
//! `on_animation_frame`, layer and overlay toggles). Discrete view changes
//! start an animated transition at the next animation frame; continuous
//! gestures are parked in the frame scheduler and drawn by the next
//! animation frame, newest first.

use std::collections::BTreeMap;
use std::sync::Arc;

use camera::{GestureEvent, InteractionController, Timing, Transition, ViewTransform, ViewUpdate};
use catalog::{DatasetBundle, DatasetLoader, IndicatorDataset};
use foundation::Aabb2;
use layers::{
    Color, CompositeMetric, FeatureAnchors, Indicator, LayerCache, LayerCacheStats,
    LayerSelection, LayerState, Legend, Marker, OverlayKind, OverlaySet, ScaleMode,
    compute_markers, safety_markers,
};
use runtime::{EventBus, Frame, FrameScheduler, SchedulerStats, SubscriptionId};
use scene::{
    FeatureId, GeometryProjector, Iso3, IsoResolver, PathData, SearchIndex, ViewportSize, World,
};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::events::{EngineEvent, MapStatus};
use crate::info_card::{CardContext, InfoCard, InfoCardAssembler};
use crate::preferences::{LabelMode, PreferenceStore, Preferences, Theme};

/// Everything that changes together on resize.
#[derive(Debug, Clone, PartialEq)]
pub struct RecomputedProjection {
    pub size: ViewportSize,
    /// One path per feature, indexed by [`FeatureId`].
    pub paths: Vec<PathData>,
    pub translate_extent: Aabb2,
    pub transform: ViewTransform,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DisposeReport {
    pub listeners_released: usize,
    pub pending_frame_dropped: bool,
}

pub struct MapEngine {
    config: EngineConfig,
    projector: GeometryProjector,
    controller: InteractionController,
    scheduler: FrameScheduler<ViewTransform>,
    transition: Option<Transition>,
    displayed: ViewTransform,
    status: MapStatus,
    world: World,
    codes: Vec<Iso3>,
    paths: Vec<PathData>,
    resolver: IsoResolver,
    search: SearchIndex,
    datasets: DatasetBundle,
    indicators: BTreeMap<Indicator, Arc<IndicatorDataset>>,
    cache: LayerCache,
    selection: LayerSelection,
    scale_mode: ScaleMode,
    layer: LayerState,
    overlays: OverlaySet,
    anchors: FeatureAnchors,
    preferences: Preferences,
    events: EventBus<EngineEvent>,
}

impl std::fmt::Debug for MapEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapEngine")
            .field("status", &self.status)
            .field("size", &self.projector.size())
            .field("features", &self.world.len())
            .field("selection", &self.selection)
            .field("transform", &self.displayed)
            .finish_non_exhaustive()
    }
}

impl MapEngine {
    /// Creates the engine for a container of `size`. Geometry and datasets
    /// arrive later through [`MapEngine::load`].
    pub fn mount(config: EngineConfig, size: ViewportSize) -> Self {
        let projector = GeometryProjector::new(size);
        let controller =
            InteractionController::new(config.controller(), size, projector.sphere_bounds());
        let scale_mode = config.default_scale_mode;
        let mut engine = Self {
            config,
            projector,
            controller,
            scheduler: FrameScheduler::new(),
            transition: None,
            displayed: ViewTransform::IDENTITY,
            status: MapStatus::Loading,
            world: World::new(),
            codes: Vec::new(),
            paths: Vec::new(),
            resolver: IsoResolver::new(),
            search: SearchIndex::default(),
            datasets: DatasetBundle::default(),
            indicators: BTreeMap::new(),
            cache: LayerCache::new(),
            selection: LayerSelection::None,
            scale_mode,
            layer: LayerState::Cleared,
            overlays: OverlaySet::new(),
            anchors: FeatureAnchors::default(),
            preferences: Preferences {
                scale_mode,
                ..Preferences::default()
            },
            events: EventBus::new(),
        };
        engine.controller.commit();
        tracing::info!(width = size.width, height = size.height, "map mounted");
        engine.events.emit(EngineEvent::Mounted {
            width: size.width,
            height: size.height,
        });
        engine
    }

    /// Applies stored preferences, including the composite scale mode.
    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = preferences;
        self.scale_mode = preferences.scale_mode;
        self.refresh_layer();
        self
    }

    /// Releases subscribers and drops any frame update not yet drawn.
    pub fn dispose(mut self) -> DisposeReport {
        self.events.emit(EngineEvent::Disposed);
        let listeners_released = self.events.listener_count();
        let pending_frame_dropped = self.scheduler.cancel().is_some();
        self.transition = None;
        self.events.clear();
        tracing::info!(listeners_released, pending_frame_dropped, "map disposed");
        DisposeReport {
            listeners_released,
            pending_frame_dropped,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn status(&self) -> &MapStatus {
        &self.status
    }

    fn set_status(&mut self, status: MapStatus) {
        if self.status != status {
            tracing::debug!(?status, "map status changed");
            self.status = status.clone();
            self.events.emit(EngineEvent::StatusChanged(status));
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&EngineEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.events.drain()
    }

    /// Fetches geometry and every dataset concurrently. A geometry failure
    /// leaves the map in [`MapStatus::Failed`]; dataset failures only leave
    /// their indicator without data.
    pub async fn load(&mut self, loader: &DatasetLoader) -> Result<(), EngineError> {
        self.set_status(MapStatus::Loading);
        let (world, bundle) = futures_util::join!(loader.load_world(), loader.load_bundle());
        match world {
            Ok(world) => {
                self.install(world, bundle);
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%error, "world geometry failed to load");
                self.install_datasets(bundle);
                self.set_status(MapStatus::Failed {
                    message: error.to_string(),
                });
                Err(EngineError::Geometry(error))
            }
        }
    }

    /// Re-runs the whole load sequence.
    pub async fn retry(&mut self, loader: &DatasetLoader) -> Result<(), EngineError> {
        tracing::info!(status = ?self.status, "retrying map load");
        self.load(loader).await
    }

    /// Installs already loaded geometry and datasets.
    pub fn install(&mut self, world: World, bundle: DatasetBundle) {
        self.world = world;
        self.install_datasets(bundle);
        self.paths = self.project_paths();
        self.set_status(MapStatus::Ready);
    }

    /// Replaces the datasets. Codes, search entries and anchors are derived
    /// again; cached layers survive only where the dataset content did not
    /// change.
    pub fn install_datasets(&mut self, bundle: DatasetBundle) {
        self.resolver = IsoResolver::with_aliases(bundle.aliases.clone());
        self.codes = self
            .world
            .iter()
            .map(|(_, feature)| self.resolver.resolve(feature))
            .collect();
        let unresolved = self.codes.iter().filter(|c| !c.is_resolved()).count();
        if unresolved > 0 {
            tracing::debug!(unresolved, "features without an ISO3 code");
        }
        self.search = SearchIndex::build(&self.world, &self.resolver, &bundle.endonyms);

        self.indicators = indicator_datasets(&bundle);
        for (indicator, data) in &self.indicators {
            self.cache
                .pin_dataset_version(*indicator, data.version().clone());
        }
        self.datasets = bundle;
        self.anchors = FeatureAnchors::build(&self.world, &self.resolver, &self.projector);
        self.refresh_layer();
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn datasets(&self) -> &DatasetBundle {
        &self.datasets
    }

    pub fn code_for(&self, id: FeatureId) -> Option<&Iso3> {
        self.codes.get(id.index())
    }

    fn project_paths(&self) -> Vec<PathData> {
        self.world
            .iter()
            .map(|(_, feature)| self.projector.path_for(&feature.geometry))
            .collect()
    }

    pub fn projector(&self) -> &GeometryProjector {
        &self.projector
    }

    pub fn paths(&self) -> &[PathData] {
        &self.paths
    }

    /// Re-derives projection, paths, anchors, overlays and the translate
    /// extent in one step.
    pub fn on_resize(&mut self, size: ViewportSize) -> RecomputedProjection {
        if self.projector.resize(size) {
            self.paths = self.project_paths();
            self.anchors = FeatureAnchors::build(&self.world, &self.resolver, &self.projector);
            self.scheduler.cancel();
            self.transition = None;
            self.displayed = self.controller.resize(size, self.projector.sphere_bounds());
            self.refresh_overlays();
            tracing::debug!(width = size.width, height = size.height, "map resized");
            self.events.emit(EngineEvent::Resized {
                width: size.width,
                height: size.height,
            });
        }
        RecomputedProjection {
            size: self.projector.size(),
            paths: self.paths.clone(),
            translate_extent: self.controller.translate_extent(),
            transform: self.displayed,
        }
    }

    /// The transform currently drawn.
    pub fn displayed_transform(&self) -> ViewTransform {
        self.displayed
    }

    /// Where the view is heading once pending frames and transitions finish.
    pub fn target_transform(&self) -> ViewTransform {
        self.controller.transform()
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn scheduler_stats(&self) -> SchedulerStats {
        self.scheduler.stats()
    }

    /// True while the host should keep sending animation frames: a
    /// transition or coalesced update is pending, or a wheel gesture has not
    /// ended yet.
    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
            || self.scheduler.has_pending()
            || self.controller.wheel_gesture_pending()
    }

    fn schedule(&mut self, update: ViewUpdate) -> ViewUpdate {
        match update.timing {
            Timing::Immediate { duration_ms } => {
                let target = self.scheduler.submit_immediate(update.transform);
                self.transition =
                    Some(Transition::starting_next_frame(self.displayed, target, duration_ms));
            }
            Timing::Coalesced => {
                self.transition = None;
                self.scheduler.submit_coalesced(update.transform);
            }
        }
        update
    }

    /// Feeds one input event. Returns the resulting view change, if the
    /// event was consumed.
    pub fn on_gesture(&mut self, event: &GestureEvent) -> Option<ViewUpdate> {
        let update = self.controller.handle(event)?;
        Some(self.schedule(update))
    }

    /// Advances to `frame`; returns the transform to draw, if it changed.
    /// Discrete transitions start at the first frame after they were
    /// scheduled.
    pub fn on_animation_frame(&mut self, frame: Frame) -> Option<ViewTransform> {
        self.controller.tick(frame.time);
        if let Some(t) = self.scheduler.on_frame(frame) {
            self.displayed = t;
            return Some(t);
        }
        let transition = self.transition.as_mut()?;
        transition.anchor(frame.time);
        let transition = *transition;
        let t = transition.sample(frame.time);
        if transition.is_complete(frame.time) {
            self.transition = None;
        }
        self.displayed = t;
        Some(t)
    }

    pub fn reset_view(&mut self) -> Option<ViewUpdate> {
        let update = self.controller.reset()?;
        Some(self.schedule(update))
    }

    /// A click on empty sea resets the view.
    pub fn on_background_click(&mut self) -> Option<ViewUpdate> {
        self.reset_view()
    }

    /// Zooms to fit a feature.
    pub fn focus_feature(&mut self, id: FeatureId) -> Option<ViewUpdate> {
        let feature = self.world.get(id)?;
        let bounds = self.projector.bounds(&feature.geometry)?;
        let update = self.controller.focus_on(bounds)?;
        Some(self.schedule(update))
    }

    pub fn history_back(&mut self) -> Option<ViewUpdate> {
        let update = self.controller.back()?;
        Some(self.schedule(update))
    }

    pub fn history_forward(&mut self) -> Option<ViewUpdate> {
        let update = self.controller.forward()?;
        Some(self.schedule(update))
    }

    pub fn search(&self, query: &str) -> Option<FeatureId> {
        self.search.resolve(query)
    }

    /// Resolves `query` and focuses the match.
    pub fn search_and_focus(&mut self, query: &str) -> Option<FeatureId> {
        let id = self.search.resolve(query);
        match id {
            Some(id) => {
                self.focus_feature(id);
            }
            None => tracing::debug!(query, "search found no country"),
        }
        id
    }

    pub fn search_suggestions(&self) -> &[String] {
        self.search.suggestions()
    }

    pub fn selection(&self) -> LayerSelection {
        self.selection
    }

    pub fn scale_mode(&self) -> ScaleMode {
        self.scale_mode
    }

    pub fn select_layer(&mut self, selection: LayerSelection) -> &LayerState {
        self.selection = selection;
        self.refresh_layer();
        tracing::info!(layer = ?selection, mode = %self.scale_mode, "layer selected");
        self.events.emit(EngineEvent::LayerChanged {
            selection,
            mode: self.scale_mode,
        });
        &self.layer
    }

    pub fn set_scale_mode(&mut self, mode: ScaleMode) -> &LayerState {
        self.scale_mode = mode;
        self.preferences.scale_mode = mode;
        self.refresh_layer();
        self.events.emit(EngineEvent::LayerChanged {
            selection: self.selection,
            mode,
        });
        &self.layer
    }

    pub fn layer_state(&self) -> &LayerState {
        &self.layer
    }

    pub fn legend(&self) -> Option<&Legend> {
        self.layer.rendered().map(|layer| &layer.legend)
    }

    pub fn cache_stats(&self) -> LayerCacheStats {
        self.cache.stats()
    }

    fn refresh_layer(&mut self) {
        self.layer = match self.selection.indicator() {
            None => LayerState::Cleared,
            Some(indicator) => match self.indicators.get(&indicator) {
                Some(data) => {
                    LayerState::Ready(self.cache.get_or_render(indicator, data, self.scale_mode))
                }
                None => LayerState::Loading {
                    title: indicator.title().to_string(),
                },
            },
        };
        self.refresh_overlays();
    }

    /// Fill for a feature under the active layer; `None` means the plain
    /// base-map style.
    pub fn fill_for(&self, id: FeatureId) -> Option<Color> {
        let code = self.code_for(id)?;
        let layer = self.layer.rendered()?;
        Some(layer.fill_for(code))
    }

    /// Hover text: the label plus the layer value when there is one.
    pub fn tooltip_for(&self, id: FeatureId) -> Option<String> {
        let label = self.label_for(id)?;
        let code = self.code_for(id)?;
        let with_value = self
            .layer
            .rendered()
            .and_then(|layer| layer.tooltip_for(&label, code));
        Some(with_value.unwrap_or(label))
    }

    pub fn set_overlay(&mut self, kind: OverlayKind, enabled: bool) -> &[Marker] {
        self.overlays.set_enabled(kind, enabled);
        if enabled {
            self.refresh_overlays();
        }
        tracing::debug!(%kind, enabled, markers = self.overlays.markers(kind).len(), "overlay toggled");
        self.events.emit(EngineEvent::OverlayToggled { kind, enabled });
        self.overlays.markers(kind)
    }

    pub fn overlay_enabled(&self, kind: OverlayKind) -> bool {
        self.overlays.is_enabled(kind)
    }

    pub fn overlay_markers(&self, kind: OverlayKind) -> &[Marker] {
        self.overlays.markers(kind)
    }

    /// Overlays sit on top of an indicator layer; with no layer selected
    /// they draw nothing but keep their toggles.
    fn refresh_overlays(&mut self) {
        if self.selection.indicator().is_none() {
            self.overlays.clear_all();
            return;
        }
        for kind in OverlayKind::ALL {
            if !self.overlays.is_enabled(kind) {
                continue;
            }
            let markers = match kind {
                OverlayKind::Safety => self
                    .datasets
                    .safety
                    .as_ref()
                    .map(|f| safety_markers(f, &self.anchors)),
                OverlayKind::Compute => self
                    .datasets
                    .compute_sites
                    .as_ref()
                    .map(|s| compute_markers(s, &self.anchors)),
            };
            self.overlays.draw(kind, markers.unwrap_or_default());
        }
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences
    }

    /// Display name under the current label mode.
    pub fn label_for(&self, id: FeatureId) -> Option<String> {
        let feature = self.world.get(id)?;
        if self.preferences.label_mode == LabelMode::Native {
            let endonym = self
                .code_for(id)
                .filter(|c| c.is_resolved())
                .and_then(|c| self.datasets.endonyms.get(c));
            if let Some(name) = endonym {
                return Some(name.clone());
            }
        }
        Some(feature.display_name().to_string())
    }

    pub fn toggle_label_mode(&mut self, store: &dyn PreferenceStore) -> LabelMode {
        self.preferences.label_mode = self.preferences.label_mode.toggled();
        self.persist(store);
        self.preferences.label_mode
    }

    pub fn toggle_theme(&mut self, store: &dyn PreferenceStore) -> Theme {
        self.preferences.theme = self.preferences.theme.toggled();
        self.persist(store);
        self.preferences.theme
    }

    /// Saves the current preferences; a failed write is logged and ignored.
    pub fn persist(&self, store: &dyn PreferenceStore) {
        if let Err(error) = store.save(&self.preferences) {
            tracing::warn!(%error, "preferences not saved");
        }
    }

    /// Detail card for a feature. Compute sites are listed only while the
    /// compute layer is active.
    pub async fn info_card(&self, id: FeatureId, assembler: &InfoCardAssembler) -> Option<InfoCard> {
        let feature = self.world.get(id)?;
        let code = self.code_for(id)?;
        let compute_active =
            self.selection == LayerSelection::Indicator(Indicator::ComputeCapacity);
        let ctx = CardContext {
            name: feature.display_name(),
            iso3: code,
            meta: self.datasets.country_meta.get(code),
            composite: self
                .datasets
                .composite
                .as_ref()
                .and_then(|c| c.scores(code)),
            compute_sites: if compute_active {
                self.datasets.compute_sites.as_ref()
            } else {
                None
            },
        };
        Some(assembler.assemble(ctx).await)
    }
}

/// Every indicator with data, keyed the way the layer cache keys them.
pub fn indicator_datasets(bundle: &DatasetBundle) -> BTreeMap<Indicator, Arc<IndicatorDataset>> {
    let mut out = BTreeMap::new();
    let singles = [
        (Indicator::Readiness, &bundle.readiness),
        (Indicator::Exposure, &bundle.exposure),
        (Indicator::GridHeadroom, &bundle.grid_headroom),
        (Indicator::ComputeCapacity, &bundle.compute_mw),
    ];
    for (indicator, data) in singles {
        if let Some(data) = data {
            out.insert(indicator, Arc::new(data.clone()));
        }
    }
    if let Some(composite) = &bundle.composite {
        for metric in CompositeMetric::ALL {
            out.insert(Indicator::Composite(metric), Arc::new(composite.metric(metric)));
        }
    }
    out
}
