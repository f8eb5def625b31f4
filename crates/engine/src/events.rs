use layers::{LayerSelection, OverlayKind, ScaleMode};

/// Whether the map can render.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MapStatus {
    #[default]
    Loading,
    Ready,
    /// Geometry failed to load; `MapEngine::retry` starts over.
    Failed { message: String },
}

impl MapStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, MapStatus::Ready)
    }
}

/// Notifications published on the engine's event bus.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Mounted { width: f64, height: f64 },
    StatusChanged(MapStatus),
    Resized { width: f64, height: f64 },
    LayerChanged { selection: LayerSelection, mode: ScaleMode },
    OverlayToggled { kind: OverlayKind, enabled: bool },
    Disposed,
}
