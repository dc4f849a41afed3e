//! Editing session: the orchestration of one mask-authoring session
//!
//! The session owns the drawing state machine, the live raster sink, both
//! cadences and the cached mask. Everything runs on the caller's thread:
//! the host forwards input, calls [`EditorSession::tick`] from its frame
//! callback and awaits [`EditorSession::confirm`] when the user saves.

use std::time::Instant;

use glam::Vec2;
use maskpaint_config::{EditorConfig, GeometryPolicy};
use maskpaint_ipc::{
    validate_strokes, EditorCommand, EditorEvent, IpcError, SaveResult, SaveWarning, WarningKind,
};
use maskpaint_upload::UploadBackend;
use tracing::{debug, info, warn};

use crate::compress::CompressionNegotiator;
use crate::drawing::{DrawingSurface, SurfaceUpdate};
use crate::geometry::ImageGeometry;
use crate::loader::{ImageLoadError, ImageLoader};
use crate::mask::{generate_mask, MaskBuffer, MaskError};
use crate::preview::PreviewRenderer;
use crate::raster::{RenderSink, StrokeRaster};
use crate::schedule::CadenceScheduler;
use crate::tiles::TiledSurface;
use crate::types::{ImageDimensions, Stroke, Tool};

/// Load state of the source image
#[derive(Debug, Clone, PartialEq)]
pub enum ImageState {
    Unloaded,
    Loading,
    Ready(ImageDimensions),
    /// Drawing stays disabled until another image loads
    Failed(String),
}

/// Identifies one image load; completions carrying an old token are dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadToken(u64);

/// What [`EditorSession::apply`] did with a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied,
    /// The host should await [`EditorSession::confirm`]
    ConfirmRequested,
}

/// One mask-authoring session over a render sink
pub struct EditorSession<S = TiledSurface> {
    config: EditorConfig,
    geometry: ImageGeometry,
    image_state: ImageState,
    load_generation: u64,
    drawing: DrawingSurface,
    /// Live stroke raster in drawing-surface space
    canvas: S,
    preview: PreviewRenderer,
    scheduler: CadenceScheduler,
    negotiator: CompressionNegotiator,
    /// Authoritative mask from the last quiescence
    mask: Option<MaskBuffer>,
    last_mask_error: Option<MaskError>,
    mounted: bool,
    events: Vec<EditorEvent>,
}

impl EditorSession<TiledSurface> {
    /// Session drawing into a CPU tiled surface of the configured container size
    pub fn new(config: EditorConfig) -> Self {
        let canvas =
            TiledSurface::with_default_tile_size(config.container_width, config.container_height);
        Self::with_sink(config, canvas)
    }
}

impl<S: RenderSink + StrokeRaster> EditorSession<S> {
    /// Session drawing into `canvas`, which is resized to the container
    pub fn with_sink(config: EditorConfig, mut canvas: S) -> Self {
        let container = ImageDimensions::new(config.container_width, config.container_height);
        if canvas.dimensions() != (container.width, container.height) {
            canvas.resize(container.width, container.height);
        }

        let geometry = ImageGeometry::new(container);
        let drawing = DrawingSurface::with_config(geometry.input_region(), &config);

        info!(
            "EditorSession created: container {}x{}, policy {:?}",
            container.width, container.height, config.geometry_policy
        );

        Self {
            scheduler: CadenceScheduler::from_config(&config),
            negotiator: CompressionNegotiator::from_config(&config),
            config,
            geometry,
            image_state: ImageState::Unloaded,
            load_generation: 0,
            drawing,
            canvas,
            preview: PreviewRenderer::new(),
            mask: None,
            last_mask_error: None,
            mounted: true,
            events: Vec::new(),
        }
    }

    // --- Image loading ---

    /// Start loading a new source image. Any earlier load becomes stale.
    pub fn begin_image_load(&mut self) -> LoadToken {
        self.load_generation += 1;
        self.image_state = ImageState::Loading;
        self.geometry.clear_natural();
        self.drawing.set_input_region(self.geometry.input_region());
        self.drawing.set_enabled(true);
        self.invalidate_mask();
        LoadToken(self.load_generation)
    }

    /// Apply a load result. Returns false when it was stale or arrived after
    /// teardown and was dropped.
    pub fn finish_image_load(
        &mut self,
        token: LoadToken,
        result: Result<ImageDimensions, ImageLoadError>,
        now: Instant,
    ) -> bool {
        if !self.mounted || token.0 != self.load_generation {
            debug!(
                "Dropping image load {:?} (current {}, mounted {})",
                token, self.load_generation, self.mounted
            );
            return false;
        }

        match result {
            Ok(natural) => {
                self.geometry.set_natural(natural);
                self.image_state = ImageState::Ready(natural);
                self.drawing.set_input_region(self.geometry.input_region());
                self.drawing.set_enabled(true);
                info!("Image loaded: {}x{}", natural.width, natural.height);
                self.events.push(EditorEvent::ImageLoaded {
                    width: natural.width,
                    height: natural.height,
                });
                // Placement changed, so any existing strokes need a new mask
                if !self.drawing.log().is_empty() {
                    self.scheduler.quiescence.trigger(now);
                }
            }
            Err(e) => {
                warn!("Image load failed: {}", e);
                self.image_state = ImageState::Failed(e.to_string());
                self.drawing.set_enabled(false);
                self.scheduler.preview.stop();
                self.events.push(EditorEvent::ImageFailed {
                    message: e.to_string(),
                });
            }
        }
        true
    }

    /// Load `source` through `loader` and apply the result
    pub async fn load_image<L: ImageLoader>(&mut self, loader: &L, source: &str) -> bool {
        let token = self.begin_image_load();
        let result = loader.load(source).await;
        self.finish_image_load(token, result, Instant::now())
    }

    // --- Input ---

    pub fn pointer_down(&mut self, point: Vec2, now: Instant) {
        let update = self.drawing.pointer_down(point);
        if self.drawing.is_drawing() {
            self.scheduler.preview.start();
        }
        self.apply_update(update, now);
    }

    pub fn pointer_move(&mut self, point: Vec2, now: Instant) {
        let update = self.drawing.pointer_move(point);
        self.apply_update(update, now);
    }

    pub fn pointer_up(&mut self, now: Instant) {
        self.scheduler.preview.stop();
        let update = self.drawing.pointer_up();
        self.apply_update(update, now);
    }

    pub fn pointer_leave(&mut self, now: Instant) {
        self.scheduler.preview.stop();
        let update = self.drawing.pointer_leave();
        self.apply_update(update, now);
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.drawing.set_tool(tool);
    }

    pub fn set_width(&mut self, width: f32) {
        self.drawing.set_width(width);
    }

    pub fn undo(&mut self, now: Instant) {
        if self.interaction_blocked("undo") {
            return;
        }
        self.scheduler.preview.stop();
        let update = self.drawing.undo();
        self.apply_update(update, now);
    }

    pub fn redo(&mut self, now: Instant) {
        if self.interaction_blocked("redo") {
            return;
        }
        let update = self.drawing.redo();
        self.apply_update(update, now);
    }

    /// Clear every stroke and drop the cached mask and preview
    pub fn reset(&mut self) {
        if self.interaction_blocked("reset") {
            return;
        }
        let update = self.drawing.reset();
        self.canvas.execute_all(&update.commands);
        self.scheduler.cancel_all();
        self.invalidate_mask();
        self.preview.invalidate();
        self.push_paths_changed();
    }

    /// Rebuild a session from saved strokes and schedule mask regeneration
    pub fn load_strokes(&mut self, strokes: Vec<Stroke>, now: Instant) -> Result<(), IpcError> {
        validate_strokes(&strokes)?;
        if self.interaction_blocked("load_strokes") {
            return Err(IpcError::InvalidFormat(
                "no valid image loaded, strokes cannot be restored".into(),
            ));
        }
        self.scheduler.preview.stop();
        let update = self.drawing.restore(strokes);
        self.apply_update(update, now);
        Ok(())
    }

    /// New container size: the raster is reallocated and the strokes redrawn
    /// at their drawing-surface coordinates
    pub fn resize_container(&mut self, width: u32, height: u32, now: Instant) {
        let container = ImageDimensions::new(width, height);
        if container == self.geometry.container() {
            return;
        }

        self.config.container_width = width;
        self.config.container_height = height;
        self.geometry.set_container(container);
        self.drawing.set_input_region(self.geometry.input_region());

        self.canvas.resize(width, height);
        self.canvas.execute_all(&self.drawing.replay());
        self.invalidate_mask();
        if !self.drawing.log().is_empty() {
            self.scheduler.quiescence.trigger(now);
        }
        debug!("Container resized to {}x{}", width, height);
    }

    /// Hidden hosts get no preview frames
    pub fn set_visible(&mut self, visible: bool) {
        self.scheduler.preview.set_visible(visible);
    }

    /// Whether the last image load failed. Editing stays blocked until a
    /// new image loads.
    pub fn is_blocked(&self) -> bool {
        matches!(self.image_state, ImageState::Failed(_))
    }

    fn interaction_blocked(&self, action: &str) -> bool {
        let blocked = self.is_blocked();
        if blocked {
            debug!("Ignoring {} while the image is unavailable", action);
        }
        blocked
    }

    /// Dispatch a wire command
    ///
    /// While the image is unavailable, commands that edit the strokes are
    /// ignored and `LoadStrokes` fails. A confirm still goes through and
    /// keeps the strokes only.
    pub fn apply(&mut self, command: EditorCommand, now: Instant) -> Result<CommandOutcome, IpcError> {
        match command {
            EditorCommand::PointerDown { x, y } => self.pointer_down(Vec2::new(x, y), now),
            EditorCommand::PointerMove { x, y } => self.pointer_move(Vec2::new(x, y), now),
            EditorCommand::PointerUp => self.pointer_up(now),
            EditorCommand::PointerLeave => self.pointer_leave(now),
            EditorCommand::SetTool { tool } => self.set_tool(tool),
            EditorCommand::SetWidth { width } => self.set_width(width),
            EditorCommand::Undo => self.undo(now),
            EditorCommand::Redo => self.redo(now),
            EditorCommand::Reset => self.reset(),
            EditorCommand::LoadStrokes { strokes } => self.load_strokes(strokes, now)?,
            EditorCommand::Resize { width, height } => self.resize_container(width, height, now),
            EditorCommand::SetVisible { visible } => self.set_visible(visible),
            EditorCommand::Confirm => return Ok(CommandOutcome::ConfirmRequested),
        }
        Ok(CommandOutcome::Applied)
    }

    // --- Cadences ---

    /// Advance both cadences to `now`: a throttled preview frame, then the
    /// quiescence-triggered mask regeneration.
    pub fn tick(&mut self, now: Instant) {
        if !self.mounted {
            return;
        }

        if let Some((width, height)) =
            self.preview
                .tick(&mut self.scheduler.preview, now, &mut self.canvas)
        {
            self.events.push(EditorEvent::PreviewUpdated { width, height });
        }

        if self.scheduler.quiescence.poll(now) {
            if self.drawing.is_drawing() {
                // The stroke in progress is not in the log yet
                self.scheduler.quiescence.trigger(now);
            } else if self.is_blocked() {
                // A new image load reschedules if there are strokes
                debug!("Skipping mask regeneration, image unavailable");
            } else {
                self.regenerate_mask();
            }
        }
    }

    /// Whether a mask regeneration is waiting for quiescence
    pub fn regeneration_pending(&self) -> bool {
        self.scheduler.quiescence.is_pending()
    }

    fn regenerate_mask(&mut self) {
        match generate_mask(&self.canvas, &self.geometry, self.config.geometry_policy) {
            Ok(mask) => {
                self.events.push(EditorEvent::MaskUpdated {
                    width: mask.width(),
                    height: mask.height(),
                });
                self.mask = Some(mask);
                self.last_mask_error = None;
            }
            Err(e) => {
                warn!("Mask generation failed: {}", e);
                self.events
                    .push(EditorEvent::Warning(warning_for_mask_error(&e)));
                self.mask = None;
                self.last_mask_error = Some(e);
            }
        }
    }

    fn invalidate_mask(&mut self) {
        self.mask = None;
        self.last_mask_error = None;
    }

    fn apply_update(&mut self, update: SurfaceUpdate, now: Instant) {
        self.canvas.execute_all(&update.commands);
        if update.paths_changed() {
            self.scheduler.quiescence.trigger(now);
            self.push_paths_changed();
        }
    }

    fn push_paths_changed(&mut self) {
        let log = self.drawing.log();
        self.events.push(EditorEvent::PathsChanged {
            stroke_count: log.len(),
            can_undo: log.can_undo(),
            can_redo: log.can_redo(),
        });
    }

    // --- Save ---

    /// Mask for a confirmed save: the cached one, a fresh one if a
    /// regeneration is pending, or an all-black mask when nothing was drawn
    fn resolve_mask(&mut self) -> Result<MaskBuffer, MaskError> {
        let has_strokes = !self.drawing.log().is_empty();
        if self.scheduler.quiescence.flush() || (self.mask.is_none() && has_strokes) {
            self.regenerate_mask();
        }

        if let Some(mask) = &self.mask {
            return Ok(mask.clone());
        }
        if let Some(e) = &self.last_mask_error {
            return Err(e.clone());
        }

        // Nothing drawn: "no edit region selected"
        let target = self
            .geometry
            .mask_mapping(self.config.geometry_policy)
            .map(|m| m.target)
            .filter(|t| !t.is_empty())
            .ok_or(MaskError::GeometryUnresolved)?;
        Ok(MaskBuffer::all_black(target.width, target.height))
    }

    /// Confirm the session: build the mask, compress it, upload it and call
    /// `on_save` exactly once with the outcome.
    ///
    /// Every failure on the way degrades the result and is reported as a
    /// [`SaveWarning`]; none of them aborts the save.
    pub async fn confirm<B, F>(&mut self, uploader: &mut B, on_save: F) -> SaveResult
    where
        B: UploadBackend,
        F: FnOnce(SaveResult),
    {
        if self.drawing.is_drawing() {
            self.pointer_up(Instant::now());
        }
        self.scheduler.preview.stop();

        let strokes = self.drawing.log().active().to_vec();
        let mut warnings = Vec::new();
        let mut mask_data_url = String::new();
        let mut uploaded_mask_url = None;

        let mask = match &self.image_state {
            ImageState::Failed(message) => Err(SaveWarning::new(
                WarningKind::ImageLoad,
                format!("Source image unavailable: {}", message),
            )),
            _ => self.resolve_mask().map_err(|e| warning_for_mask_error(&e)),
        };

        match mask {
            Ok(mask) => {
                let limit = self.config.size_limit_bytes;
                match self.negotiator.compress(&mask, limit) {
                    Ok(artifact) => {
                        if let Some(e) = artifact.budget_error(limit) {
                            warn!("{}", e);
                            warnings.push(SaveWarning::new(
                                WarningKind::SizeBudgetExceeded,
                                e.to_string(),
                            ));
                        }
                        mask_data_url = artifact.data_url();

                        match uploader.upload(artifact.to_blob()).await {
                            Ok(url) => {
                                info!("Mask uploaded to {}", url);
                                uploaded_mask_url = Some(url);
                            }
                            Err(e) => {
                                warn!("Mask upload failed: {}", e);
                                warnings.push(SaveWarning::new(WarningKind::Upload, e.to_string()));
                            }
                        }
                    }
                    Err(e) => {
                        warn!("Mask encoding failed, keeping strokes only: {}", e);
                        warnings.push(SaveWarning::new(WarningKind::CanvasExport, e.to_string()));
                    }
                }
            }
            Err(warning) => {
                warn!("No mask for this save, keeping strokes only: {}", warning.message);
                warnings.push(warning);
            }
        }

        let result = SaveResult {
            mask_data_url,
            strokes,
            uploaded_mask_url,
            warnings,
        };
        info!(
            "Save completed: {} strokes, mask {}, {} warnings",
            result.strokes.len(),
            if result.has_mask() { "attached" } else { "missing" },
            result.warnings.len()
        );

        self.events.push(EditorEvent::Saved(result.clone()));
        on_save(result.clone());
        result
    }

    // --- Lifecycle ---

    /// Cancel both cadences and drop any in-flight image load
    pub fn teardown(&mut self) {
        self.scheduler.cancel_all();
        self.mounted = false;
        self.load_generation += 1;
        info!("EditorSession torn down");
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    // --- Queries ---

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn geometry(&self) -> &ImageGeometry {
        &self.geometry
    }

    pub fn image_state(&self) -> &ImageState {
        &self.image_state
    }

    pub fn drawing(&self) -> &DrawingSurface {
        &self.drawing
    }

    /// Visible strokes in drawing order
    pub fn strokes(&self) -> &[Stroke] {
        self.drawing.log().active()
    }

    pub fn canvas(&self) -> &S {
        &self.canvas
    }

    pub fn preview(&self) -> &PreviewRenderer {
        &self.preview
    }

    /// The current authoritative mask, if one was generated
    pub fn mask(&self) -> Option<&MaskBuffer> {
        self.mask.as_ref()
    }

    pub fn geometry_policy(&self) -> GeometryPolicy {
        self.config.geometry_policy
    }
}

fn warning_for_mask_error(error: &MaskError) -> SaveWarning {
    let kind = match error {
        MaskError::Export(_) => WarningKind::CanvasExport,
        MaskError::GeometryUnresolved => WarningKind::GeometryUnresolved,
    };
    SaveWarning::new(kind, error.to_string())
}
