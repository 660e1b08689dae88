//! Field instances and their attachment to a host container.

use flourish_core::{Bounds, FieldParams};
use glam::Vec2;
use rand::{SeedableRng, rngs::SmallRng};
use ratatui::layout::Rect;
use tracing::debug;

use crate::driver::Animate;
use crate::entity::Entity;
use crate::error::FieldError;
use crate::pointer::PointerTracker;
use crate::surface::{CellSurface, Surface};
use crate::{pool, renderer, stepper};

/// A fixed pool of entities animated with one set of parameters.
#[derive(Debug, Clone)]
pub struct Field {
    params: FieldParams,
    entities: Vec<Entity>,
    rng: SmallRng,
}

impl Field {
    /// Populate a field seeded from OS entropy.
    pub fn new(params: FieldParams, bounds: Bounds) -> Self {
        Self::with_rng(params, bounds, SmallRng::from_entropy())
    }

    /// Populate a field from an explicit random source.
    pub fn with_rng(params: FieldParams, bounds: Bounds, mut rng: SmallRng) -> Self {
        let entities = pool::populate(params.count, bounds, &params, &mut rng);
        Self::from_entities(params, entities, rng)
    }

    /// Wrap hand-built entities.
    pub fn from_entities(params: FieldParams, entities: Vec<Entity>, rng: SmallRng) -> Self {
        Self {
            params,
            entities,
            rng,
        }
    }

    pub fn params(&self) -> &FieldParams {
        &self.params
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Advance one frame.
    pub fn step(&mut self, pointer: Option<Vec2>, bounds: Bounds) {
        stepper::step(
            &mut self.entities,
            pointer,
            bounds,
            &self.params,
            &mut self.rng,
        );
    }

    /// Redraw the whole field onto `surface`.
    pub fn render(&self, surface: &mut dyn Surface) {
        renderer::render(surface, &self.entities, &self.params);
    }
}

/// Named rectangles a field can attach to.
pub trait Host {
    fn container(&self, name: &str) -> Option<Rect>;
}

/// A field together with the surface it draws on and the pointer it follows.
#[derive(Debug)]
pub struct MountedField {
    container: String,
    field: Field,
    surface: CellSurface,
    pointer: PointerTracker,
}

impl MountedField {
    /// Attach a new field to the host container called `container`.
    pub fn mount(
        host: &impl Host,
        container: &str,
        params: FieldParams,
        scale: Vec2,
    ) -> Result<Self, FieldError> {
        let invalid = params.invalid_settings();
        if !invalid.is_empty() {
            return Err(FieldError::InvalidParams(invalid));
        }
        let area = host
            .container(container)
            .ok_or_else(|| FieldError::ContainerMissing(container.to_string()))?;
        let surface = CellSurface::new(area, scale);
        let field = Field::new(params, surface.bounds());
        debug!(container, ?area, count = field.entities.len(), "field mounted");
        Ok(Self::from_parts(container, field, surface))
    }

    /// Assemble a mounted field from an existing field and surface.
    pub fn from_parts(container: &str, field: Field, surface: CellSurface) -> Self {
        Self {
            container: container.to_string(),
            field,
            surface,
            pointer: PointerTracker::new(),
        }
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn surface(&self) -> &CellSurface {
        &self.surface
    }

    /// Handle the host writes pointer moves to.
    pub fn pointer(&self) -> PointerTracker {
        self.pointer.clone()
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.surface.set_opacity(opacity);
    }

    /// Record a pointer move given in global terminal cells.
    pub fn track_pointer(&self, column: u16, row: u16) {
        self.pointer.record(self.surface.to_local(column, row));
    }

    /// Resize the surface after the host's layout changed. Entity positions
    /// are kept; only the wraparound bounds move.
    pub fn relayout(&mut self, host: &impl Host) -> Result<(), FieldError> {
        let area = host
            .container(&self.container)
            .ok_or_else(|| FieldError::ContainerMissing(self.container.clone()))?;
        if area != self.surface.area() {
            debug!(container = %self.container, ?area, "surface resized");
            self.surface.resize(area);
        }
        Ok(())
    }

    pub fn detach(&mut self) {
        self.surface.detach();
    }

    pub fn attach(&mut self) {
        self.surface.attach();
    }
}

impl Animate for MountedField {
    fn step(&mut self) {
        self.field.step(self.pointer.latest(), self.surface.bounds());
    }

    fn render(&mut self) {
        self.field.render(&mut self.surface);
    }
}
