//! Per-layer settings.

use flourish_core::{Attraction, Connection, FieldParams, Rgb, Span};
use serde::{Deserialize, Serialize};

/// The three fields flourish can show, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Ambient,
    Shapes,
    Particles,
}

impl LayerKind {
    pub const ALL: [LayerKind; 3] = [LayerKind::Ambient, LayerKind::Shapes, LayerKind::Particles];

    /// Section name in the config file.
    pub fn name(self) -> &'static str {
        match self {
            LayerKind::Ambient => "ambient",
            LayerKind::Shapes => "shapes",
            LayerKind::Particles => "particles",
        }
    }

    /// Built-in parameters before overrides.
    pub fn preset(self) -> FieldParams {
        match self {
            LayerKind::Ambient => FieldParams::ambient(),
            LayerKind::Shapes => FieldParams::shapes(),
            LayerKind::Particles => FieldParams::particles(),
        }
    }
}

/// Settings of one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    pub enabled: bool,
    /// Host container the layer draws into.
    pub container: String,
    /// Multiplies cell coverage when the layer is composited.
    pub layer_opacity: f32,
    #[serde(flatten)]
    pub overrides: FieldOverrides,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            container: "hero".to_string(),
            layer_opacity: 1.0,
            overrides: FieldOverrides::default(),
        }
    }
}

impl LayerConfig {
    /// Field parameters for this layer: the preset of `kind` with overrides applied.
    pub fn params(&self, kind: LayerKind) -> FieldParams {
        self.overrides.apply(kind.preset())
    }
}

/// Optional replacements for preset field parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Span>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<Span>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<Span>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase_rate: Option<Span>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pulse_amplitude: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_rate: Option<Span>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifespan: Option<Span>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attraction_radius: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attraction_strength: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relaxation: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_distance: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_opacity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palette: Option<Vec<Rgb>>,
}

impl FieldOverrides {
    /// Apply every set override to `params`.
    ///
    /// Setting either attraction or connection key enables that feature even
    /// when the preset lacks it; missing halves come from the particle preset.
    pub fn apply(&self, mut params: FieldParams) -> FieldParams {
        let fallback = FieldParams::particles();

        if let Some(count) = self.count {
            params.count = count;
        }
        if let Some(size) = self.size {
            params.size = size;
        }
        if let Some(speed) = self.speed {
            params.speed = speed;
        }
        if let Some(opacity) = self.opacity {
            params.opacity = opacity;
        }
        if let Some(phase_rate) = self.phase_rate {
            params.phase_rate = phase_rate;
        }
        if let Some(amplitude) = self.pulse_amplitude {
            params.pulse_amplitude = amplitude;
        }
        if let Some(rotation_rate) = self.rotation_rate {
            params.rotation_rate = rotation_rate;
        }
        if let Some(lifespan) = self.lifespan {
            params.lifespan = Some(lifespan);
        }
        if let Some(relaxation) = self.relaxation {
            params.relaxation = Some(relaxation);
        }
        if let Some(palette) = &self.palette {
            params.palette = palette.clone();
        }

        if self.attraction_radius.is_some() || self.attraction_strength.is_some() {
            let base = params.attraction.or(fallback.attraction).unwrap_or(Attraction {
                radius: 0.0,
                strength: 0.0,
            });
            params.attraction = Some(Attraction {
                radius: self.attraction_radius.unwrap_or(base.radius),
                strength: self.attraction_strength.unwrap_or(base.strength),
            });
        }

        if self.connection_distance.is_some() || self.connection_opacity.is_some() {
            let base = params.connection.or(fallback.connection).unwrap_or(Connection {
                distance: 0.0,
                opacity: 0.0,
                color: Rgb::WHITE,
            });
            params.connection = Some(Connection {
                distance: self.connection_distance.unwrap_or(base.distance),
                opacity: self.connection_opacity.unwrap_or(base.opacity),
                color: base.color,
            });
        }

        params
    }
}
