//! Settings Snapshot
//!
//! A flat, read-only-per-frame snapshot of every tunable the renderer uses.
//! Produced by external UI collaborators (or loaded from a JSON file); the
//! renderer never mutates it, it only diffs consecutive snapshots.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::camera::CameraMode;
use crate::error::ConfigError;

/// Lighting parameters (directional sun light)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightSettings {
    /// Light color (linear RGB)
    pub color: Vec3,
    /// Azimuth in degrees; 0 = toward -Z, 90 = toward +X
    pub azimuth_degrees: f32,
    /// Elevation above the horizon in degrees
    pub height_degrees: f32,
    /// Radiometric power multiplier
    pub power: f32,
    /// Output exposure
    pub exposure: f32,
}

impl Default for LightSettings {
    fn default() -> Self {
        Self {
            color: Vec3::new(1.0, 0.95, 0.85),
            azimuth_degrees: 35.0,
            height_degrees: 18.0,
            power: 20.0,
            exposure: 1.0,
        }
    }
}

/// Cloud layer parameters consumed by the scene pass
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudSettings {
    pub density: f32,
    /// Strength of the low-frequency shape noise
    pub shape_strength: f32,
    /// Strength of the high-frequency erosion noise
    pub detail_strength: f32,
    /// Global multiplier on the painted coverage map
    pub coverage_scale: f32,
    /// Lowest cloud altitude (meters)
    pub base_altitude: f32,
    /// Highest cloud altitude (meters)
    pub top_altitude: f32,
}

impl Default for CloudSettings {
    fn default() -> Self {
        Self {
            density: 0.04,
            shape_strength: 1.0,
            detail_strength: 0.35,
            coverage_scale: 1.0,
            base_altitude: 1500.0,
            top_altitude: 4000.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainSettings {
    pub enabled: bool,
    /// Ground plane altitude (meters)
    pub height: f32,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            height: 0.0,
        }
    }
}

/// Flight tuning constants for the free-fly and banked-flight modes
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightTuning {
    /// Cruise speed in meters per second
    pub speed: f32,
    /// Speed multiplier while boost is held
    pub boost_multiplier: f32,
    /// Velocity response rate (1/s) of the exponential low-pass
    pub response_rate: f32,
    /// Response rate (1/s) used while the brake is held
    pub brake_response_rate: f32,
    /// Look sensitivity in radians per pixel
    pub look_sensitivity: f32,
    /// Whether banked-flight mode rolls into turns
    pub banking_enabled: bool,
    /// Scales yaw rate into target roll
    pub bank_strength: f32,
    /// Roll response rate (1/s)
    pub bank_response_rate: f32,
    /// Airspeed at which banking reaches full strength
    pub bank_reference_speed: f32,
    /// Maximum roll angle in degrees
    pub max_roll_degrees: f32,
}

impl Default for FlightTuning {
    fn default() -> Self {
        Self {
            speed: 250.0,
            boost_multiplier: 4.0,
            response_rate: 2.5,
            brake_response_rate: 6.0,
            look_sensitivity: 0.0025,
            banking_enabled: true,
            bank_strength: 0.6,
            bank_response_rate: 4.0,
            bank_reference_speed: 250.0,
            max_roll_degrees: 50.0,
        }
    }
}

/// Screen-space light shaft parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GodraySettings {
    pub enabled: bool,
    pub intensity: f32,
    /// Per-sample falloff along the ray toward the light
    pub decay: f32,
    /// Fraction of the distance to the light that is sampled
    pub density: f32,
    pub weight: f32,
    /// Number of samples along each ray
    pub samples: u32,
}

impl Default for GodraySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            intensity: 0.6,
            decay: 0.965,
            density: 0.85,
            weight: 0.04,
            samples: 48,
        }
    }
}

/// The full settings snapshot
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Internal render resolution relative to the surface
    pub resolution_scale: f32,
    /// Multiplier on animation time
    pub time_scale: f32,
    pub temporal_filter_enabled: bool,
    /// Blend rate toward new data while the camera is static
    pub temporal_alpha_static: f32,
    /// Blend rate toward new data while the camera is being manipulated
    pub temporal_alpha_interacting: f32,
    pub reprojection_enabled: bool,
    /// Keep reprojecting history while interacting instead of resetting on the edges
    pub reproject_while_interacting: bool,
    /// Use the reduced-quality scene pass while interacting
    pub fast_while_interacting: bool,
    pub camera_mode: CameraMode,
    pub field_of_view_degrees: f32,
    pub light: LightSettings,
    pub clouds: CloudSettings,
    pub terrain: TerrainSettings,
    pub flight: FlightTuning,
    pub godrays: GodraySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resolution_scale: 1.0,
            time_scale: 1.0,
            temporal_filter_enabled: true,
            temporal_alpha_static: 0.08,
            temporal_alpha_interacting: 0.35,
            reprojection_enabled: true,
            reproject_while_interacting: true,
            fast_while_interacting: true,
            camera_mode: CameraMode::Orbit,
            field_of_view_degrees: 60.0,
            light: LightSettings::default(),
            clouds: CloudSettings::default(),
            terrain: TerrainSettings::default(),
            flight: FlightTuning::default(),
            godrays: GodraySettings::default(),
        }
    }
}

impl Settings {
    /// Load a settings snapshot from a JSON file.
    ///
    /// Missing fields take their defaults; the result is sanitized.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse a settings snapshot from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(text)?;
        Ok(settings.sanitized())
    }

    /// Clamp every field into the range the renderer can honor.
    pub fn sanitized(mut self) -> Self {
        self.resolution_scale = finite_or(self.resolution_scale, 1.0).clamp(0.1, 2.0);
        self.time_scale = finite_or(self.time_scale, 1.0).max(0.0);
        self.temporal_alpha_static = finite_or(self.temporal_alpha_static, 0.08).clamp(0.01, 1.0);
        self.temporal_alpha_interacting =
            finite_or(self.temporal_alpha_interacting, 0.35).clamp(0.01, 1.0);
        self.field_of_view_degrees = finite_or(self.field_of_view_degrees, 60.0).clamp(
            crate::camera::FOV_MIN_DEGREES,
            crate::camera::FOV_MAX_DEGREES,
        );
        self.flight.speed = finite_or(self.flight.speed, 250.0).max(0.0);
        self.flight.boost_multiplier = finite_or(self.flight.boost_multiplier, 1.0).max(1.0);
        self.flight.response_rate = finite_or(self.flight.response_rate, 2.5).max(0.0);
        self.flight.brake_response_rate = finite_or(self.flight.brake_response_rate, 6.0).max(0.0);
        self.flight.bank_reference_speed = finite_or(self.flight.bank_reference_speed, 1.0).max(1e-3);
        self.flight.max_roll_degrees = finite_or(self.flight.max_roll_degrees, 50.0).clamp(0.0, 85.0);
        self.godrays.samples = self.godrays.samples.clamp(4, 128);
        self.godrays.decay = finite_or(self.godrays.decay, 0.965).clamp(0.0, 1.0);
        if self.clouds.top_altitude < self.clouds.base_altitude {
            std::mem::swap(&mut self.clouds.top_altitude, &mut self.clouds.base_altitude);
        }
        self
    }

    /// Pick the blend rate for this frame (explicit two-mode policy).
    pub fn temporal_alpha(&self, interacting: bool) -> f32 {
        if !self.temporal_filter_enabled {
            1.0
        } else if interacting {
            self.temporal_alpha_interacting
        } else {
            self.temporal_alpha_static
        }
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}
