//! JSON scene configuration.
//!
//! ```json
//! {
//!   "capacities": { "sphere": 64, "torus": 4 },
//!   "physics": { "gravity": [0.0, -9.81, 0.0], "fixed_dt": 0.008 }
//! }
//! ```
//!
//! Every field is optional. Capacities are read once, when the registry is built;
//! physics tuning can be reapplied to a running world.

use glam::Vec3;
use physics::{Material, PhysParams};
use serde::{Deserialize, Serialize};

use crate::error::SceneError;
use crate::registry::CapacityTable;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneConfig {
    pub capacities: CapacityTable,
    pub physics: PhysicsSettings,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhysicsSettings {
    pub gravity: [f32; 3],
    /// Per-step velocity retention in `(0, 1]`
    pub damping: f32,
    /// Speed under which a body may fall asleep
    pub activity_threshold: f32,
    /// Length of one physics step in seconds
    pub fixed_dt: f32,
    /// Upper bound on physics steps per frame; leftover time is dropped
    pub max_substeps: u32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.81, 0.0],
            damping: 0.999,
            activity_threshold: 0.01,
            fixed_dt: 1.0 / 120.0,
            max_substeps: 8,
        }
    }
}

impl PhysicsSettings {
    #[must_use]
    pub fn gravity(&self) -> Vec3 {
        Vec3::from_array(self.gravity)
    }

    #[must_use]
    pub fn params(&self) -> PhysParams {
        PhysParams {
            gravity: self.gravity(),
            damping: self.damping,
            material: Material::default(),
        }
    }
}

impl SceneConfig {
    /// # Errors
    ///
    /// [`SceneError::Config`] for malformed JSON, unknown fields or unknown shape names.
    pub fn from_json(text: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(text)?)
    }

    /// # Errors
    ///
    /// [`SceneError::Config`] if serialisation fails.
    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
