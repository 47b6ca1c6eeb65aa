//! Scene value types shared between handlers and owners.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Euler rotation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotator {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

/// Location, rotation and scale of an actor.
///
/// Wire form: `{"location":{x,y,z},"rotation":{pitch,yaw,roll},"scale":{x,y,z}}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub location: Vec3,
    pub rotation: Rotator,
    pub scale: Vec3,
}

impl Transform {
    pub fn at(location: Vec3) -> Self {
        Self {
            location,
            ..Self::default()
        }
    }

    /// Overwrite only the components present in `patch`.
    pub fn apply(&mut self, patch: &TransformPatch) {
        let fields = [
            (patch.x, &mut self.location.x),
            (patch.y, &mut self.location.y),
            (patch.z, &mut self.location.z),
            (patch.pitch, &mut self.rotation.pitch),
            (patch.yaw, &mut self.rotation.yaw),
            (patch.roll, &mut self.rotation.roll),
            (patch.scale_x, &mut self.scale.x),
            (patch.scale_y, &mut self.scale.y),
            (patch.scale_z, &mut self.scale.z),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            location: Vec3::ZERO,
            rotation: Rotator::default(),
            scale: Vec3::ONE,
        }
    }
}

/// Partial transform update; `None` keeps the current value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransformPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub pitch: Option<f64>,
    pub yaw: Option<f64>,
    pub roll: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
    pub scale_z: Option<f64>,
}

/// Actor kinds the reference scene can spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    StaticMeshActor,
    PointLight,
    SpotLight,
    DirectionalLight,
    CameraActor,
    PlayerStart,
}

impl ActorKind {
    pub const ALL: [ActorKind; 6] = [
        Self::StaticMeshActor,
        Self::PointLight,
        Self::SpotLight,
        Self::DirectionalLight,
        Self::CameraActor,
        Self::PlayerStart,
    ];

    /// Exact, case-sensitive lookup by wire name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StaticMeshActor => "StaticMeshActor",
            Self::PointLight => "PointLight",
            Self::SpotLight => "SpotLight",
            Self::DirectionalLight => "DirectionalLight",
            Self::CameraActor => "CameraActor",
            Self::PlayerStart => "PlayerStart",
        }
    }

    pub fn is_light(&self) -> bool {
        matches!(self, Self::PointLight | Self::SpotLight | Self::DirectionalLight)
    }

    pub fn has_mesh(&self) -> bool {
        matches!(self, Self::StaticMeshActor)
    }
}

impl fmt::Display for ActorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public view of one actor, as reported to controllers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorInfo {
    pub id: String,
    pub kind: ActorKind,
    pub transform: Transform,
}
