//! Owner operations, their results and failures.

use std::path::PathBuf;

use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::types::{ActorInfo, Transform, TransformPatch, Vec3};

/// One unit of owner work, built by a handler and executed on the owner.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneOp {
    Spawn { kind: String, location: Vec3 },
    List,
    Search { query: String },
    Delete { id: String },
    SetTransform { id: String, patch: TransformPatch },
    SetVisibility { id: String, visible: bool },
    SetLightIntensity { id: String, intensity: f64 },
    ImportAsset { file_path: PathBuf, asset_name: String },
    ApplyMaterial { id: String, texture_asset_path: String },
}

impl SceneOp {
    /// Short label for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Spawn { .. } => "spawn",
            Self::List => "list",
            Self::Search { .. } => "search",
            Self::Delete { .. } => "delete",
            Self::SetTransform { .. } => "set_transform",
            Self::SetVisibility { .. } => "set_visibility",
            Self::SetLightIntensity { .. } => "set_light_intensity",
            Self::ImportAsset { .. } => "import_asset",
            Self::ApplyMaterial { .. } => "apply_material",
        }
    }
}

/// What a successful operation produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneOutput {
    /// Spawn reports the full actor.
    Actor(ActorInfo),
    Actors(Vec<ActorInfo>),
    Transformed { id: String, transform: Transform },
    Deleted { id: String },
    Visibility { id: String, visible: bool },
    LightIntensity { id: String, intensity: f64 },
    AssetImported { asset_path: String },
    MaterialApplied { id: String, material_path: String },
}

impl SceneOutput {
    /// Success fields for the response envelope.
    pub fn into_fields(self) -> Map<String, Value> {
        let value = match self {
            Self::Actor(actor) => actor_json(&actor),
            Self::Actors(actors) => {
                json!({ "actors": actors.iter().map(actor_json).collect::<Vec<_>>() })
            }
            Self::Transformed { id, transform } => json!({ "id": id, "transform": transform }),
            Self::Deleted { id } => json!({ "id": id }),
            Self::Visibility { id, visible } => json!({ "id": id, "visible": visible }),
            Self::LightIntensity { id, intensity } => json!({ "id": id, "intensity": intensity }),
            Self::AssetImported { asset_path } => json!({ "asset_path": asset_path }),
            Self::MaterialApplied { id, material_path } => {
                json!({ "id": id, "material_path": material_path })
            }
        };
        match value {
            Value::Object(fields) => fields,
            _ => Map::new(),
        }
    }
}

fn actor_json(actor: &ActorInfo) -> Value {
    json!({
        "id": actor.id,
        "kind": actor.kind.as_str(),
        "transform": actor.transform,
    })
}

/// Operation failures. `Display` is the envelope's `error` string.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("Unknown actor kind: {0}")]
    UnknownKind(String),

    #[error("Actor not found: {0}")]
    ActorNotFound(String),

    #[error("Failed to import asset from: {0}")]
    ImportFailed(String),

    #[error("Invalid asset name: {0}")]
    InvalidAssetName(String),

    #[error("Texture not found: {0}")]
    TextureNotFound(String),

    #[error("Actor {0} has no mesh component")]
    NoMeshComponent(String),

    #[error("Actor {0} is not a light")]
    NotALight(String),

    #[error("Invalid light intensity: {0}")]
    InvalidIntensity(f64),
}
