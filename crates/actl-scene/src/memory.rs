//! In-memory reference scene.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::SceneBackend;
use crate::ops::{SceneError, SceneOp, SceneOutput};
use crate::types::{ActorInfo, ActorKind, Transform, TransformPatch, Vec3};

/// Content root for everything the scene generates.
pub const GENERATED_ROOT: &str = "/Game/Generated";

const DEFAULT_LIGHT_INTENSITY: f64 = 1.0;

#[derive(Debug, Clone)]
struct Actor {
    id: String,
    kind: ActorKind,
    transform: Transform,
    visible: bool,
    light_intensity: Option<f64>,
    material_path: Option<String>,
}

impl Actor {
    fn info(&self) -> ActorInfo {
        ActorInfo {
            id: self.id.clone(),
            kind: self.kind,
            transform: self.transform,
        }
    }
}

/// A scene held entirely in memory. Actors are kept in spawn order.
#[derive(Debug, Default)]
pub struct Scene {
    actors: Vec<Actor>,
    /// Destination path -> source file.
    assets: HashMap<String, PathBuf>,
    counters: HashMap<ActorKind, u64>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn actor(&self, id: &str) -> Option<ActorInfo> {
        self.find(id).map(Actor::info)
    }

    pub fn is_visible(&self, id: &str) -> Option<bool> {
        self.find(id).map(|a| a.visible)
    }

    pub fn light_intensity(&self, id: &str) -> Option<f64> {
        self.find(id).and_then(|a| a.light_intensity)
    }

    pub fn material_path(&self, id: &str) -> Option<&str> {
        self.find(id).and_then(|a| a.material_path.as_deref())
    }

    /// Source file an imported asset came from.
    pub fn asset_source(&self, asset_path: &str) -> Option<&PathBuf> {
        self.assets.get(asset_path)
    }

    fn find(&self, id: &str) -> Option<&Actor> {
        self.actors.iter().find(|a| a.id == id)
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut Actor, SceneError> {
        self.actors
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| SceneError::ActorNotFound(id.to_string()))
    }

    fn spawn(&mut self, kind: &str, location: Vec3) -> Result<ActorInfo, SceneError> {
        let kind = ActorKind::parse(kind).ok_or_else(|| SceneError::UnknownKind(kind.to_string()))?;

        let counter = self.counters.entry(kind).or_insert(0);
        *counter += 1;
        let id = format!("{kind}_{counter}");

        let actor = Actor {
            id,
            kind,
            transform: Transform::at(location),
            visible: true,
            light_intensity: kind.is_light().then_some(DEFAULT_LIGHT_INTENSITY),
            material_path: None,
        };
        info!("Spawned {} at ({}, {}, {})", actor.id, location.x, location.y, location.z);
        let info = actor.info();
        self.actors.push(actor);
        Ok(info)
    }

    fn delete(&mut self, id: &str) -> Result<String, SceneError> {
        let index = self
            .actors
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| SceneError::ActorNotFound(id.to_string()))?;
        let actor = self.actors.remove(index);
        info!("Deleted {}", actor.id);
        Ok(actor.id)
    }

    fn set_transform(&mut self, id: &str, patch: &TransformPatch) -> Result<Transform, SceneError> {
        let actor = self.find_mut(id)?;
        actor.transform.apply(patch);
        Ok(actor.transform)
    }

    fn search(&self, query: &str) -> Vec<ActorInfo> {
        let needle = query.to_lowercase();
        self.actors
            .iter()
            .filter(|a| {
                a.id.to_lowercase().contains(&needle)
                    || a.kind.as_str().to_lowercase().contains(&needle)
            })
            .map(Actor::info)
            .collect()
    }

    fn set_light_intensity(&mut self, id: &str, intensity: f64) -> Result<f64, SceneError> {
        let actor = self.find_mut(id)?;
        if !actor.kind.is_light() {
            return Err(SceneError::NotALight(actor.id.clone()));
        }
        if !intensity.is_finite() || intensity < 0.0 {
            return Err(SceneError::InvalidIntensity(intensity));
        }
        actor.light_intensity = Some(intensity);
        Ok(intensity)
    }

    fn import_asset(&mut self, file_path: PathBuf, asset_name: &str) -> Result<String, SceneError> {
        if !file_path.is_file() {
            return Err(SceneError::ImportFailed(file_path.display().to_string()));
        }
        let name = asset_name.trim();
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(SceneError::InvalidAssetName(asset_name.to_string()));
        }

        let asset_path = format!("{GENERATED_ROOT}/{name}");
        if self.assets.insert(asset_path.clone(), file_path).is_some() {
            debug!("Re-imported {asset_path}");
        } else {
            info!("Imported {asset_path}");
        }
        Ok(asset_path)
    }

    fn apply_material(&mut self, id: &str, texture: &str) -> Result<String, SceneError> {
        if self.find(id).is_none() {
            return Err(SceneError::ActorNotFound(id.to_string()));
        }
        if !self.assets.contains_key(texture) {
            return Err(SceneError::TextureNotFound(texture.to_string()));
        }

        let actor = self.find_mut(id)?;
        if !actor.kind.has_mesh() {
            return Err(SceneError::NoMeshComponent(actor.id.clone()));
        }
        let material_path = format!("{GENERATED_ROOT}/M_{}", actor.id);
        actor.material_path = Some(material_path.clone());
        info!("Applied {texture} to {} as {material_path}", actor.id);
        Ok(material_path)
    }
}

impl SceneBackend for Scene {
    fn execute(&mut self, op: SceneOp) -> Result<SceneOutput, SceneError> {
        debug!("Executing scene op: {}", op.name());
        match op {
            SceneOp::Spawn { kind, location } => self.spawn(&kind, location).map(SceneOutput::Actor),
            SceneOp::List => Ok(SceneOutput::Actors(self.actors.iter().map(Actor::info).collect())),
            SceneOp::Search { query } => Ok(SceneOutput::Actors(self.search(&query))),
            SceneOp::Delete { id } => self.delete(&id).map(|id| SceneOutput::Deleted { id }),
            SceneOp::SetTransform { id, patch } => self
                .set_transform(&id, &patch)
                .map(|transform| SceneOutput::Transformed { id, transform }),
            SceneOp::SetVisibility { id, visible } => {
                let actor = self.find_mut(&id)?;
                actor.visible = visible;
                Ok(SceneOutput::Visibility { id, visible })
            }
            SceneOp::SetLightIntensity { id, intensity } => self
                .set_light_intensity(&id, intensity)
                .map(|intensity| SceneOutput::LightIntensity { id, intensity }),
            SceneOp::ImportAsset { file_path, asset_name } => self
                .import_asset(file_path, &asset_name)
                .map(|asset_path| SceneOutput::AssetImported { asset_path }),
            SceneOp::ApplyMaterial { id, texture_asset_path } => self
                .apply_material(&id, &texture_asset_path)
                .map(|material_path| SceneOutput::MaterialApplied { id, material_path }),
        }
    }
}
