//! Built-in command handlers: one struct per command.
//!
//! Each handler validates its params, builds exactly one [`SceneOp`], and
//! submits it through the [`HandlerContext`]. `id` may also be sent as
//! `actor_id` and `kind` as `actor_type`.

use std::path::PathBuf;

use actl_protocol::{CommandFailure, CommandName, Commands, Response};
use actl_scene::{SceneOp, TransformPatch, Vec3};

use crate::handler::{CommandHandler, HandlerContext};
use crate::params::Params;

const ID_ALIASES: &[&str] = &["actor_id"];
const KIND_ALIASES: &[&str] = &["actor_type"];

async fn submit(ctx: &HandlerContext, op: Result<SceneOp, CommandFailure>) -> Response {
    match op {
        Ok(op) => ctx.execute(op).await,
        Err(failure) => failure.into(),
    }
}

fn actor_id(params: &Params<'_>) -> Result<String, CommandFailure> {
    params.string("id", ID_ALIASES)
}

// ─────────────────────────────────────────────────────────────────────────────
// Actors
// ─────────────────────────────────────────────────────────────────────────────

pub struct SpawnActor;

impl SpawnActor {
    fn op(params: &Params<'_>) -> Result<SceneOp, CommandFailure> {
        Ok(SceneOp::Spawn {
            kind: params.string("kind", KIND_ALIASES)?,
            location: Vec3::new(
                params.number_or_zero("x")?,
                params.number_or_zero("y")?,
                params.number_or_zero("z")?,
            ),
        })
    }
}

impl CommandHandler for SpawnActor {
    fn name(&self) -> CommandName {
        Commands::SPAWN_ACTOR
    }

    async fn handle(&self, ctx: &HandlerContext, params: Params<'_>) -> Response {
        submit(ctx, Self::op(&params)).await
    }
}

pub struct GetSceneInfo;

impl CommandHandler for GetSceneInfo {
    fn name(&self) -> CommandName {
        Commands::GET_SCENE_INFO
    }

    fn requires_params(&self) -> bool {
        false
    }

    async fn handle(&self, ctx: &HandlerContext, _params: Params<'_>) -> Response {
        ctx.execute(SceneOp::List).await
    }
}

pub struct SearchActors;

impl CommandHandler for SearchActors {
    fn name(&self) -> CommandName {
        Commands::SEARCH_ACTORS
    }

    async fn handle(&self, ctx: &HandlerContext, params: Params<'_>) -> Response {
        let op = params.string("query", &[]).map(|query| SceneOp::Search { query });
        submit(ctx, op).await
    }
}

pub struct DeleteActor;

impl CommandHandler for DeleteActor {
    fn name(&self) -> CommandName {
        Commands::DELETE_ACTOR
    }

    async fn handle(&self, ctx: &HandlerContext, params: Params<'_>) -> Response {
        let op = actor_id(&params).map(|id| SceneOp::Delete { id });
        submit(ctx, op).await
    }
}

/// Partial update: only the fields present are changed, in one owner job.
pub struct SetTransform;

impl SetTransform {
    fn op(params: &Params<'_>) -> Result<SceneOp, CommandFailure> {
        let id = actor_id(params)?;
        let patch = TransformPatch {
            x: params.optional_number("x")?,
            y: params.optional_number("y")?,
            z: params.optional_number("z")?,
            pitch: params.optional_number("pitch")?,
            yaw: params.optional_number("yaw")?,
            roll: params.optional_number("roll")?,
            scale_x: params.optional_number("scale_x")?,
            scale_y: params.optional_number("scale_y")?,
            scale_z: params.optional_number("scale_z")?,
        };
        Ok(SceneOp::SetTransform { id, patch })
    }
}

impl CommandHandler for SetTransform {
    fn name(&self) -> CommandName {
        Commands::SET_TRANSFORM
    }

    async fn handle(&self, ctx: &HandlerContext, params: Params<'_>) -> Response {
        submit(ctx, Self::op(&params)).await
    }
}

pub struct SetVisibility;

impl CommandHandler for SetVisibility {
    fn name(&self) -> CommandName {
        Commands::SET_VISIBILITY
    }

    async fn handle(&self, ctx: &HandlerContext, params: Params<'_>) -> Response {
        let op = actor_id(&params).and_then(|id| {
            let visible = params.boolean("visible")?;
            Ok(SceneOp::SetVisibility { id, visible })
        });
        submit(ctx, op).await
    }
}

pub struct SetLightIntensity;

impl CommandHandler for SetLightIntensity {
    fn name(&self) -> CommandName {
        Commands::SET_LIGHT_INTENSITY
    }

    async fn handle(&self, ctx: &HandlerContext, params: Params<'_>) -> Response {
        let op = actor_id(&params).and_then(|id| {
            let intensity = params.number("intensity")?;
            Ok(SceneOp::SetLightIntensity { id, intensity })
        });
        submit(ctx, op).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Assets
// ─────────────────────────────────────────────────────────────────────────────

pub struct ImportAsset;

impl CommandHandler for ImportAsset {
    fn name(&self) -> CommandName {
        Commands::IMPORT_ASSET
    }

    async fn handle(&self, ctx: &HandlerContext, params: Params<'_>) -> Response {
        let op = params.string("file_path", &[]).and_then(|file_path| {
            Ok(SceneOp::ImportAsset {
                file_path: PathBuf::from(file_path),
                asset_name: params.string("asset_name", &[])?,
            })
        });
        submit(ctx, op).await
    }
}

pub struct ApplyMaterial;

impl CommandHandler for ApplyMaterial {
    fn name(&self) -> CommandName {
        Commands::APPLY_MATERIAL
    }

    async fn handle(&self, ctx: &HandlerContext, params: Params<'_>) -> Response {
        let op = actor_id(&params).and_then(|id| {
            Ok(SceneOp::ApplyMaterial {
                id,
                texture_asset_path: params.string("texture_asset_path", &[])?,
            })
        });
        submit(ctx, op).await
    }
}
