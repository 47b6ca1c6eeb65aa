//! Command name constants.
//!
//! Each constant is the exact string sent over the wire as the `command`
//! field of a request. Matching is case-sensitive with no aliasing.

/// All command names understood by the reference scene owner.
pub struct Commands;

impl Commands {
    // ── Actors ──────────────────────────────────────────────────────────
    pub const SPAWN_ACTOR: &str = "spawn_actor";
    pub const DELETE_ACTOR: &str = "delete_actor";
    pub const SET_TRANSFORM: &str = "set_transform";
    pub const SET_VISIBILITY: &str = "set_visibility";
    pub const SET_LIGHT_INTENSITY: &str = "set_light_intensity";

    // ── Queries ─────────────────────────────────────────────────────────
    pub const GET_SCENE_INFO: &str = "get_scene_info";
    pub const SEARCH_ACTORS: &str = "search_actors";

    // ── Assets ──────────────────────────────────────────────────────────
    pub const IMPORT_ASSET: &str = "import_asset";
    pub const APPLY_MATERIAL: &str = "apply_material";

    pub const ALL: &[CommandName] = &[
        Self::SPAWN_ACTOR,
        Self::DELETE_ACTOR,
        Self::SET_TRANSFORM,
        Self::SET_VISIBILITY,
        Self::SET_LIGHT_INTENSITY,
        Self::GET_SCENE_INFO,
        Self::SEARCH_ACTORS,
        Self::IMPORT_ASSET,
        Self::APPLY_MATERIAL,
    ];
}

/// Returns true if the given string is a known command name.
pub fn is_known_command(command: &str) -> bool {
    Commands::ALL.contains(&command)
}

/// The command name is always a `&str` at the protocol level.
pub type CommandName = &'static str;
