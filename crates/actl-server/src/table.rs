//! Explicit command name -> handler map, built once at startup.

use std::collections::HashMap;

use actl_protocol::{CommandName, Commands, is_known_command};
use tracing::{debug, warn};

use crate::handler::{CommandHandler, HandlerDyn};
use crate::handlers::*;

#[derive(Default)]
pub struct HandlerTable {
    handlers: HashMap<CommandName, Box<dyn HandlerDyn>>,
}

impl HandlerTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in command.
    pub fn standard() -> Self {
        let mut table = Self::new();
        table.register(SpawnActor);
        table.register(GetSceneInfo);
        table.register(SearchActors);
        table.register(DeleteActor);
        table.register(SetTransform);
        table.register(SetVisibility);
        table.register(SetLightIntensity);
        table.register(ImportAsset);
        table.register(ApplyMaterial);
        debug_assert!(
            table.len() == Commands::ALL.len() && table.handlers.keys().all(|name| is_known_command(name)),
            "standard table must cover exactly the built-in commands"
        );
        table
    }

    /// Register a handler under its own name, replacing any previous one.
    pub fn register<H: CommandHandler>(&mut self, handler: H) {
        let name = handler.name();
        debug!("Registering handler: {name}");
        if self.handlers.insert(name, Box::new(handler)).is_some() {
            warn!("Handler for {name} replaced");
        }
    }

    pub(crate) fn get(&self, name: &str) -> Option<&dyn HandlerDyn> {
        self.handlers.get(name).map(Box::as_ref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<CommandName> {
        let mut names: Vec<_> = self.handlers.values().map(|h| h.name_dyn()).collect();
        names.sort_unstable();
        names
    }
}
