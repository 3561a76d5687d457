//! Full resolution of a stack graph.

use std::sync::Arc;

use tracing::{debug, info};

use super::{Placeholders, Scope};
use crate::core::git::Repo;
use crate::core::stack::{lineage, resolve_inheritance, StacksMap};
use crate::error::Result;

/// Resolves inheritance and placeholders across all stacks.
#[derive(Default)]
pub struct Resolver {
    placeholders: Placeholders,
    repo: Option<Arc<dyn Repo>>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository used by `${git:...}`.
    pub fn with_repo(mut self, repo: Arc<dyn Repo>) -> Self {
        self.repo = Some(repo);
        self
    }

    pub fn with_placeholders(mut self, placeholders: Placeholders) -> Self {
        self.placeholders = placeholders;
        self
    }

    /// Resolve `stacks` in place.
    ///
    /// Inheritance runs first for every stack. Secrets descriptors are then
    /// substituted, and server and client descriptors see the substituted
    /// secrets. On error `stacks` is left exactly as it was.
    pub fn resolve(&self, stacks: &mut StacksMap) -> Result<()> {
        let lineage = lineage(stacks);
        let mut resolved = stacks.clone();
        resolve_inheritance(&mut resolved)?;

        let repo = self.repo.as_deref();

        let snapshot = resolved.clone();
        for (name, stack) in resolved.iter_mut() {
            let scope = Scope {
                stack: name,
                stacks: &snapshot,
                lineage: &lineage,
                repo,
            };
            stack.secrets = self.placeholders.apply(&scope, &stack.secrets)?;
        }
        debug!(stacks = resolved.len(), "secrets resolved");

        let snapshot = resolved.clone();
        for (name, stack) in resolved.iter_mut() {
            let scope = Scope {
                stack: name,
                stacks: &snapshot,
                lineage: &lineage,
                repo,
            };
            stack.server = self.placeholders.apply(&scope, &stack.server)?;
            stack.client = self.placeholders.apply(&scope, &stack.client)?;
        }

        info!(stacks = resolved.len(), "stacks resolved");
        *stacks = resolved;
        Ok(())
    }
}
