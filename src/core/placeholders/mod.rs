//! Placeholder substitution.
//!
//! String fields of stack descriptors may embed `${kind:arg}` or
//! `${kind:arg:default}` tokens. Each `kind` is handled by an [`Extension`];
//! [`Placeholders::apply`] rewrites every string leaf of a [`Visit`] value on
//! a copy, so a failure never leaves a half-substituted value behind.
//!
//! [`Resolver`] runs the full pipeline over a [`StacksMap`]: inheritance,
//! then secrets descriptors, then server and client descriptors.

mod extensions;
mod resolver;
mod visit;

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::trace;

use crate::core::constants::MAX_PLACEHOLDER_DEPTH;
use crate::core::git::Repo;
use crate::core::stack::{Stack, StacksMap};
use crate::error::{PlaceholderError, Result};

pub use extensions::{Auth, Env, Git, Secret, StackName, User, Var};
pub use resolver::Resolver;
pub use visit::{Leaf, Visit};

/// Handler for one placeholder kind.
pub trait Extension: Send + Sync {
    /// Value for `arg`, or `None` when it does not exist.
    ///
    /// A missing value falls back to the token's default, if any.
    fn resolve(&self, scope: &Scope<'_>, arg: &str) -> Result<Option<String>>;

    /// Whether resolved values may contain further placeholders.
    fn nested(&self) -> bool {
        false
    }
}

/// What a placeholder can see while resolving one stack.
#[derive(Clone, Copy)]
pub struct Scope<'a> {
    /// Stack being resolved.
    pub stack: &'a str,
    pub stacks: &'a StacksMap,
    /// Stack name to the stack it inherits from.
    pub lineage: &'a BTreeMap<String, String>,
    pub repo: Option<&'a dyn Repo>,
}

impl<'a> Scope<'a> {
    pub fn current(&self) -> Option<&'a Stack> {
        self.stacks.get(self.stack)
    }

    /// Stack the current stack inherits from, one level up.
    pub fn parent(&self) -> Option<&'a Stack> {
        self.lineage
            .get(self.stack)
            .and_then(|parent| self.stacks.get(parent))
    }

    /// Error for a placeholder that could not be resolved.
    pub fn unresolved(&self, kind: &str, arg: &str, reason: impl Into<String>) -> crate::error::Error {
        PlaceholderError::Unresolved {
            stack: self.stack.to_string(),
            kind: kind.to_string(),
            arg: arg.to_string(),
            reason: reason.into(),
        }
        .into()
    }
}

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z][A-Za-z0-9_-]*):([^}]*)\}").unwrap_or_else(|e| {
            unreachable!("placeholder pattern is valid: {}", e)
        })
    })
}

/// Placeholder engine with a set of registered extensions.
#[derive(Clone)]
pub struct Placeholders {
    extensions: BTreeMap<String, Arc<dyn Extension>>,
}

impl std::fmt::Debug for Placeholders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Placeholders")
            .field("kinds", &self.extensions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for Placeholders {
    fn default() -> Self {
        let mut placeholders = Self::empty();
        placeholders
            .register("env", Env)
            .register("git", Git)
            .register("auth", Auth)
            .register("secret", Secret)
            .register("var", Var)
            .register("stack", StackName)
            .register("user", User);
        placeholders
    }
}

impl Placeholders {
    /// Engine without any extensions.
    pub fn empty() -> Self {
        Self {
            extensions: BTreeMap::new(),
        }
    }

    /// Register (or replace) the handler for `kind`.
    pub fn register(&mut self, kind: impl Into<String>, extension: impl Extension + 'static) -> &mut Self {
        self.extensions.insert(kind.into(), Arc::new(extension));
        self
    }

    pub fn kinds(&self) -> Vec<&str> {
        self.extensions.keys().map(String::as_str).collect()
    }

    /// Substitute every token in `text`.
    ///
    /// # Errors
    ///
    /// `PlaceholderError::UnknownKind`, `PlaceholderError::Unresolved` or
    /// `PlaceholderError::TooDeep`, each naming the stack in scope.
    pub fn substitute(&self, scope: &Scope<'_>, text: &str) -> Result<String> {
        self.substitute_at(scope, text, 0)
    }

    fn substitute_at(&self, scope: &Scope<'_>, text: &str, depth: usize) -> Result<String> {
        if depth > MAX_PLACEHOLDER_DEPTH {
            return Err(PlaceholderError::TooDeep {
                stack: scope.stack.to_string(),
                token: text.to_string(),
            }
            .into());
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in token_regex().captures_iter(text) {
            let (Some(token), Some(kind), Some(body)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            out.push_str(&text[last..token.start()]);
            last = token.end();

            let kind = kind.as_str();
            let (arg, default) = match body.as_str().split_once(':') {
                Some((arg, default)) => (arg, Some(default)),
                None => (body.as_str(), None),
            };

            let extension =
                self.extensions
                    .get(kind)
                    .ok_or_else(|| PlaceholderError::UnknownKind {
                        stack: scope.stack.to_string(),
                        kind: kind.to_string(),
                        token: token.as_str().to_string(),
                    })?;

            let value = match (extension.resolve(scope, arg)?, default) {
                (Some(value), _) => value,
                (None, Some(default)) => default.to_string(),
                (None, None) => return Err(scope.unresolved(kind, arg, "not found")),
            };
            trace!(stack = scope.stack, kind, arg, "placeholder resolved");

            if extension.nested() && token_regex().is_match(&value) {
                out.push_str(&self.substitute_at(scope, &value, depth + 1)?);
            } else {
                out.push_str(&value);
            }
        }
        out.push_str(&text[last..]);
        Ok(out)
    }

    /// Substituted copy of `value`. The input is never modified.
    pub fn apply<T: Visit + Clone>(&self, scope: &Scope<'_>, value: &T) -> Result<T> {
        let mut copy = value.clone();
        copy.visit(&mut |s: &mut String| {
            if s.contains("${") {
                *s = self.substitute(scope, s)?;
            }
            Ok(())
        })?;
        Ok(copy)
    }
}
