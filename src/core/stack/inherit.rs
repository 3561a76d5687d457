//! Stack inheritance.
//!
//! A descriptor entry with `inherit: parent` is replaced by the same entry of
//! the parent stack, after the parent itself is fully resolved. A stack is
//! resolved at most once; a stack reached again while it is still being
//! resolved is a cycle.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use super::descriptor::{PerEnvResourcesDescriptor, SecretsDescriptor, TypedDescriptor};
use super::{Stack, StacksMap};
use crate::error::{Result, StackError};

/// An entry that may point at another stack instead of declaring a value.
pub trait Inheritable: Clone {
    fn inherit(&self) -> Option<&str>;

    /// Local `type`, which must not be combined with `inherit`.
    fn kind(&self) -> Option<&str> {
        None
    }
}

impl Inheritable for TypedDescriptor {
    fn inherit(&self) -> Option<&str> {
        self.inherit.as_deref().filter(|p| !p.is_empty())
    }

    fn kind(&self) -> Option<&str> {
        self.kind.as_deref().filter(|k| !k.is_empty())
    }
}

impl Inheritable for PerEnvResourcesDescriptor {
    fn inherit(&self) -> Option<&str> {
        self.inherit.as_deref().filter(|p| !p.is_empty())
    }
}

impl Inheritable for SecretsDescriptor {
    fn inherit(&self) -> Option<&str> {
        self.inherit.as_deref().filter(|p| !p.is_empty())
    }
}

/// Stack each stack primarily inherits from.
///
/// Taken from the secrets descriptor, falling back to the provisioner. Must
/// be computed before [`resolve_inheritance`] clears the markers.
pub fn lineage(stacks: &StacksMap) -> BTreeMap<String, String> {
    stacks
        .iter()
        .filter_map(|(name, stack)| {
            stack
                .secrets
                .inherit()
                .or_else(|| stack.server.provisioner.inherit())
                .map(|parent| (name.clone(), parent.to_string()))
        })
        .collect()
}

/// Resolve every `inherit` marker in `stacks`.
///
/// Either every stack resolves or `stacks` is left untouched.
///
/// # Errors
///
/// `StackError::MissingParent`, `StackError::MissingInherited`,
/// `StackError::InheritConflict` or `StackError::Cycle`.
pub fn resolve_inheritance(stacks: &mut StacksMap) -> Result<()> {
    let mut state = Inheritance {
        original: stacks,
        resolved: BTreeMap::new(),
        visiting: Vec::new(),
    };
    for name in stacks.keys() {
        state.resolve(name)?;
    }

    debug!(stacks = state.resolved.len(), "inheritance resolved");
    let resolved = state.resolved;
    *stacks = resolved;
    Ok(())
}

struct Inheritance<'a> {
    original: &'a StacksMap,
    resolved: StacksMap,
    visiting: Vec<String>,
}

impl Inheritance<'_> {
    fn resolve(&mut self, name: &str) -> Result<()> {
        if self.resolved.contains_key(name) {
            return Ok(());
        }
        if let Some(pos) = self.visiting.iter().position(|s| s == name) {
            let mut chain = self.visiting[pos..].to_vec();
            chain.push(name.to_string());
            return Err(StackError::Cycle {
                stack: name.to_string(),
                chain: chain.join(" -> "),
            }
            .into());
        }

        trace!(stack = name, "resolving inheritance");
        self.visiting.push(name.to_string());
        let mut stack = self.original[name].clone();

        if let Some(parent) = stack.secrets.inherit().map(str::to_string) {
            stack.secrets = self.parent(name, "secrets", &parent)?.secrets.clone();
        } else {
            for (auth, descriptor) in stack.secrets.auth.iter_mut() {
                self.field(name, &format!("auth.{}", auth), descriptor, |p| {
                    p.secrets.auth.get(auth)
                })?;
            }
        }

        let server = &mut stack.server;
        self.field(name, "provisioner", &mut server.provisioner, |p| {
            Some(&p.server.provisioner)
        })?;
        self.field(name, "secrets provider", &mut server.secrets, |p| {
            Some(&p.server.secrets)
        })?;
        self.field(name, "cicd", &mut server.cicd, |p| Some(&p.server.cicd))?;
        for (template, descriptor) in server.templates.iter_mut() {
            self.field(name, &format!("templates.{}", template), descriptor, |p| {
                p.server.templates.get(template)
            })?;
        }
        self.field(name, "registrar", &mut server.resources.registrar, |p| {
            Some(&p.server.resources.registrar)
        })?;
        for (env, per_env) in server.resources.resources.iter_mut() {
            self.field(name, &format!("resources.{}", env), per_env, |p| {
                p.server.resources.resources.get(env)
            })?;
            for (resource, descriptor) in per_env.resources.iter_mut() {
                self.field(
                    name,
                    &format!("resources.{}.{}", env, resource),
                    descriptor,
                    |p| {
                        p.server
                            .resources
                            .resources
                            .get(env)
                            .and_then(|e| e.resources.get(resource))
                    },
                )?;
            }
        }

        self.visiting.pop();
        self.resolved.insert(name.to_string(), stack);
        Ok(())
    }

    /// Fully resolved parent stack.
    fn parent(&mut self, stack: &str, field: &str, parent: &str) -> Result<&Stack> {
        if !self.original.contains_key(parent) {
            return Err(StackError::MissingParent {
                stack: stack.to_string(),
                field: field.to_string(),
                parent: parent.to_string(),
            }
            .into());
        }
        self.resolve(parent)?;
        self.resolved
            .get(parent)
            .ok_or_else(|| StackError::NotFound(parent.to_string()).into())
    }

    /// Replace `value` with the parent's entry if it is inherited.
    fn field<T, F>(&mut self, stack: &str, field: &str, value: &mut T, get: F) -> Result<()>
    where
        T: Inheritable,
        F: Fn(&Stack) -> Option<&T>,
    {
        let Some(parent) = value.inherit().map(str::to_string) else {
            return Ok(());
        };
        if let Some(kind) = value.kind() {
            return Err(StackError::InheritConflict {
                stack: stack.to_string(),
                field: field.to_string(),
                parent,
                kind: kind.to_string(),
            }
            .into());
        }

        let inherited = get(self.parent(stack, field, &parent)?).cloned();
        *value = inherited.ok_or_else(|| StackError::MissingInherited {
            stack: stack.to_string(),
            field: field.to_string(),
            parent,
        })?;
        Ok(())
    }
}
