//! Built-in placeholder kinds.

use tracing::debug;

use super::{Extension, Scope};
use crate::core::constants::SHORT_COMMIT_LEN;
use crate::core::stack::TypedDescriptor;
use crate::error::Result;

/// `${env:NAME}`: process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct Env;

impl Extension for Env {
    fn resolve(&self, _scope: &Scope<'_>, arg: &str) -> Result<Option<String>> {
        Ok(std::env::var(arg).ok())
    }
}

/// `${git:root|gitdir|branch|commit|commit.short}`: repository facts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Git;

impl Extension for Git {
    fn resolve(&self, scope: &Scope<'_>, arg: &str) -> Result<Option<String>> {
        let repo = scope
            .repo
            .ok_or_else(|| scope.unresolved("git", arg, "git repo is not configured"))?;

        match arg {
            "root" => Ok(Some(repo.workdir().display().to_string())),
            "gitdir" => Ok(Some(repo.gitdir().display().to_string())),
            "branch" => repo.branch(),
            "commit" => repo.head_commit(),
            "commit.short" => Ok(repo
                .head_commit()?
                .map(|hash| hash.chars().take(SHORT_COMMIT_LEN).collect())),
            other => Err(scope.unresolved("git", other, "unknown git property")),
        }
    }
}

/// `${auth:name}` or `${auth:name.field}`: auth descriptor credentials.
///
/// Looks in the current stack first, then in the stack it inherits from.
#[derive(Debug, Clone, Copy, Default)]
pub struct Auth;

impl Auth {
    fn descriptor<'a>(scope: &Scope<'a>, name: &str) -> Option<&'a TypedDescriptor> {
        scope
            .current()
            .and_then(|s| s.secrets.auth.get(name))
            .or_else(|| scope.parent().and_then(|s| s.secrets.auth.get(name)))
    }
}

impl Extension for Auth {
    fn resolve(&self, scope: &Scope<'_>, arg: &str) -> Result<Option<String>> {
        let (name, field) = match arg.split_once('.') {
            Some((name, field)) => (name, Some(field)),
            None => (arg, None),
        };
        let Some(descriptor) = Self::descriptor(scope, name) else {
            debug!(stack = scope.stack, auth = name, "auth not found");
            return Ok(None);
        };

        let config = &descriptor.config;
        let value = match field {
            None => config.credentials_value(),
            Some("projectId") => config.project_id_value(),
            Some(field) => config.field(field),
        };
        Ok(value)
    }
}

/// `${secret:NAME}`: shared secret values.
///
/// Looks in the current stack first, then in the stack it inherits from.
#[derive(Debug, Clone, Copy, Default)]
pub struct Secret;

impl Extension for Secret {
    fn resolve(&self, scope: &Scope<'_>, arg: &str) -> Result<Option<String>> {
        Ok(scope
            .current()
            .and_then(|s| s.secrets.values.get(arg))
            .or_else(|| scope.parent().and_then(|s| s.secrets.values.get(arg)))
            .cloned())
    }

    fn nested(&self) -> bool {
        true
    }
}

/// `${var:name}`: stack-local variables from `server.yaml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Var;

impl Extension for Var {
    fn resolve(&self, scope: &Scope<'_>, arg: &str) -> Result<Option<String>> {
        Ok(scope
            .current()
            .and_then(|s| s.server.variables.get(arg))
            .map(|v| v.value.clone()))
    }

    fn nested(&self) -> bool {
        true
    }
}

/// `${stack:name}` or `${stack:parent}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StackName;

impl Extension for StackName {
    fn resolve(&self, scope: &Scope<'_>, arg: &str) -> Result<Option<String>> {
        match arg {
            "" | "name" => Ok(Some(scope.stack.to_string())),
            "parent" => Ok(scope.lineage.get(scope.stack).cloned()),
            other => Err(scope.unresolved("stack", other, "unknown stack property")),
        }
    }
}

/// `${user:home|username|uid}`: the OS user running the tool.
#[derive(Debug, Clone, Copy, Default)]
pub struct User;

impl Extension for User {
    fn resolve(&self, scope: &Scope<'_>, arg: &str) -> Result<Option<String>> {
        match arg {
            "home" => Ok(dirs::home_dir().map(|p| p.display().to_string())),
            "username" => Ok(Some(whoami::username())),
            "uid" => Ok(uid()),
            other => Err(scope.unresolved("user", other, "unknown user property")),
        }
    }
}

#[cfg(unix)]
fn uid() -> Option<String> {
    Some(nix::unistd::getuid().as_raw().to_string())
}

#[cfg(not(unix))]
fn uid() -> Option<String> {
    None
}
