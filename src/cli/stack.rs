//! Stack commands.

use std::sync::Arc;

use tracing::debug;

use crate::cli::{context, output};
use crate::core::placeholders::Resolver;
use crate::core::stack::StackReader;
use crate::error::{Result, StackError};

/// List stack names.
pub fn list(json: bool) -> Result<()> {
    let repo = context::open_repo()?;
    let names = StackReader::new(repo).list()?;

    if json {
        let result = serde_json::json!({
            "stacks": names,
            "count": names.len()
        });
        output::data(&serde_json::to_string_pretty(&result)?);
    } else if names.is_empty() {
        output::dimmed("no stacks found");
    } else {
        output::blank();
        output::header(&format!("{} stacks", names.len()));
        output::rule();
        for name in &names {
            output::list_item(name);
        }
    }
    Ok(())
}

/// Print one stack with inheritance and placeholders resolved.
///
/// Every stack is loaded because any of them may be a parent.
pub fn resolve(profile: &str, name: &str, json: bool) -> Result<()> {
    let repo = context::open_repo()?;
    let mut reader = StackReader::new(Arc::clone(&repo));
    if let Some(cryptor) = context::try_open_cryptor(&repo, profile)? {
        reader = reader.with_cryptor(cryptor);
    }

    let mut stacks = reader.read_all()?;
    if !stacks.contains_key(name) {
        return Err(StackError::NotFound(name.to_string()).into());
    }
    debug!(stacks = stacks.len(), "resolving");

    Resolver::new().with_repo(repo).resolve(&mut stacks)?;
    let stack = stacks
        .remove(name)
        .ok_or_else(|| StackError::NotFound(name.to_string()))?;

    if json {
        output::data(&serde_json::to_string_pretty(&stack)?);
    } else {
        output::data(serde_yaml::to_string(&stack)?.trim_end());
    }
    Ok(())
}
