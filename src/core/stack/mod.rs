//! Stacks and their descriptors.
//!
//! A stack is a directory `.sc/stacks/<name>/` with `server.yaml`,
//! `secrets.yaml` and `client.yaml`. [`StackReader`] loads them, decoding
//! typed configs through a [`ConfigRegistry`]; [`resolve_inheritance`]
//! replaces `inherit` markers with the parent stacks' values.

pub mod config;
pub mod descriptor;
mod inherit;
mod reader;

use std::collections::BTreeMap;

use serde::Serialize;

pub use config::{ConfigRegistry, ProviderConfig};
pub use descriptor::{
    ClientDescriptor, PerEnvResourcesDescriptor, PerStackResourcesDescriptor, SecretsDescriptor,
    ServerDescriptor, StackClientDescriptor, TypedDescriptor, VariableDescriptor,
};
pub use inherit::{lineage, resolve_inheritance, Inheritable};
pub use reader::StackReader;

/// A named deployment unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stack {
    pub name: String,
    pub secrets: SecretsDescriptor,
    pub server: ServerDescriptor,
    pub client: ClientDescriptor,
}

/// Stacks by name.
pub type StacksMap = BTreeMap<String, Stack>;

impl Stack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
