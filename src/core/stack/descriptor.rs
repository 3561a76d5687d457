//! Stack descriptor files.
//!
//! Each stack directory holds up to three YAML files: `server.yaml` (what to
//! provision), `secrets.yaml` (credentials and shared secret values) and
//! `client.yaml` (how applications deploy onto parent stacks).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::config::{ConfigRegistry, ProviderConfig};
use crate::error::Result;

/// A descriptor entry that is either typed locally or inherited.
///
/// Used for provisioner, secrets provider, CI/CD, templates, registrar,
/// resources and auth entries, which share this shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypedDescriptor {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "ProviderConfig::is_empty")]
    pub config: ProviderConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherit: Option<String>,
}

pub type ProvisionerDescriptor = TypedDescriptor;
pub type SecretsConfigDescriptor = TypedDescriptor;
pub type CiCdDescriptor = TypedDescriptor;
pub type TemplateDescriptor = TypedDescriptor;
pub type RegistrarDescriptor = TypedDescriptor;
pub type ResourceDescriptor = TypedDescriptor;
pub type AuthDescriptor = TypedDescriptor;

impl TypedDescriptor {
    /// Locally typed descriptor.
    pub fn typed(kind: impl Into<String>, config: ProviderConfig) -> Self {
        Self {
            kind: Some(kind.into()),
            config,
            inherit: None,
        }
    }

    /// Descriptor that takes its value from `parent`.
    pub fn inherited(parent: impl Into<String>) -> Self {
        Self {
            inherit: Some(parent.into()),
            ..Self::default()
        }
    }
}

/// `server.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    #[serde(default)]
    pub provisioner: ProvisionerDescriptor,
    #[serde(default)]
    pub secrets: SecretsConfigDescriptor,
    #[serde(default)]
    pub cicd: CiCdDescriptor,
    #[serde(default)]
    pub templates: BTreeMap<String, TemplateDescriptor>,
    #[serde(default)]
    pub resources: PerStackResourcesDescriptor,
    #[serde(default)]
    pub variables: BTreeMap<String, VariableDescriptor>,
}

/// Resources section of `server.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerStackResourcesDescriptor {
    #[serde(default)]
    pub registrar: RegistrarDescriptor,
    /// Environment name to its resources.
    #[serde(default)]
    pub resources: BTreeMap<String, PerEnvResourcesDescriptor>,
}

/// Resources of one environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerEnvResourcesDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherit: Option<String>,
}

/// Stack-local variable, read by `${var:name}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableDescriptor {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub value: String,
}

/// `secrets.yaml` of a stack.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretsDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    #[serde(default)]
    pub auth: BTreeMap<String, AuthDescriptor>,
    #[serde(default)]
    pub values: BTreeMap<String, String>,
    /// Take the whole descriptor from another stack.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherit: Option<String>,
}

/// `client.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    /// Environment name to deployment.
    #[serde(default)]
    pub stacks: BTreeMap<String, StackClientDescriptor>,
}

/// One client deployment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackClientDescriptor {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_env: Option<String>,
    #[serde(default, skip_serializing_if = "ProviderConfig::is_empty")]
    pub config: ProviderConfig,
}

impl ServerDescriptor {
    /// Decode every typed config block with `registry`.
    pub fn decode_configs(&mut self, stack: &str, registry: &ConfigRegistry) -> Result<()> {
        decode(registry, stack, "provisioner", &mut self.provisioner)?;
        decode(registry, stack, "secrets", &mut self.secrets)?;
        decode(registry, stack, "cicd", &mut self.cicd)?;
        for (name, template) in &mut self.templates {
            decode(registry, stack, &format!("templates.{}", name), template)?;
        }
        decode(registry, stack, "registrar", &mut self.resources.registrar)?;
        for (env, per_env) in &mut self.resources.resources {
            for (name, resource) in &mut per_env.resources {
                decode(registry, stack, &format!("resources.{}.{}", env, name), resource)?;
            }
        }
        Ok(())
    }
}

impl SecretsDescriptor {
    pub fn decode_configs(&mut self, stack: &str, registry: &ConfigRegistry) -> Result<()> {
        for (name, auth) in &mut self.auth {
            decode(registry, stack, &format!("auth.{}", name), auth)?;
        }
        Ok(())
    }
}

impl ClientDescriptor {
    pub fn decode_configs(&mut self, stack: &str, registry: &ConfigRegistry) -> Result<()> {
        for (env, client) in &mut self.stacks {
            registry.decode(
                stack,
                &format!("stacks.{}", env),
                client.kind.as_deref(),
                &mut client.config,
            )?;
        }
        Ok(())
    }
}

fn decode(
    registry: &ConfigRegistry,
    stack: &str,
    field: &str,
    descriptor: &mut TypedDescriptor,
) -> Result<()> {
    registry.decode(stack, field, descriptor.kind.as_deref(), &mut descriptor.config)
}
