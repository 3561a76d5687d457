//! Provider configs selected by a `type` tag.
//!
//! Descriptors carry a free-form `config` block whose schema depends on the
//! descriptor's `type`. [`ConfigRegistry`] maps each tag to a decoder and is
//! applied once when descriptors are loaded, turning the raw YAML into a
//! [`ProviderConfig`] variant.

use std::collections::BTreeMap;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::{Result, StackError};

/// Decoded `config` block of a typed descriptor.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ProviderConfig {
    /// No `config` block.
    #[default]
    Empty,
    /// As read from disk, not yet decoded.
    Raw(Value),
    GcpServiceAccount(GcpServiceAccountConfig),
    AwsToken(AwsTokenConfig),
    Kubernetes(KubernetesConfig),
    /// Known tag without a typed schema; kept as YAML.
    Opaque(Value),
}

/// `gcp-service-account` auth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcpServiceAccountConfig {
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub credentials: String,
}

/// `aws-token` auth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsTokenConfig {
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub secret_access_key: String,
    #[serde(default)]
    pub region: String,
}

/// `kubernetes` auth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesConfig {
    #[serde(default)]
    pub kubeconfig: String,
}

impl ProviderConfig {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Credential string handed to the provider.
    ///
    /// AWS credentials are rendered as a JSON document.
    pub fn credentials_value(&self) -> Option<String> {
        match self {
            Self::GcpServiceAccount(c) => Some(c.credentials.clone()),
            Self::AwsToken(c) => serde_json::to_string(c).ok(),
            Self::Kubernetes(c) => Some(c.kubeconfig.clone()),
            Self::Raw(_) | Self::Opaque(_) => self.field("credentials"),
            Self::Empty => None,
        }
    }

    /// Project (GCP) or account (AWS) the credentials belong to.
    pub fn project_id_value(&self) -> Option<String> {
        match self {
            Self::GcpServiceAccount(c) => Some(c.project_id.clone()),
            Self::AwsToken(c) => Some(c.account.clone()),
            _ => self.field("projectId"),
        }
    }

    /// Scalar field of the config by its YAML name.
    pub fn field(&self, name: &str) -> Option<String> {
        let value = serde_yaml::to_value(self).ok()?;
        match value.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl Serialize for ProviderConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Empty => serializer.serialize_none(),
            Self::Raw(v) | Self::Opaque(v) => v.serialize(serializer),
            Self::GcpServiceAccount(c) => c.serialize(serializer),
            Self::AwsToken(c) => c.serialize(serializer),
            Self::Kubernetes(c) => c.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ProviderConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(if value.is_null() {
            Self::Empty
        } else {
            Self::Raw(value)
        })
    }
}

/// Turns a raw config block into its typed form.
pub type Decoder = fn(Value) -> std::result::Result<ProviderConfig, serde_yaml::Error>;

fn decode_gcp_service_account(value: Value) -> std::result::Result<ProviderConfig, serde_yaml::Error> {
    Ok(ProviderConfig::GcpServiceAccount(serde_yaml::from_value(value)?))
}

fn decode_aws_token(value: Value) -> std::result::Result<ProviderConfig, serde_yaml::Error> {
    Ok(ProviderConfig::AwsToken(serde_yaml::from_value(value)?))
}

fn decode_kubernetes(value: Value) -> std::result::Result<ProviderConfig, serde_yaml::Error> {
    Ok(ProviderConfig::Kubernetes(serde_yaml::from_value(value)?))
}

fn decode_opaque(value: Value) -> std::result::Result<ProviderConfig, serde_yaml::Error> {
    Ok(ProviderConfig::Opaque(value))
}

const OPAQUE_TAGS: &[&str] = &[
    // provisioners and secrets providers
    "pulumi",
    "fs-passphrase",
    "gcp-secrets-manager",
    "aws-secrets-manager",
    // ci/cd and registrars
    "github-actions",
    "cloudflare",
    // deployment templates
    "cloudrun",
    "ecs-fargate",
    "aws-lambda",
    "static-website",
    "gcp-static-website",
    "kubernetes-cloudrun",
    // resources
    "gcp-bucket",
    "gcp-cloudsql-postgres",
    "gcp-redis",
    "gcp-pubsub",
    "s3-bucket",
    "aws-rds-postgres",
    "aws-rds-mysql",
    "mongodb-atlas",
    "kubernetes-helm-postgres-operator",
    "kubernetes-helm-redis-operator",
    "kubernetes-helm-rabbitmq-operator",
    // client stacks
    "cloud-compose",
    "single-image",
    "static",
];

/// Table of supported `type` tags.
#[derive(Debug, Clone)]
pub struct ConfigRegistry {
    decoders: BTreeMap<String, Decoder>,
}

impl Default for ConfigRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register("gcp-service-account", decode_gcp_service_account)
            .register("aws-token", decode_aws_token)
            .register("kubernetes", decode_kubernetes);
        for tag in OPAQUE_TAGS {
            registry.register_opaque(*tag);
        }
        registry
    }
}

impl ConfigRegistry {
    /// Registry that knows no tags.
    pub fn empty() -> Self {
        Self {
            decoders: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, tag: impl Into<String>, decoder: Decoder) -> &mut Self {
        self.decoders.insert(tag.into(), decoder);
        self
    }

    /// Accept a tag and keep its config as plain YAML.
    pub fn register_opaque(&mut self, tag: impl Into<String>) -> &mut Self {
        self.register(tag, decode_opaque)
    }

    pub fn is_known(&self, tag: &str) -> bool {
        self.decoders.contains_key(tag)
    }

    /// Decode `config` in place according to `kind`.
    ///
    /// Descriptors without a `type` (inherited ones) must not carry a config.
    ///
    /// # Errors
    ///
    /// `StackError::UnsupportedType` for unknown tags and
    /// `StackError::InvalidConfig` when the block does not match the schema.
    pub fn decode(
        &self,
        stack: &str,
        field: &str,
        kind: Option<&str>,
        config: &mut ProviderConfig,
    ) -> Result<()> {
        let Some(kind) = kind else {
            return match config {
                ProviderConfig::Raw(_) => Err(StackError::InvalidConfig {
                    stack: stack.to_string(),
                    field: field.to_string(),
                    reason: "config given without a type".to_string(),
                }
                .into()),
                _ => Ok(()),
            };
        };

        let decoder = self
            .decoders
            .get(kind)
            .ok_or_else(|| StackError::UnsupportedType {
                stack: stack.to_string(),
                field: field.to_string(),
                kind: kind.to_string(),
            })?;

        if let ProviderConfig::Raw(value) = config {
            let value = std::mem::replace(value, Value::Null);
            *config = decoder(value).map_err(|e| StackError::InvalidConfig {
                stack: stack.to_string(),
                field: field.to_string(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }
}
