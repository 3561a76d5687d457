//! Walking every string leaf of a descriptor tree.

use std::collections::BTreeMap;

use serde_yaml::Value;

use crate::core::stack::{
    ClientDescriptor, PerEnvResourcesDescriptor, PerStackResourcesDescriptor, ProviderConfig,
    SecretsDescriptor, ServerDescriptor, Stack, StackClientDescriptor, TypedDescriptor,
    VariableDescriptor,
};
use crate::error::Result;

/// Callback applied to each string leaf.
pub type Leaf<'a> = dyn FnMut(&mut String) -> Result<()> + 'a;

/// A value whose string leaves can be rewritten in place.
///
/// Map keys, `type` tags and `inherit` markers are structure, not content,
/// and are never visited.
pub trait Visit {
    fn visit(&mut self, f: &mut Leaf<'_>) -> Result<()>;
}

impl Visit for String {
    fn visit(&mut self, f: &mut Leaf<'_>) -> Result<()> {
        f(self)
    }
}

impl<T: Visit> Visit for Option<T> {
    fn visit(&mut self, f: &mut Leaf<'_>) -> Result<()> {
        match self {
            Some(v) => v.visit(f),
            None => Ok(()),
        }
    }
}

impl<T: Visit> Visit for Vec<T> {
    fn visit(&mut self, f: &mut Leaf<'_>) -> Result<()> {
        self.iter_mut().try_for_each(|v| v.visit(f))
    }
}

impl<K: Ord, V: Visit> Visit for BTreeMap<K, V> {
    fn visit(&mut self, f: &mut Leaf<'_>) -> Result<()> {
        self.values_mut().try_for_each(|v| v.visit(f))
    }
}

impl Visit for Value {
    fn visit(&mut self, f: &mut Leaf<'_>) -> Result<()> {
        match self {
            Value::String(s) => f(s),
            Value::Sequence(seq) => seq.iter_mut().try_for_each(|v| v.visit(f)),
            Value::Mapping(map) => map.iter_mut().try_for_each(|(_, v)| v.visit(f)),
            Value::Tagged(tagged) => tagged.value.visit(f),
            Value::Null | Value::Bool(_) | Value::Number(_) => Ok(()),
        }
    }
}

impl Visit for ProviderConfig {
    fn visit(&mut self, f: &mut Leaf<'_>) -> Result<()> {
        match self {
            ProviderConfig::Empty => Ok(()),
            ProviderConfig::Raw(v) | ProviderConfig::Opaque(v) => v.visit(f),
            ProviderConfig::GcpServiceAccount(c) => {
                f(&mut c.project_id)?;
                f(&mut c.credentials)
            }
            ProviderConfig::AwsToken(c) => {
                f(&mut c.account)?;
                f(&mut c.access_key)?;
                f(&mut c.secret_access_key)?;
                f(&mut c.region)
            }
            ProviderConfig::Kubernetes(c) => f(&mut c.kubeconfig),
        }
    }
}

impl Visit for TypedDescriptor {
    fn visit(&mut self, f: &mut Leaf<'_>) -> Result<()> {
        self.config.visit(f)
    }
}

impl Visit for PerEnvResourcesDescriptor {
    fn visit(&mut self, f: &mut Leaf<'_>) -> Result<()> {
        self.template.visit(f)?;
        self.resources.visit(f)
    }
}

impl Visit for PerStackResourcesDescriptor {
    fn visit(&mut self, f: &mut Leaf<'_>) -> Result<()> {
        self.registrar.visit(f)?;
        self.resources.visit(f)
    }
}

impl Visit for VariableDescriptor {
    fn visit(&mut self, f: &mut Leaf<'_>) -> Result<()> {
        f(&mut self.value)
    }
}

impl Visit for ServerDescriptor {
    fn visit(&mut self, f: &mut Leaf<'_>) -> Result<()> {
        self.provisioner.visit(f)?;
        self.secrets.visit(f)?;
        self.cicd.visit(f)?;
        self.templates.visit(f)?;
        self.resources.visit(f)?;
        self.variables.visit(f)
    }
}

impl Visit for SecretsDescriptor {
    fn visit(&mut self, f: &mut Leaf<'_>) -> Result<()> {
        self.auth.visit(f)?;
        self.values.visit(f)
    }
}

impl Visit for StackClientDescriptor {
    fn visit(&mut self, f: &mut Leaf<'_>) -> Result<()> {
        self.parent.visit(f)?;
        self.parent_env.visit(f)?;
        self.config.visit(f)
    }
}

impl Visit for ClientDescriptor {
    fn visit(&mut self, f: &mut Leaf<'_>) -> Result<()> {
        self.stacks.visit(f)
    }
}

impl Visit for Stack {
    fn visit(&mut self, f: &mut Leaf<'_>) -> Result<()> {
        self.secrets.visit(f)?;
        self.server.visit(f)?;
        self.client.visit(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, PlaceholderError};

    #[test]
    fn test_visits_nested_yaml_strings_only() {
        let mut value: Value =
            serde_yaml::from_str("a: x\nb: [y, 1, true]\nc:\n  d: z\n").unwrap();
        let mut seen = Vec::new();

        value
            .visit(&mut |s: &mut String| {
                seen.push(s.clone());
                s.make_ascii_uppercase();
                Ok(())
            })
            .unwrap();

        seen.sort();
        assert_eq!(seen, vec!["x", "y", "z"]);
        assert_eq!(value["c"]["d"], Value::String("Z".to_string()));
        assert_eq!(value["b"][1], Value::Number(1.into()));
    }

    #[test]
    fn test_structure_fields_untouched() {
        let mut descriptor = TypedDescriptor {
            kind: Some("pulumi".to_string()),
            config: ProviderConfig::Opaque(serde_yaml::from_str("org: acme").unwrap()),
            inherit: Some("base".to_string()),
        };

        descriptor
            .visit(&mut |s: &mut String| {
                *s = "changed".to_string();
                Ok(())
            })
            .unwrap();

        assert_eq!(descriptor.kind.as_deref(), Some("pulumi"));
        assert_eq!(descriptor.inherit.as_deref(), Some("base"));
        assert_eq!(descriptor.config.field("org").as_deref(), Some("changed"));
    }

    #[test]
    fn test_error_stops_walk() {
        let mut values = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let mut count = 0;

        let result = values.visit(&mut |s: &mut String| {
            count += 1;
            if s == "b" {
                return Err(PlaceholderError::TooDeep {
                    stack: "s".to_string(),
                    token: s.clone(),
                }
                .into());
            }
            Ok(())
        });

        assert!(matches!(result, Err(Error::Placeholder(_))));
        assert_eq!(count, 2);
    }
}
