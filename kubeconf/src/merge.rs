//! Combining kubeconfigs and moving the current-context pointer.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use crate::clean::{ClusterSpec, KubeConfig};
use crate::error::{ConfigError, Result};

fn absorb<V: Clone>(section: &str, into: &mut BTreeMap<String, V>, from: &BTreeMap<String, V>) {
    for (name, value) in from {
        if into.insert(name.clone(), value.clone()).is_some() {
            warn!(section, name = %name, "later kubeconfig overrides entry");
        }
    }
}

/// Combine `configs` into a new document.
///
/// Clusters, users and contexts are copied in order, so the last document
/// defining a name wins. The current context is taken from the first
/// document that sets one. References are not checked, see [`merge_strict`].
pub fn merge(configs: &[KubeConfig]) -> KubeConfig {
    let mut merged = KubeConfig::default();

    for kc in configs {
        absorb("cluster", &mut merged.clusters, &kc.clusters);
        absorb("user", &mut merged.users, &kc.users);
        absorb("context", &mut merged.contexts, &kc.contexts);
    }

    if let Some(kc) = configs.iter().find(|kc| !kc.current_context.is_empty()) {
        merged.current_context = kc.current_context.clone();
    }

    debug!(
        sources = configs.len(),
        clusters = merged.clusters.len(),
        users = merged.users.len(),
        contexts = merged.contexts.len(),
        current_context = %merged.current_context,
        "merged kubeconfigs"
    );

    merged
}

/// [`merge`], then reject the result if anything in it dangles.
pub fn merge_strict(configs: &[KubeConfig]) -> Result<KubeConfig> {
    let merged = merge(configs);
    merged.validate()?;
    Ok(merged)
}

/// One row of the context listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextOverview<'a> {
    pub name: &'a str,
    pub cluster: &'a str,
    pub server: &'a str,
    pub user: &'a str,
    pub namespace: Option<&'a str>,
    pub current: bool,
}

impl KubeConfig {
    /// Check that every non-empty context reference, and the current context
    /// itself, names an entry in this document.
    pub fn validate(&self) -> Result<()> {
        for (name, ctx) in &self.contexts {
            if !ctx.cluster.is_empty() && !self.clusters.contains_key(&ctx.cluster) {
                return Err(ConfigError::ClusterNotFound {
                    context: name.clone(),
                    cluster: ctx.cluster.clone(),
                });
            }
            if !ctx.user.is_empty() && !self.users.contains_key(&ctx.user) {
                return Err(ConfigError::CredentialNotFound {
                    context: name.clone(),
                    user: ctx.user.clone(),
                });
            }
        }

        if !self.current_context.is_empty() && !self.contexts.contains_key(&self.current_context)
        {
            return Err(ConfigError::DanglingContext {
                name: self.current_context.clone(),
            });
        }

        Ok(())
    }

    /// The name of the active context.
    pub fn current_context_name(&self) -> Result<&str> {
        if self.current_context.is_empty() {
            return Err(ConfigError::NoCurrentContext);
        }
        if !self.contexts.contains_key(&self.current_context) {
            return Err(ConfigError::DanglingContext {
                name: self.current_context.clone(),
            });
        }
        Ok(&self.current_context)
    }

    /// The name of the cluster the active context points at. The cluster
    /// itself need not be defined, see [`KubeConfig::current_cluster`].
    pub fn current_cluster_name(&self) -> Result<&str> {
        let name = self.current_context_name()?;
        Ok(&self.contexts[name].cluster)
    }

    pub fn current_cluster(&self) -> Result<(&str, &ClusterSpec)> {
        let context = self.current_context_name()?;
        let cluster = self.current_cluster_name()?;
        match self.clusters.get_key_value(cluster) {
            Some((name, spec)) => Ok((name.as_str(), spec)),
            None => Err(ConfigError::ClusterNotFound {
                context: context.to_owned(),
                cluster: cluster.to_owned(),
            }),
        }
    }

    /// A copy of this document with `target` as the current context.
    pub fn switch_context(&self, target: &str) -> Result<KubeConfig> {
        if !self.contexts.contains_key(target) {
            return Err(ConfigError::UnknownContext {
                name: target.to_owned(),
            });
        }

        info!(from = %self.current_context, to = target, "switching context");

        Ok(KubeConfig {
            current_context: target.to_owned(),
            ..self.clone()
        })
    }

    pub fn context_names(&self) -> BTreeSet<&str> {
        self.contexts.keys().map(String::as_str).collect()
    }

    /// Every context with the server of the cluster it points at, in name
    /// order.
    pub fn describe_contexts(&self) -> Result<Vec<ContextOverview<'_>>> {
        let mut rows = Vec::with_capacity(self.contexts.len());
        for (name, ctx) in &self.contexts {
            let cluster = self.clusters.get(&ctx.cluster).ok_or_else(|| {
                ConfigError::ClusterNotFound {
                    context: name.clone(),
                    cluster: ctx.cluster.clone(),
                }
            })?;
            rows.push(ContextOverview {
                name: name.as_str(),
                cluster: ctx.cluster.as_str(),
                server: cluster.server.as_str(),
                user: ctx.user.as_str(),
                namespace: ctx.namespace.as_deref(),
                current: *name == self.current_context,
            });
        }
        Ok(rows)
    }
}
