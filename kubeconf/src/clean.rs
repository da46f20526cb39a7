use std::collections::BTreeMap;

use serde_yaml::Value as YamlValue;

use crate::direct;
pub use crate::direct::{ApiVersion, ClusterSpec, ContextSpec, Extra, Kind, UserSpec};
use crate::error::SchemaViolation;

/// A kubeconfig with every section keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KubeConfig {
    pub kind: Kind,
    pub api_version: ApiVersion,
    pub preferences: Option<YamlValue>,
    pub clusters: BTreeMap<String, ClusterSpec>,
    pub users: BTreeMap<String, UserSpec>,
    pub contexts: BTreeMap<String, ContextSpec>,
    /// Empty when no context is active.
    pub current_context: String,
    pub extra: Extra,
}

fn check_field(
    field: &'static str,
    found: Option<String>,
    expected: &'static str,
) -> Result<(), SchemaViolation> {
    match found {
        None => Err(SchemaViolation::Missing(field)),
        Some(found) if found == expected => Ok(()),
        Some(found) => Err(SchemaViolation::Unexpected {
            field,
            found,
            expected,
        }),
    }
}

fn keyed<T, S>(
    section: &'static str,
    entries: Option<Vec<T>>,
    split: impl Fn(T) -> (String, S),
) -> Result<BTreeMap<String, S>, SchemaViolation> {
    let mut map = BTreeMap::new();
    for entry in entries.unwrap_or_default() {
        let (name, spec) = split(entry);
        if map.contains_key(&name) {
            return Err(SchemaViolation::Duplicate { section, name });
        }
        map.insert(name, spec);
    }
    Ok(map)
}

impl TryFrom<direct::KubeConfig> for KubeConfig {
    type Error = SchemaViolation;

    fn try_from(kc: direct::KubeConfig) -> Result<Self, Self::Error> {
        check_field("kind", kc.kind, Kind::Config.as_str())?;
        check_field("apiVersion", kc.api_version, ApiVersion::V1.as_str())?;

        Ok(Self {
            kind: Kind::Config,
            api_version: ApiVersion::V1,
            preferences: kc.preferences,
            clusters: keyed("cluster", kc.clusters, |cls| (cls.name, cls.cluster))?,
            users: keyed("user", kc.users, |usr| (usr.name, usr.user))?,
            contexts: keyed("context", kc.contexts, |ctx| (ctx.name, ctx.context))?,
            current_context: kc.current_context.unwrap_or_default(),
            extra: kc.extra,
        })
    }
}

impl From<KubeConfig> for direct::KubeConfig {
    fn from(kc: KubeConfig) -> Self {
        direct::KubeConfig {
            kind: Some(kc.kind.as_str().to_owned()),
            api_version: Some(kc.api_version.as_str().to_owned()),
            preferences: kc.preferences,
            current_context: Some(kc.current_context),

            clusters: Some(
                kc.clusters
                    .into_iter()
                    .map(|(name, cluster)| direct::Cluster { name, cluster })
                    .collect(),
            ),
            contexts: Some(
                kc.contexts
                    .into_iter()
                    .map(|(name, context)| direct::Context { name, context })
                    .collect(),
            ),
            users: Some(
                kc.users
                    .into_iter()
                    .map(|(name, user)| direct::User { name, user })
                    .collect(),
            ),
            extra: kc.extra,
        }
    }
}
