use std::io::Error as IoError;
use std::path::PathBuf;

use serde_yaml::Error as SerdeYamlError;
use thiserror::Error;

/// A well-formed YAML document that is not a kubeconfig.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SchemaViolation {
    #[error("missing `{0}`")]
    Missing(&'static str),
    #[error("unexpected {field} `{found}`, expected `{expected}`")]
    Unexpected {
        field: &'static str,
        found: String,
        expected: &'static str,
    },
    #[error("duplicate {section} entry `{name}`")]
    Duplicate { section: &'static str, name: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("kubeconfig not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read kubeconfig: {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: IoError,
    },

    #[error("failed to parse kubeconfig: {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: SerdeYamlError,
    },

    #[error("invalid kubeconfig {}: {source}", path.display())]
    Schema {
        path: PathBuf,
        #[source]
        source: SchemaViolation,
    },

    #[error("failed to serialize kubeconfig for {}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: SerdeYamlError,
    },

    #[error("failed to write kubeconfig: {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: IoError,
    },

    #[error("no current context set in kubeconfig")]
    NoCurrentContext,

    #[error("current context `{name}` is not defined in kubeconfig")]
    DanglingContext { name: String },

    #[error("context `{name}` does not exist in kubeconfig")]
    UnknownContext { name: String },

    #[error("context `{context}` refers to unknown cluster `{cluster}`")]
    ClusterNotFound { context: String, cluster: String },

    #[error("context `{context}` refers to unknown user `{user}`")]
    CredentialNotFound { context: String, user: String },

    #[error("failed to resolve home directory")]
    HomeDirectoryNotFound,

    #[error("failed to scan for kubeconfig files in {}", path.display())]
    Discover {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
