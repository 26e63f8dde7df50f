//! Compiler configuration.

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Options for PHP code generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileOptions {
    /// Name of the entry render function of each file.
    pub render_function_name: String,
    /// Namespace prefix shared by every generated file.
    pub ns_prefix: String,
    /// Directory mapped to `ns_prefix`. Required.
    pub ns_root_dir: Option<Utf8PathBuf>,
    /// Namespace of the runtime helpers, `<ns_prefix>runtime` when unset.
    pub import_helpers: Option<String>,
    /// Start the output with `<?php`.
    pub emit_header: bool,
    /// Leave out the markers used by client-side reconciliation.
    pub ssr_only: bool,
    /// Namespace overrides by module specifier.
    pub modules: IndexMap<String, ModuleInfo>,
}

/// How a module specifier maps to PHP.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModuleInfo {
    /// PHP namespace of the module, e.g. `\vendor\components\`.
    pub namespace: Option<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            render_function_name: "render".to_string(),
            ns_prefix: "san\\".to_string(),
            ns_root_dir: None,
            import_helpers: None,
            emit_header: true,
            ssr_only: false,
            modules: IndexMap::new(),
        }
    }
}

impl CompileOptions {
    /// Load options from a JSON file.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Set the project root.
    pub fn with_root(mut self, root: impl Into<Utf8PathBuf>) -> Self {
        self.ns_root_dir = Some(root.into());
        self
    }

    /// The namespace prefix with exactly one trailing separator, or empty.
    pub fn normalized_prefix(&self) -> String {
        let trimmed = self.ns_prefix.trim_matches('\\');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("{}\\", trimmed)
        }
    }

    /// Namespace of the runtime helpers, without surrounding separators.
    pub fn helpers_namespace(&self) -> String {
        match &self.import_helpers {
            Some(ns) => ns.trim_matches('\\').to_string(),
            None => format!("{}runtime", self.normalized_prefix()),
        }
    }

    /// The configured namespace for a module specifier, if any.
    pub fn module_namespace(&self, specifier: &str) -> Option<&str> {
        self.modules
            .get(specifier)
            .and_then(|m| m.namespace.as_deref())
            .filter(|ns| !ns.trim_matches('\\').is_empty())
    }
}
