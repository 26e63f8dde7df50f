//! Per-component metadata and source files.

use camino::Utf8PathBuf;
use indexmap::IndexMap;
use serde::Deserialize;
use smol_str::SmolStr;

use crate::node::{AElement, ANode};
use crate::value::ConstValue;

/// Id of a module's default export.
pub const DEFAULT_ID: &str = "default";

/// A reference from a template tag to the component that renders it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ComponentReference {
    /// Module specifier, `"."` for the file being compiled.
    pub specifier: String,
    /// Component id inside that module.
    pub id: String,
}

impl ComponentReference {
    pub fn new(specifier: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            specifier: specifier.into(),
            id: id.into(),
        }
    }

    /// A reference to another component of the same file.
    pub fn local(id: impl Into<String>) -> Self {
        Self::new(".", id)
    }

    pub fn is_local(&self) -> bool {
        self.specifier == "."
    }

    pub fn is_default(&self) -> bool {
        self.id == DEFAULT_ID
    }
}

/// Initial data of a component.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InitData {
    /// Defaults computed at compile time.
    Static(IndexMap<String, ConstValue>),
    /// Defaults only known by running `initData()` at render time.
    Dynamic,
}

/// Everything the code generator needs to know about one component.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInfo {
    pub id: String,
    /// Id in the runtime component registry.
    #[serde(default)]
    pub cid: u32,
    /// Fully qualified PHP class of the component methods.
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub root: Option<ANode>,
    #[serde(default)]
    pub computed_names: Vec<SmolStr>,
    #[serde(default)]
    pub filter_names: Vec<SmolStr>,
    /// Tag name to referenced component.
    #[serde(default)]
    pub child_components: IndexMap<SmolStr, ComponentReference>,
    #[serde(default)]
    pub init_data: Option<InitData>,
    /// Declares an `inited` hook.
    #[serde(default)]
    pub has_inited: bool,
}

impl ComponentInfo {
    pub fn new(id: impl Into<String>, cid: u32) -> Self {
        Self {
            id: id.into(),
            cid,
            class_name: None,
            root: None,
            computed_names: Vec::new(),
            filter_names: Vec::new(),
            child_components: IndexMap::new(),
            init_data: None,
            has_inited: false,
        }
    }

    pub fn with_root(mut self, root: impl Into<ANode>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_child_component(mut self, tag: impl Into<SmolStr>, reference: ComponentReference) -> Self {
        self.child_components.insert(tag.into(), reference);
        self
    }

    pub fn is_default(&self) -> bool {
        self.id == DEFAULT_ID
    }

    /// The component a tag renders, if the tag is not a plain element.
    pub fn get_child_component_reference(&self, el: &AElement) -> Option<&ComponentReference> {
        if el.tag_name.is_empty() {
            return None;
        }
        self.child_components.get(&el.tag_name)
    }
}

/// A source file and the components it defines.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SanSourceFile {
    pub path: Utf8PathBuf,
    pub components: Vec<ComponentInfo>,
    /// Id of the entry component, [`DEFAULT_ID`] when omitted.
    #[serde(default)]
    pub entry: Option<String>,
}

impl SanSourceFile {
    pub fn new(path: impl Into<Utf8PathBuf>, components: Vec<ComponentInfo>) -> Self {
        Self {
            path: path.into(),
            components,
            entry: None,
        }
    }

    /// Load a file description from its JSON form.
    pub fn from_json(source: &str) -> serde_json::Result<Self> {
        serde_json::from_str(source)
    }

    pub fn component(&self, id: &str) -> Option<&ComponentInfo> {
        self.components.iter().find(|c| c.id == id)
    }

    /// The entry component: the declared entry, else the default export,
    /// else the first component.
    pub fn entry_component(&self) -> Option<&ComponentInfo> {
        let id = self.entry.as_deref().unwrap_or(DEFAULT_ID);
        self.component(id).or_else(|| self.components.first())
    }
}
