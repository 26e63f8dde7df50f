//! Template node trees (ANode).

use serde::Deserialize;
use smol_str::SmolStr;

use crate::error::AstError;
use crate::expr::{truthy, Expr};

/// A node in a component template.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawANode")]
pub enum ANode {
    /// A text node.
    Text(ATextNode),
    /// An element, structural or not.
    Element(AElement),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ATextNode {
    pub text_expr: Expr,
}

/// An element node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AElement {
    /// Tag name. Empty for a component root rendered with a caller-chosen tag.
    pub tag_name: SmolStr,
    /// Properties in declaration order.
    pub props: Vec<Prop>,
    pub directives: Directives,
    pub children: Vec<ANode>,
    /// The `elif`/`else` siblings of an `if` node.
    pub elses: Vec<AElement>,
    /// Scoped slot bindings, for `slot` elements.
    pub vars: Vec<SlotVar>,
}

/// A property, `name="value"` or `name="{{ expr }}"`.
#[derive(Debug, Clone, PartialEq)]
pub struct Prop {
    pub name: SmolStr,
    pub expr: Expr,
    /// The value must be escaped on output.
    pub x: bool,
}

/// Directives attached to an element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Directives {
    pub if_: Option<Expr>,
    pub elif: Option<Expr>,
    pub else_: bool,
    pub for_: Option<ForDirective>,
    /// Spread of an object into attributes or component data.
    pub bind: Option<Expr>,
    /// Raw HTML content.
    pub html: Option<Expr>,
}

/// `s-for="item, index in list"`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForDirective {
    pub item: SmolStr,
    pub index: Option<SmolStr>,
    pub value: Expr,
}

/// `var-name="expr"` on a slot element.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotVar {
    pub name: SmolStr,
    pub expr: Expr,
}

/// Structural classification of an element, by tag name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Slot,
    Template,
    Fragment,
    /// A plain tag or a child component.
    Tag,
}

impl ANode {
    pub fn text(text_expr: Expr) -> Self {
        Self::Text(ATextNode { text_expr })
    }

    pub fn as_element(&self) -> Option<&AElement> {
        match self {
            Self::Element(el) => Some(el),
            Self::Text(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

impl From<AElement> for ANode {
    fn from(el: AElement) -> Self {
        Self::Element(el)
    }
}

impl AElement {
    /// Create an element with no props or children.
    pub fn new(tag_name: impl Into<SmolStr>) -> Self {
        Self {
            tag_name: tag_name.into(),
            ..Default::default()
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self.tag_name.as_str() {
            "slot" => NodeKind::Slot,
            "template" => NodeKind::Template,
            "fragment" => NodeKind::Fragment,
            _ => NodeKind::Tag,
        }
    }

    /// Get a prop by name.
    pub fn prop(&self, name: &str) -> Option<&Prop> {
        self.props.iter().find(|p| p.name == name)
    }

    pub fn with_prop(mut self, name: impl Into<SmolStr>, expr: Expr) -> Self {
        self.props.push(Prop::new(name, expr));
        self
    }

    pub fn with_child(mut self, child: impl Into<ANode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_if(mut self, cond: Expr) -> Self {
        self.directives.if_ = Some(cond);
        self
    }

    pub fn with_elif(mut self, cond: Expr) -> Self {
        self.directives.elif = Some(cond);
        self
    }

    pub fn with_else(mut self) -> Self {
        self.directives.else_ = true;
        self
    }

    /// Append to the `elses` chain of an `if` element.
    pub fn with_else_branch(mut self, branch: AElement) -> Self {
        self.elses.push(branch);
        self
    }

    pub fn with_for(mut self, item: &str, index: Option<&str>, value: Expr) -> Self {
        self.directives.for_ = Some(ForDirective {
            item: item.into(),
            index: index.map(SmolStr::from),
            value,
        });
        self
    }

    pub fn with_bind(mut self, value: Expr) -> Self {
        self.directives.bind = Some(value);
        self
    }

    pub fn with_html(mut self, value: Expr) -> Self {
        self.directives.html = Some(value);
        self
    }

    pub fn with_var(mut self, name: impl Into<SmolStr>, expr: Expr) -> Self {
        self.vars.push(SlotVar {
            name: name.into(),
            expr,
        });
        self
    }
}

impl Prop {
    pub fn new(name: impl Into<SmolStr>, expr: Expr) -> Self {
        Self {
            name: name.into(),
            expr,
            x: false,
        }
    }

    /// Mark the value as requiring escaping.
    pub fn escaped(mut self) -> Self {
        self.x = true;
        self
    }
}

// Wire form.

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawANode {
    #[serde(default)]
    text_expr: Option<Expr>,
    #[serde(default)]
    tag_name: Option<SmolStr>,
    #[serde(default)]
    props: Vec<RawProp>,
    #[serde(default)]
    directives: RawDirectives,
    #[serde(default)]
    children: Vec<ANode>,
    #[serde(default)]
    elses: Vec<ANode>,
    #[serde(default)]
    vars: Vec<RawVar>,
}

#[derive(Deserialize)]
struct RawProp {
    name: SmolStr,
    expr: Expr,
    #[serde(default)]
    x: serde_json::Value,
}

#[derive(Deserialize)]
struct RawVar {
    name: SmolStr,
    expr: Expr,
}

#[derive(Deserialize, Default)]
struct RawDirectives {
    #[serde(default, rename = "if")]
    if_: Option<RawValueDirective>,
    #[serde(default)]
    elif: Option<RawValueDirective>,
    #[serde(default, rename = "else")]
    else_: Option<serde_json::Value>,
    #[serde(default, rename = "for")]
    for_: Option<RawForDirective>,
    #[serde(default)]
    bind: Option<RawValueDirective>,
    #[serde(default)]
    html: Option<RawValueDirective>,
}

#[derive(Deserialize)]
struct RawValueDirective {
    value: Expr,
}

#[derive(Deserialize)]
struct RawForDirective {
    item: SmolStr,
    #[serde(default)]
    index: Option<SmolStr>,
    value: Expr,
}

impl TryFrom<RawANode> for ANode {
    type Error = AstError;

    fn try_from(raw: RawANode) -> Result<Self, Self::Error> {
        if let Some(text_expr) = raw.text_expr {
            return Ok(Self::Text(ATextNode { text_expr }));
        }
        let directives = raw.directives;
        let elses = raw
            .elses
            .into_iter()
            .map(|node| match node {
                ANode::Element(el) => Ok(el),
                ANode::Text(_) => Err(AstError::invalid("element", "elses", "expected an element")),
            })
            .collect::<Result<_, _>>()?;

        Ok(Self::Element(AElement {
            tag_name: raw.tag_name.unwrap_or_default(),
            props: raw
                .props
                .into_iter()
                .map(|p| Prop {
                    name: p.name,
                    expr: p.expr,
                    x: truthy(&p.x),
                })
                .collect(),
            directives: Directives {
                if_: directives.if_.map(|d| d.value),
                elif: directives.elif.map(|d| d.value),
                else_: directives.else_.is_some(),
                for_: directives.for_.map(|d| ForDirective {
                    item: d.item,
                    index: d.index.filter(|i| !i.is_empty()),
                    value: d.value,
                }),
                bind: directives.bind.map(|d| d.value),
                html: directives.html.map(|d| d.value),
            },
            children: raw.children,
            elses,
            vars: raw
                .vars
                .into_iter()
                .map(|v| SlotVar {
                    name: v.name,
                    expr: v.expr,
                })
                .collect(),
        }))
    }
}
