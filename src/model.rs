//! Presentation content tree: slides ([`LayoutNode`]) holding a recursive
//! tree of [`ContentNode`]s.
//!
//! The wire format is the JSON the layout prompt asks the model for. Nodes are
//! deserialised through a raw mirror type and checked with `TryFrom`, so a
//! `ContentNode` held in memory always satisfies the tree invariants:
//!
//! - leaf types (`title`, `paragraph`, `image`, …) carry text content;
//! - container types (`column`, `resizable-column`) carry one or more nodes;
//! - a slide's root node is a `column`.
//!
//! The type and content of a node are private and can only change through
//! methods that keep those invariants.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::slice;
use thiserror::Error;
use uuid::Uuid;

/// Minimum number of outline points a valid outline carries.
pub const MIN_OUTLINES: usize = 6;

/// A violation of the content-tree schema.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("node '{id}' of leaf type '{content_type}' must have string content")]
    LeafWithChildren { id: String, content_type: ContentType },

    #[error("node '{id}' of container type '{content_type}' must contain nodes, not text")]
    ContainerWithText { id: String, content_type: ContentType },

    #[error("slide '{slide_id}' root must be a 'column', found '{found}'")]
    RootNotColumn { slide_id: String, found: ContentType },
}

// ── Enumerations ─────────────────────────────────────────────────────────

/// Whether a content type holds text or child nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Leaf,
    Container,
}

/// Closed set of content node types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentType {
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Title,
    Paragraph,
    Table,
    #[serde(rename = "resizable-column")]
    ResizableColumn,
    Image,
    Blockquote,
    NumberedList,
    BulletList,
    TodoList,
    CalloutBox,
    CodeBlock,
    TableOfContents,
    Divider,
    Column,
}

impl ContentType {
    /// Every content type, in the order the prompt lists them.
    pub const ALL: [ContentType; 18] = [
        ContentType::Heading1,
        ContentType::Heading2,
        ContentType::Heading3,
        ContentType::Heading4,
        ContentType::Title,
        ContentType::Paragraph,
        ContentType::Table,
        ContentType::ResizableColumn,
        ContentType::Image,
        ContentType::Blockquote,
        ContentType::NumberedList,
        ContentType::BulletList,
        ContentType::TodoList,
        ContentType::CalloutBox,
        ContentType::CodeBlock,
        ContentType::TableOfContents,
        ContentType::Divider,
        ContentType::Column,
    ];

    /// Wire name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Heading1 => "heading1",
            ContentType::Heading2 => "heading2",
            ContentType::Heading3 => "heading3",
            ContentType::Heading4 => "heading4",
            ContentType::Title => "title",
            ContentType::Paragraph => "paragraph",
            ContentType::Table => "table",
            ContentType::ResizableColumn => "resizable-column",
            ContentType::Image => "image",
            ContentType::Blockquote => "blockquote",
            ContentType::NumberedList => "numberedList",
            ContentType::BulletList => "bulletList",
            ContentType::TodoList => "todoList",
            ContentType::CalloutBox => "calloutBox",
            ContentType::CodeBlock => "codeBlock",
            ContentType::TableOfContents => "tableOfContents",
            ContentType::Divider => "divider",
            ContentType::Column => "column",
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            ContentType::Column | ContentType::ResizableColumn => NodeKind::Container,
            _ => NodeKind::Leaf,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of slide layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutType {
    AccentLeft,
    AccentRight,
    ImageAndText,
    TextAndImage,
    TwoColumns,
    TwoColumnsWithHeadings,
    ThreeColumns,
    ThreeColumnsWithHeadings,
    FourColumns,
    TwoImageColumns,
    ThreeImageColumns,
    FourImageColumns,
    TableLayout,
    #[serde(rename = "blank-card")]
    BlankCard,
}

impl LayoutType {
    pub const ALL: [LayoutType; 14] = [
        LayoutType::AccentLeft,
        LayoutType::AccentRight,
        LayoutType::ImageAndText,
        LayoutType::TextAndImage,
        LayoutType::TwoColumns,
        LayoutType::TwoColumnsWithHeadings,
        LayoutType::ThreeColumns,
        LayoutType::ThreeColumnsWithHeadings,
        LayoutType::FourColumns,
        LayoutType::TwoImageColumns,
        LayoutType::ThreeImageColumns,
        LayoutType::FourImageColumns,
        LayoutType::TableLayout,
        LayoutType::BlankCard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutType::AccentLeft => "accentLeft",
            LayoutType::AccentRight => "accentRight",
            LayoutType::ImageAndText => "imageAndText",
            LayoutType::TextAndImage => "textAndImage",
            LayoutType::TwoColumns => "twoColumns",
            LayoutType::TwoColumnsWithHeadings => "twoColumnsWithHeadings",
            LayoutType::ThreeColumns => "threeColumns",
            LayoutType::ThreeColumnsWithHeadings => "threeColumnsWithHeadings",
            LayoutType::FourColumns => "fourColumns",
            LayoutType::TwoImageColumns => "twoImageColumns",
            LayoutType::ThreeImageColumns => "threeImageColumns",
            LayoutType::FourImageColumns => "fourImageColumns",
            LayoutType::TableLayout => "tableLayout",
            LayoutType::BlankCard => "blank-card",
        }
    }
}

impl fmt::Display for LayoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Content nodes ────────────────────────────────────────────────────────

/// Polymorphic content of a node.
///
/// On the wire this is a bare string, an array of nodes or a single node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeContent {
    Text(String),
    Children(Vec<ContentNode>),
    Child(Box<ContentNode>),
}

impl Default for NodeContent {
    fn default() -> Self {
        NodeContent::Text(String::new())
    }
}

/// The recursive unit of a slide's content tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawContentNode", rename_all = "camelCase")]
pub struct ContentNode {
    pub id: String,
    #[serde(rename = "type")]
    content_type: ContentType,
    pub name: String,
    content: NodeContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContentNode {
    /// Missing ids are filled in by `walker::ensure_unique_ids`.
    #[serde(default)]
    id: String,
    #[serde(rename = "type")]
    content_type: ContentType,
    #[serde(default)]
    name: String,
    #[serde(default)]
    content: NodeContent,
    #[serde(default)]
    alt: Option<String>,
    #[serde(default)]
    placeholder: Option<String>,
    #[serde(default)]
    class_name: Option<String>,
}

impl TryFrom<RawContentNode> for ContentNode {
    type Error = SchemaError;

    fn try_from(raw: RawContentNode) -> Result<Self, Self::Error> {
        let node = ContentNode::new(raw.id, raw.content_type, raw.content)?;
        Ok(ContentNode {
            name: raw.name,
            alt: raw.alt,
            placeholder: raw.placeholder,
            class_name: raw.class_name,
            ..node
        })
    }
}

impl ContentNode {
    /// Build a node, checking that `content` fits the type's kind.
    pub fn new(
        id: impl Into<String>,
        content_type: ContentType,
        content: NodeContent,
    ) -> Result<Self, SchemaError> {
        let id = id.into();
        match (content_type.kind(), &content) {
            (NodeKind::Leaf, NodeContent::Children(_) | NodeContent::Child(_)) => {
                return Err(SchemaError::LeafWithChildren { id, content_type });
            }
            (NodeKind::Container, NodeContent::Text(_)) => {
                return Err(SchemaError::ContainerWithText { id, content_type });
            }
            _ => {}
        }
        Ok(ContentNode {
            id,
            content_type,
            name: content_type.as_str().to_string(),
            content,
            alt: None,
            placeholder: None,
            class_name: None,
        })
    }

    /// Build a leaf node holding `text`.
    pub fn leaf(
        id: impl Into<String>,
        content_type: ContentType,
        text: impl Into<String>,
    ) -> Result<Self, SchemaError> {
        Self::new(id, content_type, NodeContent::Text(text.into()))
    }

    /// Build a container node holding `children`.
    pub fn container(
        id: impl Into<String>,
        content_type: ContentType,
        children: Vec<ContentNode>,
    ) -> Result<Self, SchemaError> {
        Self::new(id, content_type, NodeContent::Children(children))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn kind(&self) -> NodeKind {
        self.content_type.kind()
    }

    pub fn content(&self) -> &NodeContent {
        &self.content
    }

    pub fn is_image(&self) -> bool {
        self.content_type == ContentType::Image
    }

    /// Text content of a leaf node; `None` for containers.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            NodeContent::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Replace the text of a leaf node.
    pub fn set_text(&mut self, text: impl Into<String>) -> Result<(), SchemaError> {
        if self.kind() == NodeKind::Container {
            return Err(SchemaError::ContainerWithText {
                id: self.id.clone(),
                content_type: self.content_type,
            });
        }
        self.content = NodeContent::Text(text.into());
        Ok(())
    }

    /// Direct children in document order (empty for leaves).
    pub fn children(&self) -> &[ContentNode] {
        match &self.content {
            NodeContent::Text(_) => &[],
            NodeContent::Children(nodes) => nodes,
            NodeContent::Child(node) => slice::from_ref(&**node),
        }
    }

    pub fn children_mut(&mut self) -> &mut [ContentNode] {
        match &mut self.content {
            NodeContent::Text(_) => &mut [],
            NodeContent::Children(nodes) => nodes,
            NodeContent::Child(node) => slice::from_mut(&mut **node),
        }
    }
}

// ── Slides ───────────────────────────────────────────────────────────────

/// One slide: a layout identifier plus its content tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLayoutNode", rename_all = "camelCase")]
pub struct LayoutNode {
    pub id: String,
    pub slide_name: String,
    #[serde(rename = "type")]
    pub layout_type: LayoutType,
    pub class_name: String,
    content: ContentNode,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLayoutNode {
    /// Missing ids are filled in by `walker::ensure_unique_ids`.
    #[serde(default)]
    id: String,
    #[serde(default)]
    slide_name: String,
    #[serde(rename = "type")]
    layout_type: LayoutType,
    #[serde(default)]
    class_name: String,
    content: ContentNode,
}

impl TryFrom<RawLayoutNode> for LayoutNode {
    type Error = SchemaError;

    fn try_from(raw: RawLayoutNode) -> Result<Self, Self::Error> {
        let mut slide = LayoutNode::new(raw.id, raw.layout_type, raw.content)?;
        slide.slide_name = raw.slide_name;
        slide.class_name = raw.class_name;
        Ok(slide)
    }
}

impl LayoutNode {
    /// Build a slide; `content` must be a `column`.
    pub fn new(
        id: impl Into<String>,
        layout_type: LayoutType,
        content: ContentNode,
    ) -> Result<Self, SchemaError> {
        let id = id.into();
        if content.content_type() != ContentType::Column {
            return Err(SchemaError::RootNotColumn {
                slide_id: id,
                found: content.content_type(),
            });
        }
        Ok(LayoutNode {
            id,
            slide_name: String::new(),
            layout_type,
            class_name: String::new(),
            content,
        })
    }

    pub fn with_slide_name(mut self, name: impl Into<String>) -> Self {
        self.slide_name = name.into();
        self
    }

    /// Root node of the slide (always a `column`).
    pub fn content(&self) -> &ContentNode {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut ContentNode {
        &mut self.content
    }
}

// ── Outlines ─────────────────────────────────────────────────────────────

/// The outline payload: ordered single-sentence points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineSet {
    pub outlines: Vec<String>,
}

/// An outline point as an editable card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineCard {
    pub id: String,
    pub title: String,
    /// 1-based position in the outline.
    pub order: usize,
}

impl OutlineSet {
    pub fn len(&self) -> usize {
        self.outlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outlines.is_empty()
    }

    /// Turn the points into cards with fresh ids, keeping their order.
    pub fn cards(&self) -> Vec<OutlineCard> {
        self.outlines
            .iter()
            .enumerate()
            .map(|(i, title)| OutlineCard {
                id: Uuid::new_v4().to_string(),
                title: title.clone(),
                order: i + 1,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_type_wire_names_round_trip() {
        for ty in ContentType::ALL {
            let v = serde_json::to_value(ty).unwrap();
            assert_eq!(v, json!(ty.as_str()));
            let back: ContentType = serde_json::from_value(v).unwrap();
            assert_eq!(back, ty);
        }
    }

    #[test]
    fn layout_type_wire_names_round_trip() {
        for ty in LayoutType::ALL {
            let v = serde_json::to_value(ty).unwrap();
            assert_eq!(v, json!(ty.as_str()));
        }
        let blank: LayoutType = serde_json::from_value(json!("blank-card")).unwrap();
        assert_eq!(blank, LayoutType::BlankCard);
    }

    #[test]
    fn only_columns_are_containers() {
        assert_eq!(ContentType::Column.kind(), NodeKind::Container);
        assert_eq!(ContentType::ResizableColumn.kind(), NodeKind::Container);
        assert_eq!(ContentType::Image.kind(), NodeKind::Leaf);
        assert_eq!(ContentType::Divider.kind(), NodeKind::Leaf);
    }

    #[test]
    fn deserialises_nested_tree() {
        let v = json!({
            "id": "root",
            "type": "column",
            "name": "Column",
            "content": [
                {"id": "t", "type": "title", "name": "Title", "content": "Hello"},
                {"id": "r", "type": "resizable-column", "name": "Split", "content": {
                    "id": "i", "type": "image", "name": "Image",
                    "content": "https://example.org/a.png", "alt": "A lake"
                }}
            ]
        });
        let node: ContentNode = serde_json::from_value(v).unwrap();
        assert_eq!(node.children().len(), 2);
        let split = &node.children()[1];
        assert_eq!(split.children().len(), 1);
        assert_eq!(split.children()[0].alt.as_deref(), Some("A lake"));
    }

    #[test]
    fn rejects_leaf_with_children() {
        let v = json!({
            "id": "p", "type": "paragraph", "name": "P",
            "content": [{"id": "x", "type": "title", "name": "T", "content": "t"}]
        });
        assert!(serde_json::from_value::<ContentNode>(v).is_err());
    }

    #[test]
    fn rejects_container_with_text() {
        let v = json!({"id": "c", "type": "column", "name": "C", "content": "oops"});
        let err = serde_json::from_value::<ContentNode>(v).unwrap_err();
        assert!(err.to_string().contains("container type"), "got: {err}");
    }

    #[test]
    fn missing_leaf_content_defaults_to_empty_text() {
        let v = json!({"id": "d", "type": "divider", "name": "Divider"});
        let node: ContentNode = serde_json::from_value(v).unwrap();
        assert_eq!(node.text(), Some(""));
    }

    #[test]
    fn slide_root_must_be_column() {
        let v = json!({
            "id": "s1", "slideName": "Intro", "type": "blank-card", "className": "p-8",
            "content": {"id": "t", "type": "title", "name": "T", "content": "Hi"}
        });
        let err = serde_json::from_value::<LayoutNode>(v).unwrap_err();
        assert!(err.to_string().contains("must be a 'column'"), "got: {err}");
    }

    #[test]
    fn slide_serialises_with_camel_case_keys() {
        let root = ContentNode::container(
            "root",
            ContentType::Column,
            vec![ContentNode::leaf("t", ContentType::Title, "Hi").unwrap()],
        )
        .unwrap();
        let slide = LayoutNode::new("s1", LayoutType::BlankCard, root)
            .unwrap()
            .with_slide_name("Intro");
        let v = serde_json::to_value(&slide).unwrap();
        assert_eq!(v["slideName"], "Intro");
        assert_eq!(v["type"], "blank-card");
        assert_eq!(v["content"]["type"], "column");
        assert!(v["content"]["content"][0].get("alt").is_none());
    }

    #[test]
    fn set_text_refuses_containers() {
        let mut col = ContentNode::container("c", ContentType::Column, vec![]).unwrap();
        assert!(col.set_text("x").is_err());
        let mut img = ContentNode::leaf("i", ContentType::Image, "").unwrap();
        img.set_text("https://example.org/x.png").unwrap();
        assert_eq!(img.text(), Some("https://example.org/x.png"));
    }

    #[test]
    fn outline_cards_keep_order() {
        let set = OutlineSet {
            outlines: vec!["A".into(), "B".into(), "C".into()],
        };
        let cards = set.cards();
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].title, "A");
        assert_eq!(cards[2].order, 3);
        assert_ne!(cards[0].id, cards[1].id);
    }
}
