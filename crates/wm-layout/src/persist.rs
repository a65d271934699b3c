// ABOUTME: JSON form of the layout tree.
// ABOUTME: Panes are stored with a type discriminator and decoded through a registry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tree::{DisplayNode, SplitAxis, SplitLine, TreePane};

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("Failed to (de)serialize layout: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to decode pane of type {type_name}: {source}")]
    Pane {
        type_name: String,
        source: serde_json::Error,
    },

    #[error("Split node ({0:?}) is missing its children")]
    MissingChildren(SplitAxis),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitLineRecord {
    pub pos: f32,
    pub axis: SplitAxis,
}

/// One node as written to disk.
///
/// Leaves have `axis: none`, a pane `type` and the pane's own state.
/// Internal nodes carry exactly two children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub split_line: SplitLineRecord,
    #[serde(rename = "type", default)]
    pub pane_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pane: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Box<[NodeRecord; 2]>>,
}

/// Panes that can be written into a layout file
pub trait PaneCodec: TreePane {
    /// Discriminator stored in the `type` field
    fn type_name(&self) -> &'static str;

    fn encode(&self) -> Result<serde_json::Value, serde_json::Error>;
}

pub type PaneDecoder<P> = fn(serde_json::Value) -> Result<P, serde_json::Error>;

/// Maps `type` discriminators back to pane constructors
pub struct PaneRegistry<P> {
    decoders: BTreeMap<&'static str, PaneDecoder<P>>,
}

impl<P> Default for PaneRegistry<P> {
    fn default() -> Self {
        Self {
            decoders: BTreeMap::new(),
        }
    }
}

impl<P: TreePane> PaneRegistry<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, type_name: &'static str, decoder: PaneDecoder<P>) -> &mut Self {
        self.decoders.insert(type_name, decoder);
        self
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.decoders.contains_key(type_name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.decoders.keys().copied()
    }

    /// Decode a pane. Unknown discriminators become a placeholder pane.
    pub fn decode(&self, type_name: &str, value: serde_json::Value) -> Result<P, LayoutError> {
        match self.decoders.get(type_name) {
            Some(decoder) => decoder(value).map_err(|source| LayoutError::Pane {
                type_name: type_name.to_string(),
                source,
            }),
            None => {
                tracing::error!("{}: Unhandled type in config file", type_name);
                Ok(P::placeholder())
            }
        }
    }
}

impl<P: PaneCodec> DisplayNode<P> {
    pub fn to_record(&self) -> Result<NodeRecord, LayoutError> {
        match self {
            DisplayNode::Leaf(pane) => Ok(NodeRecord {
                split_line: SplitLineRecord {
                    pos: 0.5,
                    axis: SplitAxis::None,
                },
                pane_type: pane.type_name().to_string(),
                pane: Some(pane.encode()?),
                children: None,
            }),
            DisplayNode::Split { line, children } => Ok(NodeRecord {
                split_line: SplitLineRecord {
                    pos: line.pos,
                    axis: line.axis,
                },
                pane_type: String::new(),
                pane: None,
                children: Some(Box::new([
                    children[0].to_record()?,
                    children[1].to_record()?,
                ])),
            }),
        }
    }

    /// Rebuild a tree. Identities are freshly assigned.
    pub fn from_record(record: NodeRecord, registry: &PaneRegistry<P>) -> Result<Self, LayoutError> {
        let NodeRecord {
            split_line,
            pane_type,
            pane,
            children,
        } = record;

        if split_line.axis == SplitAxis::None {
            if pane_type.is_empty() {
                tracing::warn!("Leaf without a pane type; using an empty pane");
                return Ok(DisplayNode::Leaf(P::placeholder()));
            }
            let pane = registry.decode(&pane_type, pane.unwrap_or(serde_json::Value::Null))?;
            return Ok(DisplayNode::Leaf(pane));
        }

        let Some(children) = children else {
            return Err(LayoutError::MissingChildren(split_line.axis));
        };
        let [first, second] = *children;
        let pos = SplitLine::sanitize_pos(split_line.pos);
        if pos != split_line.pos {
            tracing::warn!("Split fraction {} out of range; using {}", split_line.pos, pos);
        }
        Ok(DisplayNode::Split {
            line: SplitLine::new(split_line.axis, pos),
            children: [
                Box::new(Self::from_record(first, registry)?),
                Box::new(Self::from_record(second, registry)?),
            ],
        })
    }

    pub fn to_json(&self) -> Result<String, LayoutError> {
        Ok(serde_json::to_string_pretty(&self.to_record()?)?)
    }

    pub fn from_json(json: &str, registry: &PaneRegistry<P>) -> Result<Self, LayoutError> {
        let record: NodeRecord = serde_json::from_str(json)?;
        Self::from_record(record, registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{decode_test_pane, TestPane};

    fn registry() -> PaneRegistry<TestPane> {
        let mut registry = PaneRegistry::new();
        registry.register("test", decode_test_pane);
        registry
    }

    fn names(node: &DisplayNode<TestPane>) -> Vec<String> {
        let mut out = Vec::new();
        node.visit_panes(&mut |element| {
            if let crate::Element::Pane(p) = element {
                out.push(p.name.clone());
            }
        });
        out
    }

    #[test]
    fn json_preserves_shape_and_state() {
        let mut right = DisplayNode::leaf(TestPane::named("B"));
        right.split_y(0.25, DisplayNode::leaf(TestPane::named("C")));
        let mut root = DisplayNode::leaf(TestPane::named("A"));
        root.split_x(0.6, right);

        let json = root.to_json().unwrap();
        let loaded = DisplayNode::from_json(&json, &registry()).unwrap();

        assert_eq!(names(&loaded), vec!["A", "B", "C"]);
        assert_eq!(loaded.axis(), SplitAxis::Horizontal);
        assert_eq!(loaded.split_line().unwrap().pos, 0.6);
        let [_, right] = loaded.children().unwrap();
        assert_eq!(right.axis(), SplitAxis::Vertical);
        assert_eq!(right.split_line().unwrap().pos, 0.25);

        // Fresh identities on load
        for id in loaded.pane_ids() {
            assert!(!root.contains_pane(id));
        }
    }

    #[test]
    fn record_uses_type_discriminator() {
        let root = DisplayNode::leaf(TestPane::named("A"));
        let value = serde_json::to_value(root.to_record().unwrap()).unwrap();
        assert_eq!(value["type"], "test");
        assert_eq!(value["split_line"]["axis"], "none");
        assert_eq!(value["pane"]["name"], "A");
        assert!(value.get("children").is_none());
    }

    #[test]
    fn unknown_type_becomes_placeholder() {
        let json = r#"{
            "split_line": {"pos": 0.5, "axis": "horizontal"},
            "children": [
                {"split_line": {"pos": 0.5, "axis": "none"}, "type": "test", "pane": {"name": "kept"}},
                {"split_line": {"pos": 0.5, "axis": "none"}, "type": "hologram", "pane": {"beams": 3}}
            ]
        }"#;
        let loaded = DisplayNode::from_json(json, &registry()).unwrap();
        assert_eq!(names(&loaded), vec!["kept", "Empty"]);
    }

    #[test]
    fn malformed_known_pane_is_an_error() {
        let json = r#"{"split_line": {"pos": 0.5, "axis": "none"}, "type": "test", "pane": {"nom": 1}}"#;
        let err = DisplayNode::from_json(json, &registry()).unwrap_err();
        assert!(matches!(err, LayoutError::Pane { .. }));
    }

    #[test]
    fn split_without_children_is_an_error() {
        let json = r#"{"split_line": {"pos": 0.5, "axis": "vertical"}, "type": ""}"#;
        let err = DisplayNode::<TestPane>::from_json(json, &registry()).unwrap_err();
        assert!(matches!(err, LayoutError::MissingChildren(SplitAxis::Vertical)));
    }

    #[test]
    fn out_of_range_split_fractions_are_repaired() {
        let leaf = r#"{"split_line": {"pos": 0.5, "axis": "none"}, "type": "test", "pane": {"name": "x"}}"#;
        let json = format!(
            r#"{{"split_line": {{"pos": 1e39, "axis": "horizontal"}},
                "children": [{leaf}, {{"split_line": {{"pos": 3.0, "axis": "vertical"}},
                                      "children": [{leaf}, {leaf}]}}]}}"#
        );
        let mut loaded = DisplayNode::<TestPane>::from_json(&json, &registry()).unwrap();
        assert_eq!(loaded.split_line().unwrap().pos, 0.5);
        let [_, right] = loaded.children().unwrap();
        assert_eq!(right.split_line().unwrap().pos, SplitLine::MAX_POS);

        // Degenerate displays still lay out every pane
        for size in [[200.0, 100.0], [0.0, 100.0], [0.0, 0.0]] {
            let extent = wm_core::Extent2D::from_size(size[0], size[1]);
            let bounds = crate::PaneBounds::root(extent, extent, extent);
            let mut panes = 0;
            loaded.visit_panes_with_bounds(&crate::NodeFilter::Identity, bounds, 3.0, &mut |b, e| {
                if let crate::ElementMut::Pane(_) = e {
                    assert!(b.display.p0[0].is_finite() && b.display.p1[0].is_finite());
                    panes += 1;
                }
            });
            assert_eq!(panes, 3);
        }
    }

    #[test]
    fn registry_lists_types() {
        let registry = registry();
        assert!(registry.contains("test"));
        assert!(!registry.contains("hologram"));
        assert_eq!(registry.type_names().collect::<Vec<_>>(), vec!["test"]);
    }
}
