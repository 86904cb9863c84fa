pub mod client;
pub mod controller;

pub const PROMPT_NODE_ID: &str = "1";
pub const RESPONSE_NODE_ID: &str = "2";
pub const EDGE_ID: &str = "e1-2";

pub const PROMPT_PLACEHOLDER: &str = "Type something...";
pub const RESPONSE_PLACEHOLDER: &str = "Waiting for run...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Prompt,
    Response,
}

impl NodeKind {
    pub fn id(self) -> &'static str {
        match self {
            NodeKind::Prompt => PROMPT_NODE_ID,
            NodeKind::Response => RESPONSE_NODE_ID,
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            PROMPT_NODE_ID => Some(NodeKind::Prompt),
            RESPONSE_NODE_ID => Some(NodeKind::Response),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NodeKind::Prompt => "PROMPT",
            NodeKind::Response => "AI RESPONSE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub position: Position,
    pub value: String,
    pub selected: bool,
}

impl Node {
    fn new(kind: NodeKind, x: f64, y: f64) -> Self {
        Self {
            kind,
            position: Position { x, y },
            value: String::new(),
            selected: false,
        }
    }

    #[allow(dead_code)]
    pub fn id(&self) -> &'static str {
        self.kind.id()
    }

    /// Text shown inside the node: the value, or the kind's placeholder.
    pub fn display_text(&self) -> &str {
        if !self.value.is_empty() {
            return &self.value;
        }
        match self.kind {
            NodeKind::Prompt => PROMPT_PLACEHOLDER,
            NodeKind::Response => RESPONSE_PLACEHOLDER,
        }
    }
}

/// The single prompt -> response link. Carries no data.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub animated: bool,
    pub selected: bool,
}

#[allow(dead_code)]
impl Edge {
    pub fn id(&self) -> &'static str {
        EDGE_ID
    }

    pub fn source(&self) -> &'static str {
        PROMPT_NODE_ID
    }

    pub fn target(&self) -> &'static str {
        RESPONSE_NODE_ID
    }
}

/// Incremental visual change coming from the canvas surface.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub enum GraphChange {
    Position { id: String, position: Position },
    Select { id: String, selected: bool },
    Remove { id: String },
}

/// Fixed two-node, one-edge graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    pub prompt: Node,
    pub response: Node,
    pub edge: Edge,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            prompt: Node::new(NodeKind::Prompt, 100.0, 150.0),
            response: Node::new(NodeKind::Response, 500.0, 150.0),
            edge: Edge {
                animated: true,
                selected: false,
            },
        }
    }
}

impl Canvas {
    pub fn node(&self, kind: NodeKind) -> &Node {
        match kind {
            NodeKind::Prompt => &self.prompt,
            NodeKind::Response => &self.response,
        }
    }

    pub fn node_mut(&mut self, kind: NodeKind) -> &mut Node {
        match kind {
            NodeKind::Prompt => &mut self.prompt,
            NodeKind::Response => &mut self.response,
        }
    }

    pub fn nodes(&self) -> [&Node; 2] {
        [&self.prompt, &self.response]
    }

    pub fn set_value(&mut self, kind: NodeKind, value: &str) {
        let node = self.node_mut(kind);
        node.value.clear();
        node.value.push_str(value);
    }

    /// Apply position/selection changes. Removals and unknown ids are
    /// dropped; the graph shape never changes.
    pub fn apply_changes(&mut self, changes: &[GraphChange]) {
        for change in changes {
            match change {
                GraphChange::Position { id, position } => match NodeKind::from_id(id) {
                    Some(kind) => self.node_mut(kind).position = *position,
                    None => tracing::trace!(%id, "position change for unknown node ignored"),
                },
                GraphChange::Select { id, selected } if id == EDGE_ID => {
                    self.edge.selected = *selected;
                }
                GraphChange::Select { id, selected } => match NodeKind::from_id(id) {
                    Some(kind) => self.node_mut(kind).selected = *selected,
                    None => tracing::trace!(%id, "selection change for unknown element ignored"),
                },
                GraphChange::Remove { id } => {
                    tracing::debug!(%id, "remove change ignored on fixed canvas");
                }
            }
        }
    }
}
