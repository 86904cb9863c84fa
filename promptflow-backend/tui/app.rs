use std::sync::Arc;

use tokio::sync::mpsc;

use crate::canvas::client::FlowApi;
use crate::canvas::controller::{Command, FlowController, Outcome};
use crate::canvas::{EDGE_ID, GraphChange, NodeKind, Position};

/// Canvas units moved per Alt+Arrow press.
const NUDGE_X: f64 = 20.0;
const NUDGE_Y: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    None,
    Prompt,
    Response,
    Edge,
}

impl Selection {
    fn next(self) -> Self {
        match self {
            Selection::None => Selection::Prompt,
            Selection::Prompt => Selection::Response,
            Selection::Response => Selection::Edge,
            Selection::Edge => Selection::None,
        }
    }

    fn element_id(self) -> Option<&'static str> {
        match self {
            Selection::None => None,
            Selection::Prompt => Some(NodeKind::Prompt.id()),
            Selection::Response => Some(NodeKind::Response.id()),
            Selection::Edge => Some(EDGE_ID),
        }
    }
}

pub struct App {
    pub server_url: String,
    pub controller: FlowController,
    pub should_quit: bool,
    api: Arc<dyn FlowApi>,
    outcome_tx: mpsc::UnboundedSender<Outcome>,
    outcome_rx: mpsc::UnboundedReceiver<Outcome>,
}

impl App {
    pub fn new(server_url: String, api: Arc<dyn FlowApi>) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self {
            server_url,
            controller: FlowController::new(),
            should_quit: false,
            api,
            outcome_tx,
            outcome_rx,
        }
    }

    /// Hand a command to the controller; any network call it asks for runs
    /// on a spawned task and comes back through [`App::poll_outcomes`].
    pub fn dispatch(&mut self, command: Command) {
        let Some(effect) = self.controller.handle(command) else {
            return;
        };
        let api = self.api.clone();
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let outcome = effect.execute(api.as_ref()).await;
            // Receiver only goes away when the TUI is shutting down.
            let _ = tx.send(outcome);
        });
    }

    pub fn poll_outcomes(&mut self) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.controller.complete(outcome);
        }
    }

    /// Run/Save are refused while a call is in flight, the way a disabled
    /// button would.
    pub fn run_flow(&mut self) {
        if !self.controller.loading() {
            self.dispatch(Command::Run);
        }
    }

    pub fn save_flow(&mut self) {
        if !self.controller.loading() {
            self.dispatch(Command::Save);
        }
    }

    pub fn input_char(&mut self, c: char) {
        let mut text = self.controller.prompt().to_string();
        text.push(c);
        self.dispatch(Command::EditPrompt(text));
    }

    pub fn input_newline(&mut self) {
        self.input_char('\n');
    }

    pub fn input_backspace(&mut self) {
        let mut text = self.controller.prompt().to_string();
        if text.pop().is_some() {
            self.dispatch(Command::EditPrompt(text));
        }
    }

    pub fn selection(&self) -> Selection {
        let canvas = self.controller.canvas();
        if canvas.prompt.selected {
            Selection::Prompt
        } else if canvas.response.selected {
            Selection::Response
        } else if canvas.edge.selected {
            Selection::Edge
        } else {
            Selection::None
        }
    }

    pub fn cycle_selection(&mut self) {
        let next = self.selection().next();
        self.select(next);
    }

    pub fn clear_selection(&mut self) {
        self.select(Selection::None);
    }

    fn select(&mut self, target: Selection) {
        let changes = [Selection::Prompt, Selection::Response, Selection::Edge]
            .into_iter()
            .filter_map(|s| {
                s.element_id().map(|id| GraphChange::Select {
                    id: id.to_string(),
                    selected: s == target,
                })
            })
            .collect();
        self.dispatch(Command::Graph(changes));
    }

    /// Move the selected node by one nudge step in the given direction.
    pub fn nudge_selected(&mut self, dx: f64, dy: f64) {
        let kind = match self.selection() {
            Selection::Prompt => NodeKind::Prompt,
            Selection::Response => NodeKind::Response,
            Selection::Edge | Selection::None => return,
        };
        let current = self.controller.canvas().node(kind).position;
        let position = Position {
            x: (current.x + dx * NUDGE_X).max(0.0),
            y: (current.y + dy * NUDGE_Y).max(0.0),
        };
        self.dispatch(Command::Graph(vec![GraphChange::Position {
            id: kind.id().to_string(),
            position,
        }]));
    }
}
