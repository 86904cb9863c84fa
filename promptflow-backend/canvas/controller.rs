use std::fmt;

use super::client::{FlowApi, FlowApiError, SavedFlow};
use super::{Canvas, GraphChange, NodeKind};

/// Status line phases. `Idle` renders as an empty line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RunStatus {
    #[default]
    Idle,
    Generating,
    Ready,
    Saving,
    Saved,
    MustRunFirst,
    AiFailed,
    SaveFailed,
}

impl RunStatus {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            RunStatus::MustRunFirst | RunStatus::AiFailed | RunStatus::SaveFailed
        )
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RunStatus::Idle => "",
            RunStatus::Generating => "Generating AI response...",
            RunStatus::Ready => "AI response ready",
            RunStatus::Saving => "Saving to MongoDB...",
            RunStatus::Saved => "Flow saved successfully!",
            RunStatus::MustRunFirst => "Must run flow before saving",
            RunStatus::AiFailed => "Error: AI request failed",
            RunStatus::SaveFailed => "Error: Failed to save to database",
        };
        f.write_str(text)
    }
}

/// User intent dispatched from the canvas surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    EditPrompt(String),
    Graph(Vec<GraphChange>),
    Run,
    Save,
}

/// A network call the controller wants made. The caller decides where it
/// runs (inline or on a spawned task) and reports back with an [`Outcome`].
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    AskAi { prompt: String },
    SaveFlow { prompt: String, response: String },
}

#[derive(Debug)]
pub enum Outcome {
    AiReplied(Result<String, FlowApiError>),
    FlowSaved(Result<SavedFlow, FlowApiError>),
}

impl Effect {
    pub async fn execute(self, api: &dyn FlowApi) -> Outcome {
        match self {
            Effect::AskAi { prompt } => Outcome::AiReplied(api.ask_ai(&prompt).await),
            Effect::SaveFlow { prompt, response } => {
                Outcome::FlowSaved(api.save_flow(&prompt, &response).await)
            }
        }
    }
}

/// Single owner of the canvas and the prompt/response pair.
///
/// `prompt` and `response` are the source of truth; the node values are
/// mirrors kept equal after every mutation. Run and save do not guard
/// against re-entry: callers check [`FlowController::loading`].
#[derive(Debug, Default)]
pub struct FlowController {
    canvas: Canvas,
    prompt: String,
    response: String,
    status: RunStatus,
    loading: bool,
}

impl FlowController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Apply a command. Run/Save return the call to make, if any.
    pub fn handle(&mut self, command: Command) -> Option<Effect> {
        match command {
            Command::EditPrompt(text) => {
                self.on_prompt_edit(text);
                None
            }
            Command::Graph(changes) => {
                self.on_graph_change(&changes);
                None
            }
            Command::Run => self.begin_run(),
            Command::Save => self.begin_save(),
        }
    }

    pub fn complete(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::AiReplied(result) => self.finish_run(result),
            Outcome::FlowSaved(result) => self.finish_save(result),
        }
    }

    pub fn on_prompt_edit(&mut self, text: impl Into<String>) {
        self.prompt = text.into();
        self.canvas.set_value(NodeKind::Prompt, &self.prompt);
    }

    pub fn on_graph_change(&mut self, changes: &[GraphChange]) {
        self.canvas.apply_changes(changes);
    }

    /// Empty prompt: no-op, status untouched.
    pub fn begin_run(&mut self) -> Option<Effect> {
        if self.prompt.is_empty() {
            return None;
        }
        self.loading = true;
        self.status = RunStatus::Generating;
        Some(Effect::AskAi {
            prompt: self.prompt.clone(),
        })
    }

    /// On failure the previous response (or placeholder) stays in place.
    pub fn finish_run(&mut self, result: Result<String, FlowApiError>) {
        match result {
            Ok(text) => {
                self.response = text;
                self.canvas.set_value(NodeKind::Response, &self.response);
                self.status = RunStatus::Ready;
            }
            Err(e) => {
                tracing::error!(error = %e, "AI request failed");
                self.status = RunStatus::AiFailed;
            }
        }
        self.loading = false;
    }

    pub fn begin_save(&mut self) -> Option<Effect> {
        if self.prompt.is_empty() || self.response.is_empty() {
            self.status = RunStatus::MustRunFirst;
            return None;
        }
        self.loading = true;
        self.status = RunStatus::Saving;
        Some(Effect::SaveFlow {
            prompt: self.prompt.clone(),
            response: self.response.clone(),
        })
    }

    pub fn finish_save(&mut self, result: Result<SavedFlow, FlowApiError>) {
        match result {
            Ok(saved) => {
                tracing::info!(id = %saved.id, "flow saved");
                self.status = RunStatus::Saved;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to save flow");
                self.status = RunStatus::SaveFailed;
            }
        }
        self.loading = false;
    }

    #[cfg(test)]
    pub async fn run(&mut self, api: &dyn FlowApi) {
        if let Some(effect) = self.begin_run() {
            let outcome = effect.execute(api).await;
            self.complete(outcome);
        }
    }

    #[cfg(test)]
    pub async fn save(&mut self, api: &dyn FlowApi) {
        if let Some(effect) = self.begin_save() {
            let outcome = effect.execute(api).await;
            self.complete(outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Position, RESPONSE_PLACEHOLDER};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex as StdMutex;

    struct MockFlowApi {
        reply: StdMutex<Result<String, String>>,
        save_fails: bool,
        asked: StdMutex<Vec<String>>,
        saved: StdMutex<Vec<(String, String)>>,
    }

    impl MockFlowApi {
        fn replying(text: &str) -> Self {
            Self {
                reply: StdMutex::new(Ok(text.to_string())),
                save_fails: false,
                asked: StdMutex::new(Vec::new()),
                saved: StdMutex::new(Vec::new()),
            }
        }

        fn unreachable() -> Self {
            Self {
                reply: StdMutex::new(Err("connection refused".to_string())),
                save_fails: true,
                asked: StdMutex::new(Vec::new()),
                saved: StdMutex::new(Vec::new()),
            }
        }

        fn set_reply(&self, reply: Result<String, String>) {
            *self.reply.lock().unwrap() = reply;
        }

        fn ask_count(&self) -> usize {
            self.asked.lock().unwrap().len()
        }

        fn save_count(&self) -> usize {
            self.saved.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl FlowApi for MockFlowApi {
        async fn ask_ai(&self, prompt: &str) -> Result<String, FlowApiError> {
            self.asked.lock().unwrap().push(prompt.to_string());
            self.reply
                .lock()
                .unwrap()
                .clone()
                .map_err(FlowApiError::Malformed)
        }

        async fn save_flow(
            &self,
            prompt: &str,
            response: &str,
        ) -> Result<SavedFlow, FlowApiError> {
            self.saved
                .lock()
                .unwrap()
                .push((prompt.to_string(), response.to_string()));
            if self.save_fails {
                return Err(FlowApiError::Status {
                    status: 500,
                    body: r#"{"error":"Failed to save flow"}"#.to_string(),
                });
            }
            Ok(SavedFlow {
                id: format!("rec-{}", self.save_count()),
                prompt: prompt.to_string(),
                response: response.to_string(),
                created_at: Utc::now(),
            })
        }
    }

    #[test]
    fn test_prompt_edit_mirrors_into_node() {
        let mut controller = FlowController::new();

        controller.on_prompt_edit("Hel");
        assert_eq!(controller.prompt(), "Hel");
        assert_eq!(controller.canvas().prompt.value, "Hel");

        controller.on_prompt_edit("");
        assert_eq!(controller.prompt(), "");
        assert_eq!(controller.canvas().prompt.value, "");
    }

    #[test]
    fn test_graph_change_leaves_domain_state_alone() {
        let mut controller = FlowController::new();
        controller.on_prompt_edit("Hello");

        controller.handle(Command::Graph(vec![GraphChange::Position {
            id: "1".to_string(),
            position: Position { x: 10.0, y: 20.0 },
        }]));

        assert_eq!(controller.canvas().prompt.position, Position { x: 10.0, y: 20.0 });
        assert_eq!(controller.prompt(), "Hello");
        assert_eq!(controller.canvas().prompt.value, "Hello");
        assert_eq!(controller.response(), "");
    }

    #[tokio::test]
    async fn test_run_success_sets_response_node() {
        let api = MockFlowApi::replying("Hi there!");
        let mut controller = FlowController::new();
        controller.on_prompt_edit("Hello");

        controller.run(&api).await;

        assert_eq!(controller.response(), "Hi there!");
        assert_eq!(controller.canvas().response.value, "Hi there!");
        assert_eq!(controller.status(), &RunStatus::Ready);
        assert_eq!(controller.status().to_string(), "AI response ready");
        assert!(!controller.loading());
        assert_eq!(*api.asked.lock().unwrap(), vec!["Hello".to_string()]);
    }

    #[tokio::test]
    async fn test_run_with_empty_prompt_is_noop() {
        let api = MockFlowApi::replying("Hi there!");
        let mut controller = FlowController::new();

        controller.run(&api).await;

        assert_eq!(api.ask_count(), 0);
        assert_eq!(controller.status(), &RunStatus::Idle);
        assert!(!controller.loading());
    }

    #[tokio::test]
    async fn test_run_with_emptied_prompt_keeps_previous_status() {
        let api = MockFlowApi::replying("Hi there!");
        let mut controller = FlowController::new();
        controller.on_prompt_edit("Hello");
        controller.run(&api).await;

        controller.on_prompt_edit("");
        controller.run(&api).await;

        assert_eq!(api.ask_count(), 1);
        assert_eq!(controller.status(), &RunStatus::Ready);
    }

    #[test]
    fn test_begin_run_sets_progress_before_request() {
        let mut controller = FlowController::new();
        controller.on_prompt_edit("Hello");

        let effect = controller.handle(Command::Run);

        assert_eq!(
            effect,
            Some(Effect::AskAi {
                prompt: "Hello".to_string()
            })
        );
        assert_eq!(controller.status().to_string(), "Generating AI response...");
        assert!(controller.loading());
    }

    #[tokio::test]
    async fn test_run_failure_keeps_placeholder() {
        let api = MockFlowApi::unreachable();
        let mut controller = FlowController::new();
        controller.on_prompt_edit("Hello");

        controller.run(&api).await;

        assert_eq!(controller.status(), &RunStatus::AiFailed);
        assert!(controller.status().is_error());
        assert_eq!(controller.response(), "");
        assert_eq!(controller.canvas().response.display_text(), RESPONSE_PLACEHOLDER);
        assert!(!controller.loading());
    }

    #[tokio::test]
    async fn test_run_failure_keeps_previous_response() {
        let api = MockFlowApi::replying("first answer");
        let mut controller = FlowController::new();
        controller.on_prompt_edit("Hello");
        controller.run(&api).await;

        api.set_reply(Err("timed out".to_string()));
        controller.run(&api).await;

        assert_eq!(controller.status().to_string(), "Error: AI request failed");
        assert_eq!(controller.response(), "first answer");
        assert_eq!(controller.canvas().response.value, "first answer");
    }

    #[tokio::test]
    async fn test_save_before_run_is_rejected_locally() {
        let api = MockFlowApi::replying("Hi there!");
        let mut controller = FlowController::new();
        controller.on_prompt_edit("Hello");

        controller.save(&api).await;

        assert_eq!(controller.status().to_string(), "Must run flow before saving");
        assert_eq!(api.save_count(), 0);
        assert!(!controller.loading());
    }

    #[test]
    fn test_save_with_nothing_entered_is_rejected_locally() {
        let api = MockFlowApi::replying("Hi there!");
        let mut controller = FlowController::new();

        assert_eq!(controller.handle(Command::Save), None);
        assert_eq!(controller.status(), &RunStatus::MustRunFirst);
        assert_eq!(api.save_count(), 0);
    }

    #[tokio::test]
    async fn test_run_then_save_scenario() {
        let api = MockFlowApi::replying("Hi there!");
        let mut controller = FlowController::new();
        controller.on_prompt_edit("Hello");
        controller.run(&api).await;

        let effect = controller.handle(Command::Save);
        assert_eq!(controller.status().to_string(), "Saving to MongoDB...");
        assert!(controller.loading());

        let outcome = effect.unwrap().execute(&api).await;
        controller.complete(outcome);

        assert_eq!(controller.status().to_string(), "Flow saved successfully!");
        assert!(!controller.loading());
        assert_eq!(
            *api.saved.lock().unwrap(),
            vec![("Hello".to_string(), "Hi there!".to_string())]
        );
    }

    #[tokio::test]
    async fn test_repeated_saves_each_send_a_request() {
        let api = MockFlowApi::replying("Hi there!");
        let mut controller = FlowController::new();
        controller.on_prompt_edit("Hello");
        controller.run(&api).await;

        controller.save(&api).await;
        controller.save(&api).await;

        assert_eq!(api.save_count(), 2);
        assert_eq!(controller.status(), &RunStatus::Saved);
    }

    #[tokio::test]
    async fn test_save_sends_values_at_call_time() {
        let api = MockFlowApi::replying("Hi there!");
        let mut controller = FlowController::new();
        controller.on_prompt_edit("Hello");
        controller.run(&api).await;
        controller.on_prompt_edit("Hello again");

        controller.save(&api).await;

        assert_eq!(
            *api.saved.lock().unwrap(),
            vec![("Hello again".to_string(), "Hi there!".to_string())]
        );
    }

    #[tokio::test]
    async fn test_save_failure_sets_error_status() {
        let api = MockFlowApi::unreachable();
        api.set_reply(Ok("Hi there!".to_string()));
        let mut controller = FlowController::new();
        controller.on_prompt_edit("Hello");
        controller.run(&api).await;

        controller.save(&api).await;

        assert_eq!(
            controller.status().to_string(),
            "Error: Failed to save to database"
        );
        assert_eq!(controller.response(), "Hi there!");
        assert!(!controller.loading());
    }

    #[test]
    fn test_idle_status_renders_empty() {
        assert_eq!(RunStatus::Idle.to_string(), "");
        assert!(!RunStatus::Idle.is_error());
    }
}
