//! End-to-end walks over mock collaborators.
//!
//! Every scenario builds a small graph, runs it through a real
//! [`WorkflowEngine`], and inspects both the returned text and what the
//! mocks recorded being asked.

use async_trait::async_trait;
use stackflow_core::{
    Collaborators, DocumentStore, Graph, InferenceModel, InferenceRequest, NodeKind, RepoIngestor,
    ReportRenderer, Result, StackflowError, WebSearch, WorkflowEngine, DEFAULT_PROMPT,
    NO_RESULT_FALLBACK,
};
use std::sync::{Arc, Mutex};

/// Records every collaborator invocation so tests can assert on call counts
/// and request shapes.
#[derive(Default)]
struct Recorder {
    retrievals: Mutex<Vec<(String, String)>>,
    searches: Mutex<Vec<String>>,
    fetches: Mutex<Vec<String>>,
    inferences: Mutex<Vec<InferenceRequest>>,
    renders: Mutex<Vec<(String, String)>>,
}

impl Recorder {
    fn total_calls(&self) -> usize {
        self.retrievals.lock().unwrap().len()
            + self.searches.lock().unwrap().len()
            + self.fetches.lock().unwrap().len()
            + self.inferences.lock().unwrap().len()
            + self.renders.lock().unwrap().len()
    }
}

#[derive(Clone)]
struct MockDocuments {
    recorder: Arc<Recorder>,
    reply: std::result::Result<String, String>,
}

#[async_trait]
impl DocumentStore for MockDocuments {
    async fn retrieve(&self, query: &str, collection: &str) -> Result<String> {
        self.recorder
            .retrievals
            .lock()
            .unwrap()
            .push((query.to_string(), collection.to_string()));
        self.reply
            .clone()
            .map_err(StackflowError::collaborator)
    }
}

#[derive(Clone)]
struct MockWeb {
    recorder: Arc<Recorder>,
    reply: String,
}

#[async_trait]
impl WebSearch for MockWeb {
    async fn search(&self, query: &str) -> Result<String> {
        self.recorder.searches.lock().unwrap().push(query.to_string());
        Ok(self.reply.clone())
    }
}

#[derive(Clone)]
struct MockRepos {
    recorder: Arc<Recorder>,
    reply: String,
}

#[async_trait]
impl RepoIngestor for MockRepos {
    async fn fetch(&self, repo_ref: &str) -> Result<String> {
        self.recorder.fetches.lock().unwrap().push(repo_ref.to_string());
        Ok(self.reply.clone())
    }
}

#[derive(Clone)]
struct MockInference {
    recorder: Arc<Recorder>,
    reply: String,
}

#[async_trait]
impl InferenceModel for MockInference {
    async fn infer(&self, request: InferenceRequest) -> Result<String> {
        self.recorder.inferences.lock().unwrap().push(request);
        Ok(self.reply.clone())
    }
}

#[derive(Clone)]
struct MockReports {
    recorder: Arc<Recorder>,
}

#[async_trait]
impl ReportRenderer for MockReports {
    async fn render(&self, content: &str, filename: &str) -> Result<String> {
        self.recorder
            .renders
            .lock()
            .unwrap()
            .push((content.to_string(), filename.to_string()));
        Ok(format!("PDF generated successfully at ./generated_reports/{filename}"))
    }
}

struct Harness {
    recorder: Arc<Recorder>,
    engine: WorkflowEngine,
}

impl Harness {
    fn new() -> Self {
        Self::with_retrieval(Ok("retrieved snippet".to_string()))
    }

    fn with_retrieval(reply: std::result::Result<String, String>) -> Self {
        let recorder = Arc::new(Recorder::default());
        let services = Collaborators {
            documents: Arc::new(MockDocuments {
                recorder: recorder.clone(),
                reply,
            }),
            web: Arc::new(MockWeb {
                recorder: recorder.clone(),
                reply: "Title: result\nSnippet: text\n\n".to_string(),
            }),
            repos: Arc::new(MockRepos {
                recorder: recorder.clone(),
                reply: "--- FILE: src/main.rs ---\nfn main() {}\n".to_string(),
            }),
            inference: Arc::new(MockInference {
                recorder: recorder.clone(),
                reply: "the model's answer".to_string(),
            }),
            reports: Arc::new(MockReports {
                recorder: recorder.clone(),
            }),
        };
        Self {
            recorder,
            engine: WorkflowEngine::new(services),
        }
    }
}

fn llm_node() -> NodeKind {
    NodeKind::LlmInference {
        prompt: None,
        model: None,
    }
}

#[tokio::test]
async fn missing_entry_node_is_fatal_and_calls_nothing() {
    let harness = Harness::new();
    let mut graph = Graph::new();
    graph.add_node("search", NodeKind::WebSearch);
    graph.add_node("llm", llm_node());
    graph.add_edge("search", "llm");

    let err = harness.engine.execute(&graph, "hello").await.unwrap_err();
    assert!(matches!(err, StackflowError::MissingEntryNode));
    assert_eq!(harness.recorder.total_calls(), 0);
}

#[tokio::test]
async fn walk_ends_at_node_without_outgoing_edge() {
    let harness = Harness::new();
    let mut graph = Graph::new();
    graph.add_node("in", NodeKind::QueryIntake);
    graph.add_node("llm", llm_node());
    graph.add_edge("in", "llm");
    // "llm" has no outgoing edge.

    let result = harness.engine.execute(&graph, "hello").await.unwrap();
    assert_eq!(result, "the model's answer");
}

#[tokio::test]
async fn edge_to_missing_node_ends_walk_normally() {
    let harness = Harness::new();
    let mut graph = Graph::new();
    graph.add_node("in", NodeKind::QueryIntake);
    graph.add_node("llm", llm_node());
    graph.add_edge("in", "llm");
    graph.add_edge("llm", "ghost");

    let result = harness.engine.execute(&graph, "hello").await.unwrap();
    assert_eq!(result, "the model's answer");
    assert_eq!(harness.recorder.inferences.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn two_node_cycle_hits_the_step_bound() {
    let harness = Harness::new();
    let mut graph = Graph::new();
    graph.add_node("in", NodeKind::QueryIntake);
    graph.add_node("search", NodeKind::WebSearch);
    graph.add_edge("in", "search");
    graph.add_edge("search", "in");

    let err = harness.engine.execute(&graph, "hello").await.unwrap_err();
    assert!(matches!(err, StackflowError::StepLimitExceeded { limit: 8 }));
}

#[tokio::test]
async fn scenario_intake_straight_to_inference() {
    let harness = Harness::new();
    let mut graph = Graph::new();
    graph.add_node("in", NodeKind::QueryIntake);
    graph.add_node("llm", llm_node());
    graph.add_edge("in", "llm");

    let result = harness.engine.execute(&graph, "hello").await.unwrap();
    assert_eq!(result, "the model's answer");

    let inferences = harness.recorder.inferences.lock().unwrap();
    assert_eq!(inferences.len(), 1);
    let request = &inferences[0];
    assert_eq!(request.prompt, DEFAULT_PROMPT);
    assert_eq!(request.query, "hello");
    assert_eq!(request.doc_context, None);
    assert_eq!(request.repo_context, None);
    assert_eq!(request.web_context, None);
}

#[tokio::test]
async fn scenario_retrieval_feeds_inference() {
    let harness = Harness::with_retrieval(Ok("Paris is the capital".to_string()));
    let mut graph = Graph::new();
    graph.add_node("in", NodeKind::QueryIntake);
    graph.add_node(
        "kb",
        NodeKind::KnowledgeBase {
            collection: Some("doc1".to_string()),
        },
    );
    graph.add_node("llm", llm_node());
    graph.add_edge("in", "kb");
    graph.add_edge("kb", "llm");

    harness
        .engine
        .execute(&graph, "capital of France?")
        .await
        .unwrap();

    let retrievals = harness.recorder.retrievals.lock().unwrap();
    assert_eq!(
        retrievals.as_slice(),
        &[("capital of France?".to_string(), "doc1".to_string())]
    );

    let inferences = harness.recorder.inferences.lock().unwrap();
    let request = &inferences[0];
    assert_eq!(request.doc_context.as_deref(), Some("Paris is the capital"));
    assert_eq!(request.web_context, None);
}

#[tokio::test]
async fn scenario_entry_only_returns_fallback() {
    let harness = Harness::new();
    let mut graph = Graph::new();
    graph.add_node("in", NodeKind::QueryIntake);

    let result = harness.engine.execute(&graph, "hello").await.unwrap();
    assert_eq!(result, NO_RESULT_FALLBACK);
    assert_eq!(harness.recorder.total_calls(), 0);
}

#[tokio::test]
async fn scenario_unrecognized_node_is_noop_but_walk_advances() {
    let harness = Harness::new();
    let mut graph = Graph::new();
    graph.add_node("in", NodeKind::QueryIntake);
    graph.add_node("odd", NodeKind::Unrecognized("Quantum Widget".to_string()));
    graph.add_node("llm", llm_node());
    graph.add_edge("in", "odd");
    graph.add_edge("odd", "llm");

    let result = harness.engine.execute(&graph, "hello").await.unwrap();
    assert_eq!(result, "the model's answer");

    let inferences = harness.recorder.inferences.lock().unwrap();
    let request = &inferences[0];
    assert_eq!(request.doc_context, None);
    assert_eq!(request.repo_context, None);
    assert_eq!(request.web_context, None);
}

#[tokio::test]
async fn web_search_only_touches_its_own_channel() {
    let harness = Harness::new();
    let mut graph = Graph::new();
    graph.add_node("in", NodeKind::QueryIntake);
    graph.add_node("web", NodeKind::WebSearch);
    graph.add_node("llm", llm_node());
    graph.add_edge("in", "web");
    graph.add_edge("web", "llm");

    harness.engine.execute(&graph, "hello").await.unwrap();

    let inferences = harness.recorder.inferences.lock().unwrap();
    let request = &inferences[0];
    assert!(request.web_context.is_some());
    assert_eq!(request.doc_context, None);
    assert_eq!(request.repo_context, None);
}

#[tokio::test]
async fn kb_and_repo_both_reach_inference() {
    let harness = Harness::with_retrieval(Ok("doc snippet".to_string()));
    let mut graph = Graph::new();
    graph.add_node("in", NodeKind::QueryIntake);
    graph.add_node(
        "kb",
        NodeKind::KnowledgeBase {
            collection: Some("manual".to_string()),
        },
    );
    graph.add_node(
        "git",
        NodeKind::GitRepo {
            repo_url: Some("octocat/hello-world".to_string()),
        },
    );
    graph.add_node("llm", llm_node());
    graph.add_edge("in", "kb");
    graph.add_edge("kb", "git");
    graph.add_edge("git", "llm");

    harness.engine.execute(&graph, "how does it work?").await.unwrap();

    let inferences = harness.recorder.inferences.lock().unwrap();
    let request = &inferences[0];
    assert_eq!(request.doc_context.as_deref(), Some("doc snippet"));
    assert!(request.repo_context.as_deref().unwrap().contains("src/main.rs"));

    // The assembled prompt keeps the document section ahead of the
    // repository section, each exactly once.
    let assembled = request.assemble_prompt();
    let doc_at = assembled.find("--- DOCUMENT CONTEXT START ---").unwrap();
    let repo_at = assembled.find("--- REPOSITORY CONTEXT START ---").unwrap();
    assert!(doc_at < repo_at);
    assert_eq!(assembled.matches("doc snippet").count(), 1);
}

#[tokio::test]
async fn failing_retrieval_degrades_context_but_walk_continues() {
    let harness = Harness::with_retrieval(Err("vector store unreachable".to_string()));
    let mut graph = Graph::new();
    graph.add_node("in", NodeKind::QueryIntake);
    graph.add_node(
        "kb",
        NodeKind::KnowledgeBase {
            collection: Some("doc1".to_string()),
        },
    );
    graph.add_node("llm", llm_node());
    graph.add_edge("in", "kb");
    graph.add_edge("kb", "llm");

    let result = harness.engine.execute(&graph, "hello").await.unwrap();
    assert_eq!(result, "the model's answer");

    let inferences = harness.recorder.inferences.lock().unwrap();
    let doc_context = inferences[0].doc_context.as_deref().unwrap();
    assert!(doc_context.starts_with("Error:"));
    assert!(doc_context.contains("vector store unreachable"));
}

#[tokio::test]
async fn kb_node_without_collection_is_skipped() {
    let harness = Harness::new();
    let mut graph = Graph::new();
    graph.add_node("in", NodeKind::QueryIntake);
    graph.add_node("kb", NodeKind::KnowledgeBase { collection: None });
    graph.add_node("llm", llm_node());
    graph.add_edge("in", "kb");
    graph.add_edge("kb", "llm");

    harness.engine.execute(&graph, "hello").await.unwrap();

    assert!(harness.recorder.retrievals.lock().unwrap().is_empty());
    let inferences = harness.recorder.inferences.lock().unwrap();
    assert_eq!(inferences[0].doc_context, None);
}

#[tokio::test]
async fn report_node_renders_result_or_placeholder() {
    let harness = Harness::new();

    // After inference: the result is rendered with the configured filename.
    let mut graph = Graph::new();
    graph.add_node("in", NodeKind::QueryIntake);
    graph.add_node("llm", llm_node());
    graph.add_node(
        "pdf",
        NodeKind::PdfGenerator {
            filename: Some("answer.pdf".to_string()),
        },
    );
    graph.add_edge("in", "llm");
    graph.add_edge("llm", "pdf");

    let result = harness.engine.execute(&graph, "hello").await.unwrap();
    // Rendering is a side effect only; the walk's result is untouched.
    assert_eq!(result, "the model's answer");
    {
        let renders = harness.recorder.renders.lock().unwrap();
        assert_eq!(
            renders.as_slice(),
            &[("the model's answer".to_string(), "answer.pdf".to_string())]
        );
    }

    // Before any inference: the placeholder body and default filename.
    let harness = Harness::new();
    let mut graph = Graph::new();
    graph.add_node("in", NodeKind::QueryIntake);
    graph.add_node("pdf", NodeKind::PdfGenerator { filename: None });
    graph.add_edge("in", "pdf");

    let result = harness.engine.execute(&graph, "hello").await.unwrap();
    assert_eq!(result, NO_RESULT_FALLBACK);
    let renders = harness.recorder.renders.lock().unwrap();
    assert_eq!(renders[0].0, "No result was produced by the workflow.");
    assert_eq!(renders[0].1, "report.pdf");
}

#[tokio::test]
async fn first_entry_node_wins_when_several_exist() {
    let harness = Harness::new();
    let mut graph = Graph::new();
    graph.add_node("first", NodeKind::QueryIntake);
    graph.add_node("second", NodeKind::QueryIntake);
    graph.add_node("llm", llm_node());
    graph.add_edge("first", "llm");
    graph.add_edge("second", "second");

    let result = harness.engine.execute(&graph, "hello").await.unwrap();
    assert_eq!(result, "the model's answer");
}
