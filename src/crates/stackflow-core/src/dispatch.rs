//! Per-node-type behaviors.
//!
//! `dispatch` maps a node's [`NodeKind`] onto its behavior: read the
//! configuration the kind carries, read what earlier nodes left in the
//! execution context, call at most one collaborator, and write the outcome
//! back into the context. Nodes and edges are never touched.
//!
//! Collaborator failures stop here. Whatever a backend returns as an error is
//! folded into the corresponding context field as an `Error: ...` string so the
//! walk can keep going; a degraded context is preferable to an aborted run.

use crate::collaborators::{
    Collaborators, InferenceRequest, DEFAULT_MODEL, DEFAULT_PROMPT, DEFAULT_REPORT_FILENAME,
    EMPTY_RESULT_PLACEHOLDER,
};
use crate::context::ExecutionContext;
use crate::graph::{Node, NodeKind};
use tracing::{debug, warn};

pub(crate) async fn dispatch(node: &Node, ctx: &mut ExecutionContext, services: &Collaborators) {
    match &node.kind {
        // Entry marker only.
        NodeKind::QueryIntake => {}

        NodeKind::KnowledgeBase { collection } => {
            let Some(collection) = collection.as_deref() else {
                debug!(node = %node.id, "knowledge base node has no collection, skipping");
                return;
            };
            match services.documents.retrieve(&ctx.query, collection).await {
                Ok(text) => ctx.kb_context = Some(text),
                Err(e) => {
                    warn!(node = %node.id, error = %e, "document retrieval failed");
                    ctx.kb_context =
                        Some(format!("Error: could not retrieve documents. Details: {e}"));
                }
            }
        }

        NodeKind::WebSearch => match services.web.search(&ctx.query).await {
            Ok(text) => ctx.web_context = Some(text),
            Err(e) => {
                warn!(node = %node.id, error = %e, "web search failed");
                ctx.web_context = Some(format!("Error performing web search: {e}"));
            }
        },

        NodeKind::GitRepo { repo_url } => {
            let Some(repo_url) = repo_url.as_deref() else {
                debug!(node = %node.id, "git repo node has no repository URL, skipping");
                return;
            };
            match services.repos.fetch(repo_url).await {
                Ok(text) => ctx.repo_context = Some(text),
                Err(e) => {
                    warn!(node = %node.id, error = %e, "repository ingestion failed");
                    ctx.repo_context =
                        Some(format!("Error: could not ingest repository. Details: {e}"));
                }
            }
        }

        NodeKind::PdfGenerator { filename } => {
            let content = ctx.result.as_deref().unwrap_or(EMPTY_RESULT_PLACEHOLDER);
            let filename = filename.as_deref().unwrap_or(DEFAULT_REPORT_FILENAME);
            match services.reports.render(content, filename).await {
                Ok(outcome) => debug!(node = %node.id, outcome = %outcome, "report rendered"),
                Err(e) => warn!(node = %node.id, error = %e, "report rendering failed"),
            }
        }

        NodeKind::LlmInference { prompt, model } => {
            let request = InferenceRequest {
                prompt: prompt.clone().unwrap_or_else(|| DEFAULT_PROMPT.to_string()),
                query: ctx.query.clone(),
                doc_context: ctx.kb_context.clone(),
                repo_context: ctx.repo_context.clone(),
                web_context: ctx.web_context.clone(),
                model: model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            };
            match services.inference.infer(request).await {
                Ok(text) => ctx.result = Some(text),
                Err(e) => {
                    warn!(node = %node.id, error = %e, "inference failed");
                    ctx.result = Some(format!(
                        "Error: could not get a response from the model. Details: {e}"
                    ));
                }
            }
        }

        NodeKind::Unrecognized(label) => {
            warn!(node = %node.id, label = %label, "unrecognized node type, skipping");
        }
    }
}
