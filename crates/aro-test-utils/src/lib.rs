//! Test doubles shared across the workspace
//!
//! Deterministic stand-ins for every boundary the pipeline touches:
//! - [`ScriptedCompletion`] / [`RoutedCompletion`] for text generation
//! - [`StaticSearch`] / [`UnavailableSearch`] for document retrieval
//! - [`RecordingStore`] / [`FailingStore`] for relation storage
//! - [`ScriptedRuntime`] for the sandbox container runtime

#![allow(missing_docs)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use aro_core::{
    CompletionError, DocumentSearch, Relation, RelationStore, SearchError, StoreError,
    TextCompletion,
};
use aro_sandbox::{ContainerRuntime, RuntimeFailure, RESULTS_FILENAME};

/// Completion fake replaying a fixed queue of responses
///
/// Pops one response per call in order and records every prompt it saw.
/// An exhausted queue is an API error, which makes over-consumption loud.
pub struct ScriptedCompletion {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    #[must_use]
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// All prompts received so far, in call order
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Number of scripted responses not yet consumed
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl TextCompletion for ScriptedCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| CompletionError::Api("scripted responses exhausted".to_string()))
    }
}

/// Completion fake routing prompts to responses by substring
///
/// The first route whose pattern the prompt contains wins; unmatched
/// prompts get the default response. Useful for full-pipeline runs where
/// each stage's prompt carries a distinctive phrase.
pub struct RoutedCompletion {
    routes: Vec<(String, String)>,
    default: String,
    prompts: Mutex<Vec<String>>,
}

impl RoutedCompletion {
    #[must_use]
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            routes: Vec::new(),
            default: default.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Add a substring route; earlier routes take precedence
    #[must_use]
    pub fn route(mut self, pattern: impl Into<String>, response: impl Into<String>) -> Self {
        self.routes.push((pattern.into(), response.into()));
        self
    }

    /// All prompts received so far, in call order
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Whether any received prompt contains the given substring
    #[must_use]
    pub fn saw_prompt_containing(&self, needle: &str) -> bool {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .any(|p| p.contains(needle))
    }
}

#[async_trait::async_trait]
impl TextCompletion for RoutedCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let response = self
            .routes
            .iter()
            .find(|(pattern, _)| prompt.contains(pattern))
            .map_or(&self.default, |(_, response)| response);
        Ok(response.clone())
    }
}

/// Search fake returning a fixed document list for every query
pub struct StaticSearch {
    documents: Vec<String>,
}

impl StaticSearch {
    #[must_use]
    pub fn new<I, S>(documents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            documents: documents.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait::async_trait]
impl DocumentSearch for StaticSearch {
    async fn search(&self, _query: &str) -> Result<Vec<String>, SearchError> {
        Ok(self.documents.clone())
    }
}

/// Search fake that always reports a missing index
#[derive(Debug, Default)]
pub struct UnavailableSearch;

#[async_trait::async_trait]
impl DocumentSearch for UnavailableSearch {
    async fn search(&self, _query: &str) -> Result<Vec<String>, SearchError> {
        Err(SearchError::NotAvailable("no index for tests".to_string()))
    }
}

/// Relation store fake capturing every stored batch
#[derive(Debug, Default)]
pub struct RecordingStore {
    stored: Mutex<Vec<Relation>>,
}

impl RecordingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All relations stored so far
    #[must_use]
    pub fn stored(&self) -> Vec<Relation> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RelationStore for RecordingStore {
    async fn store(&self, relations: &[Relation]) -> Result<(), StoreError> {
        self.stored.lock().unwrap().extend_from_slice(relations);
        Ok(())
    }
}

/// Relation store fake that always fails
#[derive(Debug, Default)]
pub struct FailingStore;

#[async_trait::async_trait]
impl RelationStore for FailingStore {
    async fn store(&self, _relations: &[Relation]) -> Result<(), StoreError> {
        Err(StoreError::WriteFailed("store down for tests".to_string()))
    }
}

/// What the scripted container runtime does during its run phase
#[derive(Debug, Clone)]
pub enum RunBehavior {
    /// Write the given JSON as the results artifact
    WriteResults(String),
    /// Exit cleanly without producing an artifact
    WriteNothing,
    /// Fail with a message
    Fail(String),
}

/// Container runtime fake with a scripted build and run phase
pub struct ScriptedRuntime {
    build_error: Option<String>,
    run_behavior: RunBehavior,
}

impl ScriptedRuntime {
    /// A runtime whose run writes the given results artifact
    #[must_use]
    pub fn succeeding(results_json: impl Into<String>) -> Self {
        Self {
            build_error: None,
            run_behavior: RunBehavior::WriteResults(results_json.into()),
        }
    }

    /// A runtime whose build phase fails
    #[must_use]
    pub fn failing_build(message: impl Into<String>) -> Self {
        Self {
            build_error: Some(message.into()),
            run_behavior: RunBehavior::WriteNothing,
        }
    }

    /// A runtime whose run phase fails
    #[must_use]
    pub fn failing_run(message: impl Into<String>) -> Self {
        Self {
            build_error: None,
            run_behavior: RunBehavior::Fail(message.into()),
        }
    }

    /// A runtime that runs cleanly but leaves no artifact behind
    #[must_use]
    pub fn silent() -> Self {
        Self {
            build_error: None,
            run_behavior: RunBehavior::WriteNothing,
        }
    }
}

#[async_trait::async_trait]
impl ContainerRuntime for ScriptedRuntime {
    async fn build(&self, _workspace: &Path, _image_tag: &str) -> Result<(), RuntimeFailure> {
        match &self.build_error {
            Some(msg) => Err(RuntimeFailure::new(msg.clone())),
            None => Ok(()),
        }
    }

    async fn run(&self, workspace: &Path, _image_tag: &str) -> Result<(), RuntimeFailure> {
        match &self.run_behavior {
            RunBehavior::WriteResults(json) => {
                std::fs::write(workspace.join(RESULTS_FILENAME), json)
                    .map_err(|e| RuntimeFailure::new(e.to_string()))?;
                Ok(())
            }
            RunBehavior::WriteNothing => Ok(()),
            RunBehavior::Fail(msg) => Err(RuntimeFailure::new(msg.clone())),
        }
    }

    async fn remove_image(&self, _image_tag: &str) {}
}
