//! End-to-end pipeline runs over test doubles
//!
//! Every boundary is faked: search returns fixed chunks, completion is
//! routed by prompt content, and the sandbox runtime is scripted. The
//! orchestrator, transition table, and all nine stages are real.

use std::sync::Arc;

use aro_core::{Decision, ExecutionOutcome, PipelineError, SandboxErrorKind, SearchError};
use aro_pipeline::stages::FAILED_ANALYSIS;
use aro_pipeline::{Collaborators, ResearchPipeline, RunOutcome, StageName};
use aro_sandbox::{SandboxExecutor, WorkspaceManager};
use aro_test_utils::{
    FailingStore, RecordingStore, RoutedCompletion, ScriptedCompletion, ScriptedRuntime,
    StaticSearch, UnavailableSearch,
};

const DOCS: [&str; 2] = [
    "Transformers rely on attention over all token pairs.",
    "Sparse attention patterns reduce the quadratic cost.",
];

const PLAN_JSON: &str =
    r#"{"datasets": ["imdb"], "methodology": ["load data", "train", "evaluate"], "metrics": ["accuracy"]}"#;

const RELATIONS_JSON: &str =
    r#"[{"source_entity": "sparse attention", "relation": "reduces", "target_entity": "training cost"}]"#;

/// Routed completion covering every prompting stage
fn routed(review_answer: &str) -> RoutedCompletion {
    RoutedCompletion::new("unexpected prompt")
        .route("extract key entities", RELATIONS_JSON)
        .route(
            "senior research scientist",
            "Sparse attention reduces training cost without hurting accuracy.",
        )
        .route("meticulous lab director", PLAN_JSON)
        .route(
            "expert Python programmer",
            "```python\nimport json\njson.dump({'accuracy': 0.91}, open('results.json', 'w'))\n```",
        )
        .route("data analyst", "The accuracy clearly supports the hypothesis.")
        .route("senior scientist reviewing", review_answer)
        .route("research paper in Markdown", "# Sparse Attention\n\nFindings.")
}

fn pipeline(
    completion: Arc<dyn aro_core::TextCompletion>,
    relations: Option<Arc<dyn aro_core::RelationStore>>,
    runtime: ScriptedRuntime,
    sandbox_root: &std::path::Path,
    paper_path: &std::path::Path,
) -> ResearchPipeline {
    let collaborators = Collaborators {
        search: Arc::new(StaticSearch::new(DOCS)),
        completion,
        relations,
    };
    let executor = Arc::new(SandboxExecutor::new(
        WorkspaceManager::new(sandbox_root),
        Arc::new(runtime),
    ));
    ResearchPipeline::standard(collaborators, executor, paper_path)
}

fn stage_sequence(report: &aro_pipeline::RunReport) -> Vec<StageName> {
    report.events.iter().map(|e| e.stage).collect()
}

#[tokio::test]
async fn proceed_on_first_cycle_writes_the_paper() {
    let root = tempfile::tempdir().unwrap();
    let paper_path = root.path().join("out/paper.md");
    let completion = Arc::new(routed("proceed"));
    let store = Arc::new(RecordingStore::new());

    let pipeline = pipeline(
        completion.clone() as Arc<dyn aro_core::TextCompletion>,
        Some(store.clone() as Arc<dyn aro_core::RelationStore>),
        ScriptedRuntime::succeeding(r#"{"accuracy": 0.91}"#),
        root.path(),
        &paper_path,
    );

    let report = pipeline.run("sparse attention").await.unwrap();

    assert_eq!(report.outcome, RunOutcome::PaperCompleted);
    assert_eq!(report.state.loop_count, 0);
    assert_eq!(
        report.paper(),
        Some("# Sparse Attention\n\nFindings.")
    );
    assert_eq!(
        std::fs::read_to_string(&paper_path).unwrap(),
        "# Sparse Attention\n\nFindings."
    );

    // One pass through the chain, no redesign cycle
    assert_eq!(
        stage_sequence(&report),
        vec![
            StageName::Retrieve,
            StageName::UpdateKnowledge,
            StageName::GenerateHypothesis,
            StageName::DesignExperiment,
            StageName::SynthesizeCode,
            StageName::ExecuteSandbox,
            StageName::Analyze,
            StageName::Review,
            StageName::WritePaper,
        ]
    );

    // One relation batch per retrieved document
    let stored = store.stored();
    assert_eq!(stored.len(), DOCS.len());
    assert_eq!(stored[0].source, "sparse attention");

    // The sandbox results flowed into state unchanged
    match report.state.execution_result.as_ref().unwrap() {
        ExecutionOutcome::Completed { results } => {
            assert_eq!(results["accuracy"], serde_json::json!(0.91));
        }
        other => panic!("expected completed outcome, got {other:?}"),
    }
}

#[tokio::test]
async fn persistent_redesign_stops_at_the_retry_ceiling() {
    let root = tempfile::tempdir().unwrap();
    let paper_path = root.path().join("paper.md");

    let pipeline = pipeline(
        Arc::new(routed("redesign")),
        None,
        ScriptedRuntime::succeeding(r#"{"accuracy": 0.4}"#),
        root.path(),
        &paper_path,
    );

    let report = pipeline.run("sparse attention").await.unwrap();

    assert_eq!(report.outcome, RunOutcome::RetriesExhausted);
    assert_eq!(report.state.loop_count, aro_pipeline::MAX_LOOPS);
    assert_eq!(report.paper(), None);
    assert!(!paper_path.exists());
    assert_eq!(report.state.decision, Some(Decision::Redesign));

    let sequence = stage_sequence(&report);
    let reviews = sequence.iter().filter(|s| **s == StageName::Review).count();
    let increments = sequence
        .iter()
        .filter(|s| **s == StageName::IncrementRetry)
        .count();
    assert_eq!(reviews, 4);
    assert_eq!(increments, 3);
    assert!(!sequence.contains(&StageName::WritePaper));

    // Counter increments strictly by one per cycle
    let counter_writes: Vec<u32> = report
        .events
        .iter()
        .filter(|e| e.stage == StageName::IncrementRetry)
        .map(|e| e.update.loop_count.unwrap())
        .collect();
    assert_eq!(counter_writes, vec![1, 2, 3]);
}

#[tokio::test]
async fn build_failure_degrades_analysis_without_prompting() {
    let root = tempfile::tempdir().unwrap();
    let paper_path = root.path().join("paper.md");
    let completion = Arc::new(routed("proceed"));

    let pipeline = pipeline(
        completion.clone() as Arc<dyn aro_core::TextCompletion>,
        None,
        ScriptedRuntime::failing_build("no matching manifest for base image"),
        root.path(),
        &paper_path,
    );

    let report = pipeline.run("sparse attention").await.unwrap();

    // The failed run reached analyze as a value, not an error
    assert!(matches!(
        report.state.execution_result,
        Some(ExecutionOutcome::Failed {
            kind: SandboxErrorKind::Build,
            ..
        })
    ));
    assert_eq!(report.state.analysis.as_deref(), Some(FAILED_ANALYSIS));

    // Degraded analysis never consulted the model
    assert!(!completion.saw_prompt_containing("data analyst"));
}

#[tokio::test]
async fn missing_search_index_aborts_the_run() {
    let root = tempfile::tempdir().unwrap();
    let collaborators = Collaborators {
        search: Arc::new(UnavailableSearch),
        completion: Arc::new(routed("proceed")),
        relations: None,
    };
    let executor = Arc::new(SandboxExecutor::new(
        WorkspaceManager::new(root.path()),
        Arc::new(ScriptedRuntime::silent()),
    ));
    let pipeline =
        ResearchPipeline::standard(collaborators, executor, root.path().join("paper.md"));

    let err = pipeline.run("sparse attention").await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Retrieval(SearchError::NotAvailable(_))
    ));
}

#[tokio::test]
async fn relation_store_failure_does_not_abort() {
    let root = tempfile::tempdir().unwrap();
    let paper_path = root.path().join("paper.md");

    let pipeline = pipeline(
        Arc::new(routed("proceed")),
        Some(Arc::new(FailingStore)),
        ScriptedRuntime::succeeding(r#"{"accuracy": 0.91}"#),
        root.path(),
        &paper_path,
    );

    let report = pipeline.run("sparse attention").await.unwrap();
    assert_eq!(report.outcome, RunOutcome::PaperCompleted);
}

#[tokio::test]
async fn malformed_plan_gets_one_reprompt() {
    let root = tempfile::tempdir().unwrap();
    let paper_path = root.path().join("paper.md");

    // With no relation store the knowledge stage makes no completion
    // calls, so the scripted order is: hypothesis, design (garbage),
    // design (valid), synthesis, analysis, review, paper.
    let completion = Arc::new(ScriptedCompletion::new([
        "Sparse attention reduces training cost.",
        "I am sorry, I cannot produce JSON today.",
        PLAN_JSON,
        "print('experiment')",
        "Accuracy supports the hypothesis.",
        "proceed",
        "# Paper",
    ]));

    let pipeline = pipeline(
        completion.clone() as Arc<dyn aro_core::TextCompletion>,
        None,
        ScriptedRuntime::succeeding(r#"{"accuracy": 0.91}"#),
        root.path(),
        &paper_path,
    );

    let report = pipeline.run("sparse attention").await.unwrap();

    assert_eq!(report.outcome, RunOutcome::PaperCompleted);
    assert_eq!(completion.remaining(), 0);
    let plan = report.state.experiment_plan.as_ref().unwrap();
    assert_eq!(plan.datasets, vec!["imdb"]);
}

#[tokio::test]
async fn repeated_malformed_plans_abort_with_a_decode_error() {
    let root = tempfile::tempdir().unwrap();
    let paper_path = root.path().join("paper.md");

    let completion = Arc::new(ScriptedCompletion::new([
        "Sparse attention reduces training cost.",
        "still prose, no JSON",
        "again prose, no JSON",
    ]));

    let pipeline = pipeline(
        completion,
        None,
        ScriptedRuntime::silent(),
        root.path(),
        &paper_path,
    );

    let err = pipeline.run("sparse attention").await.unwrap_err();
    match err {
        PipelineError::GenerationParse { stage, .. } => {
            assert_eq!(stage, "design_experiment");
        }
        other => panic!("expected decode error, got {other}"),
    }
}

#[tokio::test]
async fn stage_events_reach_the_sink_in_order() {
    let root = tempfile::tempdir().unwrap();
    let paper_path = root.path().join("paper.md");

    let pipeline = pipeline(
        Arc::new(routed("proceed")),
        None,
        ScriptedRuntime::succeeding("{}"),
        root.path(),
        &paper_path,
    );

    let mut seen: Vec<StageName> = Vec::new();
    let report = pipeline
        .run_with_sink("sparse attention", |event| seen.push(event.stage))
        .await
        .unwrap();

    assert_eq!(seen, stage_sequence(&report));
    assert_eq!(seen.first(), Some(&StageName::Retrieve));
    assert_eq!(seen.last(), Some(&StageName::WritePaper));
}
