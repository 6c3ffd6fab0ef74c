use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Arg, Command, value_parser};

use aro_collab::{ingest_corpus, ChunkIndexSearch, HfCompletionClient, JsonlRelationStore};
use aro_core::AroConfig;
use aro_pipeline::{Collaborators, ResearchPipeline, RunOutcome};
use aro_sandbox::{DockerRuntime, SandboxExecutor, WorkspaceManager};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Command::new("aro")
        .version(aro_pipeline::VERSION)
        .about("Autonomous research orchestrator")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("run")
                .about("Run the research pipeline on a topic")
                .arg(
                    Arg::new("topic")
                        .long("topic")
                        .required(true)
                        .help("Research topic to investigate"),
                )
                .arg(
                    Arg::new("index-dir")
                        .long("index-dir")
                        .value_parser(value_parser!(PathBuf))
                        .help("Chunk index directory (default: chunk_index)"),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .value_parser(value_parser!(PathBuf))
                        .help("Paper output path (default: outputs/research_paper.md)"),
                )
                .arg(
                    Arg::new("sandbox-root")
                        .long("sandbox-root")
                        .value_parser(value_parser!(PathBuf))
                        .help("Root directory for sandbox workspaces"),
                ),
        )
        .subcommand(
            Command::new("ingest")
                .about("Chunk a document corpus into the search index")
                .arg(
                    Arg::new("corpus")
                        .long("corpus")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory of .txt/.md documents"),
                )
                .arg(
                    Arg::new("index")
                        .long("index")
                        .default_value("chunk_index")
                        .value_parser(value_parser!(PathBuf))
                        .help("Index directory to write chunks into"),
                ),
        );

    match cli.get_matches().subcommand() {
        Some(("run", args)) => {
            let topic = args.get_one::<String>("topic").unwrap().clone();

            let mut config = AroConfig::from_env().context("loading configuration")?;
            if let Some(dir) = args.get_one::<PathBuf>("index-dir") {
                config = config.with_index_dir(dir);
            }
            if let Some(path) = args.get_one::<PathBuf>("output") {
                config = config.with_paper_path(path);
            }
            if let Some(root) = args.get_one::<PathBuf>("sandbox-root") {
                config = config.with_sandbox_root(root);
            }

            run_pipeline(topic, config).await
        }
        Some(("ingest", args)) => {
            let corpus = args.get_one::<PathBuf>("corpus").unwrap();
            let index = args.get_one::<PathBuf>("index").unwrap();

            let written = ingest_corpus(corpus, index)
                .with_context(|| format!("ingesting corpus at {}", corpus.display()))?;
            println!("Ingested {} chunks into {}", written, index.display());
            Ok(())
        }
        _ => unreachable!("arg_required_else_help"),
    }
}

async fn run_pipeline(topic: String, config: AroConfig) -> anyhow::Result<()> {
    let collaborators = Collaborators {
        search: Arc::new(ChunkIndexSearch::new(&config.index_dir, config.retrieval_k)),
        completion: Arc::new(HfCompletionClient::new(&config)),
        relations: Some(Arc::new(JsonlRelationStore::new(&config.relations_path))),
    };
    let runtime = DockerRuntime::new(
        Duration::from_secs(config.build_timeout_secs),
        Duration::from_secs(config.run_timeout_secs),
    );
    let executor = Arc::new(SandboxExecutor::new(
        WorkspaceManager::new(&config.sandbox_root),
        Arc::new(runtime),
    ));

    let pipeline = ResearchPipeline::standard(collaborators, executor, &config.paper_path);

    println!("Researching: {}", topic);
    println!();

    let report = pipeline
        .run_with_sink(topic, |event| {
            println!("  [{}] done", event.stage);
        })
        .await?;

    println!();
    match report.outcome {
        RunOutcome::PaperCompleted => {
            println!("Paper written to {}", config.paper_path.display());
        }
        RunOutcome::RetriesExhausted => {
            println!(
                "Stopped after {} redesign cycles: maximum iterations reached",
                report.state.loop_count
            );
        }
    }
    Ok(())
}
