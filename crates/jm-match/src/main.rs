use std::{
    io::Read,
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use clap::Parser;
use dotenvy::dotenv;
use jm_common::{
    JobRecord,
    api::{MatchRequest, MatchResponse},
    embedding::{EmbeddingConfig, EmbeddingConfigError, create_embedder},
    logging::{init_tracing_subscriber, install_tracing_panic_hook},
    matching::{CancellationFlag, MatchError, MatchingEngine, MatchingEngineConfig},
};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "jm-match",
    about = "Rank a job corpus against a match request and print the result as JSON"
)]
struct Cli {
    /// JSON array of job records
    #[arg(long, env = "JM_JOBS_PATH")]
    jobs: PathBuf,

    /// JSON match request (`-` reads stdin)
    #[arg(long, default_value = "-")]
    request: PathBuf,

    /// Embedding backend: hash | none (overrides JM_EMBEDDER)
    #[arg(long)]
    embedder: Option<String>,

    /// Embedding dimension (overrides JM_EMBEDDING_DIMENSION)
    #[arg(long)]
    dimension: Option<usize>,

    /// Skip the query embedding cache
    #[arg(long, default_value_t = false)]
    no_cache: bool,

    /// Worker threads for scoring (overrides JM_MAX_CONCURRENCY)
    #[arg(long)]
    max_concurrency: Option<usize>,

    /// Cancel scoring after this many milliseconds and return partial results
    #[arg(long)]
    deadline_ms: Option<u64>,

    /// Pretty-print the response
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

fn embedding_config(args: &Cli) -> Result<EmbeddingConfig, EmbeddingConfigError> {
    let mut config = EmbeddingConfig::from_env()?;
    if let Some(backend) = args.embedder.as_deref() {
        config.backend = backend.parse()?;
    }
    if let Some(dimension) = args.dimension {
        config.dimension = dimension;
    }
    if args.no_cache {
        config.cache_enabled = false;
    }
    config.validate()?;
    Ok(config)
}

fn engine_config(args: &Cli) -> Result<MatchingEngineConfig, MatchError> {
    let mut config = MatchingEngineConfig::from_env()?;
    if let Some(max_concurrency) = args.max_concurrency {
        config.max_concurrency = max_concurrency.max(1);
    }
    Ok(config)
}

fn read_input(path: &Path) -> std::io::Result<String> {
    if path.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        Ok(raw)
    } else {
        std::fs::read_to_string(path)
    }
}

fn load_jobs(path: &Path) -> Result<Vec<JobRecord>, Box<dyn std::error::Error>> {
    let raw = read_input(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Trip `cancel` once `deadline` elapses. The timer thread is detached.
fn arm_deadline(cancel: &CancellationFlag, deadline: Duration) {
    let cancel = cancel.clone();
    thread::spawn(move || {
        thread::sleep(deadline);
        cancel.cancel();
    });
}

fn execute(
    args: &Cli,
    jobs: &[JobRecord],
    request: &MatchRequest,
) -> Result<MatchResponse, Box<dyn std::error::Error>> {
    let embedder = create_embedder(&embedding_config(args)?)?;
    let engine = MatchingEngine::new(engine_config(args)?, embedder)?;

    let cancel = CancellationFlag::new();
    if let Some(ms) = args.deadline_ms {
        arm_deadline(&cancel, Duration::from_millis(ms));
    }

    let outcome = engine.rank_with_map(jobs, &request.query, &request.weights, &cancel)?;
    if outcome.partial {
        warn!(returned = outcome.results.len(), "deadline reached; response is partial");
    }

    Ok(MatchResponse::from_outcome(
        outcome,
        engine.embedder(),
        request.limit,
    ))
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_tracing_subscriber("jm-match");
    install_tracing_panic_hook("jm-match");

    let args = Cli::parse();
    if args.jobs == args.request && args.jobs.as_os_str() == "-" {
        return Err("--jobs and --request cannot both read stdin".into());
    }

    let jobs = load_jobs(&args.jobs)?;
    let request = MatchRequest::from_json_str(&read_input(&args.request)?)?;
    info!(jobs = jobs.len(), "loaded job corpus");

    let response = execute(&args, &jobs, &request)?;
    if response.is_empty() {
        info!(excluded = response.excluded, "no jobs matched the request");
    }
    let body = if args.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{body}");

    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("jm-match failed: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jm_common::{
        RemoteCategory,
        embedding::EmbedderBackend,
        matching::SimilaritySource,
    };

    fn with_env(vars: &[(&str, Option<&str>)], f: impl FnOnce()) {
        use std::sync::Mutex;
        static ENV_GUARD: Mutex<()> = Mutex::new(());
        let _guard = ENV_GUARD.lock().unwrap_or_else(|e| e.into_inner());

        let prev: Vec<(String, Option<String>)> = vars
            .iter()
            .map(|(key, value)| {
                let previous = std::env::var(key).ok();
                match value {
                    Some(v) => unsafe { std::env::set_var(key, v) },
                    None => unsafe { std::env::remove_var(key) },
                }
                (key.to_string(), previous)
            })
            .collect();

        f();

        for (key, previous) in prev {
            if let Some(v) = previous {
                unsafe { std::env::set_var(&key, v) };
            } else {
                unsafe { std::env::remove_var(&key) };
            }
        }
    }

    const CLEAN_ENV: [(&str, Option<&str>); 5] = [
        ("JM_EMBEDDER", None),
        ("JM_EMBEDDING_DIMENSION", None),
        ("JM_EMBEDDING_CACHE", None),
        ("JM_MAX_CONCURRENCY", None),
        ("JM_MISSING_COMPONENT_POLICY", None),
    ];

    fn args(extra: &[&str]) -> Cli {
        let mut argv = vec!["jm-match", "--jobs", "jobs.json"];
        argv.extend_from_slice(extra);
        Cli::parse_from(argv)
    }

    fn corpus() -> Vec<JobRecord> {
        vec![
            JobRecord {
                id: "job-1".into(),
                title: "Python Engineer".into(),
                description: "remote python engineer for data tooling".into(),
                required_skills: Some(vec!["python".into(), "sql".into()]),
                remote_category: Some(RemoteCategory::Remote),
                ..JobRecord::default()
            },
            JobRecord {
                id: "job-2".into(),
                title: "Contract Designer".into(),
                description: "figma work on site".into(),
                job_type: Some("contract".into()),
                ..JobRecord::default()
            },
            JobRecord {
                id: "job-3".into(),
                title: "Java Developer".into(),
                description: "spring services".into(),
                required_skills: Some(vec!["java".into()]),
                remote_category: Some(RemoteCategory::OnSite),
                ..JobRecord::default()
            },
        ]
    }

    fn request(raw: &str) -> MatchRequest {
        MatchRequest::from_json_str(raw).unwrap()
    }

    #[test]
    fn cli_flags_override_environment() {
        with_env(
            &[
                ("JM_EMBEDDER", Some("hash")),
                ("JM_EMBEDDING_DIMENSION", Some("128")),
                ("JM_EMBEDDING_CACHE", None),
            ],
            || {
                let from_env = embedding_config(&args(&[])).unwrap();
                assert_eq!(from_env.backend, EmbedderBackend::Hash);
                assert_eq!(from_env.dimension, 128);
                assert!(from_env.cache_enabled);

                let overridden =
                    embedding_config(&args(&["--embedder", "none", "--dimension", "32", "--no-cache"]))
                        .unwrap();
                assert_eq!(overridden.backend, EmbedderBackend::Disabled);
                assert_eq!(overridden.dimension, 32);
                assert!(!overridden.cache_enabled);
            },
        );
    }

    #[test]
    fn unknown_backend_is_rejected() {
        with_env(&CLEAN_ENV, || {
            let err = embedding_config(&args(&["--embedder", "word2vec"])).unwrap_err();
            assert_eq!(err, EmbeddingConfigError::UnknownBackend("word2vec".into()));
        });
    }

    #[test]
    fn ranks_with_keyword_fallback_when_embeddings_are_off() {
        with_env(&CLEAN_ENV, || {
            let response = execute(
                &args(&["--embedder", "none", "--max-concurrency", "2"]),
                &corpus(),
                &request(
                    r#"{
                        "query": {
                            "text": "remote python engineer",
                            "skills": ["python"],
                            "preferred_remote": ["remote"],
                            "hard_exclude_job_types": ["contract"]
                        },
                        "limit": 5
                    }"#,
                ),
            )
            .unwrap();

            assert_eq!(response.similarity_source, SimilaritySource::Keyword);
            assert_eq!(response.embedder, "none");
            assert_eq!(response.excluded, 1);
            assert!(!response.partial);
            let ids: Vec<&str> = response.results.iter().map(|r| r.job_id.as_str()).collect();
            assert_eq!(ids, vec!["job-1", "job-3"]);
        });
    }

    #[test]
    fn limit_and_weights_come_from_the_request() {
        with_env(&CLEAN_ENV, || {
            let response = execute(
                &args(&[]),
                &corpus(),
                &request(
                    r#"{
                        "query": {"skills": ["java"]},
                        "weights": {"skills": 1, "bogus": 3},
                        "limit": 1
                    }"#,
                ),
            )
            .unwrap();

            assert_eq!(response.results.len(), 1);
            assert_eq!(response.results[0].job_id, "job-3");
            assert_eq!(response.candidates, 3);
            assert_eq!(response.embedder, "hash");
        });
    }

    #[test]
    fn fully_excluded_corpus_gives_an_empty_response() {
        with_env(&CLEAN_ENV, || {
            let response = execute(
                &args(&[]),
                &corpus(),
                &request(r#"{"query": {"hard_exclude_job_types": ["contract"], "hard_exclude_locations": []}}"#),
            )
            .unwrap();
            assert!(!response.is_empty());

            let everything_excluded = execute(
                &args(&[]),
                &corpus()[1..2],
                &request(r#"{"query": {"hard_exclude_job_types": ["Contract"]}}"#),
            )
            .unwrap();
            assert!(everything_excluded.is_empty());
            assert_eq!(everything_excluded.excluded, 1);
        });
    }

    #[test]
    fn negative_weight_fails_the_run() {
        with_env(&CLEAN_ENV, || {
            let err = execute(
                &args(&[]),
                &corpus(),
                &request(r#"{"query": {}, "weights": {"salary": -1}}"#),
            )
            .unwrap_err();

            assert!(err.to_string().contains("salary"));
        });
    }
}
