use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use alumni_common::db::{DbPoolError, ProfileFetchError, create_pool_from_url, fetch_profiles};
use alumni_common::logging::{LogSettings, init_tracing};
use alumni_common::recommend::{
    SimilarityMatrix, TfidfSpace, build_feature_documents, load_config_from_env,
};
use alumni_common::{Profile, RecommendError, ScoredProfile, rank};
use clap::{Parser, Subcommand};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    name = "alumni-recommend",
    about = "Rank alumni by profile similarity, offline"
)]
struct Cli {
    /// JSON array of profiles; takes precedence over the database
    #[arg(long, global = true)]
    profiles: Option<PathBuf>,

    /// PostgreSQL connection string, used when no --profiles file is given
    #[arg(long, env = "DATABASE_URL", global = true, hide_env_values = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Recommendations for one alumnus, best first
    Rank {
        #[arg(long)]
        target: i64,

        /// Defaults to ALUMNI_RECOMMEND_TOP_K, capped at ALUMNI_RECOMMEND_MAX_TOP_K
        #[arg(long, allow_negative_numbers = true)]
        top_k: Option<i64>,

        /// Print similarity scores alongside ids
        #[arg(long)]
        scores: bool,
    },
    /// Pairwise cosine similarity for the whole batch
    Matrix,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("no profile source: pass --profiles or set DATABASE_URL")]
    NoSource,
    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("{} is not a JSON array of profiles: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Pool(#[from] DbPoolError),
    #[error(transparent)]
    Fetch(#[from] ProfileFetchError),
    #[error(transparent)]
    Recommend(#[from] RecommendError),
    #[error("failed to write output: {0}")]
    Output(#[from] serde_json::Error),
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(untagged)]
enum RankOutput {
    Ids(Vec<i64>),
    Scored(Vec<ScoredProfile>),
}

#[derive(Debug, PartialEq, Serialize)]
struct MatrixOutput {
    ids: Vec<i64>,
    scores: Vec<Vec<f64>>,
}

fn read_profiles(path: &Path) -> Result<Vec<Profile>, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&raw).map_err(|source| CliError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

async fn load_profiles(cli: &Cli) -> Result<Vec<Profile>, CliError> {
    if let Some(path) = &cli.profiles {
        return read_profiles(path);
    }

    let url = cli.database_url.as_deref().ok_or(CliError::NoSource)?;
    let pool = create_pool_from_url(url)?;
    Ok(fetch_profiles(&pool).await?)
}

fn rank_output(
    target: i64,
    profiles: &[Profile],
    top_k: usize,
    with_scores: bool,
) -> Result<RankOutput, CliError> {
    let ranked = rank(target, profiles, top_k)?;

    Ok(if with_scores {
        RankOutput::Scored(ranked)
    } else {
        RankOutput::Ids(ranked.into_iter().map(|scored| scored.id).collect())
    })
}

fn similarity_matrix(profiles: &[Profile]) -> MatrixOutput {
    let space = TfidfSpace::fit(&build_feature_documents(profiles));
    let matrix = SimilarityMatrix::from_space(&space);

    MatrixOutput {
        ids: profiles.iter().map(|p| p.id).collect(),
        scores: (0..matrix.size())
            .filter_map(|row| matrix.row(row).map(<[f64]>::to_vec))
            .collect(),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let profiles = load_profiles(&cli).await?;
    info!(profiles = profiles.len(), "loaded batch");

    match cli.command {
        Command::Rank {
            target,
            top_k,
            scores,
        } => {
            let top_k = load_config_from_env().resolve_top_k(top_k);
            print_json(&rank_output(target, &profiles, top_k, scores)?)
        }
        Command::Matrix => print_json(&similarity_matrix(&profiles)),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing(
        env!("CARGO_PKG_NAME"),
        &LogSettings {
            default_filter: "warn".to_string(),
            stderr: true,
            ..LogSettings::from_env()
        },
    );

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("alumni-recommend: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> Vec<Profile> {
        vec![
            Profile::new(1, Some("CS"), Some("NYC"), 2020),
            Profile::new(2, Some("CS"), Some("NYC"), 2021),
            Profile::new(3, Some("Art"), Some("LA"), 2019),
        ]
    }

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "alumni-recommend-{}-{name}.json",
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn profiles_file_tolerates_missing_fields() {
        let path = write_temp(
            "sparse",
            r#"[{"id": 1, "major": "CS", "graduation_year": 2020},
                {"id": 2, "city": null, "graduation_year": 2021}]"#,
        );

        let profiles = read_profiles(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].city, None);
        assert_eq!(profiles[1].major, None);
    }

    #[test]
    fn malformed_profiles_file_names_the_path() {
        let path = write_temp("broken", r#"{"id": 1}"#);

        let err = read_profiles(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(matches!(err, CliError::Parse { .. }));
        assert!(err.to_string().contains("alumni-recommend-"));
    }

    #[test]
    fn rank_prints_ids_or_scores() {
        assert_eq!(
            rank_output(1, &batch(), 5, false).unwrap(),
            RankOutput::Ids(vec![2, 3])
        );

        let RankOutput::Scored(scored) = rank_output(1, &batch(), 1, true).unwrap() else {
            panic!("expected scored output");
        };
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].id, 2);
        assert!(scored[0].score > 0.0);
    }

    #[test]
    fn unknown_target_is_an_error() {
        assert!(matches!(
            rank_output(9, &batch(), 5, false),
            Err(CliError::Recommend(RecommendError::NotFound { target_id: 9 }))
        ));
    }

    #[test]
    fn matrix_covers_the_whole_batch() {
        let output = similarity_matrix(&batch());

        assert_eq!(output.ids, vec![1, 2, 3]);
        assert_eq!(output.scores.len(), 3);
        for (i, row) in output.scores.iter().enumerate() {
            assert_eq!(row.len(), 3);
            assert!((row[i] - 1.0).abs() < 1e-9);
        }
        assert_eq!(output.scores[0][1], output.scores[1][0]);
    }

    #[test]
    fn cli_parses_rank_subcommand() {
        let cli = Cli::try_parse_from([
            "alumni-recommend",
            "--profiles",
            "batch.json",
            "rank",
            "--target",
            "7",
            "--top-k",
            "-1",
        ])
        .unwrap();

        assert_eq!(cli.profiles, Some(PathBuf::from("batch.json")));
        match cli.command {
            Command::Rank { target, top_k, scores } => {
                assert_eq!(target, 7);
                assert_eq!(top_k, Some(-1));
                assert!(!scores);
            }
            Command::Matrix => panic!("expected rank"),
        }
    }
}
