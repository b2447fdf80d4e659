use anyhow::{Context, Result};
use ccg_derivation::{Derivation, Replayer};
use ccg_protocol::DependencyReport;
use clap::{Parser, ValueEnum};
use rkyv::ser::{serializers::AllocSerializer, Serializer};
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

const REPORT_VERSION: u32 = 1;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Json,
    Rkyv,
}

#[derive(Parser)]
#[command(author, version, about = "Replays CCG derivations and reports their dependencies")]
struct Cli {
    /// JSON file holding one derivation or an array of them
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// Defaults to stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Skip derivations the engine cannot rebuild instead of failing
    #[arg(long)]
    keep_going: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Input {
    Many(Vec<Derivation>),
    One(Derivation),
}

impl Input {
    fn into_vec(self) -> Vec<Derivation> {
        match self {
            Input::Many(all) => all,
            Input::One(one) => vec![one],
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env().init();
    let cli = Cli::parse();

    log::info!("reading derivations from {}", cli.input.display());
    let input_data = fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let derivations = serde_json::from_str::<Input>(&input_data)
        .with_context(|| format!("parsing {}", cli.input.display()))?
        .into_vec();

    let report = replay_all(&derivations, cli.keep_going)?;
    log::info!(
        "replayed {} of {} derivations",
        report.sentences.len(),
        derivations.len()
    );

    let bytes = match cli.format {
        Format::Json => serde_json::to_vec_pretty(&report)?,
        Format::Rkyv => {
            let mut serializer = AllocSerializer::<256>::default();
            serializer
                .serialize_value(&report)
                .map_err(|e| anyhow::anyhow!("rkyv serialization failed: {e:?}"))?;
            serializer.into_serializer().into_inner().to_vec()
        }
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
            log::info!("report written to {}", path.display());
        }
        None => std::io::stdout().write_all(&bytes)?,
    }
    Ok(())
}

fn replay_all(derivations: &[Derivation], keep_going: bool) -> Result<DependencyReport> {
    let mut replayer = Replayer::new();
    let mut sentences = Vec::with_capacity(derivations.len());
    for (n, derivation) in derivations.iter().enumerate() {
        match replayer.replay(derivation) {
            Ok(replayed) => sentences.push(replayed.to_sentence()),
            Err(e) if keep_going => {
                log::warn!("skipping derivation {}: {}", n, e);
            }
            Err(e) => return Err(e).with_context(|| format!("derivation {}", n)),
        }
    }
    Ok(DependencyReport {
        version: REPORT_VERSION,
        sentences,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENTENCE: &str = r#"{"binary": {"category": "S[dcl]",
        "left": {"leaf": {"word": "John", "category": "NP"}},
        "right": {"binary": {"category": "S[dcl]\\NP",
            "left": {"leaf": {"word": "likes", "category": "(S[dcl]\\NP)/NP"}},
            "right": {"leaf": {"word": "Mary", "category": "NP"}}}}}}"#;

    #[test]
    fn test_single_and_array_input() {
        let one: Input = serde_json::from_str(SENTENCE).unwrap();
        assert_eq!(one.into_vec().len(), 1);

        let many: Input = serde_json::from_str(&format!("[{SENTENCE}, {SENTENCE}]")).unwrap();
        assert_eq!(many.into_vec().len(), 2);
    }

    #[test]
    fn test_report_round_trips_through_rkyv() {
        let derivations = serde_json::from_str::<Input>(SENTENCE).unwrap().into_vec();
        let report = replay_all(&derivations, false).unwrap();
        assert_eq!(report.sentences[0].dependencies.len(), 2);

        let mut serializer = AllocSerializer::<256>::default();
        serializer.serialize_value(&report).unwrap();
        let bytes = serializer.into_serializer().into_inner();
        let archived = rkyv::check_archived_root::<DependencyReport>(&bytes).unwrap();
        assert_eq!(archived.version, REPORT_VERSION);
        assert_eq!(archived.sentences.len(), 1);
    }

    #[test]
    fn test_keep_going_skips_failures() {
        let bad = Derivation::binary("S", Derivation::leaf("a", "NP"), Derivation::leaf("b", "NP"));
        let good = serde_json::from_str::<Input>(SENTENCE).unwrap().into_vec();
        let derivations = vec![bad, good[0].clone()];

        assert!(replay_all(&derivations, false).is_err());
        let report = replay_all(&derivations, true).unwrap();
        assert_eq!(report.sentences.len(), 1);
    }
}
