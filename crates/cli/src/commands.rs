use anyhow::{Context, Result};
use nayose_core::{MatcherConfig, SimilarityResult};
use nayose_import::{
    annotate, extract_master_data, import::import_source, read_ledger_file, write_ledger,
    LedgerTable, MasterData, NameKind, NameMatcher,
};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct SuggestOutput<'a> {
    query: &'a str,
    kind: NameKind,
    exact: bool,
    candidates: Vec<SimilarityResult>,
}

/// Reads the TOML config when given, then applies command-line overrides.
pub fn load_config(
    path: Option<&Path>,
    top_n: Option<usize>,
    threshold: Option<f64>,
) -> Result<MatcherConfig> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            MatcherConfig::from_toml(&content)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => MatcherConfig::default(),
    };

    if let Some(top_n) = top_n {
        config.top_n = top_n;
    }
    if let Some(threshold) = threshold {
        config.threshold = threshold;
    }
    config.validate().context("invalid matcher options")?;

    if (config.weight_sum() - 1.0).abs() > 1e-9 {
        tracing::warn!(
            sum = config.weight_sum(),
            "matcher weights do not sum to 1.0; scores may leave [0, 1]"
        );
    }
    tracing::debug!(?config, "matcher config loaded");
    Ok(config)
}

fn load_master(paths: &[PathBuf]) -> Result<MasterData> {
    let tables = paths
        .iter()
        .map(|p| read_ledger_file(p).with_context(|| format!("reading master {}", p.display())))
        .collect::<Result<Vec<LedgerTable>>>()?;
    let master = extract_master_data(&tables);
    tracing::info!(
        files = paths.len(),
        partners = master.partners.len(),
        departments = master.departments.len(),
        "master lists built"
    );
    Ok(master)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

pub fn score(config: &MatcherConfig, a: &str, b: &str) -> Result<()> {
    let matcher = NameMatcher::new(*config);
    print_json(&matcher.similarity(a, b))
}

pub fn suggest(
    config: &MatcherConfig,
    query: &str,
    master_paths: &[PathBuf],
    kind: NameKind,
) -> Result<()> {
    let master = load_master(master_paths)?;
    let names = master.get(kind);
    let matcher = NameMatcher::new(*config);

    let exact = names.contains(query);
    let candidates = if exact {
        Vec::new()
    } else {
        matcher.suggest(query, names)
    };

    print_json(&SuggestOutput {
        query,
        kind,
        exact,
        candidates,
    })
}

pub fn reconcile(
    config: &MatcherConfig,
    source: &Path,
    master_paths: &[PathBuf],
    output: Option<&Path>,
) -> Result<()> {
    let data =
        std::fs::read(source).with_context(|| format!("reading source {}", source.display()))?;
    let mut table =
        import_source(&data).with_context(|| format!("parsing source {}", source.display()))?;
    tracing::info!(rows = table.len(), "source export loaded");

    let master = load_master(master_paths)?;
    let matcher = NameMatcher::new(*config);
    annotate(&mut table, &master, &matcher).context("annotating source rows")?;

    match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            write_ledger(&table, std::io::BufWriter::new(file))?;
            tracing::info!(path = %path.display(), "annotated export written");
        }
        None => write_ledger(&table, std::io::stdout().lock())?,
    }
    Ok(())
}
