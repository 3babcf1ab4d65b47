//! Annotation report and subgraph of a gene list
//!
//! `cargo run --example annotate <INDEX> <ROOT> <GENE>...`
//!
//! `ROOT` is one of `ALL`, `BP`, `MF` or `CC`. A `GENE` of the form
//! `@targets.txt` reads the genes from a target list, `@-` from stdin. The
//! minimum coverage is estimated. Set `GENESCAPE_PATTERN` to filter terms by name and
//! `GENESCAPE_CSV` to print the report as CSV.
use tracing::Level;
use tracing_subscriber::EnvFilter;

use genescape::report::{AnnotationReport, SubgraphExport};
use genescape::targets::{parse_targets, read_targets, target_symbols};
use genescape::{GoResult, IndexCache, NamespaceFilter, QueryParams};

fn genes(args: &[String]) -> GoResult<Vec<String>> {
    let mut genes = Vec::new();
    for arg in args {
        match arg.strip_prefix('@') {
            Some("-") => genes.extend(target_symbols(&parse_targets(std::io::stdin().lock())?)),
            Some(path) => genes.extend(target_symbols(&read_targets(path)?)),
            None => genes.push(arg.clone()),
        }
    }
    Ok(genes)
}

fn run(index: &str, root: &str, args: &[String]) -> GoResult<i32> {
    let cache = IndexCache::new();
    let ontology = cache.get_or_load(index)?;

    let root: NamespaceFilter = root.parse()?;
    let mut params = QueryParams::new(genes(args)?).with_root(root);
    if let Ok(pattern) = std::env::var("GENESCAPE_PATTERN") {
        params = params.with_pattern(pattern);
    }

    let result = ontology.query(&params)?;
    for message in result.messages() {
        eprintln!("# {message}");
    }
    eprintln!(
        "# minimum coverage {} ({})",
        result.min_coverage(),
        if result.coverage_estimated() { "estimated" } else { "fixed" }
    );

    let report = AnnotationReport::new(&result, ontology.index())?;
    if std::env::var("GENESCAPE_CSV").is_ok() {
        print!("{}", report.to_csv()?);
    } else {
        println!("{}", report.to_json()?);
        println!("{}", SubgraphExport::new(&result, ontology.index())?.to_json()?);
    }
    Ok(result.exit_code())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        println!("Usage: annotate <INDEX> <ROOT> <GENE | @FILE | @->...");
        return;
    }

    match run(&args[1], &args[2], &args[3..]) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(2);
        }
    }
}
