//! Subgraph of the significant terms of an enrichment table
//!
//! `cargo run --example enrichment <INDEX> <TABLE> [MAX_P_VALUE] [CATEGORY]`
//!
//! `TABLE` is a g:Profiler CSV or an Enrichr TSV export. `CATEGORY` is a
//! regex matched against the source column, e.g. `GO:BP`.
use tracing::Level;
use tracing_subscriber::EnvFilter;

use genescape::report::SubgraphExport;
use genescape::targets::enrichment::{read_enrichment, EnrichmentFilter};
use genescape::{GoError, GoResult, Ontology};

fn run(
    index: &str,
    table: &str,
    max_p_value: Option<&str>,
    category: Option<&str>,
) -> GoResult<i32> {
    let ontology = Ontology::from_index_file(index)?;
    let table = read_enrichment(table)?;

    let mut filter = EnrichmentFilter::new();
    if let Some(max) = max_p_value {
        let max: f64 = max
            .parse()
            .map_err(|_| GoError::InvalidInput(format!("invalid p-value {max}")))?;
        filter = filter.with_max_p_value(max);
    }
    if let Some(pattern) = category {
        filter = filter.with_category(pattern)?;
    }

    for row in table.selected(&filter) {
        let fold = row
            .fold_enrichment()
            .map_or_else(|| "-".to_string(), |fold| format!("{fold:.2}"));
        eprintln!("# {}\t{}\t{:e}\t{fold}", row.term_id, row.name, row.p_value);
    }

    let result = ontology.query(&table.query_params(&filter))?;
    for message in result.messages() {
        eprintln!("# {message}");
    }
    println!("{}", SubgraphExport::new(&result, ontology.index())?.to_json()?);
    Ok(result.exit_code())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        println!("Usage: enrichment <INDEX> <TABLE> [MAX_P_VALUE] [CATEGORY]");
        return;
    }

    let max_p_value = args.get(3).map(String::as_str);
    let category = args.get(4).map(String::as_str);
    match run(&args[1], &args[2], max_p_value, category) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(2);
        }
    }
}
