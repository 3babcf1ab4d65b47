//! Compares the subgraphs of two gene lists
//!
//! `cargo run --example compare <INDEX> <GENES_A> <GENES_B>`
//!
//! Gene lists are comma separated, e.g. `ACAA1,CYP1A1`.
use tracing::Level;
use tracing_subscriber::EnvFilter;

use genescape::query::comparison::Comparison;
use genescape::{GoResult, Ontology, QueryParams};

fn genes(list: &str) -> Vec<&str> {
    list.split(',').map(str::trim).collect()
}

fn run(index: &str, lhs: &str, rhs: &str) -> GoResult<()> {
    let ontology = Ontology::from_index_file(index)?;
    let lhs = ontology.query(&QueryParams::new(genes(lhs)).with_min_coverage(1))?;
    let rhs = ontology.query(&QueryParams::new(genes(rhs)).with_min_coverage(1))?;

    let comparison = Comparison::new(&lhs, &rhs);
    println!("{comparison}");

    let common = comparison.common_subgraph(ontology.graph());
    for (parent, child) in common.edges() {
        println!("{parent}\t{child}");
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 4 {
        println!("Usage: compare <INDEX> <GENES_A> <GENES_B>");
        return;
    }
    if let Err(err) = run(&args[1], &args[2], &args[3]) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
