//! Builds a genescape index from `go-basic.obo` and a GAF file
//!
//! `cargo run --release --example build_index <OBO> <GAF> <OUTPUT> [--synonyms]`
//!
//! The output is gzip-compressed if its name ends with `.gz`.
use tracing::Level;
use tracing_subscriber::EnvFilter;

use genescape::Ontology;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        println!("Usage: build_index <OBO> <GAF> <OUTPUT> [--synonyms]");
        return;
    }
    let include_synonyms = args.iter().any(|arg| arg == "--synonyms");

    let ontology = match Ontology::from_standard(&args[1], &args[2], include_synonyms) {
        Ok(ontology) => ontology,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };
    println!("{}", ontology.index().stats());

    match ontology.save(&args[3]) {
        Ok(()) => println!("Saved index to {}", args[3]),
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}
