use std::env;
use std::io::Write;
use clap::Parser;
use log::info;
use std::time::Instant;

use amplikit_classify::nbc::{classify_batch, NbcIndex, DEFAULT_BOOT_ITERS, DEFAULT_MIN_WORDS};
use amplikit_classify::ClassifyError;
use amplikit_io::out_writer;
use amplikit_seq::sequence::{annotation_tax, load_sequences};

#[derive(Parser, Debug)]
#[clap(name = "nbc", version, author)]
#[clap(about = "Assign taxonomy to amplicon reads with a Naive Bayesian classifier", long_about = None)]
struct Args {
    /// input file with query reads: FASTA or FASTQ format, gzip'ed or not
    #[clap(long, short='i')]
    input: String,
    /// reference database: FASTA with ;tax=...; annotations
    #[clap(long)]
    db: String,
    /// output table, one line per query
    #[clap(long, short='t', default_value = "stdout")]
    tabbedout: String,
    /// report only the rank prefix whose confidence reaches this cutoff
    #[clap(long, short='c', default_value_t = 0.8)]
    cutoff: f64,
    /// number of bootstrap iterations per strand
    #[clap(long, default_value_t = DEFAULT_BOOT_ITERS)]
    boot_iters: usize,
    /// lower bound on the number of words resampled per bootstrap iteration
    #[clap(long, default_value_t = DEFAULT_MIN_WORDS)]
    min_words: usize,
    /// worker threads: 1 = sequential, 0 = sized by the host
    #[clap(long, default_value_t = 1)]
    threads: usize,
    /// be more verbose and log program actions on the screen
    #[clap(long, short='v', action)]
    verbose: bool,
}

pub fn main() -> Result<(), ClassifyError> {

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            e.print().expect("can't print the usage message");
            std::process::exit(code);
        }
    };
    unsafe {
        if env::var("RUST_LOG").is_err() { env::set_var("RUST_LOG", "info") }
        if args.verbose { env::set_var("RUST_LOG", "debug"); }
    }
    env_logger::init();

    // ---------- build the taxonomy tree from the reference database ----------
    let references = load_sequences(&args.db)?;
    let taxonomies: Vec<String> = references
        .iter()
        .map(|seq| annotation_tax(seq.description()).unwrap_or("").to_string())
        .collect();
    if taxonomies.iter().all(|tax| tax.is_empty()) {
        return Err(ClassifyError::NoReferenceTaxonomies { file_name: args.db });
    }
    let index = NbcIndex::build(&references, &taxonomies);

    // ---------- classify the queries ----------
    let queries = load_sequences(&args.input)?;
    let start = Instant::now();
    let hits = classify_batch(&index, &queries, args.boot_iters, args.min_words, args.threads);
    info!("{} queries classified in {:?}", queries.len(), start.elapsed());

    let mut out_file = out_writer(&args.tabbedout, false);
    for (query, hit) in queries.iter().zip(hits.iter()) {
        if hit.is_none() {
            writeln!(out_file, "{}\t*\t+\t*", query.id())?;
            continue;
        }
        let annotated: Vec<String> = hit
            .ranks
            .iter()
            .zip(hit.confidences.iter())
            .map(|(rank, conf)| format!("{}({:.2})", rank, conf))
            .collect();
        let n_passed = hit.confidences.iter().take_while(|&&conf| conf >= args.cutoff).count();
        let passed = if n_passed == 0 {
            String::from("*")
        } else {
            hit.ranks[..n_passed].join(",")
        };
        writeln!(out_file, "{}\t{}\t{}\t{}", query.id(), annotated.join(","), hit.strand, passed)?;
    }
    out_file.flush()?;

    Ok(())
}
