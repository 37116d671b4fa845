use std::collections::HashMap;
use std::env;
use clap::Parser;
use log::info;
use std::time::Instant;

use amplikit_denoise::DenoiseError;
use amplikit_seq::sequence::{load_sequences, strip_size_annotation, Sequence, SequenceReporter, WriteFasta};

#[derive(Parser, Debug)]
#[clap(name = "derep", version, author)]
#[clap(about = "Dereplicate amplicon reads into unique sequences with ;size=N; abundances", long_about = None)]
struct Args {
    /// input file with reads: FASTA or FASTQ format, gzip'ed or not
    #[clap(long, short='i')]
    input: String,
    /// output file with the dereplicated sequences, FASTA format
    #[clap(long, short='o', default_value = "stdout")]
    output: String,
    /// be more verbose and log program actions on the screen
    #[clap(long, short='v', action)]
    verbose: bool,
}

pub fn main() -> Result<(), DenoiseError> {

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

    // ---------- load the reads ----------
    let start = Instant::now();
    let reads = load_sequences(&args.input)?;
    if reads.is_empty() {
        return Err(DenoiseError::NoSequencesRead { file_name: args.input });
    }

    // ---------- merge identical sequences, case-insensitively ----------
    let mut slot_of: HashMap<String, usize> = HashMap::new();
    let mut uniques: Vec<(Sequence, u64)> = Vec::new();
    for read in reads {
        let key = read.to_string().to_ascii_uppercase();
        // a read without a ;size=N; annotation counts as one observation
        let observed = read.size().max(1);
        match slot_of.get(&key) {
            Some(&slot) => uniques[slot].1 += observed,
            None => {
                slot_of.insert(key, uniques.len());
                uniques.push((read, observed));
            }
        }
    }
    uniques.sort_by(|a, b| b.1.cmp(&a.1));
    info!("{} unique sequences kept in {:?}", uniques.len(), start.elapsed());

    // ---------- write them back, most abundant first ----------
    let mut writer = WriteFasta::new(Some(args.output), 0, false);
    for (read, total) in &uniques {
        let label = format!("{};size={};", strip_size_annotation(read.id()), total);
        writer.report(&Sequence::from_attrs(label, read.seq().to_vec()))?;
    }
    writer.flush()?;

    Ok(())
}
