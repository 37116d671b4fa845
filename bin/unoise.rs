use std::env;
use clap::Parser;
use log::info;
use std::time::Instant;

use amplikit_denoise::chimera::{flag_chimeras, DEFAULT_MIN_ABSKEW};
use amplikit_denoise::unoise::{unoise, DEFAULT_ALPHA, DEFAULT_MIN_SIZE};
use amplikit_denoise::DenoiseError;
use amplikit_seq::sequence::{load_sequences, Sequence, SequenceReporter, WriteFasta};

#[derive(Parser, Debug)]
#[clap(name = "unoise", version, author)]
#[clap(about = "Denoise dereplicated amplicon reads into zero-radius OTUs", long_about = None)]
struct Args {
    /// input file with dereplicated, ;size=N;-annotated reads: FASTA format, gzip'ed or not
    #[clap(long, short='i')]
    input: String,
    /// output file with the denoised, chimera-filtered ZOTU sequences
    #[clap(long, short='z', default_value = "stdout")]
    zotus: String,
    /// the UNOISE3 alpha parameter: larger values merge more aggressively
    #[clap(long, short='a', default_value_t = DEFAULT_ALPHA)]
    alpha: f64,
    /// reads below this abundance never seed a cluster
    #[clap(long, short='m', default_value_t = DEFAULT_MIN_SIZE)]
    minsize: u64,
    /// minimum abundance skew of a chimera parent over its candidate child
    #[clap(long, default_value_t = DEFAULT_MIN_ABSKEW)]
    min_skew: f64,
    /// worker threads for the chimera stage: 1 = sequential, 0 = sized by the host
    #[clap(long, default_value_t = 1)]
    threads: usize,
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

    // ---------- load the dereplicated reads ----------
    let reads = load_sequences(&args.input)?;
    if reads.is_empty() {
        return Err(DenoiseError::NoSequencesRead { file_name: args.input });
    }

    // ---------- denoise, then drop the chimeras ----------
    let start = Instant::now();
    let centroids = unoise(reads, args.alpha, args.minsize);
    let chimeric = flag_chimeras(&centroids, args.min_skew, args.threads);

    // ---------- relabel the survivors as Zotu1, Zotu2, ... ----------
    let mut writer = WriteFasta::new(Some(args.zotus), 0, false);
    let mut n_zotus = 0usize;
    for (centroid, &is_chimeric) in centroids.iter().zip(chimeric.iter()) {
        if is_chimeric { continue; }
        n_zotus += 1;
        let label = format!("Zotu{}", n_zotus);
        writer.report(&Sequence::from_attrs(label, centroid.seq.seq().to_vec()))?;
    }
    writer.flush()?;
    info!("{} ZOTUs written in {:?}", n_zotus, start.elapsed());

    Ok(())
}
