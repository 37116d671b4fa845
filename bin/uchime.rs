use std::env;
use std::io::Write;
use clap::Parser;
use log::info;

use amplikit_denoise::chimera::{flag_chimeras, DEFAULT_MIN_ABSKEW};
use amplikit_denoise::unoise::Centroid;
use amplikit_denoise::DenoiseError;
use amplikit_io::out_writer;
use amplikit_seq::sequence::{load_sequences, SequenceReporter, WriteFasta};

#[derive(Parser, Debug)]
#[clap(name = "uchime", version, author)]
#[clap(about = "Flag chimeric sequences among abundance-annotated centroids", long_about = None)]
struct Args {
    /// input file with ;size=N;-annotated centroids: FASTA format, gzip'ed or not
    #[clap(long, short='i')]
    input: String,
    /// write the non-chimeric sequences, original headers preserved, to this FASTA file
    #[clap(long)]
    output: Option<String>,
    /// write a per-sequence verdict table (id, size, ok/chimera) to this TSV file
    #[clap(long)]
    summary: Option<String>,
    /// minimum abundance skew of a parent over a chimera candidate
    #[clap(long, default_value_t = DEFAULT_MIN_ABSKEW)]
    min_skew: f64,
    /// worker threads: 1 = sequential de-novo mode, 0 = sized by the host
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

    // ---------- load the centroids, most abundant first ----------
    let mut seqs = load_sequences(&args.input)?;
    if seqs.is_empty() {
        return Err(DenoiseError::NoSequencesRead { file_name: args.input });
    }
    seqs.sort_by(|a, b| b.size().cmp(&a.size()));
    let centroids: Vec<Centroid> = seqs
        .into_iter()
        .map(|seq| Centroid { total_size: seq.size(), seq })
        .collect();

    let chimeric = flag_chimeras(&centroids, args.min_skew, args.threads);
    let n_chimeric = chimeric.iter().filter(|&&f| f).count();
    info!("{} of {} centroids called chimeric", n_chimeric, centroids.len());

    // ---------- non-chimeric sequences keep their original headers ----------
    if let Some(fname) = &args.output {
        let mut writer = WriteFasta::new(Some(fname.clone()), 0, false);
        for (centroid, &is_chimeric) in centroids.iter().zip(chimeric.iter()) {
            if !is_chimeric { writer.report(&centroid.seq)?; }
        }
        writer.flush()?;
    }

    // ---------- per-sequence verdicts ----------
    if let Some(fname) = &args.summary {
        let mut out_file = out_writer(fname, false);
        for (centroid, &is_chimeric) in centroids.iter().zip(chimeric.iter()) {
            let status = if is_chimeric { "chimera" } else { "ok" };
            writeln!(out_file, "{}\t{}\t{}", centroid.seq.id(), centroid.total_size, status)?;
        }
        out_file.flush()?;
    }

    Ok(())
}
