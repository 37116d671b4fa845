use std::env;
use std::io::Write;
use clap::{Parser, ValueEnum};
use log::info;
use std::time::Instant;

use amplikit_io::{open_file, out_writer};
use amplikit_seq::filter::phix_flags;
use amplikit_seq::sequence::{FastqIterator, FastqRecord};
use amplikit_seq::SequenceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PairedMode {
    /// remove the pair when either read looks like PhiX
    Strict,
    /// remove the pair only when both reads look like PhiX
    Lenient,
}

#[derive(Parser, Debug)]
#[clap(name = "remove_phix", version, author)]
#[clap(about = "Remove reads of the PhiX sequencing control from FASTQ files", long_about = None)]
struct Args {
    /// forward reads: FASTQ format, gzip'ed or not
    #[clap(long, short='1')]
    in1: String,
    /// reverse reads of a paired-end run
    #[clap(long, short='2')]
    in2: Option<String>,
    /// output file for the kept forward reads
    #[clap(long, short='o', default_value = "stdout")]
    out1: String,
    /// output file for the kept reverse reads
    #[clap(long, short='O')]
    out2: Option<String>,
    /// minimum per-base identity to the PhiX genome for a read to be removed
    #[clap(long, default_value_t = 0.97)]
    min_id: f64,
    /// reads contributing fewer valid 8-mers than this are always kept
    #[clap(long, default_value_t = 8)]
    min_kmers: usize,
    /// what to do when only one read of a pair looks like PhiX
    #[clap(long, value_enum, default_value_t = PairedMode::Strict)]
    paired_mode: PairedMode,
    /// write a one-line TSV report (reads_in, reads_removed, pct_removed) to this file
    #[clap(long)]
    report: Option<String>,
    /// worker threads: 1 = sequential, 0 = sized by the host
    #[clap(long, default_value_t = 1)]
    threads: usize,
    /// be more verbose and log program actions on the screen
    #[clap(long, short='v', action)]
    verbose: bool,
}

fn load_fastq(filename: &str) -> Result<Vec<FastqRecord>, SequenceError> {
    let reader = open_file(filename)?;
    let records: Vec<FastqRecord> = FastqIterator::new(reader).collect();
    for record in &records {
        if record.len() != record.qual().len() {
            return Err(SequenceError::MismatchedQualityLength {
                description: record.description().to_string(),
                seq_length: record.len(),
                qual_length: record.qual().len(),
            });
        }
    }
    Ok(records)
}

pub fn main() -> Result<(), SequenceError> {

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

    let start = Instant::now();
    let reads1 = load_fastq(&args.in1)?;
    let flags1 = phix_flags(
        &reads1.iter().map(|r| r.seq()).collect::<Vec<_>>(),
        args.min_id, args.min_kmers, args.threads,
    );

    let mut reads_in = reads1.len();
    let mut reads_removed = 0usize;

    match &args.in2 {
        None => {
            // ---------- single-end mode ----------
            let mut out_file = out_writer(&args.out1, false);
            for (read, &is_phix) in reads1.iter().zip(flags1.iter()) {
                if is_phix {
                    reads_removed += 1;
                } else {
                    write!(out_file, "{}", read)?;
                }
            }
            out_file.flush()?;
        }
        Some(in2) => {
            // ---------- paired-end mode: a verdict applies to the pair ----------
            let reads2 = load_fastq(in2)?;
            let flags2 = phix_flags(
                &reads2.iter().map(|r| r.seq()).collect::<Vec<_>>(),
                args.min_id, args.min_kmers, args.threads,
            );
            reads_in += reads2.len();
            let n_pairs = reads1.len().min(reads2.len());

            let mut out_file1 = out_writer(&args.out1, false);
            let out2 = args.out2.as_deref().unwrap_or("stdout");
            let mut out_file2 = out_writer(out2, false);
            for pair in 0..n_pairs {
                let drop_pair = match args.paired_mode {
                    PairedMode::Strict => flags1[pair] || flags2[pair],
                    PairedMode::Lenient => flags1[pair] && flags2[pair],
                };
                if drop_pair {
                    reads_removed += 2;
                } else {
                    write!(out_file1, "{}", reads1[pair])?;
                    write!(out_file2, "{}", reads2[pair])?;
                }
            }
            out_file1.flush()?;
            out_file2.flush()?;
        }
    }

    let pct = if reads_in == 0 { 0.0 } else { 100.0 * reads_removed as f64 / reads_in as f64 };
    if let Some(fname) = &args.report {
        let mut report = out_writer(fname, false);
        writeln!(report, "reads_in\treads_removed\tpct_removed")?;
        writeln!(report, "{}\t{}\t{:.2}", reads_in, reads_removed, pct)?;
        report.flush()?;
    }
    println!("reads_in={} reads_removed={} pct={:.2}%", reads_in, reads_removed, pct);
    info!("PhiX filtering finished in {:?}", start.elapsed());

    Ok(())
}
