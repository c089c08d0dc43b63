//! CLI surface and run orchestration: argument parsing, FASTA input,
//! per-transcript parallel alignment and sequential report writing.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use bio::io::fasta;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::align::{align_linear_space, AlignConfig, AlignmentResult};
use crate::report::{segments, write_blocks, write_segments};
use crate::scoring::{SpliceSiteMap, SubstitutionTable};
use crate::shuffle;

/// Which splice-site orientation(s) to try for each transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strand {
    /// gt..ag signals only.
    Forward,
    /// ct..ac signals only.
    Reverse,
    /// Try both and keep the higher-scoring alignment.
    Both,
}

#[derive(Parser, Debug)]
#[command(name = "est2genome")]
#[command(version)]
#[command(about = "Splice-aware alignment of spliced transcripts to genomic DNA", long_about = None)]
pub struct EstArgs {
    /// Spliced transcript (EST/mRNA) FASTA file.
    #[arg(short, long)]
    pub est: PathBuf,
    /// Genomic FASTA file; only the first record is used.
    #[arg(short, long)]
    pub genome: PathBuf,
    #[arg(long, default_value_t = 1)]
    pub match_score: i32,
    #[arg(long, default_value_t = 1)]
    pub mismatch: i32,
    #[arg(long, default_value_t = 2)]
    pub gappenalty: i32,
    #[arg(long, default_value_t = 40)]
    pub intronpenalty: i32,
    #[arg(long, default_value_t = 20)]
    pub splicepenalty: i32,
    /// Charge every intron the full intron penalty, ignoring splice signals.
    #[arg(long, default_value_t = false)]
    pub nosplice: bool,
    /// Suppress alignments scoring at or below this.
    #[arg(long, default_value_t = 30)]
    pub minscore: i32,
    #[arg(long, value_enum, default_value_t = Strand::Both)]
    pub mode: Strand,
    /// Megabytes of path-matrix memory per alignment.
    #[arg(long, default_value_t = 10.0)]
    pub space: f64,
    /// Print the wrapped pairwise alignment under each segment table.
    #[arg(short, long, default_value_t = false)]
    pub align: bool,
    /// Line width of the pairwise alignment view.
    #[arg(long, default_value_t = 50)]
    pub width: usize,
    /// Align this many shuffled copies of each transcript to estimate a
    /// null score distribution (0 disables).
    #[arg(long, default_value_t = 0)]
    pub shuffle: usize,
    #[arg(long, default_value_t = 20825)]
    pub seed: u64,
    #[arg(short, long)]
    pub out: Option<PathBuf>,
    /// Worker threads (0 = all cores).
    #[arg(short = 'n', long, default_value_t = 0)]
    pub threads: usize,
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

struct EstOutcome {
    result: AlignmentResult,
    forward: bool,
    null_scores: Vec<i32>,
}

pub fn run(args: EstArgs) -> Result<()> {
    let num_threads = if args.threads == 0 {
        num_cpus::get()
    } else {
        args.threads
    };
    // Tests may call run() more than once in-process; a second global build
    // fails harmlessly.
    let _ = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global();

    if args.verbose {
        eprintln!("[INFO] Reading genome & ESTs...");
    }
    let genome_reader =
        fasta::Reader::from_file(&args.genome).context("Failed to open genome FASTA")?;
    let genome_record = genome_reader
        .records()
        .filter_map(|r| r.ok())
        .next()
        .context("Genome FASTA contains no records")?;
    let genome_id = short_id(genome_record.id());
    let genome = genome_record.seq().to_vec();

    let est_reader = fasta::Reader::from_file(&args.est).context("Failed to open EST FASTA")?;
    let ests: Vec<fasta::Record> = est_reader.records().filter_map(|r| r.ok()).collect();
    if ests.is_empty() || genome.is_empty() {
        return Ok(());
    }
    if args.verbose {
        eprintln!(
            "[INFO] {} ESTs vs {} ({} bp), {} threads",
            ests.len(),
            genome_id,
            genome.len(),
            num_threads
        );
    }

    let table = SubstitutionTable::build(
        args.match_score,
        args.mismatch,
        args.gappenalty,
        0,
        b'-',
    );
    let config = AlignConfig {
        gap: args.gappenalty,
        intron_penalty: args.intronpenalty,
        splice_penalty: args.splicepenalty,
    };
    let budget = (args.space * 1e6) as usize;

    let forward_map = match (args.nosplice, args.mode) {
        (true, _) | (false, Strand::Reverse) => None,
        _ => Some(SpliceSiteMap::build(&genome, true)),
    };
    let reverse_map = match (args.nosplice, args.mode) {
        (true, _) | (false, Strand::Forward) => None,
        _ => Some(SpliceSiteMap::build(&genome, false)),
    };

    let bar = if ests.len() > 1 {
        let bar = ProgressBar::new(ests.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
                .context("Invalid progress bar template")?,
        );
        Some(bar)
    } else {
        None
    };

    let outcomes: Vec<Result<EstOutcome>> = ests
        .par_iter()
        .enumerate()
        .map(|(i, est)| {
            let outcome = align_one(
                &genome,
                est.seq(),
                &table,
                forward_map.as_ref(),
                reverse_map.as_ref(),
                &config,
                budget,
                args.shuffle,
                args.seed.wrapping_add(i as u64),
            );
            if let Some(bar) = &bar {
                bar.inc(1);
            }
            outcome.with_context(|| format!("Failed to align EST '{}'", short_id(est.id())))
        })
        .collect();
    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }

    let mut writer = open_output(args.out.as_ref())?;
    let mut reported = 0usize;
    for (est, outcome) in ests.iter().zip(outcomes) {
        let outcome = outcome?;
        let result = &outcome.result;
        if result.is_empty() || result.score <= args.minscore {
            continue;
        }
        reported += 1;
        let est_id = short_id(est.id());
        if !args.nosplice {
            if outcome.forward {
                writeln!(
                    writer,
                    "Note Best alignment is between forward est and forward genome, and splice sites imply forward gene"
                )?;
            } else {
                writeln!(
                    writer,
                    "Note Best alignment is between forward est and forward genome, but splice sites imply REVERSED GENE"
                )?;
            }
        }
        let segs = segments(result, &genome, est.seq(), &table, &config);
        write_segments(&mut writer, result, &segs, &genome_id, &est_id)?;
        if args.align {
            write_blocks(
                &mut writer,
                result,
                &genome,
                est.seq(),
                &genome_id,
                &est_id,
                args.width.max(1),
            )?;
        }
        if !outcome.null_scores.is_empty() {
            let summary = shuffle::summarize(&outcome.null_scores);
            writeln!(
                writer,
                "Shuffle\t{}\tmax {}\tmean {:.1}\tsd {:.1}",
                outcome.null_scores.len(),
                summary.max,
                summary.mean,
                summary.sd,
            )?;
        }
        writeln!(writer)?;
    }
    writer.flush()?;
    if args.verbose {
        eprintln!("[INFO] Reported {} of {} ESTs", reported, ests.len());
    }
    Ok(())
}

/// Align one transcript in every requested orientation and keep the best,
/// forward winning ties.
#[allow(clippy::too_many_arguments)]
fn align_one(
    genome: &[u8],
    transcript: &[u8],
    table: &SubstitutionTable,
    forward_map: Option<&SpliceSiteMap>,
    reverse_map: Option<&SpliceSiteMap>,
    config: &AlignConfig,
    budget: usize,
    shuffle_count: usize,
    seed: u64,
) -> Result<EstOutcome> {
    let forward_splice = forward_map.map(|m| m.view());
    let mut best = align_linear_space(genome, transcript, table, forward_splice, config, budget)?;
    let mut best_forward = true;
    let mut best_splice = forward_splice;
    if let Some(map) = reverse_map {
        let reverse = align_linear_space(genome, transcript, table, Some(map.view()), config, budget)?;
        if reverse.score > best.score {
            best = reverse;
            best_forward = false;
            best_splice = Some(map.view());
        }
    }
    let null_scores = if shuffle_count > 0 && !best.is_empty() {
        shuffle::null_scores(
            genome,
            transcript,
            table,
            best_splice,
            config,
            budget,
            shuffle_count,
            seed,
        )?
    } else {
        Vec::new()
    };
    Ok(EstOutcome {
        result: best,
        forward: best_forward,
        null_scores,
    })
}

fn short_id(id: &str) -> String {
    id.split_whitespace().next().unwrap_or("unknown").to_string()
}

fn open_output(out_path: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = if let Some(path) = out_path {
        Box::new(BufWriter::new(
            File::create(path).context("Failed to create output file")?,
        ))
    } else {
        Box::new(BufWriter::new(io::stdout()))
    };
    Ok(writer)
}
