//! Conekit CLI
//!
//! Exact vertex enumeration and Hilbert bases for rational cones.
//!
//! # Usage
//! ```bash
//! # Extreme rays of a cone given by eq/ge constraint rows
//! conekit enumerate cone.txt --canonical
//!
//! # Hilbert basis of the cone spanned by a generator file
//! conekit hilbert generators.txt --jobs 4 --stats run.csv
//!
//! # Read from stdin, print nothing but the rays
//! echo "2 ge 1 -1" | conekit enumerate - --quiet
//! ```

mod input;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use conekit_core::{
    EnumerationConfig, EnumerationStats, HilbertConfig, HilbertEnumerator, HilbertStats,
    VertexEnumerator,
};

#[derive(Parser)]
#[command(name = "conekit")]
#[command(about = "Exact vertex enumeration and Hilbert bases for rational cones")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enumerate the extreme rays of a constrained non-negative orthant
    Enumerate {
        /// Constraint file, or `-` for stdin
        input: PathBuf,

        /// Worker threads (0 = one per hardware thread)
        #[arg(long, default_value = "0")]
        jobs: usize,

        /// Sort the output lexicographically
        #[arg(long)]
        canonical: bool,

        /// Fail as soon as the surviving ray set becomes empty
        #[arg(long)]
        feasibility_check: bool,

        /// Export run statistics to CSV
        #[arg(long)]
        stats: Option<PathBuf>,

        /// Print the rays and nothing else
        #[arg(long)]
        quiet: bool,
    },

    /// Compute the Hilbert basis of the cone spanned by generators
    Hilbert {
        /// Generator file, or `-` for stdin
        input: PathBuf,

        /// Worker threads (0 = one per hardware thread)
        #[arg(long, default_value = "0")]
        jobs: usize,

        /// Sort the output lexicographically
        #[arg(long)]
        canonical: bool,

        /// Export run statistics to CSV
        #[arg(long)]
        stats: Option<PathBuf>,

        /// Print the basis and nothing else
        #[arg(long)]
        quiet: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Enumerate {
            input,
            jobs,
            canonical,
            feasibility_check,
            stats,
            quiet,
        } => {
            run_enumerate(input, jobs, canonical, feasibility_check, stats, quiet);
        }
        Commands::Hilbert {
            input,
            jobs,
            canonical,
            stats,
            quiet,
        } => {
            run_hilbert(input, jobs, canonical, stats, quiet);
        }
    }
}

fn run_enumerate(
    input: PathBuf,
    jobs: usize,
    canonical: bool,
    feasibility_check: bool,
    stats: Option<PathBuf>,
    quiet: bool,
) {
    let text = input::read_source(&input).unwrap_or_else(|message| fail(&message));
    let problem = input::parse_cone(&text).unwrap_or_else(|message| fail(&message));

    if !quiet {
        println!("Dimension:   {}", problem.dim);
        println!("Constraints: {}", problem.signs.len());
        println!();
    }

    let config = EnumerationConfig {
        parallelism: jobs,
        feasibility_check,
        canonicalise_output: canonical,
        ..Default::default()
    };
    let outcome = VertexEnumerator::with_config(config).enumerate(
        &problem.matrix,
        &problem.signs,
        problem.dim,
    );
    let (rays, run_stats) = match outcome {
        Ok(pair) => pair,
        Err(error) => fail(&format!("enumeration failed: {error}")),
    };

    for ray in &rays {
        println!("{}", ray.vector());
    }

    if !quiet {
        println!();
        println!("Rays:      {}", run_stats.final_rays);
        println!(
            "Pivots:    {} admitted of {} considered",
            run_stats.pivots_admitted, run_stats.pivots_considered
        );
        println!("Peak rays: {}", run_stats.peak_rays);
        println!("Time:      {} us", run_stats.time_us);
    }

    if let Some(path) = stats {
        export_enumeration_stats(&path, &run_stats);
        if !quiet {
            println!("Statistics exported to: {}", path.display());
        }
    }
}

fn run_hilbert(
    input: PathBuf,
    jobs: usize,
    canonical: bool,
    stats: Option<PathBuf>,
    quiet: bool,
) {
    let text = input::read_source(&input).unwrap_or_else(|message| fail(&message));
    let problem = input::parse_generators(&text).unwrap_or_else(|message| fail(&message));

    if !quiet {
        println!("Dimension:  {}", problem.dim);
        println!("Generators: {}", problem.generators.len());
        println!();
    }

    let config = HilbertConfig { parallelism: jobs, ..Default::default() };
    let outcome =
        HilbertEnumerator::with_config(config).enumerate(&problem.generators, problem.dim);
    let (mut basis, run_stats) = match outcome {
        Ok(pair) => pair,
        Err(error) => fail(&format!("hilbert basis failed: {error}")),
    };

    if canonical {
        basis.sort();
    }
    for element in &basis {
        println!("{element}");
    }

    if !quiet {
        println!();
        println!("Basis:     {}", run_stats.basis_size);
        println!("Faces:     {}", run_stats.faces);
        println!("Simplices: {}", run_stats.simplices);
        println!("Time:      {} us", run_stats.time_us);
    }

    if let Some(path) = stats {
        export_hilbert_stats(&path, &run_stats);
        if !quiet {
            println!("Statistics exported to: {}", path.display());
        }
    }
}

fn fail(message: &str) -> ! {
    eprintln!("conekit: {message}");
    std::process::exit(1);
}

fn export_enumeration_stats(path: &PathBuf, stats: &EnumerationStats) {
    use std::fs::File;
    use std::io::Write;

    let mut file = File::create(path).expect("Failed to create export file");
    writeln!(file, "metric,value").unwrap();
    writeln!(file, "rows_processed,{}", stats.rows_processed).unwrap();
    writeln!(file, "peak_rays,{}", stats.peak_rays).unwrap();
    writeln!(file, "pivots_considered,{}", stats.pivots_considered).unwrap();
    writeln!(file, "pivots_admitted,{}", stats.pivots_admitted).unwrap();
    writeln!(file, "final_rays,{}", stats.final_rays).unwrap();
    writeln!(file, "time_us,{}", stats.time_us).unwrap();
}

fn export_hilbert_stats(path: &PathBuf, stats: &HilbertStats) {
    use std::fs::File;
    use std::io::Write;

    let mut file = File::create(path).expect("Failed to create export file");
    writeln!(file, "metric,value").unwrap();
    writeln!(file, "faces,{}", stats.faces).unwrap();
    writeln!(file, "simplices,{}", stats.simplices).unwrap();
    writeln!(file, "candidates,{}", stats.candidates).unwrap();
    writeln!(file, "basis_size,{}", stats.basis_size).unwrap();
    writeln!(file, "time_us,{}", stats.time_us).unwrap();
}
