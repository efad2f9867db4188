use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{CommandFactory, Parser};

use qsm_core::{Comparator, CoverageHandle, DecisionHeuristic, SearchEngine};
use qsm_sat::{DpllBackend, SatBackend};

/// Minimum-cost prime-implicant selection over a SAT-encoded cover problem.
///
/// `--help` intentionally exits 1 rather than 0, matching every other
/// argument-error path here. `--cnf`/`--pic` use the conventional
/// double-dash spelling; flag spelling was never part of the engine's
/// tested contract.
#[derive(Parser, Debug)]
#[command(name = "qsm", disable_help_flag = true)]
struct Opt {
    /// Path to the input DIMACS file.
    #[arg(long = "cnf")]
    cnf: Option<PathBuf>,

    /// Path to the PI-class descriptor file.
    #[arg(long = "pic")]
    pic: Option<PathBuf>,

    /// Enumerate every cost-optimal solution instead of stopping at the first.
    #[arg(long = "all-solutions", default_value_t = false)]
    all_solutions: bool,

    /// Prefer algebraically simpler (constant-flagged) classes when branching.
    #[arg(long = "prefer-consts", default_value_t = false)]
    prefer_consts: bool,

    /// Emit a per-step inference trace.
    #[arg(long = "verbose", default_value_t = false)]
    verbose: bool,

    #[arg(long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,
}

fn print_usage() {
    let _ = Opt::command().print_long_help();
    println!();
}

fn main() -> anyhow::Result<()> {
    println!("c Minimizer {}.", env!("CARGO_PKG_VERSION"));

    let opt = match Opt::try_parse() {
        Ok(opt) => opt,
        Err(e) => {
            eprintln!("c Error, {e}");
            print_usage();
            std::process::exit(1);
        }
    };

    if opt.help {
        print_usage();
        std::process::exit(1);
    }

    let Some(cnf_path) = opt.cnf.clone() else {
        eprintln!("c Error, no dimacs file was specified.");
        print_usage();
        std::process::exit(1);
    };
    let Some(pic_path) = opt.pic.clone() else {
        eprintln!("c Error, no PI-class file was specified.");
        print_usage();
        std::process::exit(1);
    };

    init_tracing(opt.verbose);

    if opt.all_solutions {
        println!("c option found: --all-solutions");
    }
    if opt.prefer_consts {
        println!("c option found: --prefer-consts");
    }
    if opt.verbose {
        println!("c option found: --verbose");
    }

    let interrupted = Arc::new(AtomicBool::new(false));
    install_sigint_handler(interrupted.clone())?;

    println!("c Initializing built-in SAT backend.");
    let mut backend = DpllBackend::default();
    backend
        .read_dimacs(&cnf_path)
        .with_context(|| format!("could not read DIMACS file {}", cnf_path.display()))?;

    let store = qsm_core::load_pic_file(&pic_path)?;
    println!("c Found {} PI classes in {}.", store.len(), pic_path.display());

    for var in 1..=store.max_care() {
        backend.add_observed_var(var);
    }
    let coverage = CoverageHandle::new();
    backend.connect_external_propagator(coverage.adapter());

    let comparator = if opt.prefer_consts {
        Comparator::ConstOrLessCoverage
    } else {
        Comparator::LessCoverage
    };
    let heuristic = DecisionHeuristic::new(comparator);
    let mut engine = SearchEngine::new(store, opt.all_solutions, heuristic, coverage);

    engine.run(&mut backend)?;
    backend.disconnect_external_propagator();

    if interrupted.load(Ordering::SeqCst) {
        bail!("interrupted");
    }

    if engine.resolved_at_root {
        println!("c All PIs are assigned on root-level, no search started.");
    }
    print_solutions(&engine);
    println!("c Number of SAT calls: {}", backend.solve_calls());
    Ok(())
}

/// Prints every solution the search collected. The original minimizer's
/// driver only ever printed the first collected solution regardless of
/// `--all-solutions`; since that flag exists to enumerate alternatives,
/// this prints each one, bracketed by a `c solution N` marker when there
/// is more than one to disambiguate.
fn print_solutions(engine: &SearchEngine) {
    let solutions = &engine.trail.best_solutions;
    if solutions.len() > 1 {
        for (n, solution) in solutions.iter().enumerate() {
            println!("c solution {n}, cost {}", engine.trail.best_cost);
            print_solution(engine, solution);
        }
    } else {
        for solution in solutions {
            print_solution(engine, solution);
        }
    }
}

fn print_solution(engine: &SearchEngine, solution: &[i32]) {
    for &pid in solution {
        let idx = engine.store.index_of(pid).expect("pid in a recorded solution must exist in the store");
        println!("invariant [pi{pid}] {}", engine.store.descriptor(idx).qform);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let subscriber = tracing_subscriber::fmt().with_max_level(level).without_time().finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Installs a SIGINT handler that prints an interruption notice. Unlike
/// the original, this does not also intercept SIGXCPU/SIGSEGV/SIGTERM/
/// SIGABRT: those are not safe to act on from a Rust signal handler, so
/// they are left at their default dispositions.
fn install_sigint_handler(interrupted: Arc<AtomicBool>) -> anyhow::Result<()> {
    ctrlc::set_handler(move || {
        println!("c Signal interruption.");
        interrupted.store(true, Ordering::SeqCst);
        std::process::exit(130);
    })
    .context("failed to install SIGINT handler")
}
