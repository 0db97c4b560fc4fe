use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};

use satsession::cnf::dimacs::{DimacsProblem, parse_dimacs_reader};
use satsession::enumerate::count_models_bounded;
use satsession::{
    Assignment, DpllEngine, Engine, EnumerateParams, Enumerator, SessionError, SolveParams,
    StopReason, VarisatEngine, enumerate_answers_with, single_answer_with,
};

#[derive(Debug, Parser)]
#[command(name = "satsession")]
#[command(about = "Solve or enumerate DIMACS CNF problems")]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Debug, Args)]
struct Tuning {
    #[arg(long, default_value_t = 0)]
    verbosity: u32,
    /// 0 false, 1 true, 2 Jeroslow-Wang, 3 random
    #[arg(long, default_value_t = 2)]
    phase: i64,
    #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
    prop_limit: i64,
    #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
    decision_limit: i64,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    #[arg(long, default_value = "dpll")]
    backend: String,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    Solve {
        path: String,
        #[arg(long = "assume", allow_hyphen_values = true)]
        assume: Vec<i64>,
        #[command(flatten)]
        tuning: Tuning,
    },
    Enumerate {
        path: String,
        #[arg(long)]
        max: Option<usize>,
        #[command(flatten)]
        tuning: Tuning,
    },
    Count {
        path: String,
        #[arg(long, default_value_t = 4096)]
        cap: usize,
        #[command(flatten)]
        tuning: Tuning,
    },
}

#[derive(Debug, Clone, Copy)]
enum Backend {
    Dpll,
    Varisat,
}

impl Tuning {
    fn backend(&self) -> Result<Backend> {
        match self.backend.as_str() {
            "dpll" => Ok(Backend::Dpll),
            "varisat" => Ok(Backend::Varisat),
            other => bail!("unknown backend '{}', expected dpll|varisat", other),
        }
    }

    fn enumerate_params(&self, problem: DimacsProblem) -> EnumerateParams {
        EnumerateParams::new(i64::from(problem.nvars), problem.clauses)
            .verbosity(self.verbosity)
            .default_phase(self.phase)
            .propagation_limit(self.prop_limit)
            .decision_limit(self.decision_limit)
            .seed(self.seed)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Cmd::Solve {
            path,
            assume,
            tuning,
        } => solve_cmd(&path, assume, &tuning)?,
        Cmd::Enumerate { path, max, tuning } => enumerate_cmd(&path, max, &tuning)?,
        Cmd::Count { path, cap, tuning } => count_cmd(&path, cap, &tuning)?,
    }
    Ok(())
}

fn load_problem(path: &str) -> Result<DimacsProblem> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path))?;
    parse_dimacs_reader(BufReader::new(file)).with_context(|| format!("failed to parse {}", path))
}

fn solve_cmd(path: &str, assume: Vec<i64>, tuning: &Tuning) -> Result<()> {
    let problem = load_problem(path)?;
    let params = SolveParams::new(i64::from(problem.nvars), problem.clauses)
        .verbosity(tuning.verbosity)
        .default_phase(tuning.phase)
        .propagation_limit(tuning.prop_limit)
        .decision_limit(tuning.decision_limit)
        .seed(tuning.seed)
        .assumptions(assume);

    let answer = match tuning.backend()? {
        Backend::Dpll => single_answer_with::<DpllEngine>(&params),
        Backend::Varisat => single_answer_with::<VarisatEngine>(&params),
    };
    match answer {
        Ok(Some(assignment)) => {
            println!("s SATISFIABLE");
            print_model(&assignment);
        }
        Ok(None) => println!("s UNSATISFIABLE"),
        Err(SessionError::ResourceLimitReached) => println!("s UNKNOWN"),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

fn enumerate_cmd(path: &str, max: Option<usize>, tuning: &Tuning) -> Result<()> {
    let params = tuning.enumerate_params(load_problem(path)?);
    match tuning.backend()? {
        Backend::Dpll => print_models(enumerate_answers_with::<DpllEngine>(&params)?, max),
        Backend::Varisat => print_models(enumerate_answers_with::<VarisatEngine>(&params)?, max),
    }
}

fn print_models<E: Engine>(mut models: Enumerator<E>, max: Option<usize>) -> Result<()> {
    let limit = max.unwrap_or(usize::MAX);
    while models.produced() < limit {
        match models.next() {
            Some(assignment) => print_model(&assignment?),
            None => break,
        }
    }
    let stop = match models.stop_reason() {
        Some(StopReason::Unsatisfiable) => "exhausted",
        Some(StopReason::ResourceLimitReached) => "limit",
        Some(StopReason::Failed) => "failed",
        None => "max",
    };
    println!("c models={} stop={}", models.produced(), stop);
    Ok(())
}

fn count_cmd(path: &str, cap: usize, tuning: &Tuning) -> Result<()> {
    let params = tuning.enumerate_params(load_problem(path)?);
    let report = match tuning.backend()? {
        Backend::Dpll => {
            count_models_bounded(&mut enumerate_answers_with::<DpllEngine>(&params)?, cap)?
        }
        Backend::Varisat => {
            count_models_bounded(&mut enumerate_answers_with::<VarisatEngine>(&params)?, cap)?
        }
    };
    println!(
        "count={} hit_cap={} exact={}",
        report.count,
        report.hit_cap,
        report.is_exact()
    );
    Ok(())
}

fn print_model(assignment: &Assignment) {
    let lits = assignment
        .literals()
        .iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>();
    if lits.is_empty() {
        println!("v 0");
    } else {
        println!("v {} 0", lits.join(" "));
    }
}
