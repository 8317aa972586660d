use std::env;
use std::process;

use hmm_engine::{HmmModel, TrainConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    let options = match Options::parse(env::args().skip(1)) {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("hmm_demo: {err}");
            Options::print_help();
            process::exit(2);
        }
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hmm_engine=info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(err) = run(&options) {
        eprintln!("hmm_demo: {err}");
        process::exit(1);
    }
}

fn run(options: &Options) -> hmm_engine::Result<()> {
    // Two hidden states, two symbols. State 0 mostly emits 0, state 1 mostly
    // emits 1. transition[to][from]: each column sums to one.
    let mut model = HmmModel::from_rows(
        vec![0.5, 0.5],
        vec![vec![0.8, 0.3], vec![0.2, 0.7]],
        vec![vec![0.9, 0.1], vec![0.2, 0.8]],
    )?;

    print!("{model}");
    println!();

    let obs = &options.observations;
    println!("Observation sequence: {}", join(obs));

    let path = model.predict(obs)?;
    println!("Predicted hidden states (Viterbi): {}", join(&path));

    let ll = model.log_likelihood(obs)?;
    println!("Log-likelihood of observation sequence: {ll}");

    let report = model.train(&[obs.as_slice()], &options.config)?;
    println!();
    println!(
        "Parameters after Baum-Welch training ({} iterations, {}):",
        report.iterations,
        if report.converged {
            "converged"
        } else {
            "iteration cap reached"
        }
    );
    print!("{model}");
    println!("Log-likelihood after training: {}", report.log_likelihood);
    Ok(())
}

fn join(values: &[usize]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

struct Options {
    observations: Vec<usize>,
    config: TrainConfig,
}

impl Options {
    fn parse<I, T>(mut args: I) -> Result<Self, String>
    where
        I: Iterator<Item = T>,
        T: Into<String>,
    {
        let mut observations = vec![0, 0, 1, 0, 1, 1];
        let mut builder = TrainConfig::builder();

        while let Some(arg) = args.next() {
            let arg: String = arg.into();
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) => (flag.to_string(), Some(value.to_string())),
                None => (arg, None),
            };
            if flag == "--help" || flag == "-h" {
                Options::print_help();
                process::exit(0);
            }
            let mut value = || -> Result<String, String> {
                match &inline {
                    Some(v) => Ok(v.clone()),
                    None => args
                        .next()
                        .map(Into::into)
                        .ok_or_else(|| format!("missing value after {flag}")),
                }
            };
            match flag.as_str() {
                "--observations" => observations = parse_observations(&value()?)?,
                "--max-iterations" => {
                    let n = value()?
                        .parse::<usize>()
                        .map_err(|_| "max iterations must be a non-negative integer".to_string())?;
                    builder = builder.with_max_iterations(n);
                }
                "--tolerance" => {
                    let tol = value()?
                        .parse::<f64>()
                        .map_err(|_| "tolerance must be a number".to_string())?;
                    builder = builder.with_tolerance(tol);
                }
                _ => return Err(format!("unrecognized argument '{flag}'")),
            }
        }

        let config = builder.build().map_err(|err| err.to_string())?;
        Ok(Self {
            observations,
            config,
        })
    }

    fn print_help() {
        println!(
            "\
Usage: cargo run --bin hmm_demo [-- <options>]

Options:
  --observations <s,s,...>      Comma-separated observation symbols (default: 0,0,1,0,1,1)
  --max-iterations <N>          Baum-Welch iteration cap (default: 1000)
  --tolerance <X>               Log-likelihood convergence tolerance (default: 1e-5)
  -h, --help                    Print this help message

Set RUST_LOG (e.g. RUST_LOG=hmm_engine=debug) to see per-iteration training logs.
"
        );
    }
}

fn parse_observations(value: &str) -> Result<Vec<usize>, String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map_err(|_| format!("invalid observation symbol '{s}'"))
        })
        .collect()
}
