//! `dofsim`: command-line front end for the substrate DoF toolkit.

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use substrate_dof_sim::plot;
use substrate_dof_sim::prelude::*;
use substrate_dof_sim::validation::{
    compare_mechanisms, validate_causal_diamond, validate_substrate, validate_tension_bandgaps,
    COMPARISON_POINTS,
};

#[derive(Parser, Debug)]
#[clap(
    name = "dofsim",
    version = env!("CARGO_PKG_VERSION"),
    about = "Degrees-of-freedom reduction mechanisms on a capacity-constrained substrate"
)]
struct Cli {
    /// TOML experiment config; built-in defaults when omitted.
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dilation factor Γ and proper time rate at one point
    Gamma {
        #[clap(long)]
        s_hat: f64,
        #[clap(long)]
        lambda_hat: f64,
        /// Lapse exponent; defaults to substrate.dilation_exponent
        #[clap(long)]
        p: Option<f64>,
    },
    /// Print validation tables
    Validate {
        #[clap(value_enum, default_value = "all")]
        target: Target,
    },
    /// Write every SVG figure
    Plot {
        /// Defaults to output.out_dir
        #[clap(long)]
        out_dir: Option<PathBuf>,
    },
    /// Print the effective config as TOML
    Config,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Target {
    Substrate,
    Diamond,
    Bandgap,
    Compare,
    All,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ExperimentConfig::load(path)?,
        None => ExperimentConfig::default(),
    };

    match cli.command {
        Command::Gamma {
            s_hat,
            lambda_hat,
            p,
        } => {
            let p = p.unwrap_or(config.substrate.dilation_exponent);
            let substrate = SubstrateNetwork::from_config(&config.substrate)?;
            let gamma = substrate.compute_gamma(s_hat, lambda_hat, p)?;
            println!("ŝ = {}, λ̂ = {}, p = {}", s_hat, lambda_hat, p);
            println!("  ŝ² + λ̂²  = {:.6}", s_hat * s_hat + lambda_hat * lambda_hat);
            println!("  Γ        = {:.6}", gamma);
            println!("  dτ/dt    = {:.6}", 1.0 / gamma);
        }
        Command::Validate { target } => run_validation(&config, target)?,
        Command::Plot { out_dir } => {
            let out_dir = out_dir.unwrap_or_else(|| config.output.out_dir.clone());
            for path in plot::render_all(&config, &out_dir)? {
                println!("{}", path.display());
            }
        }
        Command::Config => print!("{}", config.to_toml_string()?),
    }
    Ok(())
}

fn run_validation(config: &ExperimentConfig, target: Target) -> SubstrateResult<()> {
    let substrate = SubstrateNetwork::from_config(&config.substrate)?;
    let diamond = CausalDiamondThrottling::from_config(&config.diamond);
    let bandgap = TensionInducedBandgaps::from_config(&config.bandgap);
    let p = config.substrate.dilation_exponent;
    let all = target == Target::All;

    if all || target == Target::Substrate {
        println!("{}", validate_substrate(&substrate, p));
    }
    if all || target == Target::Diamond {
        println!("{}", validate_causal_diamond(&diamond));
    }
    if all || target == Target::Bandgap {
        println!("{}", validate_tension_bandgaps(&bandgap));
    }
    if all || target == Target::Compare {
        let mechanisms: [&dyn DofMechanism; 2] = [&diamond, &bandgap];
        println!(
            "{}",
            compare_mechanisms(&substrate, &mechanisms, &COMPARISON_POINTS, p)?
        );
    }
    Ok(())
}
