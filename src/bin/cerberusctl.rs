// CLASSIFICATION: COMMUNITY
// Filename: cerberusctl.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cerberus::config::EngineConfig;
use cerberus::driver::MorphDriver;
use cerberus::profile::{builtin_profile, builtin_profiles, loader};
use cerberus::render::{self, Command};
use cerberus::threat::adapt::AdaptiveResponder;
use cerberus::threat::{self, AttackerProfile};
use cerberus::utils::clock::unix_now;
use cerberus::{SharedState, StateModel};

#[derive(Parser)]
#[command(name = "cerberusctl", about = "Cerberus state engine control", version = "0.1")]
struct Cli {
    /// TOML engine configuration.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available device profiles.
    Profiles {
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Build a state and print one artifact or command output.
    Render {
        #[arg(long, default_value = "TP-Link_Archer_C7")]
        profile: String,
        #[arg(long, default_value_t = 42)]
        seed: u32,
        #[arg(long)]
        now: Option<i64>,
        /// Read a file such as /proc/uptime.
        #[arg(long, conflicts_with = "command")]
        path: Option<String>,
        /// Run a shell command line such as "ps aux".
        #[arg(long)]
        command: Option<String>,
    },
    /// Save a state snapshot and print its fingerprint.
    Snapshot {
        #[arg(long, default_value = "TP-Link_Archer_C7")]
        profile: String,
        #[arg(long, default_value_t = 42)]
        seed: u32,
        #[arg(long)]
        out: PathBuf,
    },
    /// Run one morph driver step against a saved snapshot.
    Poll {
        #[arg(long)]
        state: PathBuf,
    },
    /// Assess attacker telemetry (JSON array) and optionally respond.
    Assess {
        telemetry: PathBuf,
        #[arg(long)]
        apply: bool,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let cfg = EngineConfig::load(cli.config.as_deref())?;
    match cli.command {
        Commands::Profiles { file } => {
            let profiles = match file.or(cfg.profiles_file.clone()) {
                Some(path) => loader::load_profiles(&path)?,
                None => builtin_profiles().to_vec(),
            };
            for p in profiles {
                let kind = format!("{:?}", p.device_type);
                println!("{:<20} {:<10} {} {}", p.name, kind, p.vendor, p.model);
            }
        }
        Commands::Render {
            profile,
            seed,
            now,
            path,
            command,
        } => {
            let state = StateModel::init_with(builtin_profile(&profile)?, seed, now.unwrap_or_else(unix_now))?;
            let out = match (path, command) {
                (Some(path), _) => render::generate_file_content(&state, &path)?,
                (None, Some(line)) => render::render_command(&state, &Command::parse(&line, "/root")?)?,
                (None, None) => anyhow::bail!("one of --path or --command is required"),
            };
            print!("{out}");
        }
        Commands::Snapshot { profile, seed, out } => {
            let state = StateModel::init_with(builtin_profile(&profile)?, seed, unix_now())?;
            state.save(&out)?;
            println!("{}", state.fingerprint()?);
        }
        Commands::Poll { state } => {
            let mut driver = MorphDriver::from_config(&cfg)?;
            let model = if state.exists() {
                StateModel::load(&state).with_context(|| format!("loading {}", state.display()))?
            } else {
                StateModel::init(Some(driver.current_profile().clone()))?
            };
            let shared = SharedState::new(model);
            let report = driver.poll(&shared)?;
            shared.snapshot()?.save(&state)?;
            println!(
                "profile={} morphed={} emergency={} blocklist={} frequency={}",
                driver.current_profile().name,
                report.morphed_to.is_some(),
                report.emergency.is_some(),
                report.blocklist_size,
                report
                    .requested_frequency
                    .map_or_else(|| "default".to_string(), |f| f.to_string()),
            );
        }
        Commands::Assess { telemetry, apply } => {
            let text = std::fs::read_to_string(&telemetry)
                .with_context(|| format!("reading {}", telemetry.display()))?;
            let mut attackers: Vec<AttackerProfile> = serde_json::from_str(&text)?;
            let now = unix_now();
            threat::detect_coordination(&mut attackers, &cfg.threat);
            let assessment = threat::assess_threat_level(&attackers, &cfg.threat, now);
            let action = threat::get_appropriate_response(&assessment, &cfg.threat);
            println!("{}", serde_json::to_string_pretty(&assessment)?);
            println!("response: {:?}", action);
            if apply {
                let mut responder = AdaptiveResponder::new(cfg.signals(), cfg.adapt.clone());
                responder.apply(action, &attackers, now)?;
            }
        }
    }
    Ok(())
}
