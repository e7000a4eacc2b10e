use std::io::Read;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use chordmap::cli::{parse_script, replay, CliArgs, CliCommand};
use chordmap::config::EngineConfig;
use chordmap::keymap::{
    load_default_keymap, load_keymap_with, BindingTable, Command, KeymapLayers, RecordingContext,
    SequenceMatcher,
};

fn main() -> Result<()> {
    chordmap::tracing::init();

    let args = CliArgs::parse();
    let config = args.apply(EngineConfig::load());

    let layers = match &args.keymap {
        Some(path) => load_keymap_with(path, config.policy())
            .with_context(|| format!("Failed to load keymap {}", path.display()))?,
        None => load_default_keymap(config.policy()),
    };
    let table = build_table(&layers, &config)?;

    match &args.command {
        CliCommand::Check => {
            for (sequence, command) in table.bindings() {
                println!("{:<16} {}", sequence.to_string(), command);
            }
            println!("{} bindings", table.len());
        }
        CliCommand::Replay { script } => {
            let source = match script {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read script {}", path.display()))?,
                None => {
                    let mut source = String::new();
                    std::io::stdin()
                        .read_to_string(&mut source)
                        .context("Failed to read script from stdin")?;
                    source
                }
            };
            let steps = parse_script(&source).context("Invalid replay script")?;

            let mut matcher = SequenceMatcher::with_timeout(Arc::new(table), config.timeout());
            let mut ctx = RecordingContext::new();
            for fired in replay(&mut matcher, &steps, &mut ctx) {
                println!("{:>6}ms  {}", fired.at.as_millis(), fired.command);
            }
            if let Some(pending) = matcher.pending_display() {
                println!("pending: {}", pending);
            }
        }
    }

    Ok(())
}

fn build_table(layers: &KeymapLayers, config: &EngineConfig) -> Result<BindingTable<Command>> {
    let platform = config.platform()?;
    let table = layers
        .build_table(platform, config.policy())
        .with_context(|| format!("Invalid keymap for {}", platform))?;
    tracing::info!("Built {} table with {} bindings", platform, table.len());
    Ok(table)
}
