use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regmap_core::{convert_file, ConvertOptions, FlattenStats};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ConvertSummary {
    pub input: String,
    pub output: String,
    pub registers: usize,
    pub split_registers: usize,
    pub nodes: usize,
}

impl ConvertSummary {
    fn new(input: &Path, output: &Path, stats: FlattenStats) -> Self {
        ConvertSummary {
            input: input.display().to_string(),
            output: output.display().to_string(),
            registers: stats.registers,
            split_registers: stats.split_registers,
            nodes: stats.nodes,
        }
    }
}

pub struct ConvertArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub namespace: String,
    pub indent: usize,
}

pub fn run(args: ConvertArgs, json: bool) -> Result<()> {
    let options = ConvertOptions {
        namespace: args.namespace,
        indent: args.indent,
    };
    info!(input = %args.input.display(), namespace = %options.namespace, "converting");
    let stats = convert_file(&args.input, &args.output, &options)
        .with_context(|| format!("convert {}", args.input.display()))?;
    let summary = ConvertSummary::new(&args.input, &args.output, stats);

    if json {
        print_json(&summary)?;
    } else {
        println!(
            "{} registers -> {} nodes ({} split) written to {}",
            summary.registers, summary.nodes, summary.split_registers, summary.output
        );
    }
    Ok(())
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialise JSON output")?;
    println!("{text}");
    Ok(())
}
