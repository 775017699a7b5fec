use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use regmap_core::ConvertOptions;
use regmapctl::cmd_convert::{self, ConvertArgs};

#[derive(Parser, Debug)]
#[command(
    name = "regmapctl",
    version,
    about = "Flatten IP-XACT register descriptions into node register maps"
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Print a JSON conversion summary
    #[arg(long)]
    json: bool,
    /// IP-XACT input document
    #[arg(short, long, visible_alias = "ifs")]
    input: PathBuf,
    /// Register map output document
    #[arg(short, long, visible_alias = "ofs")]
    output: PathBuf,
    /// Namespace URI of register and field elements
    #[arg(long, default_value_t = ConvertOptions::default().namespace)]
    namespace: String,
    /// Spaces per indentation level in the output
    #[arg(long, default_value_t = ConvertOptions::default().indent)]
    indent: usize,
}

/// Rewrite the single-dash `-ifs`/`-ofs` spellings to their long form so
/// clap does not read them as `-i fs`/`-o fs`.
fn legacy_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            if arg.to_str().is_some_and(is_legacy_flag) {
                let mut long = OsString::from("-");
                long.push(&arg);
                long
            } else {
                arg
            }
        })
        .collect()
}

fn is_legacy_flag(arg: &str) -> bool {
    ["-ifs", "-ofs"].iter().any(|flag| {
        arg == *flag
            || arg
                .strip_prefix(*flag)
                .is_some_and(|rest| rest.starts_with('='))
    })
}

fn main() -> Result<()> {
    let Cli {
        verbose,
        json,
        input,
        output,
        namespace,
        indent,
    } = Cli::parse_from(legacy_args(std::env::args_os()));

    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| level.into()),
        ))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = ConvertArgs {
        input,
        output,
        namespace,
        indent,
    };
    cmd_convert::run(args, json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_defaults() {
        let cli = Cli::parse_from(["regmapctl", "-i", "in.xml", "-o", "out.xml"]);
        assert_eq!(cli.input, PathBuf::from("in.xml"));
        assert_eq!(cli.output, PathBuf::from("out.xml"));
        assert_eq!(cli.namespace, ConvertOptions::default().namespace);
        assert_eq!(cli.indent, 2);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.json);
    }

    #[test]
    fn parse_legacy_aliases() {
        let cli = Cli::parse_from([
            "regmapctl",
            "--ifs",
            "block.xml",
            "--ofs",
            "map.xml",
            "--indent",
            "4",
            "-vv",
            "--json",
        ]);
        assert_eq!(cli.input, PathBuf::from("block.xml"));
        assert_eq!(cli.output, PathBuf::from("map.xml"));
        assert_eq!(cli.indent, 4);
        assert_eq!(cli.verbose, 2);
        assert!(cli.json);
    }

    #[test]
    fn parse_single_dash_legacy_flags() {
        let argv = ["regmapctl", "-ifs", "block.xml", "-ofs=map.xml", "-v"].map(OsString::from);
        let cli = Cli::parse_from(legacy_args(argv));
        assert_eq!(cli.input, PathBuf::from("block.xml"));
        assert_eq!(cli.output, PathBuf::from("map.xml"));
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn short_flags_are_left_alone() {
        let argv = ["regmapctl", "-i", "fs.xml", "-ofsx"].map(OsString::from);
        let args = legacy_args(argv);
        assert_eq!(args[2], OsString::from("fs.xml"));
        assert_eq!(args[3], OsString::from("-ofsx"));
    }

    #[test]
    fn input_and_output_are_required() {
        assert!(Cli::try_parse_from(["regmapctl", "-o", "out.xml"]).is_err());
        assert!(Cli::try_parse_from(["regmapctl", "-i", "in.xml"]).is_err());
    }
}
