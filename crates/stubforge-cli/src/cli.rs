use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI parser for the `stubforge` binary.
#[derive(Debug, Parser)]
#[command(
    name = "stubforge",
    version,
    about = "Offline prompt rendering and schema-driven payload synthesis"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render a prompt template against an inputs file
    Render {
        /// Template text file
        #[arg(long, value_name = "FILE")]
        template: PathBuf,

        /// Inputs object (YAML or JSON)
        #[arg(long, value_name = "FILE")]
        inputs: PathBuf,
    },

    /// Synthesize values from a JSON Schema, one per line
    Synth {
        /// Schema file (YAML or JSON)
        #[arg(long, value_name = "FILE")]
        schema: PathBuf,

        #[arg(long)]
        seed: Option<u64>,

        /// Number of values to print
        #[arg(long, default_value_t = 1)]
        count: usize,
    },

    /// Run intents, plan and eval for the document in a manifest
    Pipeline {
        /// Manifest file (YAML or JSON)
        #[arg(long, value_name = "FILE")]
        manifest: PathBuf,

        /// Seed override, takes precedence over the config file
        #[arg(long)]
        seed: Option<u64>,

        /// Engine config file (YAML or JSON)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn pipeline_flags_parse() {
        let cli = Cli::try_parse_from([
            "stubforge",
            "-v",
            "pipeline",
            "--manifest",
            "run.yaml",
            "--seed",
            "7",
            "--pretty",
        ])
        .expect("cli should parse");

        assert!(cli.verbose);
        match cli.command {
            Commands::Pipeline {
                manifest,
                seed,
                config,
                pretty,
            } => {
                assert_eq!(manifest.to_str(), Some("run.yaml"));
                assert_eq!(seed, Some(7));
                assert!(config.is_none());
                assert!(pretty);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn synth_count_defaults_to_one() {
        let cli = Cli::try_parse_from(["stubforge", "synth", "--schema", "s.json"])
            .expect("cli should parse");
        assert!(matches!(cli.command, Commands::Synth { count: 1, seed: None, .. }));
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["stubforge", "-q", "-v", "synth", "--schema", "s.json"]);
        assert!(result.is_err());
    }
}
