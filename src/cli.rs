//! Clap adapter for coqpit.
//!
//! This module is the optional integration layer between the
//! parser-agnostic core and [clap](https://docs.rs/clap). It is compiled
//! only when the `clap` Cargo feature is enabled (on by default).
//!
//! The flag surface is built at runtime from the flattened
//! [`ArgSpec`](crate::args::ArgSpec)s of an instance, so the generated
//! `--help` lists every reachable field with its declared help text. Actual
//! parsing stays in the clap-free [`args`](crate::args) module; clap is
//! used here purely as a help and usage renderer that matches the flags
//! [`parse_args`](crate::args::parse_args) understands.

use clap::{Arg, Command};

use crate::args::{ArgOptions, ArgSpec, arg_specs};
use crate::config::Config;
use crate::error::CoqpitError;

/// Build a `clap::Command` whose arguments mirror the instance's flags.
pub fn command(name: &str, config: &Config, options: &ArgOptions) -> Result<Command, CoqpitError> {
    let specs = arg_specs(config, options)?;
    Ok(command_from_specs(name, &specs))
}

fn command_from_specs(name: &str, specs: &[ArgSpec]) -> Command {
    let mut cmd = Command::new(name.to_string()).no_binary_name(true);
    for spec in specs {
        let id = spec.flag.trim_start_matches("--").to_string();
        let mut arg = Arg::new(id.clone())
            .long(id)
            .value_name("VALUE")
            .required(false);
        if spec.multi {
            arg = arg.num_args(1..);
        }
        if let Some(help) = &spec.help {
            arg = arg.help(help.clone());
        }
        cmd = cmd.arg(arg);
    }
    cmd
}

/// The `--help` text for an instance's flag surface.
pub fn render_help(name: &str, config: &Config, options: &ArgOptions) -> Result<String, CoqpitError> {
    let mut cmd = command(name, config, options)?;
    Ok(cmd.render_help().to_string())
}
