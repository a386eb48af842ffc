/*
 * SPDX-FileCopyrightText: 2026 The SparseRank Authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use clap::Subcommand;

use super::GlobalArgs;

pub mod sweep;

#[derive(Subcommand, Debug)]
#[command(name = "bench")]
/// A few benchmark utilities.
pub enum SubCommands {
    Sweep(sweep::CliArgs),
}

pub fn main(global_args: GlobalArgs, subcommand: SubCommands) -> Result<()> {
    match subcommand {
        SubCommands::Sweep(args) => sweep::main(global_args, args),
    }
}
