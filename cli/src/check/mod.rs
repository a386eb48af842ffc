/*
 * SPDX-FileCopyrightText: 2026 The SparseRank Authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use clap::Subcommand;

use super::GlobalArgs;

pub mod top;

#[derive(Subcommand, Debug)]
#[command(name = "check")]
/// Check coherence of files.
pub enum SubCommands {
    Top(top::CliArgs),
}

pub fn main(global_args: GlobalArgs, subcommand: SubCommands) -> Result<()> {
    match subcommand {
        SubCommands::Top(args) => top::main(global_args, args),
    }
}
