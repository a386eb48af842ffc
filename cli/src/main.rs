/*
 * SPDX-FileCopyrightText: 2026 The SparseRank Authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use sparserank_cli::cli_main;
use sparserank_cli::init_env_logger;

pub fn main() -> Result<()> {
    init_env_logger()?;
    cli_main(std::env::args_os())
}
