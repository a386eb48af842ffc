/*
 * SPDX-FileCopyrightText: 2026 The SparseRank Authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

fn main() {
    built::write_built_file().expect("Failed to acquire build-time information");

    let out_dir = std::env::var("OUT_DIR").expect("OUT_DIR is not set");
    let mut built_file = OpenOptions::new()
        .append(true)
        .open(Path::new(&out_dir).join("built.rs"))
        .expect("Failed to open built.rs");
    writeln!(
        built_file,
        "pub const BUILD_DATE: &str = \"{}\";",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )
    .expect("Failed to write build date");
}
