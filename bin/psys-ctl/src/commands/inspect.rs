// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `psys-ctl inspect` command: display manifest structure and sizes.

use anyhow::Context;
use pg_manifest::{ProgramGroupManifest, ProgramGroupParam};
use psys_runtime::ProcessGroup;
use std::path::PathBuf;

pub async fn execute(manifest_path: PathBuf) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║            psys-ctl · Manifest Inspector             ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let manifest = ProgramGroupManifest::from_file(&manifest_path)
        .with_context(|| format!("failed to load manifest '{}'", manifest_path.display()))?;
    manifest.validate()?;

    // ── Summary ────────────────────────────────────────────────
    println!("  Name:      {}", manifest.name);
    println!("  Group id:  {}", manifest.id);
    println!("  Programs:  {}", manifest.program_count());
    println!("  Terminals: {}", manifest.terminal_count());
    println!();

    // ── Programs ───────────────────────────────────────────────
    println!(
        "  {:<4} {:<10} {:>10} {:>10}",
        "Id", "Cell", "Prog deps", "Term deps",
    );
    println!("  {}", "-".repeat(40));
    for p in &manifest.programs {
        let cell = p
            .preferred_cell
            .map(|c| c.to_string())
            .unwrap_or_else(|| "any".into());
        println!(
            "  {:<4} {:<10} {:>10} {:>10}",
            p.id,
            cell,
            p.program_dependency_count(),
            p.terminal_dependency_count(),
        );
    }
    println!();

    // ── Terminals ──────────────────────────────────────────────
    println!(
        "  {:<4} {:<22} {:<8} {:>12} {:>9} {:>9}",
        "Id", "Type", "Attrs", "Frame", "Sections", "Bytes",
    );
    println!("  {}", "-".repeat(70));
    for t in &manifest.terminals {
        println!(
            "  {:<4} {:<22} {:#06x} {:>7}x{:<4} {:>9} {:>9}",
            t.id,
            format!("{:?}", t.terminal_type),
            t.attributes.pack(),
            t.frame_format.width,
            t.frame_format.height,
            t.total_sections(),
            t.frame_format.frame_bytes(),
        );
    }
    println!();

    // ── Sizes ──────────────────────────────────────────────────
    let param = ProgramGroupParam::for_manifest(&manifest);
    println!("  Manifest descriptor: {:>6} bytes", manifest.size_of());
    println!("  Param block:         {:>6} bytes", param.size_of());
    println!(
        "  Process group:       {:>6} bytes",
        ProcessGroup::size_of(&manifest, &param),
    );
    Ok(())
}
