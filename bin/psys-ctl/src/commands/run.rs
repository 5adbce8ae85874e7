// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `psys-ctl run` command: execute a pipeline against the simulator.
//!
//! Builds a process group from the manifest, attaches synthetic frame
//! buffers, binds every process to a cell, then drives the full command
//! sequence (submit → start → run ×N → stop) over the transport.

use anyhow::Context;
use pg_manifest::{ProgramGroupManifest, ProgramGroupParam};
use psys_runtime::{
    BufferSet, CellSim, FrameBuffer, HostScheduler, ProcessGroup, PsysConfig, SimGroupSpec,
};
use psys_transport::{transport, CommandOp};
use resource_model::CellId;
use std::path::PathBuf;
use std::sync::Arc;

pub async fn execute(
    manifest_path: PathBuf,
    config_path: Option<PathBuf>,
    frames: u32,
    fragments: Option<u16>,
) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║             psys-ctl · Pipeline Runner               ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    // ── Configuration ──────────────────────────────────────────
    let config = match &config_path {
        Some(path) => PsysConfig::from_file(path)
            .with_context(|| format!("failed to load config '{}'", path.display()))?,
        None => PsysConfig::default(),
    };

    let manifest = Arc::new(
        ProgramGroupManifest::from_file(&manifest_path)
            .with_context(|| format!("failed to load manifest '{}'", manifest_path.display()))?,
    );
    manifest.validate()?;

    let fragment_count = fragments.unwrap_or(config.default_fragment_count);
    let param = ProgramGroupParam::for_manifest(&manifest).with_fragments(fragment_count);

    println!("  {}", manifest.summary());
    println!("   Frames:    {frames}");
    println!("   Fragments: {fragment_count}");
    println!("   Queues:    {} dedicated, depth {}", config.num_ppg_queues, config.queue_depth);
    println!();

    // ── Group setup ────────────────────────────────────────────
    let mut group = ProcessGroup::create(Arc::clone(&manifest), param, 0x50_53_59_53)?;

    let mut buffers = BufferSet::new();
    let mut handle_counter = 1u64;
    let mut max_frame_bytes = 1usize;
    for t in group.terminals() {
        if t.is_data() {
            let len = t.required_bytes();
            max_frame_bytes = max_frame_bytes.max(len);
            buffers = buffers.with_buffer(
                t.id(),
                FrameBuffer {
                    handle: handle_counter,
                    len,
                },
            );
            handle_counter += 1;
        }
    }
    group.attach(&buffers)?;

    // Bind each process round-robin over the configured cells, then
    // acquire. Dispatch requires acquisition to have happened already.
    let program_ids: Vec<u8> = group.processes().iter().map(|p| p.program_id()).collect();
    for (i, id) in program_ids.iter().enumerate() {
        let cell = CellId::new((i % config.num_cells as usize) as u8)?;
        let process = group.process_mut(*id)?;
        process.bindings_mut().set_cell(cell)?;
        process.acquire()?;
    }

    // ── Transport + simulator ──────────────────────────────────
    let (host, cell) = transport(config.transport_config());
    let mut scheduler = HostScheduler::new(host);
    let user_token = group.user_token();
    let handle = scheduler.register_persistent(group)?;

    let mut sim = CellSim::new(cell);
    sim.insert_group(SimGroupSpec {
        context: handle,
        user_token,
        fragment_count,
        frame_bytes: max_frame_bytes as u32,
        queue_capacity: 2,
        fail_after_fragments: None,
    })?;
    tokio::spawn(sim.run());

    // ── Execution ──────────────────────────────────────────────
    scheduler.submit(handle).await?;
    scheduler.await_completion(handle, CommandOp::Submit).await?;
    scheduler.start(handle).await?;
    scheduler.await_completion(handle, CommandOp::Start).await?;

    for frame in 0..frames {
        scheduler.run(handle).await?;
        let event = scheduler.await_completion(handle, CommandOp::Run).await?;
        if event.status.is_failure() {
            anyhow::bail!("frame {frame} failed: {:?}", event.status);
        }
        tracing::info!(frame, "frame complete");
    }

    scheduler.stop(handle).await?;
    scheduler.await_completion(handle, CommandOp::Stop).await?;

    // ── Results ────────────────────────────────────────────────
    let group = scheduler.group(handle)?;
    println!("  State:   {}", group.state().as_str());
    println!("  Metrics: {}", group.metrics());
    Ok(())
}
