/*!
Summarize and optionally decode one acquisition chunk of a Sentinel-1
Level-0 raw telemetry file.
 */
use anyhow::Result;
use clap::Parser;
use itertools::Itertools;

use sentinel1_l0::cache::{load_chunk_cache, save_chunk_cache};
use sentinel1_l0::driver::{decode_batch, decode_metadata};
use sentinel1_l0::metadata::decode_columns;

#[derive(clap::Parser, Debug)]
#[command(version, about)]
struct Opt {
    /// Path to a Sentinel-1 Level-0 file (a raw concatenation of CCSDS packets).
    input: std::path::PathBuf,

    /// Decode and cache this acquisition chunk, rather than just summarizing.
    #[arg(long)]
    decode_chunk: Option<u32>,

    #[arg(short, default_value = "0")]
    verbose: usize,
}

fn main() -> Result<()> {
    let opt = Opt::parse();
    stderrlog::new()
        .module(module_path!())
        .module("sentinel1_l0")
        .quiet(false)
        .verbosity(opt.verbose)
        .timestamp(stderrlog::Timestamp::Second)
        .init()?;

    let data = std::fs::read(&opt.input)?;
    let (table, bounds) = decode_metadata(&data)?;
    let decoded = decode_columns(&table);

    let members_by_chunk: std::collections::HashMap<u32, Vec<usize>> =
        (0..table.len()).into_group_map_by(|&i| table.acquisition_chunk[i]);
    let num_chunks = table.acquisition_chunk.iter().max().map_or(0, |m| m + 1);

    println!("{}: {} packets, {} acquisition chunks", opt.input.display(), table.len(), num_chunks);
    println!("{:>5} {:>8} {:>10} {:>8} {:>8}", "chunk", "packets", "baq_mode", "num_quads", "swath");
    for chunk_id in 0..num_chunks {
        let members = &members_by_chunk[&chunk_id];
        let first = members[0];
        println!(
            "{:>5} {:>8} {:>10} {:>8} {:>8}",
            chunk_id,
            members.len(),
            decoded.baq_mode[first].map_or("?".to_string(), |m| format!("{m:?}")),
            decoded.num_quads[first].unwrap_or(0),
            decoded.swath_number[first].unwrap_or(0),
        );
    }

    if let Some(chunk_id) = opt.decode_chunk {
        let filter = members_by_chunk.get(&chunk_id).cloned().unwrap_or_default();
        if filter.is_empty() {
            anyhow::bail!("no packets in acquisition chunk {chunk_id}");
        }
        let num_quads = table.nq[filter[0]].unwrap_or(0) as usize;
        let expected_shape = (filter.len(), 2 * num_quads);

        let matrix = if let Some(cached) = load_chunk_cache(&opt.input, chunk_id, expected_shape) {
            log::info!("chunk {chunk_id} loaded from cache");
            cached
        } else {
            let (matrix, failed) = decode_batch(&data, &table, &bounds, &filter)?;
            if !failed.is_empty() {
                log::warn!("chunk {chunk_id}: {} packet(s) failed to decode and were zero-filled: {:?}", failed.len(), failed);
            }
            save_chunk_cache(&opt.input, chunk_id, &matrix)?;
            matrix
        };
        println!("decoded chunk {chunk_id}: {} rows x {} columns", matrix.len(), matrix[0].len());
    }

    Ok(())
}
