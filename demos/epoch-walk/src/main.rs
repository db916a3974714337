use anyhow::{anyhow, Context, Result};
use shnn_dataset::{DataReader, DatasetParams};
use shnn_events::{write_spike_file, AddressEvent};
use std::fs;
use std::path::Path;

const NUM_SAMPLES: u32 = 100;
const MINIBATCH: usize = 12;

fn synthesize(root: &Path) -> Result<()> {
    fs::create_dir_all(root)?;
    let mut index = String::from("#sample\t#class\n");
    for id in 1..=NUM_SAMPLES {
        let label = id % 10;
        // A short diagonal sweep whose start column encodes the label
        let events: Vec<AddressEvent> = (0..20u32)
            .map(|k| AddressEvent::new(((label + k) % 34) as u8, (k % 34) as u8, (k % 2) as u8, k * 15_000))
            .collect();
        write_spike_file(root.join(format!("{}.bs2", id)), &events)?;
        index.push_str(&format!("{}\t{}\n", id, label));
    }
    fs::write(root.join("train.txt"), &index)?;
    fs::write(root.join("test.txt"), "1\t1\n")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let root = Path::new("epoch-walk-data");
    synthesize(root).context("writing synthetic dataset")?;

    // 34x34x2 sensor, 350 bins of 1 ms
    let params = DatasetParams::new(0.0, 350_000.0, 1_000.0, 34, 34, 2)?;
    let reader = DataReader::open(root, "train.txt", "test.txt", &params)?;

    let mut batches = reader.training_batches();
    let mut served = 0usize;
    loop {
        match batches.next_minibatch(MINIBATCH) {
            Ok(batch) => {
                served += 1;
                log::info!("minibatch {}: labels {:?}, {} spikes", served, batch.labels, batch.input.sum());
            }
            Err(err) if err.is_exhausted() => break,
            Err(err) => return Err(anyhow!("minibatch {} failed: {err}", served + 1)),
        }
    }

    if served != NUM_SAMPLES as usize / MINIBATCH {
        return Err(anyhow!("served {} minibatches, expected {}", served, NUM_SAMPLES as usize / MINIBATCH));
    }

    println!(
        "Epoch OK: {} minibatches of {} ({} left over), input {}x{}",
        served,
        MINIBATCH,
        batches.remaining(),
        params.input_size(),
        MINIBATCH * params.num_time_bins()
    );
    Ok(())
}
