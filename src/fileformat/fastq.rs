use anyhow::Context;
use log::debug;
use std::fs::File;
use std::path::PathBuf;

use seq_io::fastq::Reader as FastqReader;

///////////////////////////////
/// Open a fastq file for reading, transparently decompressing if needed
pub fn open_fastq(path: &PathBuf) -> anyhow::Result<FastqReader<Box<dyn std::io::Read>>> {
    let handle =
        File::open(path).with_context(|| format!("Could not open fastq file {}", path.display()))?;

    let (reader, compression) = niffler::get_reader(Box::new(handle))
        .with_context(|| format!("Could not read fastq file {}", path.display()))?;

    debug!(
        "Opened file {} with compression {:?}",
        path.display(),
        compression
    );
    Ok(FastqReader::new(reader))
}
