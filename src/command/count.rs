use anyhow::{bail, Context, Result};
use clap::Args;
use log::info;
use std::fs::File;
use std::path::PathBuf;

use crate::barcode::{BarcodeCodec, Platform, ReadStructure};
use crate::count::{
    count_reads, CountTable, DenseCountTable, SparseCountTable, MAX_DENSE_BARCODE_LEN,
};
use crate::fileformat::open_fastq;

#[derive(Args)]
pub struct CountCMD {
    #[arg(short = '1', long = "r1", help = "Input R1 FASTQ file (plain or compressed)")]
    pub path_r1: PathBuf,
    #[arg(
        short = '2',
        long = "r2",
        help = "Input R2 FASTQ file, for layouts spanning both mates"
    )]
    pub path_r2: Option<PathBuf>,
    #[arg(
        long = "structure",
        help = "Structure-string describing the read layout, e.g. f16b12xr150s"
    )]
    pub structure: Option<String>,
    #[arg(
        long = "platform",
        help = "Library platform preset (chromium, tellseq, stlfr). A --structure overrides it"
    )]
    pub platform: Option<Platform>,
    #[arg(short = 'o', long = "out", help = "Output TSV, one barcode and count per row")]
    pub path_out: PathBuf,
    #[arg(
        long = "min-count",
        default_value_t = 1,
        help = "Only report barcodes seen at least this many times"
    )]
    pub min_count: u16,
    #[arg(
        long = "sparse",
        help = "Use a hash map table instead of the dense array. Chosen automatically for long barcodes"
    )]
    pub sparse: bool,
}

impl CountCMD {
    pub fn try_execute(&mut self) -> Result<()> {
        verify_input_fq_file(&self.path_r1)?;
        if let Some(path_r2) = &self.path_r2 {
            verify_input_fq_file(path_r2)?;
        }

        //An explicit structure-string wins over a platform preset
        let descriptor = match (&self.structure, &self.platform) {
            (Some(descriptor), _) => descriptor.clone(),
            (None, Some(platform)) => platform.descriptor().to_string(),
            (None, None) => bail!("Either a structure-string or a platform preset is required"),
        };

        let structure = ReadStructure::from_descriptor(&descriptor)
            .with_context(|| format!("Invalid structure-string '{}'", descriptor))?;

        info!(
            "Read layout: {}bp barcode in {} segment(s), first on the {} read",
            structure.barcode_length,
            structure.barcode_segments.len(),
            structure.barcode_mate
        );

        if structure.barcode_uses_reverse() && self.path_r2.is_none() {
            bail!("The layout places barcode bases on the reverse read but no --r2 was given");
        }

        //The table is allocated once, sized by the barcode length, and
        //never reallocated during the run
        let use_sparse = self.sparse || structure.barcode_length > MAX_DENSE_BARCODE_LEN;
        let mut table: Box<dyn CountTable> = if use_sparse {
            info!("Using the sparse counting table");
            Box::new(SparseCountTable::new())
        } else {
            Box::new(DenseCountTable::new())
        };
        table.resize(structure.barcode_length)?;

        let mut reader_forward = open_fastq(&self.path_r1)?;
        let mut reader_reverse = match &self.path_r2 {
            Some(path_r2) => Some(open_fastq(path_r2)?),
            None => None,
        };

        let stats = count_reads(
            &mut reader_forward,
            reader_reverse.as_mut(),
            &structure,
            table.as_mut(),
        );

        info!(
            "Counted {} of {} reads ({} skipped)",
            stats.n_counted, stats.n_reads, stats.n_skipped
        );

        write_counts(&self.path_out, table.as_ref(), &structure, self.min_count)
    }
}

///////////////////////////////
/// One row of the counts TSV
#[derive(Debug, serde::Serialize)]
struct CountTsvRow {
    barcode: String,
    count: u16,
}

///////////////////////////////
/// Write the observed barcodes and their counts, in index order (which
/// is lexicographic barcode order), dropping rows under min_count
fn write_counts(
    path: &PathBuf,
    table: &dyn CountTable,
    structure: &ReadStructure,
    min_count: u16,
) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Could not create output file {}", path.display()))?;
    let mut writer = csv::WriterBuilder::new().delimiter(b'\t').from_writer(file);

    let mut n_rows: u64 = 0;
    for (index, count) in table.snapshot() {
        if count < min_count {
            continue;
        }
        let barcode = BarcodeCodec::decode(index, structure.barcode_length);
        writer.serialize(CountTsvRow {
            barcode: String::from_utf8_lossy(&barcode).into_owned(),
            count,
        })?;
        n_rows += 1;
    }
    writer.flush()?;

    info!("Wrote {} barcodes to {}", n_rows, path.display());
    Ok(())
}

fn verify_input_fq_file(path_in: &PathBuf) -> Result<()> {
    let file = File::open(path_in)
        .with_context(|| format!("Could not open input file {}", path_in.display()))?;
    if file.metadata()?.len() == 0 {
        println!("Warning: input file {} is empty", path_in.display());
    }

    let filename = path_in
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or_default();

    if filename.ends_with("fq")
        | filename.ends_with("fastq")
        | filename.ends_with("fq.gz")
        | filename.ends_with("fastq.gz")
    {
        //ok
    } else {
        bail!("Input file must be a fastq file: {}", path_in.display())
    }

    Ok(())
}
