use log::debug;
use seq_io::fastq::{Reader as FastqReader, Record as FastqRecord};

use super::table::CountTable;
use crate::barcode::{extract_barcode, ReadStructure};

///////////////////////////////
/// Tallies from one counting run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Records pulled from the input
    pub n_reads: u64,
    /// Records that contributed a barcode to the table
    pub n_counted: u64,
    /// Records skipped for an ambiguous base or a read too short
    pub n_skipped: u64,
}

///////////////////////////////
/// The counting loop: pull the next record (pair), extract its barcode,
/// bump the table, until the input has no more records. Single threaded
/// and blocking; the table is exclusively ours for the duration.
///
/// End-of-stream and read failure both just end the loop. This layer
/// does not tell them apart and never retries.
pub fn count_reads<R1, R2, T>(
    reader_forward: &mut FastqReader<R1>,
    mut reader_reverse: Option<&mut FastqReader<R2>>,
    structure: &ReadStructure,
    table: &mut T,
) -> PipelineStats
where
    R1: std::io::Read,
    R2: std::io::Read,
    T: CountTable + ?Sized,
{
    let mut stats = PipelineStats::default();

    loop {
        let record_forward = match reader_forward.next() {
            Some(Ok(record)) => record,
            Some(Err(_)) | None => break,
        };

        //Paired input is consumed in lockstep; either stream running out
        //ends the run
        let record_reverse = match reader_reverse {
            Some(ref mut reader) => match reader.next() {
                Some(Ok(record)) => Some(record),
                Some(Err(_)) | None => break,
            },
            None => None,
        };

        stats.n_reads += 1;

        let barcode = extract_barcode(
            structure,
            record_forward.seq(),
            record_reverse.as_ref().map(|r| r.seq()),
        );
        match barcode {
            Some(barcode) => {
                table.increment(&barcode);
                stats.n_counted += 1;
            }
            None => stats.n_skipped += 1,
        }
    }

    debug!(
        "counting done: {} records, {} counted, {} skipped",
        stats.n_reads, stats.n_counted, stats.n_skipped
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::count::table::{DenseCountTable, SparseCountTable};

    fn fastq(records: &[&str]) -> Vec<u8> {
        let mut out = Vec::new();
        for (i, seq) in records.iter().enumerate() {
            out.extend_from_slice(format!("@read{}\n{}\n+\n", i, seq).as_bytes());
            out.extend_from_slice(&vec![b'I'; seq.len()]);
            out.push(b'\n');
        }
        out
    }

    #[test]
    fn counts_known_single_end_set() {
        //2bp barcode, 1bp spacer, 4bp sequence
        let structure = ReadStructure::from_descriptor("f2b1x4s").unwrap();
        let input = fastq(&[
            "AAGTTTT", //AA
            "CCGTTTT", //CC
            "AAGTTTT", //AA
            "NAGTTTT", //ambiguous, skipped
            "GGGTTTT", //GG
        ]);

        let mut reader = FastqReader::new(input.as_slice());
        let mut table = DenseCountTable::new();
        table.resize(structure.barcode_length).unwrap();

        let stats = count_reads(
            &mut reader,
            None::<&mut FastqReader<&[u8]>>,
            &structure,
            &mut table,
        );

        assert_eq!(stats.n_reads, 5);
        assert_eq!(stats.n_counted, 4);
        assert_eq!(stats.n_skipped, 1);

        //AA = 0, CC = 5, GG = 10
        assert_eq!(table.get(0), 2);
        assert_eq!(table.get(5), 1);
        assert_eq!(table.get(10), 1);
        assert_eq!(table.snapshot(), vec![(0, 2), (5, 1), (10, 1)]);
    }

    #[test]
    fn ambiguous_reads_leave_table_untouched() {
        let structure = ReadStructure::from_descriptor("f2b4s").unwrap();
        let input = fastq(&["NNTTTT", "ANTTTT", "NATTTT"]);

        let mut reader = FastqReader::new(input.as_slice());
        let mut table = DenseCountTable::new();
        table.resize(structure.barcode_length).unwrap();

        let stats = count_reads(
            &mut reader,
            None::<&mut FastqReader<&[u8]>>,
            &structure,
            &mut table,
        );

        assert_eq!(stats.n_counted, 0);
        assert_eq!(stats.n_skipped, 3);
        assert!(table.snapshot().is_empty());
    }

    #[test]
    fn counts_paired_set() {
        //Barcode split across both mates
        let structure = ReadStructure::from_descriptor("f2b4sr2b4s").unwrap();
        let input1 = fastq(&["AAGGGG", "AAGGGG", "CCGGGG"]);
        let input2 = fastq(&["TTGGGG", "TTGGGG", "GGGGGG"]);

        let mut reader1 = FastqReader::new(input1.as_slice());
        let mut reader2 = FastqReader::new(input2.as_slice());
        let mut table = DenseCountTable::new();
        table.resize(structure.barcode_length).unwrap();

        let stats = count_reads(&mut reader1, Some(&mut reader2), &structure, &mut table);

        assert_eq!(stats.n_reads, 3);
        assert_eq!(stats.n_counted, 3);

        //AATT = 0b00001111, CCGG = 0b01011010
        assert_eq!(table.get(0b0000_1111), 2);
        assert_eq!(table.get(0b0101_1010), 1);
    }

    #[test]
    fn paired_streams_end_in_lockstep() {
        let structure = ReadStructure::from_descriptor("f2b4sr2b4s").unwrap();
        let input1 = fastq(&["AAGGGG", "AAGGGG", "AAGGGG"]);
        let input2 = fastq(&["TTGGGG"]); //shorter stream ends the run

        let mut reader1 = FastqReader::new(input1.as_slice());
        let mut reader2 = FastqReader::new(input2.as_slice());
        let mut table = DenseCountTable::new();
        table.resize(structure.barcode_length).unwrap();

        let stats = count_reads(&mut reader1, Some(&mut reader2), &structure, &mut table);
        assert_eq!(stats.n_reads, 1);
        assert_eq!(table.get(0b0000_1111), 1);
    }

    #[test]
    fn dense_and_sparse_see_the_same_stream_alike() {
        let structure = ReadStructure::from_descriptor("f3b3s").unwrap();
        let records = ["ACGTTT", "ACGTTT", "TTTAAA", "NNNAAA", "GGGAAA"];

        let input = fastq(&records);
        let mut reader = FastqReader::new(input.as_slice());
        let mut dense = DenseCountTable::new();
        dense.resize(structure.barcode_length).unwrap();
        count_reads(
            &mut reader,
            None::<&mut FastqReader<&[u8]>>,
            &structure,
            &mut dense,
        );

        let input = fastq(&records);
        let mut reader = FastqReader::new(input.as_slice());
        let mut sparse = SparseCountTable::new();
        sparse.resize(structure.barcode_length).unwrap();
        count_reads(
            &mut reader,
            None::<&mut FastqReader<&[u8]>>,
            &structure,
            &mut sparse,
        );

        assert_eq!(dense.snapshot(), sparse.snapshot());
    }
}
