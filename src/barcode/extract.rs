use super::structure::{Mate, ReadStructure};

///////////////////////////////
/// Assemble the combined barcode of one read (pair) according to the
/// parsed structure: the sub-slice of each barcode segment, taken from
/// the segment's own mate, concatenated in structure-string order.
///
/// Returns None when the read cannot contribute a countable barcode: an
/// ambiguous base anywhere in the combined barcode (a single N discards
/// the whole barcode, no partial masking), a read too short for the
/// declared layout, or a layout that needs the reverse mate when none
/// was given. Pure function, no side effects.
pub fn extract_barcode(
    structure: &ReadStructure,
    mate1: &[u8],
    mate2: Option<&[u8]>,
) -> Option<Vec<u8>> {
    let mut barcode: Vec<u8> = Vec::with_capacity(structure.barcode_length);

    for segment in &structure.barcode_segments {
        let seq = match segment.mate {
            Mate::Forward => mate1,
            Mate::Reverse => mate2?,
        };
        let sub = seq.get(segment.start..segment.end)?;

        for &b in sub {
            match b.to_ascii_uppercase() {
                base @ (b'A' | b'C' | b'G' | b'T') => barcode.push(base),
                _ => return None,
            }
        }
    }

    Some(barcode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_forward_only() {
        let rs = ReadStructure::from_descriptor("f4b2x6s").unwrap();
        let barcode = extract_barcode(&rs, b"ACGTTTAAAAAA", None);
        assert_eq!(barcode, Some(b"ACGT".to_vec()));
    }

    #[test]
    fn extract_fractioned_barcode() {
        //Two barcode segments with a spacer between them
        let rs = ReadStructure::from_descriptor("f2b3x2b5s").unwrap();
        let barcode = extract_barcode(&rs, b"AATTTGGCCCCC", None);
        assert_eq!(barcode, Some(b"AAGG".to_vec()));
    }

    #[test]
    fn extract_across_mates() {
        let rs = ReadStructure::from_descriptor("f2b4sr2b4s").unwrap();
        let barcode = extract_barcode(&rs, b"AAGGGG", Some(b"CCTTTT"));
        assert_eq!(barcode, Some(b"AACC".to_vec()));
    }

    #[test]
    fn lowercase_bases_are_accepted() {
        let rs = ReadStructure::from_descriptor("f4b2s").unwrap();
        let barcode = extract_barcode(&rs, b"acgtTT", None);
        assert_eq!(barcode, Some(b"ACGT".to_vec()));
    }

    #[test]
    fn ambiguous_base_discards_whole_barcode() {
        let rs = ReadStructure::from_descriptor("f4b2s").unwrap();
        assert_eq!(extract_barcode(&rs, b"ACNTGG", None), None);
        assert_eq!(extract_barcode(&rs, b"NCGTGG", None), None);
    }

    #[test]
    fn ambiguous_base_in_second_segment_discards_too() {
        let rs = ReadStructure::from_descriptor("f2b2b2s").unwrap();
        assert_eq!(extract_barcode(&rs, b"AANTGG", None), None);
    }

    #[test]
    fn too_short_read_is_skipped() {
        let rs = ReadStructure::from_descriptor("f8b2s").unwrap();
        assert_eq!(extract_barcode(&rs, b"ACGT", None), None);
    }

    #[test]
    fn missing_reverse_mate_is_skipped() {
        let rs = ReadStructure::from_descriptor("f2b4sr2b4s").unwrap();
        assert_eq!(extract_barcode(&rs, b"AAGGGG", None), None);
    }
}
