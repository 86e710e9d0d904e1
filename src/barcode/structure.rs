use std::fmt;

use thiserror::Error;

///////////////////////////////
/// One of the two reads in a pair. The structure-string calls them by
/// their leading letter, 'f' and 'r'.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mate {
    Forward,
    Reverse,
}

impl Mate {
    fn from_marker(c: u8) -> Option<Mate> {
        match c {
            b'f' => Some(Mate::Forward),
            b'r' => Some(Mate::Reverse),
            _ => None,
        }
    }
}

impl fmt::Display for Mate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Mate::Forward => "forward",
            Mate::Reverse => "reverse",
        })
    }
}

///////////////////////////////
/// A contiguous byte range [start, end) within one mate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub mate: Mate,
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.end - self.start
    }
}

///////////////////////////////
/// Everything that can be wrong with a structure-string. Parsing fails
/// outright on the first of these; there is no partial result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    #[error("Empty structure-string")]
    Empty,

    #[error("Invalid read specifier '{0}' at start of structure-string. Must be one of 'F' and 'R'")]
    InvalidMateMarker(char),

    #[error("Expected a numeric position at offset {pos} of the structure-string, found '{found}'")]
    MissingLength { found: char, pos: usize },

    #[error("Structure-string ending with numeric value. Each position must be followed by an identifier (one of 'x', 'b' and 's')")]
    TrailingNumber,

    #[error("Invalid identifier '{found}' at offset {pos} of the structure-string. Each position must be followed by an identifier (one of 'x', 'b' and 's')")]
    InvalidTypeLetter { found: char, pos: usize },

    #[error("Unexpected character '{found}' at offset {pos} of the structure-string. Each identifier must be followed by a numeric position, a read specifier or the end of the string")]
    UnexpectedAfterType { found: char, pos: usize },

    #[error("Structure-string contains read specifier '{0}' more than once, but must contain each read specifier at most once")]
    DuplicateMateMarker(char),

    #[error("Structure-string defines no barcode segment")]
    NoBarcodeSegment,

    #[error("Structure-string defines no sequence segment")]
    NoSequenceSegment,
}

///////////////////////////////
/// The parsed layout of a read pair: which byte ranges hold barcode
/// bases, and which hold biological sequence. Built once from a
/// structure-string, immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadStructure {
    /// Mate carrying the first barcode segment
    pub barcode_mate: Mate,

    /// Summed length of all barcode segments. Derived, never set directly.
    pub barcode_length: usize,

    /// Barcode ranges in structure-string order, each tagged with its mate
    pub barcode_segments: Vec<Segment>,

    pub forward_sequence_segments: Vec<Segment>,
    pub reverse_sequence_segments: Vec<Segment>,
}

impl ReadStructure {
    pub fn from_descriptor(descriptor: &str) -> Result<ReadStructure, StructureError> {
        StructureParser::parse(descriptor)
    }

    /// True if any barcode base lives on the reverse read
    pub fn barcode_uses_reverse(&self) -> bool {
        self.barcode_segments.iter().any(|s| s.mate == Mate::Reverse)
    }
}

///////////////////////////////
/// Tokenizer over the lowercased structure-string bytes. Digit runs come
/// out as one numeric token; everything else one letter at a time.
struct SegmentLexer {
    text: Vec<u8>,
    pos: usize,
}

impl SegmentLexer {
    fn new(descriptor: &str) -> SegmentLexer {
        SegmentLexer {
            text: descriptor.to_lowercase().into_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.text.get(self.pos).copied()
    }

    fn next_letter(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    //Read a run of decimal digits. None if the next character is not a digit.
    fn next_length(&mut self) -> Option<usize> {
        let mut num: usize = 0;
        let mut any_digit = false;
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            num = num * 10 + (c - b'0') as usize;
            self.pos += 1;
            any_digit = true;
        }
        if any_digit {
            Some(num)
        } else {
            None
        }
    }
}

///////////////////////////////
/// Parser for structure-strings such as "F16B12XR150S": a leading read
/// specifier, then length+identifier segments ('b' barcode, 'x' spacer,
/// 's' sequence), optionally switching to the other read with a second
/// specifier. Holds the lexer position and per-mate cursor state while
/// segments accumulate.
pub struct StructureParser {
    lexer: SegmentLexer,
    current_mate: Mate,
    visited_mates: Vec<Mate>,
    cursor: usize,
    barcode_mate: Option<Mate>,
    barcode_segments: Vec<Segment>,
    forward_sequence_segments: Vec<Segment>,
    reverse_sequence_segments: Vec<Segment>,
}

impl StructureParser {
    pub fn parse(descriptor: &str) -> Result<ReadStructure, StructureError> {
        let parser = StructureParser {
            lexer: SegmentLexer::new(descriptor),
            current_mate: Mate::Forward,
            visited_mates: Vec::with_capacity(2),
            cursor: 0,
            barcode_mate: None,
            barcode_segments: Vec::new(),
            forward_sequence_segments: Vec::new(),
            reverse_sequence_segments: Vec::new(),
        };
        parser.run()
    }

    fn run(mut self) -> Result<ReadStructure, StructureError> {
        //A structure-string starts with the read specifier
        let first = self.lexer.next_letter().ok_or(StructureError::Empty)?;
        self.current_mate =
            Mate::from_marker(first).ok_or(StructureError::InvalidMateMarker(first as char))?;
        self.visited_mates.push(self.current_mate);

        loop {
            //Segment length. A missing digit run is only valid at the very end.
            let length = match self.lexer.next_length() {
                Some(length) => length,
                None => match self.lexer.peek() {
                    None => break,
                    Some(c) => {
                        return Err(StructureError::MissingLength {
                            found: c as char,
                            pos: self.lexer.pos,
                        })
                    }
                },
            };

            //Segment identifier
            let Some(kind) = self.lexer.next_letter() else {
                return Err(StructureError::TrailingNumber);
            };
            self.push_segment(kind, length)?;

            //A digit continues on the same mate, a fresh read specifier
            //switches mates, end-of-string terminates.
            match self.lexer.peek() {
                None => break,
                Some(c) if c.is_ascii_digit() => continue,
                Some(c) => match Mate::from_marker(c) {
                    Some(mate) => {
                        if self.visited_mates.contains(&mate) {
                            return Err(StructureError::DuplicateMateMarker(c as char));
                        }
                        self.lexer.next_letter();
                        self.visited_mates.push(mate);
                        self.current_mate = mate;
                        self.cursor = 0;
                    }
                    None => {
                        return Err(StructureError::UnexpectedAfterType {
                            found: c as char,
                            pos: self.lexer.pos,
                        })
                    }
                },
            }
        }

        self.finish()
    }

    fn push_segment(&mut self, kind: u8, length: usize) -> Result<(), StructureError> {
        let segment = Segment {
            mate: self.current_mate,
            start: self.cursor,
            end: self.cursor + length,
        };
        match kind {
            b'b' => {
                //The first barcode segment anywhere fixes the barcode mate
                if self.barcode_mate.is_none() {
                    self.barcode_mate = Some(self.current_mate);
                }
                self.barcode_segments.push(segment);
            }
            b'x' => {} //spacer: consumes position, records nothing
            b's' => match self.current_mate {
                Mate::Forward => self.forward_sequence_segments.push(segment),
                Mate::Reverse => self.reverse_sequence_segments.push(segment),
            },
            other => {
                return Err(StructureError::InvalidTypeLetter {
                    found: other as char,
                    pos: self.lexer.pos - 1,
                })
            }
        }
        self.cursor += length;
        Ok(())
    }

    fn finish(self) -> Result<ReadStructure, StructureError> {
        let Some(barcode_mate) = self.barcode_mate else {
            return Err(StructureError::NoBarcodeSegment);
        };
        if self.forward_sequence_segments.is_empty() && self.reverse_sequence_segments.is_empty() {
            return Err(StructureError::NoSequenceSegment);
        }

        let barcode_length = self.barcode_segments.iter().map(|s| s.len()).sum();

        Ok(ReadStructure {
            barcode_mate,
            barcode_length,
            barcode_segments: self.barcode_segments,
            forward_sequence_segments: self.forward_sequence_segments,
            reverse_sequence_segments: self.reverse_sequence_segments,
        })
    }
}
