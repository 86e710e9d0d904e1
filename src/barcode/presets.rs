use std::fmt;

///////////////////////////////
/// Library platforms with a known, fixed read layout. Each maps to the
/// structure-string a user would otherwise write by hand; an explicit
/// structure-string always wins over a preset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    /// 10x Chromium 3' GEX: 16bp cell barcode + 12bp UMI on R1, cDNA on R2
    Chromium,
    /// TELL-Seq linked reads: 18bp barcode and a spacer on R1
    TellSeq,
    /// stLFR: three 10bp barcode blocks with 6bp spacers at the start of R2
    Stlfr,
}

impl Platform {
    pub fn descriptor(&self) -> &'static str {
        match self {
            Platform::Chromium => "f16b12xr150s",
            Platform::TellSeq => "f18b5xr150s",
            Platform::Stlfr => "f100sr10b6x10b6x10b100s",
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let platform = match s.to_lowercase().as_str() {
            "chromium" | "10x" => Platform::Chromium,
            "tellseq" | "tell-seq" => Platform::TellSeq,
            "stlfr" => Platform::Stlfr,
            _ => return Err(format!("Unknown platform preset: {}", s)),
        };
        Ok(platform)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Platform::Chromium => "chromium",
            Platform::TellSeq => "tellseq",
            Platform::Stlfr => "stlfr",
        })
    }
}
