use clap::ValueEnum;
use super::Samples;

/// Fixed-width element encodings a raw capture can be stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SampleEncoding {
    #[value(name = "i8")]
    I8,
    #[value(name = "i16")]
    I16,
    #[value(name = "i32")]
    I32,
    #[value(name = "f32")]
    F32,
    #[value(name = "f64")]
    F64,
}

impl SampleEncoding {
    pub fn byte_width(&self) -> usize {
        match self {
            SampleEncoding::I8 => 1,
            SampleEncoding::I16 => 2,
            SampleEncoding::I32 => 4,
            SampleEncoding::F32 => 4,
            SampleEncoding::F64 => 8,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SampleEncoding::I8 => "i8",
            SampleEncoding::I16 => "i16",
            SampleEncoding::I32 => "i32",
            SampleEncoding::F32 => "f32",
            SampleEncoding::F64 => "f64",
        }
    }
}

/// Decode a flat little-endian buffer into typed samples.
/// A trailing partial element is dropped.
pub fn decode(buffer: &[u8], encoding: SampleEncoding) -> Samples {
    let width = encoding.byte_width();
    let remainder = buffer.len() % width;
    if remainder != 0 {
        log::debug!(
            "Dropping {} trailing byte(s) that do not form a whole {} element",
            remainder,
            encoding.name()
        );
    }

    match encoding {
        SampleEncoding::I8 => Samples::I8(buffer.iter().map(|&b| b as i8).collect()),
        SampleEncoding::I16 => Samples::I16(
            buffer
                .chunks_exact(2)
                .map(|chunk| i16::from_le_bytes([chunk[0], chunk[1]]))
                .collect(),
        ),
        SampleEncoding::I32 => Samples::I32(
            buffer
                .chunks_exact(4)
                .map(|chunk| i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .collect(),
        ),
        SampleEncoding::F32 => Samples::F32(
            buffer
                .chunks_exact(4)
                .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .collect(),
        ),
        SampleEncoding::F64 => Samples::F64(
            buffer
                .chunks_exact(8)
                .map(|chunk| {
                    let mut bytes = [0u8; 8];
                    bytes.copy_from_slice(chunk);
                    f64::from_le_bytes(bytes)
                })
                .collect(),
        ),
    }
}
