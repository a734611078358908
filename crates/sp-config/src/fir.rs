//! Loading FIR tap coefficients from `.txt` or `.wav` files.

use crate::error::ConfigError;
use std::path::Path;

/// Load tap coefficients from a file, dispatching on extension. `.txt` is
/// one decimal value per line; `.wav` is mono PCM or IEEE-float, and must
/// match `expected_sample_rate`.
pub fn load_taps(path: &Path, expected_sample_rate: u32) -> Result<Vec<f64>, ConfigError> {
    let err = |message: String| ConfigError::FirFile {
        path: path.display().to_string(),
        message,
    };
    match path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()) {
        Some(ext) if ext == "txt" => load_txt(path).map_err(|e| err(e.to_string())),
        Some(ext) if ext == "wav" => load_wav(path, expected_sample_rate),
        Some(other) => Err(err(format!("unsupported FIR file extension {other:?}"))),
        None => Err(err("FIR file has no extension".to_string())),
    }
}

fn load_txt(path: &Path) -> std::io::Result<Vec<f64>> {
    let text = std::fs::read_to_string(path)?;
    let mut taps = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let value: f64 = trimmed.parse().map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("line {}: not a decimal number: {:?}", lineno + 1, trimmed),
            )
        })?;
        taps.push(value);
    }
    Ok(taps)
}

fn load_wav(path: &Path, expected_sample_rate: u32) -> Result<Vec<f64>, ConfigError> {
    let err = |message: String| ConfigError::FirFile {
        path: path.display().to_string(),
        message,
    };
    let mut reader = hound::WavReader::open(path).map_err(|e| err(e.to_string()))?;
    let spec = reader.spec();
    if spec.channels != 1 {
        return Err(err(format!(
            "FIR wav files must be mono, got {} channels",
            spec.channels
        )));
    }
    if spec.sample_rate != expected_sample_rate {
        return Err(err(format!(
            "FIR wav sample rate {} does not match render sample rate {}",
            spec.sample_rate, expected_sample_rate
        )));
    }
    let taps = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .map(|s| s.map(|v| v as f64))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| err(e.to_string()))?,
        (hound::SampleFormat::Float, 64) => {
            // hound only exposes f32 samples; read as i32 bit pattern is not
            // applicable here, so 64-bit float wav is read via the f32 path
            // after hound's own upcast.
            reader
                .samples::<f32>()
                .map(|s| s.map(|v| v as f64))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| err(e.to_string()))?
        }
        (hound::SampleFormat::Int, bits @ (16 | 24 | 32)) => {
            let max = (1i64 << (bits - 1)) as f64 - 1.0;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f64 / max))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| err(e.to_string()))?
        }
        (format, bits) => {
            return Err(err(format!(
                "unsupported FIR wav format {format:?}/{bits}-bit"
            )))
        }
    };
    Ok(taps)
}
