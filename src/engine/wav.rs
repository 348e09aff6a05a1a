//! RIFF/WAVE encoding for mono 32-bit float PCM

use crate::error::{Error, Result};

use super::PcmBuffer;

/// Size of the canonical header written by [`encode_wav`]
pub const HEADER_LEN: usize = 44;

const FORMAT_IEEE_FLOAT: u16 = 3;
const CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 32;
const BYTES_PER_SAMPLE: u32 = BITS_PER_SAMPLE as u32 / 8;

/// Highest sample rate whose byte rate fits the 32-bit header field
pub const MAX_SAMPLE_RATE: u32 = u32::MAX / (CHANNELS as u32 * BYTES_PER_SAMPLE);

/// Encode mono f32 samples to a WAV byte buffer (44-byte header + data).
///
/// Fails when the byte rate or the chunk sizes do not fit their 32-bit fields.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let byte_rate = sample_rate
        .checked_mul(CHANNELS as u32 * BYTES_PER_SAMPLE)
        .ok_or_else(|| Error::InvalidParameter(format!("sample rate {sample_rate} is too high for WAV")))?;
    let block_align = CHANNELS * BYTES_PER_SAMPLE as u16;
    let (data_size, chunk_size) = u32::try_from(samples.len())
        .ok()
        .and_then(|n| n.checked_mul(BYTES_PER_SAMPLE))
        .and_then(|data| Some((data, data.checked_add(36)?)))
        .ok_or_else(|| {
            Error::InvalidParameter(format!("{} samples do not fit a WAV data chunk", samples.len()))
        })?;

    let mut buf = Vec::with_capacity(HEADER_LEN + data_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&chunk_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&FORMAT_IEEE_FLOAT.to_le_bytes());
    buf.extend_from_slice(&CHANNELS.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        buf.extend_from_slice(&sample.to_le_bytes());
    }

    Ok(buf)
}

/// Header fields of a canonical 44-byte WAV header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub chunk_size: u32,
    pub fmt_size: u32,
    pub audio_format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_size: u32,
}

impl WavHeader {
    /// Parse the fixed header layout produced by [`encode_wav`]
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::InvalidWav(format!(
                "expected at least {} bytes, got {}",
                HEADER_LEN,
                bytes.len()
            )));
        }
        expect_tag(bytes, 0, b"RIFF")?;
        expect_tag(bytes, 8, b"WAVE")?;
        expect_tag(bytes, 12, b"fmt ")?;
        expect_tag(bytes, 36, b"data")?;

        Ok(Self {
            chunk_size: read_u32(bytes, 4),
            fmt_size: read_u32(bytes, 16),
            audio_format: read_u16(bytes, 20),
            channels: read_u16(bytes, 22),
            sample_rate: read_u32(bytes, 24),
            byte_rate: read_u32(bytes, 28),
            block_align: read_u16(bytes, 32),
            bits_per_sample: read_u16(bytes, 34),
            data_size: read_u32(bytes, 40),
        })
    }

    /// Number of samples described by the data chunk
    pub fn sample_count(&self) -> usize {
        match self.block_align {
            0 => 0,
            align => self.data_size as usize / align as usize,
        }
    }
}

/// Decode bytes written by [`encode_wav`] back into a buffer
pub fn decode_wav(bytes: &[u8]) -> Result<PcmBuffer> {
    let header = WavHeader::parse(bytes)?;

    if header.audio_format != FORMAT_IEEE_FLOAT
        || header.channels != CHANNELS
        || header.bits_per_sample != BITS_PER_SAMPLE
    {
        return Err(Error::InvalidWav(format!(
            "unsupported format {} with {} channels at {} bits",
            header.audio_format, header.channels, header.bits_per_sample
        )));
    }

    let data = &bytes[HEADER_LEN..];
    if data.len() < header.data_size as usize {
        return Err(Error::InvalidWav(format!(
            "data chunk declares {} bytes but only {} are present",
            header.data_size,
            data.len()
        )));
    }

    let samples = data[..header.data_size as usize]
        .chunks_exact(BYTES_PER_SAMPLE as usize)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    Ok(PcmBuffer::new(samples, header.sample_rate))
}

fn expect_tag(bytes: &[u8], offset: usize, tag: &[u8; 4]) -> Result<()> {
    if &bytes[offset..offset + 4] == tag {
        Ok(())
    } else {
        Err(Error::InvalidWav(format!(
            "missing {:?} tag at offset {}",
            String::from_utf8_lossy(tag),
            offset
        )))
    }
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_header_layout() {
        let wav = encode_wav(&[0.25, -0.5, 1.0], 44100).unwrap();

        assert_eq!(wav.len(), 44 + 12);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[4..8], &48u32.to_le_bytes());
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(&wav[16..20], &16u32.to_le_bytes());
        assert_eq!(&wav[20..22], &3u16.to_le_bytes());
        assert_eq!(&wav[22..24], &1u16.to_le_bytes());
        assert_eq!(&wav[24..28], &44100u32.to_le_bytes());
        assert_eq!(&wav[28..32], &(44100u32 * 4).to_le_bytes());
        assert_eq!(&wav[32..34], &4u16.to_le_bytes());
        assert_eq!(&wav[34..36], &32u16.to_le_bytes());
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(&wav[40..44], &12u32.to_le_bytes());
        assert_eq!(&wav[44..48], &0.25f32.to_le_bytes());
    }

    #[test]
    fn test_empty_buffer() {
        let wav = encode_wav(&[], 8000).unwrap();
        assert_eq!(wav.len(), HEADER_LEN);

        let header = WavHeader::parse(&wav).unwrap();
        assert_eq!(header.chunk_size, 36);
        assert_eq!(header.sample_count(), 0);
    }

    #[test]
    fn test_decode_recovers_samples() {
        let samples = vec![0.0, 0.1, -0.7, f32::MIN_POSITIVE, 1.0, -1.0];
        let pcm = decode_wav(&encode_wav(&samples, 22050).unwrap()).unwrap();

        assert_eq!(pcm.samples(), samples.as_slice());
        assert_eq!(pcm.sample_rate(), 22050);
        assert_eq!(pcm.channels(), 1);
    }

    #[test]
    fn test_hound_reads_output() {
        let samples: Vec<f32> = (0..100).map(|i| (i as f32 / 50.0) - 1.0).collect();
        let wav = encode_wav(&samples, 48000).unwrap();

        let reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 48000);
        assert_eq!(spec.bits_per_sample, 32);
        assert_eq!(spec.sample_format, hound::SampleFormat::Float);

        let decoded: Vec<f32> = reader.into_samples().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn test_sample_rate_limit() {
        let wav = encode_wav(&[0.0], MAX_SAMPLE_RATE).unwrap();
        let header = WavHeader::parse(&wav).unwrap();
        assert_eq!(header.byte_rate, MAX_SAMPLE_RATE * 4);

        assert!(matches!(
            encode_wav(&[0.0], 2_000_000_000),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            encode_wav(&[0.0], MAX_SAMPLE_RATE + 1),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_rejects_truncated_input() {
        assert!(matches!(WavHeader::parse(b"RIFF"), Err(Error::InvalidWav(_))));

        let mut wav = encode_wav(&[0.5, 0.5], 8000).unwrap();
        wav.truncate(HEADER_LEN + 4);
        assert!(matches!(decode_wav(&wav), Err(Error::InvalidWav(_))));
    }

    #[test]
    fn test_rejects_wrong_tags() {
        let mut wav = encode_wav(&[0.5], 8000).unwrap();
        wav[8..12].copy_from_slice(b"AVI ");
        assert!(matches!(WavHeader::parse(&wav), Err(Error::InvalidWav(_))));
    }
}
