//! PCMU framing on top of the ITU-T G.711 µ-law reference encoder

use codec_core::codecs::g711::ulaw_compress;

/// Samples per 20 ms frame at 8 kHz.
pub const FRAME_SAMPLES: usize = 160;

/// µ-law code for a zero sample.
pub const MU_LAW_SILENCE: u8 = 0xFF;

/// Encode 8 kHz PCM into 20 ms µ-law frames; the last frame is padded with silence.
pub fn encode_frames(samples: &[i16]) -> Vec<[u8; FRAME_SAMPLES]> {
    samples
        .chunks(FRAME_SAMPLES)
        .map(|chunk| {
            let mut frame = [MU_LAW_SILENCE; FRAME_SAMPLES];
            for (slot, &sample) in frame.iter_mut().zip(chunk) {
                *slot = ulaw_compress(sample);
            }
            frame
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_code_matches_encoder() {
        assert_eq!(ulaw_compress(0), MU_LAW_SILENCE);
        let frames = encode_frames(&[0i16; FRAME_SAMPLES]);
        assert!(frames[0].iter().all(|&b| b == MU_LAW_SILENCE));
    }

    #[test]
    fn test_sign_bit_follows_sample() {
        let frames = encode_frames(&[1000, -1000, i16::MAX, i16::MIN]);
        assert_ne!(frames[0][0] & 0x80, 0);
        assert_eq!(frames[0][1] & 0x80, 0);
        assert_eq!(frames[0][2], 0x80);
        assert_eq!(frames[0][3], 0x00);
    }

    #[test]
    fn test_frames_are_padded() {
        let frames = encode_frames(&[1000i16; 170]);
        assert_eq!(frames.len(), 2);
        assert_ne!(frames[1][0], MU_LAW_SILENCE);
        assert!(frames[1][10..].iter().all(|&b| b == MU_LAW_SILENCE));
        assert!(encode_frames(&[]).is_empty());
    }
}
