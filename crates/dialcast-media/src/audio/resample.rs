/// Linear-interpolation resampler.
///
/// Adequate for narrowband telephony where the output is immediately quantized to
/// 8-bit µ-law.
pub fn resample_linear(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if samples.is_empty() || from_rate == 0 || to_rate == 0 {
        return Vec::new();
    }
    if from_rate == to_rate {
        return samples.to_vec();
    }

    let out_len = ((samples.len() as u64 * to_rate as u64) / from_rate as u64).max(1) as usize;
    let step = from_rate as f64 / to_rate as f64;
    let last = samples.len() - 1;

    (0..out_len)
        .map(|i| {
            let position = i as f64 * step;
            let index = (position.floor() as usize).min(last);
            let next = (index + 1).min(last);
            let frac = position - index as f64;
            let value = samples[index] as f64 * (1.0 - frac) + samples[next] as f64 * frac;
            value.round().clamp(i16::MIN as f64, i16::MAX as f64) as i16
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_rate_is_identity() {
        let input = vec![1, 2, 3];
        assert_eq!(resample_linear(&input, 8000, 8000), input);
    }

    #[test]
    fn test_downsample_length() {
        let input = vec![0i16; 44100];
        assert_eq!(resample_linear(&input, 44100, 8000).len(), 8000);
    }

    #[test]
    fn test_upsample_interpolates() {
        let out = resample_linear(&[0, 100], 1, 2);
        assert_eq!(out, vec![0, 50, 100, 100]);
    }

    #[test]
    fn test_empty_input() {
        assert!(resample_linear(&[], 48000, 8000).is_empty());
    }
}
