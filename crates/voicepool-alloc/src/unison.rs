//! Unison layout: per-voice detune and stereo position.

pub const MAX_UNISON_VOICES: usize = 16;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UnisonVoiceParams {
    /// -1.0 (first voice) to 1.0 (last voice), 0.0 for a single voice
    pub position: f32,
    /// Detune in cents
    pub detune_cents: f32,
    /// -1.0 = left, 1.0 = right
    pub pan: f32,
}

/// Precomputed spread for a unison stack, rebuilt when the config changes.
#[derive(Debug, Clone)]
pub struct UnisonLayout {
    voices: [UnisonVoiceParams; MAX_UNISON_VOICES],
    count: usize,
}

impl Default for UnisonLayout {
    fn default() -> Self {
        Self::new(1, 0.0, 0.0)
    }
}

impl UnisonLayout {
    /// `detune_cents` is the offset of the outermost voices, `spread` scales pan (0.0-1.0).
    pub fn new(count: usize, detune_cents: f32, spread: f32) -> Self {
        let count = count.clamp(1, MAX_UNISON_VOICES);
        let mut voices = [UnisonVoiceParams::default(); MAX_UNISON_VOICES];

        for (i, params) in voices.iter_mut().enumerate().take(count) {
            let position = if count == 1 {
                0.0
            } else {
                (i as f32 / (count - 1) as f32) * 2.0 - 1.0
            };

            *params = UnisonVoiceParams {
                position,
                detune_cents: position * detune_cents,
                pan: position * spread,
            };
        }

        Self { voices, count }
    }

    #[inline]
    pub fn voice_count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn voice_params(&self, index: usize) -> &UnisonVoiceParams {
        &self.voices[index.min(MAX_UNISON_VOICES - 1)]
    }

    #[inline]
    pub fn all_params(&self) -> &[UnisonVoiceParams] {
        &self.voices[..self.count]
    }
}
