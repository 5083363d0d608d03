/// Sound engine: procedural chimes and Music-zone tunes via rodio.
///
/// Effects are generated as in-memory WAV buffers at init time and played
/// fire-and-forget. Tracks are rendered from their note list on demand into
/// one dedicated Sink, so starting a track always replaces the previous one.
///
/// Compile with `--no-default-features` or without "sound" feature
/// to disable audio entirely (the stub SoundEngine reports every track
/// as unplayable).
///
/// `AudioRegistry` is independent of the feature: it decides who owns the
/// single music slot; the engine only makes noise.

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use crate::domain::zone::Track;

    const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = std::f32::consts::TAU;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        music: Option<Sink>,
        sfx_open: Arc<Vec<u8>>,
        sfx_close: Arc<Vec<u8>>,
        sfx_tired: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("no audio output: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                music: None,
                sfx_open: Arc::new(make_wav(&gen_open())),
                sfx_close: Arc::new(make_wav(&gen_close())),
                sfx_tired: Arc::new(make_wav(&gen_tired())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        pub fn play_open(&self) { self.play(&self.sfx_open); }
        pub fn play_close(&self) { self.play(&self.sfx_close); }
        pub fn play_tired(&self) { self.play(&self.sfx_tired); }

        /// Start `track`, replacing whatever was playing.
        pub fn play_track(&mut self, track: &Track) -> Result<(), String> {
            self.stop_track();
            if track.notes.iter().all(|&n| n == 0) {
                return Err(format!("\"{}\" has no notes", track.title));
            }
            let wav = make_wav(&gen_track(&track.notes, track.beat_ms));
            let sink = Sink::try_new(&self.handle)
                .map_err(|e| format!("audio output unavailable: {e}"))?;
            let src = rodio::Decoder::new(Cursor::new(wav))
                .map_err(|e| format!("could not decode \"{}\": {e}", track.title))?;
            sink.append(src);
            self.music = Some(sink);
            Ok(())
        }

        pub fn stop_track(&mut self) {
            if let Some(sink) = self.music.take() {
                sink.stop();
            }
        }

        /// True once the current track has played to the end.
        pub fn track_finished(&self) -> bool {
            self.music.as_ref().is_some_and(|s| s.empty())
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    fn midi_to_freq(note: u8) -> f32 {
        440.0 * 2f32.powf((note as f32 - 69.0) / 12.0)
    }

    /// Sine plus a little 3rd harmonic, for a soft retro tone.
    fn tone(freq: f32, secs: f32, volume: f32, attack: f32) -> impl Iterator<Item = f32> {
        let n = (SAMPLE_RATE as f32 * secs) as usize;
        let attack_n = ((SAMPLE_RATE as f32 * attack) as usize).max(1);
        (0..n).map(move |i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let rise = (i as f32 / attack_n as f32).min(1.0);
            let fall = 1.0 - (i as f32 / n as f32).powf(1.5);
            let wave = (t * freq * TAU).sin() * 0.8 + (t * freq * 3.0 * TAU).sin() * 0.2;
            wave * rise * fall * volume
        })
    }

    /// Panel open: quick rising fifth.
    fn gen_open() -> Vec<f32> {
        let mut s: Vec<f32> = tone(659.0, 0.06, 0.25, 0.004).collect();
        s.extend(tone(988.0, 0.10, 0.25, 0.004));
        s
    }

    /// Panel close: the same interval falling.
    fn gen_close() -> Vec<f32> {
        let mut s: Vec<f32> = tone(988.0, 0.05, 0.2, 0.004).collect();
        s.extend(tone(659.0, 0.08, 0.2, 0.004));
        s
    }

    /// Out of stamina: low descending puff.
    fn gen_tired() -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.18) as usize;
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                let freq = 220.0 - p * 90.0;
                let t = i as f32 / SAMPLE_RATE as f32;
                (t * freq * TAU).sin() * (1.0 - p) * 0.3
            })
            .collect()
    }

    /// One beat per note; 0 is a rest.
    pub(super) fn gen_track(notes: &[u8], beat_ms: u32) -> Vec<f32> {
        let beat = beat_ms as f32 / 1000.0;
        let per_beat = (SAMPLE_RATE as f32 * beat) as usize;
        let mut samples = Vec::with_capacity(per_beat * notes.len());
        for &note in notes {
            let start = samples.len();
            if note > 0 {
                samples.extend(tone(midi_to_freq(note), beat * 0.9, 0.22, 0.01));
            }
            samples.resize(start + per_beat, 0.0);
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    pub(super) fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2; // 16-bit = 2 bytes per sample
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_open(&self) {}
    pub fn play_close(&self) {}
    pub fn play_tired(&self) {}
    pub fn play_track(&mut self, _track: &crate::domain::zone::Track) -> Result<(), String> {
        Err("built without sound support".into())
    }
    pub fn stop_track(&mut self) {}
    pub fn track_finished(&self) -> bool { false }
}

// ════════════════════════════════════════════════════════════
//  Audio ownership
// ════════════════════════════════════════════════════════════

/// Single-owner registry for the music slot.
///
/// `claim` hands back the previous owner so the caller can stop it before
/// starting the new one. `release` is a no-op unless the caller is still
/// the owner, so a stale release cannot silence someone else.
#[derive(Clone, Debug)]
pub struct AudioRegistry<K> {
    current: Option<K>,
}

impl<K> Default for AudioRegistry<K> {
    fn default() -> Self {
        AudioRegistry { current: None }
    }
}

impl<K: Copy + Eq> AudioRegistry<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `owner` current; returns the displaced owner, if any other.
    pub fn claim(&mut self, owner: K) -> Option<K> {
        match self.current.replace(owner) {
            Some(prev) if prev != owner => Some(prev),
            _ => None,
        }
    }

    /// Returns true if `owner` was current and is now released.
    pub fn release(&mut self, owner: K) -> bool {
        if self.current == Some(owner) {
            self.current = None;
            true
        } else {
            false
        }
    }

    pub fn current(&self) -> Option<K> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    struct Owner(usize, usize);

    #[test]
    fn claim_returns_previous_owner() {
        let mut reg = AudioRegistry::new();
        assert_eq!(reg.claim(Owner(2, 0)), None);
        assert_eq!(reg.claim(Owner(2, 1)), Some(Owner(2, 0)));
        assert_eq!(reg.current(), Some(Owner(2, 1)));
    }

    #[test]
    fn reclaiming_is_not_a_displacement() {
        let mut reg = AudioRegistry::new();
        reg.claim(Owner(2, 0));
        assert_eq!(reg.claim(Owner(2, 0)), None);
    }

    #[test]
    fn release_only_by_current_owner() {
        let mut reg = AudioRegistry::new();
        reg.claim(Owner(2, 0));
        reg.claim(Owner(2, 1));
        // Stale owner cannot clear the slot.
        assert!(!reg.release(Owner(2, 0)));
        assert_eq!(reg.current(), Some(Owner(2, 1)));
        assert!(reg.release(Owner(2, 1)));
        assert_eq!(reg.current(), None);
        assert!(!reg.release(Owner(2, 1)));
    }
}
