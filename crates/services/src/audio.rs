use async_trait::async_trait;

use solfa_core::model::{Pitch, PlaybackElement};

/// Nominal duration one pitch sounds before the next element begins.
pub const NOTE_DURATION_MS: u64 = 500;

/// Default gap between playback elements; a silence consumes exactly one gap.
pub const DEFAULT_GAP_MS: u64 = 500;

/// Audio playback capability consumed by the quiz loop.
///
/// Implementations own the device mechanics. A missing audio resource is a
/// silent no-op, never an error: the session has no dependency on playback
/// for its own transitions.
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Play a single pitch for the nominal note duration.
    async fn play_pitch(&self, pitch: Pitch);

    /// Play a rendition in order. A pitch sounds for the nominal duration,
    /// then `gap_ms` elapses before the next element; a silence consumes
    /// `gap_ms` with no sound.
    async fn play_sequence(&self, elements: &[PlaybackElement], gap_ms: u64);
}

/// Player that produces no sound but honors the rendition's timing, useful
/// for tests and headless drivers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentPlayer;

#[async_trait]
impl AudioPlayer for SilentPlayer {
    async fn play_pitch(&self, _pitch: Pitch) {
        tokio::time::sleep(std::time::Duration::from_millis(NOTE_DURATION_MS)).await;
    }

    async fn play_sequence(&self, elements: &[PlaybackElement], gap_ms: u64) {
        for element in elements {
            let ms = match element {
                PlaybackElement::Note(_) => NOTE_DURATION_MS + gap_ms,
                PlaybackElement::Silence => gap_ms,
            };
            tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
        }
    }
}
