//! Audio element wrapper.
//!
//! The story's two tracks (intro narration music and the main background
//! song) live as `<audio>` elements in the static page. Everything here is
//! best-effort: autoplay rejections are swallowed, a missing element is a
//! silent no-op, so the presentation keeps running without sound.

use wasm_bindgen::JsCast;
use web_sys::HtmlAudioElement;

/// Default background-track volume.
pub const DEFAULT_VOLUME: f64 = 0.75;

/// Element id of the main background track.
pub const BG_MUSIC_ID: &str = "bg-music";
/// Element id of the intro track.
pub const INTRO_MUSIC_ID: &str = "intro-music";

/// Handle on one `<audio>` element, looked up lazily by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDeck {
    element_id: &'static str,
}

impl AudioDeck {
    #[must_use]
    pub const fn new(element_id: &'static str) -> Self {
        Self { element_id }
    }

    fn element(&self) -> Option<HtmlAudioElement> {
        web_sys::window()
            .and_then(|win| win.document())
            .and_then(|doc| doc.get_element_by_id(self.element_id))
            .and_then(|el| el.dyn_into::<HtmlAudioElement>().ok())
    }

    /// Start playback at `volume`. Autoplay rejections and missing elements
    /// are swallowed; the returned promise is intentionally dropped.
    pub fn play(&self, volume: f64) {
        if let Some(audio) = self.element() {
            audio.set_volume(volume.clamp(0.0, 1.0));
            if let Err(err) = audio.play() {
                log::debug!(
                    "audio '{}' play rejected: {}",
                    self.element_id,
                    crate::dom::js_error_message(&err)
                );
            }
        }
    }

    /// Pause and rewind to the start.
    pub fn stop(&self) {
        if let Some(audio) = self.element() {
            let _ = audio.pause();
            audio.set_current_time(0.0);
        }
    }

    pub fn set_volume(&self, volume: f64) {
        if let Some(audio) = self.element() {
            audio.set_volume(volume.clamp(0.0, 1.0));
        }
    }

    pub fn set_muted(&self, muted: bool) {
        if let Some(audio) = self.element() {
            audio.set_muted(muted);
        }
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.element().is_some_and(|audio| !audio.paused())
    }
}
