//! `canvas-confetti` binding.
//!
//! The page loads `canvas-confetti` as a global; the state machines describe
//! bursts as [`BurstSpec`] values and this module forwards them. Fire and
//! forget: failures only reach the console.

use lumina_story::BurstSpec;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// The `confetti(options)` global installed by the canvas-confetti
    /// script tag.
    #[wasm_bindgen(js_name = confetti, catch)]
    fn confetti_raw(options: JsValue) -> Result<(), JsValue>;
}

/// Fire one burst. Serialization or invocation failures are logged and
/// otherwise ignored.
pub fn fire(spec: &BurstSpec) {
    match serde_wasm_bindgen::to_value(spec) {
        Ok(options) => {
            if let Err(err) = confetti_raw(options) {
                log::debug!("confetti failed: {}", crate::dom::js_error_message(&err));
            }
        }
        Err(err) => log::warn!("burst spec did not serialize: {err}"),
    }
}

/// Fire every burst in a machine's effect batch, ignoring other effects.
pub fn fire_all<'a, I>(specs: I)
where
    I: IntoIterator<Item = &'a BurstSpec>,
{
    for spec in specs {
        fire(spec);
    }
}
