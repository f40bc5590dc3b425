use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, ScrollBehavior, ScrollIntoViewOptions, Window};

/// Retrieve the global `window` object.
///
/// # Panics
/// Panics if executed outside of a browser context where `window` is unavailable.
#[must_use]
pub fn window() -> Window {
    web_sys::window().expect("`window` should be available in web context")
}

/// Retrieve the document object for DOM interactions.
///
/// # Panics
/// Panics when the document cannot be accessed from the current browser window.
#[must_use]
pub fn document() -> Document {
    window()
        .document()
        .expect("`document` should exist in browser context")
}

/// Convert a JavaScript value into a readable string for error reporting.
#[must_use]
pub fn js_error_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|err| err.message().into())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Log an error message to the browser console.
pub fn console_error(message: &str) {
    web_sys::console::error_1(&JsValue::from(message));
}

/// DOM id of the chapter `<section>` with the given index.
#[must_use]
pub fn chapter_id(index: usize) -> String {
    format!("chapter-{index}")
}

/// Smooth-scroll the chapter with `index` into view. Missing elements are a
/// no-op; chapters may not be mounted yet when a stale scroll effect lands.
pub fn scroll_to_chapter(index: usize) {
    let Some(el) = document().get_element_by_id(&chapter_id(index)) else {
        return;
    };
    let options = ScrollIntoViewOptions::new();
    options.set_behavior(ScrollBehavior::Smooth);
    el.scroll_into_view_with_scroll_into_view_options(&options);
}

/// Whether the viewer asked for reduced motion at the OS level.
#[must_use]
pub fn prefers_reduced_motion() -> bool {
    media_query_matches("(prefers-reduced-motion: reduce)")
}

/// Narrow-viewport check; maps to the core machines' `low_power` flag.
#[must_use]
pub fn is_narrow_viewport() -> bool {
    media_query_matches("(max-width: 768px)")
}

fn media_query_matches(query: &str) -> bool {
    web_sys::window()
        .and_then(|win| win.match_media(query).ok().flatten())
        .is_some_and(|list| list.matches())
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::chapter_id;

    #[test]
    fn chapter_ids_are_stable() {
        assert_eq!(chapter_id(0), "chapter-0");
        assert_eq!(chapter_id(2), "chapter-2");
    }
}
