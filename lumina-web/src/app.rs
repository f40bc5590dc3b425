use crate::a11y::{set_status, visible_focus_css};
use crate::audio::{AudioDeck, BG_MUSIC_ID, DEFAULT_VOLUME, INTRO_MUSIC_ID};
use crate::components::{
    AchievementToast, ChapterChevron, DotsRail, IntroSequence, RitualChapter, SiegeChapter,
    VinylChapter,
};
use crate::dom;
use crate::driver::{Liveness, arm, now_ms};
use lumina_story::{
    AchievementGate, AchievementKey, GateEffect, NavCommand, OBSERVER_THRESHOLDS, SceneScript,
    SectionEffect, SectionTracker, StoryContent, VisibilitySample,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{
    HtmlInputElement, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    KeyboardEvent,
};
use yew::prelude::*;

const CHAPTER_COUNT: usize = 3;

fn parse_chapter_index(id: &str) -> Option<usize> {
    id.strip_prefix("chapter-")?.parse().ok()
}

/// Top-level shell: intro overlay, three scroll-snap chapters, navigation,
/// audio controls, achievement toast and the screen-reader live region.
#[function_component(App)]
pub fn app() -> Html {
    let content = use_memo((), |()| StoryContent::load_from_static());
    let script: Option<SceneScript> = (*use_memo(content.clone(), |content| {
        content
            .scene_script()
            .map_err(|err| log::warn!("intro disabled, scene script invalid: {err}"))
            .ok()
    }))
    .clone();

    let gate = use_mut_ref(AchievementGate::new);
    let tracker = use_mut_ref(SectionTracker::new);
    let live = use_memo((), |()| Liveness::new());

    // Skip the intro outright if the embedded script failed validation.
    let intro_done = use_state(|| script.is_none());
    let current = use_state(|| 0usize);
    let toast = use_state(|| Option::<(AchievementKey, bool)>::None);
    let back_to_top = use_state(|| false);
    let muted = use_state(|| false);
    let volume = use_state(|| DEFAULT_VOLUME);
    let low_power = use_memo((), |()| {
        dom::is_narrow_viewport() || dom::prefers_reduced_motion()
    });

    {
        let live = live.clone();
        let gate = gate.clone();
        use_effect_with((), move |()| {
            move || {
                live.kill();
                gate.borrow_mut().teardown();
            }
        });
    }

    let handle_gate_effects = {
        let toast = toast.clone();
        let content = content.clone();
        Callback::from(move |effects: Vec<GateEffect>| {
            for effect in effects {
                match effect {
                    GateEffect::Unlocked(key) => {
                        if let Some(info) = content.achievement(key) {
                            set_status(&format!("Achievement unlocked: {}", info.title));
                        }
                    }
                    GateEffect::ToastOpened(key) => toast.set(Some((key, false))),
                    GateEffect::ToastExiting(key) => toast.set(Some((key, true))),
                    GateEffect::ToastClosed(_) => toast.set(None),
                }
            }
        })
    };

    let unlock = {
        let gate = gate.clone();
        let live = live.clone();
        let handle_gate_effects = handle_gate_effects.clone();
        Callback::from(move |key: AchievementKey| {
            let effects = gate.borrow_mut().unlock(key, now_ms()).into_vec();
            if effects.is_empty() {
                return;
            }
            handle_gate_effects.emit(effects);
            arm(&gate, &live, &handle_gate_effects);
        })
    };

    // Route a batch of tracker effects: scrolls go to the DOM, unlocks to
    // the gate.
    fn route_section_effects(
        effects: impl IntoIterator<Item = SectionEffect>,
        unlock: &Callback<AchievementKey>,
    ) {
        for effect in effects {
            match effect {
                SectionEffect::ScrollTo(index) => dom::scroll_to_chapter(index),
                SectionEffect::Unlock(key) => unlock.emit(key),
            }
        }
    }

    let on_intro_complete = {
        let intro_done = intro_done.clone();
        let tracker = tracker.clone();
        Callback::from(move |()| {
            tracker.borrow_mut().set_chapter_count(CHAPTER_COUNT);
            intro_done.set(true);
        })
    };

    // Visibility tracking: observe the chapter sections once they exist.
    {
        let tracker = tracker.clone();
        let unlock = unlock.clone();
        let current = current.clone();
        use_effect_with(*intro_done, move |mounted| {
            let mut cleanup: Option<(IntersectionObserver, Closure<dyn FnMut(js_sys::Array)>)> =
                None;
            if *mounted {
                tracker.borrow_mut().set_chapter_count(CHAPTER_COUNT);
                let callback = Closure::<dyn FnMut(js_sys::Array)>::new(
                    move |entries: js_sys::Array| {
                        let samples: Vec<VisibilitySample> = entries
                            .iter()
                            .filter_map(|value| {
                                let entry = value.dyn_into::<IntersectionObserverEntry>().ok()?;
                                let index = parse_chapter_index(&entry.target().id())?;
                                Some(VisibilitySample {
                                    index,
                                    ratio: entry.intersection_ratio(),
                                })
                            })
                            .collect();
                        let effects = tracker.borrow_mut().observe(&samples);
                        current.set(tracker.borrow().current());
                        route_section_effects(effects, &unlock);
                    },
                );
                let init = IntersectionObserverInit::new();
                let thresholds = js_sys::Array::new();
                for t in OBSERVER_THRESHOLDS {
                    thresholds.push(&t.into());
                }
                init.set_threshold(&thresholds);
                match IntersectionObserver::new_with_options(
                    callback.as_ref().unchecked_ref(),
                    &init,
                ) {
                    Ok(observer) => {
                        for index in 0..CHAPTER_COUNT {
                            if let Some(el) =
                                dom::document().get_element_by_id(&dom::chapter_id(index))
                            {
                                observer.observe(&el);
                            }
                        }
                        cleanup = Some((observer, callback));
                    }
                    Err(err) => {
                        dom::console_error(&format!(
                            "intersection observer unavailable: {}",
                            dom::js_error_message(&err)
                        ));
                    }
                }
            }
            move || {
                if let Some((observer, _callback)) = cleanup {
                    observer.disconnect();
                }
            }
        });
    }

    // Keyboard navigation, active once the chapters exist.
    {
        let tracker = tracker.clone();
        let unlock = unlock.clone();
        use_effect_with(*intro_done, move |mounted| {
            let mut listener: Option<Closure<dyn FnMut(KeyboardEvent)>> = None;
            if *mounted {
                let callback = Closure::<dyn FnMut(KeyboardEvent)>::new(
                    move |event: KeyboardEvent| {
                        let Some(command) = NavCommand::from_key(&event.key()) else {
                            return;
                        };
                        event.prevent_default();
                        let effects = tracker.borrow_mut().navigate(command);
                        route_section_effects(effects, &unlock);
                    },
                );
                let _ = dom::window().add_event_listener_with_callback(
                    "keydown",
                    callback.as_ref().unchecked_ref(),
                );
                listener = Some(callback);
            }
            move || {
                if let Some(callback) = listener {
                    let _ = dom::window().remove_event_listener_with_callback(
                        "keydown",
                        callback.as_ref().unchecked_ref(),
                    );
                }
            }
        });
    }

    let on_music_start = {
        let unlock = unlock.clone();
        let muted = muted.clone();
        let volume = volume.clone();
        Callback::from(move |()| {
            let deck = AudioDeck::new(BG_MUSIC_ID);
            deck.set_muted(*muted);
            deck.play(*volume);
            unlock.emit(AchievementKey::MusicStart);
        })
    };

    // Finishing the ritual ends the journey: the final achievement unlocks
    // here, whether or not the back-to-top button is ever clicked.
    let on_ritual_finished = {
        let tracker = tracker.clone();
        let back_to_top = back_to_top.clone();
        let unlock = unlock.clone();
        Callback::from(move |()| {
            tracker.borrow_mut().show_back_to_top();
            back_to_top.set(true);
            unlock.emit(AchievementKey::BackToTop);
        })
    };

    // Shared by the dots rail and the per-chapter chevrons.
    let on_scroll_request = {
        let tracker = tracker.clone();
        let unlock = unlock.clone();
        Callback::from(move |index: usize| {
            let effects = tracker.borrow_mut().request_scroll(index);
            route_section_effects(effects, &unlock);
        })
    };

    let on_back_to_top = {
        let on_scroll_request = on_scroll_request.clone();
        Callback::from(move |_: MouseEvent| on_scroll_request.emit(0))
    };

    let toggle_mute = {
        let muted = muted.clone();
        Callback::from(move |_: MouseEvent| {
            let next = !*muted;
            AudioDeck::new(BG_MUSIC_ID).set_muted(next);
            AudioDeck::new(INTRO_MUSIC_ID).set_muted(next);
            muted.set(next);
        })
    };

    let on_volume_input = {
        let volume = volume.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                if let Ok(value) = input.value().parse::<f64>() {
                    let value = value.clamp(0.0, 1.0);
                    AudioDeck::new(BG_MUSIC_ID).set_volume(value);
                    volume.set(value);
                }
            }
        })
    };

    let toast_view = toast.and_then(|(key, exiting)| {
        content
            .achievement(key)
            .map(|info| html! { <AchievementToast info={info.clone()} {exiting} /> })
    });

    html! {
        <>
            <style>{ visible_focus_css() }</style>
            <div id="story-live" class="sr-only" aria-live="polite" />
            <audio id={INTRO_MUSIC_ID} src="/hie/intro-theme.mp3" preload="auto" />
            <audio id={BG_MUSIC_ID} src="/hie/bg-music.mp3" loop={true} preload="auto" />

            if !*intro_done {
                if let Some(script) = script {
                    <IntroSequence {script} on_complete={on_intro_complete} />
                }
            } else {
                <main class="story-shell">
                    <section id={dom::chapter_id(0)} class="chapter">
                        <span class="chapter-badge">{ "Chapter 1" }</span>
                        <h2 class="chapter-banner">{ "🎵 Drop the Needle" }</h2>
                        <VinylChapter low_power={*low_power} {on_music_start} />
                        <ChapterChevron target={1} label="Continue to chapter 2"
                            on_select={on_scroll_request.clone()} />
                    </section>
                    <section id={dom::chapter_id(1)} class="chapter">
                        <span class="chapter-badge">{ "Chapter 2" }</span>
                        <h2 class="chapter-banner">{ "🏰 Storm the Town Hall" }</h2>
                        <SiegeChapter />
                        <ChapterChevron target={2} label="Continue to chapter 3"
                            on_select={on_scroll_request.clone()} />
                    </section>
                    <section id={dom::chapter_id(2)} class="chapter">
                        <span class="chapter-badge">{ "Chapter 3" }</span>
                        <h2 class="chapter-banner">{ "🎂 The Birthday Ritual" }</h2>
                        <RitualChapter low_power={*low_power} content={content.clone()}
                            on_finished={on_ritual_finished} />
                    </section>

                    <DotsRail chapter_count={CHAPTER_COUNT} current={*current}
                        on_select={on_scroll_request} />

                    <div class="audio-controls">
                        <button onclick={toggle_mute}
                            aria-label={ if *muted { "Unmute" } else { "Mute" } }>
                            { if *muted { "🔇" } else { "🔊" } }
                        </button>
                        <input type="range" min="0" max="1" step="0.05"
                            value={volume.to_string()} oninput={on_volume_input}
                            aria-label="Music volume" />
                    </div>

                    if *back_to_top {
                        <button class="back-to-top" onclick={on_back_to_top}>
                            { "↑ Back to the beginning" }
                        </button>
                    }

                    { toast_view }
                </main>
            }
        </>
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::parse_chapter_index;

    #[test]
    fn chapter_ids_round_trip() {
        assert_eq!(parse_chapter_index("chapter-0"), Some(0));
        assert_eq!(parse_chapter_index("chapter-2"), Some(2));
        assert_eq!(parse_chapter_index("chapter-x"), None);
        assert_eq!(parse_chapter_index("other"), None);
    }
}
