use crate::confetti;
use crate::driver::Liveness;
use gloo::timers::future::TimeoutFuture;
use lumina_story::BurstSpec;
use wasm_bindgen_futures::spawn_local;
use web_sys::KeyboardEvent;
use yew::prelude::*;

/// Delay before the celebratory burst after the record starts.
const BURST_DELAY_MS: u32 = 500;
/// Delay before the featured photo fades in.
const PHOTO_DELAY_MS: u32 = 1_000;
/// Delay before the scroll prompt appears.
const PROMPT_DELAY_MS: u32 = 2_000;

#[derive(Properties, PartialEq, Clone)]
pub struct VinylChapterProps {
    pub low_power: bool,
    /// Fired once when the record starts; the app shell starts the
    /// background track and routes the music achievement.
    pub on_music_start: Callback<()>,
}

/// Chapter 1: the vinyl player. One click starts the music and staggers the
/// photo and scroll-prompt reveals.
#[function_component(VinylChapter)]
pub fn vinyl_chapter(props: &VinylChapterProps) -> Html {
    let spinning = use_state(|| false);
    let show_photo = use_state(|| false);
    let show_prompt = use_state(|| false);
    let live = use_memo((), |()| Liveness::new());

    {
        let live = live.clone();
        use_effect_with((), move |()| move || live.kill());
    }

    let start = {
        let spinning = spinning.clone();
        let show_photo = show_photo.clone();
        let show_prompt = show_prompt.clone();
        let live = live.clone();
        let low_power = props.low_power;
        let on_music_start = props.on_music_start.clone();
        Callback::from(move |()| {
            if *spinning {
                return;
            }
            spinning.set(true);
            on_music_start.emit(());

            {
                let live = (*live).clone();
                spawn_local(async move {
                    TimeoutFuture::new(BURST_DELAY_MS).await;
                    if live.is_live() {
                        confetti::fire(&BurstSpec::music_start(low_power));
                    }
                });
            }
            {
                let live = (*live).clone();
                let show_photo = show_photo.clone();
                spawn_local(async move {
                    TimeoutFuture::new(PHOTO_DELAY_MS).await;
                    if live.is_live() {
                        show_photo.set(true);
                    }
                });
            }
            {
                let live = (*live).clone();
                let show_prompt = show_prompt.clone();
                spawn_local(async move {
                    TimeoutFuture::new(PROMPT_DELAY_MS).await;
                    if live.is_live() {
                        show_prompt.set(true);
                    }
                });
            }
        })
    };

    let on_click = {
        let start = start.clone();
        Callback::from(move |_: MouseEvent| start.emit(()))
    };
    let on_key = {
        let start = start.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" || e.key() == " " {
                e.prevent_default();
                start.emit(());
            }
        })
    };

    html! {
        <div class="vinyl-chapter">
            <button class={classes!("vinyl-record", if *spinning { Some("spinning") } else { None })}
                onclick={on_click} onkeydown={on_key}
                aria-label={ if *spinning { "Record spinning" } else { "Start the music" } }
                aria-pressed={ if *spinning { "true" } else { "false" } }>
                <span class="vinyl-label" aria-hidden="true">{ "♪" }</span>
            </button>
            if !*spinning {
                <p class="vinyl-hint">{ "Tap the record to start the celebration" }</p>
            }
            if *show_photo {
                <figure class="vinyl-photo">
                    <img src="/hie/new_cropped_1_1.png" alt="The birthday star" />
                </figure>
            }
            if *show_prompt {
                <p class="scroll-prompt" aria-hidden="true">{ "Scroll to continue the story ↓" }</p>
            }
        </div>
    }
}
