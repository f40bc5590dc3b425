use crate::audio::{AudioDeck, INTRO_MUSIC_ID};
use crate::driver::{Liveness, arm, now_ms};
use lumina_story::{IntroEffect, IntroPhase, SceneScript, SceneSequencer};
use web_sys::KeyboardEvent;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct IntroSequenceProps {
    /// Validated scene script; the app shell skips the intro entirely when
    /// the embedded script fails validation.
    pub script: SceneScript,
    pub on_complete: Callback<()>,
}

/// Cinematic intro: loading screen, begin gate, timed scene progression.
///
/// All timing lives in the [`SceneSequencer`]; this component mirrors its
/// phase for rendering and forwards the audio effects to the intro track.
#[function_component(IntroSequence)]
pub fn intro_sequence(props: &IntroSequenceProps) -> Html {
    let sequencer = {
        let script = props.script.clone();
        use_mut_ref(move || SceneSequencer::new(script, now_ms()))
    };
    let live = use_memo((), |()| Liveness::new());
    let phase = use_state(|| IntroPhase::Loading);

    let handle_effects = {
        let phase = phase.clone();
        let on_complete = props.on_complete.clone();
        Callback::from(move |effects: Vec<IntroEffect>| {
            let deck = AudioDeck::new(INTRO_MUSIC_ID);
            for effect in effects {
                match effect {
                    IntroEffect::PlayAudio { volume } => deck.play(f64::from(volume)),
                    IntroEffect::StopAudio => deck.stop(),
                    IntroEffect::SceneShown(i) => phase.set(IntroPhase::Playing(i)),
                    IntroEffect::IntroComplete => {
                        phase.set(IntroPhase::Completed);
                        on_complete.emit(());
                    }
                }
            }
        })
    };

    // Arm the asset-wait fallback on mount; tear everything down on unmount.
    {
        let sequencer = sequencer.clone();
        let live = live.clone();
        let phase = phase.clone();
        let handle_effects = handle_effects.clone();
        use_effect_with((), move |()| {
            let on_wake = {
                let sequencer = sequencer.clone();
                let phase = phase.clone();
                let handle_effects = handle_effects.clone();
                Callback::from(move |effects: Vec<IntroEffect>| {
                    handle_effects.emit(effects);
                    // The fallback may have unblocked the gesture screen.
                    if sequencer.borrow().phase() == IntroPhase::AwaitingGesture {
                        phase.set(IntroPhase::AwaitingGesture);
                    }
                })
            };
            arm(&sequencer, &live, &on_wake);
            move || {
                live.kill();
                let stop_effects = sequencer.borrow_mut().teardown();
                let deck = AudioDeck::new(INTRO_MUSIC_ID);
                for effect in stop_effects {
                    if effect == IntroEffect::StopAudio {
                        deck.stop();
                    }
                }
            }
        });
    }

    let on_asset_loaded = {
        let sequencer = sequencer.clone();
        let phase = phase.clone();
        Callback::from(move |_: Event| {
            let mut seq = sequencer.borrow_mut();
            seq.asset_loaded(now_ms());
            phase.set(seq.phase());
        })
    };

    let begin = {
        let sequencer = sequencer.clone();
        let live = live.clone();
        let handle_effects = handle_effects.clone();
        Callback::from(move |()| {
            let effects = sequencer.borrow_mut().gesture(now_ms()).into_vec();
            if effects.is_empty() {
                return;
            }
            handle_effects.emit(effects);
            arm(&sequencer, &live, &handle_effects);
        })
    };
    let on_begin_click = {
        let begin = begin.clone();
        Callback::from(move |_: MouseEvent| begin.emit(()))
    };
    let on_begin_key = {
        let begin = begin.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" || e.key() == " " {
                e.prevent_default();
                begin.emit(());
            }
        })
    };

    let first_asset = props
        .script
        .get(0)
        .map(|s| s.asset.clone())
        .unwrap_or_default();

    let body = match *phase {
        IntroPhase::Loading => html! {
            <div class="intro-loading">
                <img src={first_asset} onload={on_asset_loaded.clone()}
                    onerror={on_asset_loaded} alt="" class="intro-preload" />
                <p class="muted">{ "Gathering stardust..." }</p>
            </div>
        },
        IntroPhase::AwaitingGesture => html! {
            <button class="intro-begin" onclick={on_begin_click} onkeydown={on_begin_key}>
                { "Begin the story" }
            </button>
        },
        IntroPhase::Playing(i) => {
            let scene = props.script.get(i);
            html! {
                <figure class="intro-scene" key={i}>
                    { scene.map_or_else(Html::default, |s| html! {
                        <>
                            <img src={s.asset.clone()} alt={s.caption.clone()} />
                            <figcaption>{ s.caption.clone() }</figcaption>
                        </>
                    }) }
                </figure>
            }
        }
        IntroPhase::Completed => Html::default(),
    };

    html! {
        <div class="intro-overlay" data-phase={format!("{:?}", *phase)}>
            { body }
        </div>
    }
}
