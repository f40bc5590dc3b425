use crate::a11y::set_status;
use crate::confetti;
use crate::driver::{Liveness, arm, now_ms};
use lumina_story::{Rect, RitualEffect, RitualPhase, RitualStateMachine, StoryContent};
use std::rc::Rc;
use web_sys::KeyboardEvent;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct RitualChapterProps {
    pub low_power: bool,
    pub content: Rc<StoryContent>,
    /// Fired once when the cake is cut; the app shell reveals the
    /// back-to-top affordance.
    pub on_finished: Callback<()>,
}

/// Chapter 3: the cake ritual. Drop the spell, blow out the candles, cut the
/// cake, read the wishes.
#[function_component(RitualChapter)]
pub fn ritual_chapter(props: &RitualChapterProps) -> Html {
    let machine = {
        let low_power = props.low_power;
        use_mut_ref(move || RitualStateMachine::new(low_power))
    };
    let live = use_memo((), |()| Liveness::new());
    let revision = use_state(|| 0u32);
    let dragging = use_state(|| false);
    let cake_ref = use_node_ref();

    {
        let machine = machine.clone();
        let live = live.clone();
        use_effect_with((), move |()| {
            move || {
                live.kill();
                machine.borrow_mut().teardown();
            }
        });
    }

    let handle_effects = {
        let revision = revision.clone();
        let on_finished = props.on_finished.clone();
        Callback::from(move |effects: Vec<RitualEffect>| {
            for effect in &effects {
                match effect {
                    RitualEffect::Burst(spec) => confetti::fire(spec),
                    RitualEffect::SpellLanded => set_status("The spell landed. Candles are lit!"),
                    RitualEffect::AllCandlesOut => {
                        set_status("All candles are out. Time to cut the cake!");
                    }
                    RitualEffect::CakeCut => set_status("Happy Birthday!"),
                    RitualEffect::RitualComplete => on_finished.emit(()),
                    RitualEffect::CandleBlown { .. } => {}
                }
            }
            if !effects.is_empty() {
                revision.set(revision.wrapping_add(1));
            }
        })
    };

    let drop_spell = {
        let machine = machine.clone();
        let handle_effects = handle_effects.clone();
        Callback::from(move |()| {
            let effects = machine.borrow_mut().drop_spell(now_ms());
            handle_effects.emit(effects.into_vec());
        })
    };

    let cake_rect = {
        let cake_ref = cake_ref.clone();
        move || -> Option<Rect> {
            let rect = cake_ref.cast::<web_sys::Element>()?.get_bounding_client_rect();
            Some(Rect {
                left: rect.left(),
                top: rect.top(),
                right: rect.right(),
                bottom: rect.bottom(),
            })
        }
    };

    let on_spell_mousedown = {
        let dragging = dragging.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            dragging.set(true);
        })
    };
    // Release anywhere in the chapter; the machine hit-tests against the
    // cake's rectangle, so a miss just ends the drag.
    let on_mouseup = {
        let machine = machine.clone();
        let handle_effects = handle_effects.clone();
        let dragging = dragging.clone();
        Callback::from(move |e: MouseEvent| {
            if !*dragging {
                return;
            }
            dragging.set(false);
            if let Some(rect) = cake_rect() {
                let effects = machine.borrow_mut().drop_spell_at(
                    f64::from(e.client_x()),
                    f64::from(e.client_y()),
                    rect,
                    now_ms(),
                );
                handle_effects.emit(effects.into_vec());
            }
        })
    };

    let on_cake_click = {
        let drop_spell = drop_spell.clone();
        Callback::from(move |_: MouseEvent| drop_spell.emit(()))
    };
    let on_cake_key = {
        let drop_spell = drop_spell.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" || e.key() == " " {
                e.prevent_default();
                drop_spell.emit(());
            }
        })
    };

    let blow = {
        let machine = machine.clone();
        let handle_effects = handle_effects.clone();
        Callback::from(move |index: usize| {
            let effects = machine.borrow_mut().blow_out_candle(index, now_ms());
            handle_effects.emit(effects.into_vec());
        })
    };

    let cut = {
        let machine = machine.clone();
        let live = live.clone();
        let handle_effects = handle_effects.clone();
        Callback::from(move |_: MouseEvent| {
            let effects = machine.borrow_mut().cut_cake(now_ms());
            handle_effects.emit(effects.into_vec());
            // The finale stream runs on the machine's clock.
            arm(&machine, &live, &handle_effects);
        })
    };

    let state = machine.borrow();
    let phase = state.phase();
    let spell_landed = phase != RitualPhase::AwaitingSpell;
    let lit = state.lit_count();

    let candles = state.candles().iter().enumerate().map(|(index, is_lit)| {
        let blow_click = {
            let blow = blow.clone();
            Callback::from(move |_: MouseEvent| blow.emit(index))
        };
        let blow_key = {
            let blow = blow.clone();
            Callback::from(move |e: KeyboardEvent| {
                if e.key() == "Enter" || e.key() == " " {
                    e.prevent_default();
                    blow.emit(index);
                }
            })
        };
        html! {
            <button key={index}
                class={classes!("candle", if *is_lit { Some("lit") } else { Some("out") })}
                onclick={blow_click} onkeydown={blow_key}
                aria-label={ if *is_lit {
                    format!("Blow out candle {}", index + 1)
                } else {
                    format!("Candle {} is out", index + 1)
                }}>
                { if *is_lit { "🕯️" } else { "💨" } }
            </button>
        }
    });

    let prompt = match phase {
        RitualPhase::AwaitingSpell => "⚡ Drag the spell to the cake, or click the cake to drop! ⚡",
        RitualPhase::CandlesLit => "🕯️ Make a wish! Tap the candles.",
        RitualPhase::AllBlown => "✨ Your wish is sealed! Cut the cake! ✨",
        RitualPhase::Cut => "🎉 Happy Birthday! 🎉",
    };

    html! {
        <div class="ritual-chapter" onmouseup={on_mouseup}>
            <p class="ritual-prompt">
                { prompt }
                if spell_landed && lit > 0 {
                    <span class="candle-count">{ format!(" ({lit} left)") }</span>
                }
            </p>
            <div ref={cake_ref} role="button" tabindex="0"
                class={classes!("cake", if spell_landed { Some("awake") } else { Some("dormant") })}
                onclick={on_cake_click} onkeydown={on_cake_key}
                aria-label={ if spell_landed { "Birthday cake" } else { "Drop the spell on the cake" } }>
                if spell_landed {
                    <div class="candle-row">
                        { for candles }
                    </div>
                }
            </div>
            if !spell_landed {
                <button class={classes!("spell", if *dragging { Some("dragging") } else { None })}
                    onmousedown={on_spell_mousedown}
                    aria-label="Rage spell; drag onto the cake">
                    { "Rage Spell 🎂" }
                </button>
            }
            if phase == RitualPhase::AllBlown {
                <button class="cut-cake" onclick={cut}>{ "Cut the Cake 🔪✨" }</button>
            }
            if state.messages_revealed() {
                <section class="message-grid" aria-label="Birthday wishes">
                    { for props.content.messages.iter().enumerate().map(|(i, card)| html! {
                        <article key={i} class="message-card" data-tint={card.tint.clone()}>
                            <h3>{ card.title.clone() }</h3>
                            <p>{ card.text.clone() }</p>
                        </article>
                    }) }
                </section>
            }
        </div>
    }
}
