use crate::a11y::set_status;
use crate::confetti;
use crate::driver::{Liveness, arm, now_ms};
use lumina_story::{SEAL_COUNT, SiegeEffect, SiegePhase, SiegeStateMachine};
use web_sys::KeyboardEvent;
use yew::prelude::*;

/// Chapter 2: deploy three seals against the town hall.
///
/// The machine owns all timing (projectile flight, damage flash, victory
/// sequencing); this component forwards deploy clicks, fires the bursts and
/// re-renders from the machine's state after every effect batch.
#[function_component(SiegeChapter)]
pub fn siege_chapter() -> Html {
    let machine = use_mut_ref(SiegeStateMachine::new);
    let live = use_memo((), |()| Liveness::new());
    let revision = use_state(|| 0u32);
    let encouragement = use_state(|| false);

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
        let encouragement = encouragement.clone();
        Callback::from(move |effects: Vec<SiegeEffect>| {
            for effect in &effects {
                match effect {
                    SiegeEffect::Burst(spec) => confetti::fire(spec),
                    SiegeEffect::Encouragement => encouragement.set(true),
                    SiegeEffect::Victory => {
                        set_status("The town hall has fallen. Victory!");
                    }
                    _ => {}
                }
            }
            if !effects.is_empty() {
                revision.set(revision.wrapping_add(1));
            }
        })
    };

    let deploy = {
        let machine = machine.clone();
        let live = live.clone();
        let handle_effects = handle_effects.clone();
        Callback::from(move |seal_id: u8| {
            let (_, effects) = machine.borrow_mut().deploy(seal_id, now_ms());
            handle_effects.emit(effects.into_vec());
            arm(&machine, &live, &handle_effects);
        })
    };

    let state = machine.borrow();
    let health = state.health();
    let flashing = state.is_flashing();
    let phase = state.phase();
    let deployed = state.deployed_count();

    let seal_buttons = state.seals().iter().map(|seal| {
        let id = seal.id;
        let deploy_click = {
            let deploy = deploy.clone();
            Callback::from(move |_: MouseEvent| deploy.emit(id))
        };
        let deploy_key = {
            let deploy = deploy.clone();
            Callback::from(move |e: KeyboardEvent| {
                if e.key() == "Enter" || e.key() == " " {
                    e.prevent_default();
                    deploy.emit(id);
                }
            })
        };
        html! {
            <button key={id}
                class={classes!("seal", if seal.deployed { Some("deployed") } else { None })}
                onclick={deploy_click} onkeydown={deploy_key}
                disabled={seal.deployed || phase != SiegePhase::Idle && phase != SiegePhase::Engaging}
                aria-label={format!("Deploy seal {id}")}>
                { format!("Seal {id}") }
            </button>
        }
    });

    html! {
        <div class="siege-chapter">
            <div class="health-bar" role="progressbar"
                aria-valuenow={format!("{health:.0}")} aria-valuemin="0" aria-valuemax="100"
                aria-label="Town hall health">
                <div class="health-fill" style={format!("width:{health}%")} />
            </div>
            <div class={classes!("town-hall",
                if flashing { Some("hit-flash") } else { None },
                if phase == SiegePhase::Destroyed || phase == SiegePhase::LootRevealed {
                    Some("destroyed")
                } else {
                    None
                })}
                aria-hidden="true" />
            <div class="seal-row">
                { for seal_buttons }
            </div>
            if *encouragement && deployed < SEAL_COUNT {
                <p class="siege-hint">{ "Direct hit! Keep going!" }</p>
            }
            if phase == SiegePhase::LootRevealed {
                <div class="loot-reveal">
                    <p>{ "🏆 Victory! The celebration loot is yours." }</p>
                </div>
            }
        </div>
    }
}
