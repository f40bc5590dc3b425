use lumina_story::AchievementInfo;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct AchievementToastProps {
    pub info: AchievementInfo,
    /// True while the exit animation runs; drives the slide-out class.
    pub exiting: bool,
}

/// The single achievement toast. The gate guarantees at most one is mounted;
/// timing lives in the gate, this component only renders the current slot.
#[function_component(AchievementToast)]
pub fn achievement_toast(props: &AchievementToastProps) -> Html {
    let class = classes!(
        "achievement-toast",
        if props.exiting { "toast-exit" } else { "toast-enter" }
    );
    html! {
        <div {class} role="status" aria-live="polite">
            <span class="toast-icon" aria-hidden="true">{ props.info.icon.clone() }</span>
            <div class="toast-body">
                <p class="toast-title">{ props.info.title.clone() }</p>
                <p class="toast-desc">{ props.info.description.clone() }</p>
            </div>
        </div>
    }
}
