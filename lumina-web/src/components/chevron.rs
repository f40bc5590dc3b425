use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ChapterChevronProps {
    /// Chapter index this affordance scrolls to.
    pub target: usize,
    pub label: AttrValue,
    pub on_select: Callback<usize>,
}

/// Clickable chevron at the foot of a chapter, scrolling to the next one.
#[function_component(ChapterChevron)]
pub fn chapter_chevron(props: &ChapterChevronProps) -> Html {
    let onclick = {
        let on_select = props.on_select.clone();
        let target = props.target;
        Callback::from(move |_: MouseEvent| on_select.emit(target))
    };
    html! {
        <button class="chapter-chevron" {onclick} aria-label={props.label.clone()}>
            <span aria-hidden="true">{ "⌄" }</span>
        </button>
    }
}
