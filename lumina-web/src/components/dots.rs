use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct DotsRailProps {
    pub chapter_count: usize,
    pub current: usize,
    pub on_select: Callback<usize>,
}

/// Fixed navigation rail: one dot per chapter, current one highlighted.
#[function_component(DotsRail)]
pub fn dots_rail(props: &DotsRailProps) -> Html {
    let dots = (0..props.chapter_count).map(|index| {
        let on_select = props.on_select.clone();
        let onclick = Callback::from(move |_| on_select.emit(index));
        let class = classes!(
            "nav-dot",
            if index == props.current { Some("active") } else { None }
        );
        let label = format!("Go to chapter {}", index + 1);
        html! {
            <button key={index} {class} {onclick} aria-label={label}
                aria-current={ if index == props.current { "true" } else { "false" } } />
        }
    });
    html! {
        <nav class="dots-rail" aria-label="Chapters">
            { for dots }
        </nav>
    }
}
