use lumina_web::a11y;
use lumina_web::audio::{BG_MUSIC_ID, DEFAULT_VOLUME, INTRO_MUSIC_ID};
use lumina_web::components::chevron::ChapterChevronProps;
use lumina_web::dom::chapter_id;
use lumina_web::driver::Liveness;
use yew::{AttrValue, Callback};

#[test]
fn focus_css_ships_screen_reader_helpers() {
    let css = a11y::visible_focus_css();
    assert!(css.contains(":focus"));
    assert!(css.contains(".sr-only"));
}

#[test]
fn audio_decks_target_distinct_elements() {
    assert_ne!(BG_MUSIC_ID, INTRO_MUSIC_ID);
    assert!((0.0..=1.0).contains(&DEFAULT_VOLUME));
}

#[test]
fn chapter_ids_enumerate_sections() {
    assert_eq!(chapter_id(0), "chapter-0");
    assert_eq!(chapter_id(1), "chapter-1");
}

#[test]
fn chevron_props_compare_by_scroll_target() {
    let on_select = Callback::from(|_: usize| ());
    let a = ChapterChevronProps {
        target: 1,
        label: AttrValue::from("Continue to chapter 2"),
        on_select: on_select.clone(),
    };
    let b = a.clone();
    assert!(a == b);

    let c = ChapterChevronProps {
        target: 2,
        label: AttrValue::from("Continue to chapter 3"),
        on_select,
    };
    assert!(a != c);
}

#[test]
fn liveness_flag_is_shared_across_clones() {
    let live = Liveness::new();
    let seen_by_timer = live.clone();
    live.kill();
    assert!(!seen_by_timer.is_live());
}
