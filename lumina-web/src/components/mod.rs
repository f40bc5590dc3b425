pub mod chevron;
pub mod dots;
pub mod intro;
pub mod ritual;
pub mod siege;
pub mod toast;
pub mod vinyl;

pub use chevron::ChapterChevron;
pub use dots::DotsRail;
pub use intro::IntroSequence;
pub use ritual::RitualChapter;
pub use siege::SiegeChapter;
pub use toast::AchievementToast;
pub use vinyl::VinylChapter;
