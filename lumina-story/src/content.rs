//! Embedded story content: scene script, achievement catalog, message cards.

use crate::achievements::AchievementKey;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_STORY_DATA: &str = include_str!("../assets/story.json");

/// One intro scene: a visual, its caption, and how long it stays on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub id: u8,
    pub asset: String,
    pub caption: String,
    pub duration_ms: u64,
}

/// Display data for one achievement toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementInfo {
    pub key: AchievementKey,
    pub icon: String,
    pub title: String,
    pub description: String,
}

/// One of the short message cards revealed after the cake is cut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageCard {
    pub title: String,
    pub text: String,
    /// Gradient class hint for the card background; cosmetic passthrough.
    pub tint: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("scene script is empty")]
    Empty,
    #[error("scene {0} has zero duration")]
    ZeroDuration(u8),
}

/// Validated, immutable intro scene list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneScript {
    scenes: Vec<Scene>,
}

impl SceneScript {
    /// Validate and freeze a scene list.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty or any scene has a zero
    /// duration.
    pub fn new(scenes: Vec<Scene>) -> Result<Self, ScriptError> {
        if scenes.is_empty() {
            return Err(ScriptError::Empty);
        }
        if let Some(scene) = scenes.iter().find(|s| s.duration_ms == 0) {
            return Err(ScriptError::ZeroDuration(scene.id));
        }
        Ok(Self { scenes })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    #[must_use]
    pub fn last_index(&self) -> usize {
        self.scenes.len() - 1
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Scene> {
        self.scenes.get(index)
    }

    #[must_use]
    pub fn duration_of(&self, index: usize) -> Option<u64> {
        self.scenes.get(index).map(|s| s.duration_ms)
    }

    /// Sum of all scene durations, without the trailing completion pause.
    #[must_use]
    pub fn total_duration_ms(&self) -> u64 {
        self.scenes.iter().map(|s| s.duration_ms).sum()
    }
}

/// Everything the presentation says, loaded from the embedded story data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryContent {
    pub scenes: Vec<Scene>,
    pub achievements: Vec<AchievementInfo>,
    pub messages: Vec<MessageCard>,
}

impl Default for StoryContent {
    fn default() -> Self {
        serde_json::from_str(DEFAULT_STORY_DATA).unwrap_or_else(|err| {
            log::warn!("embedded story data failed to parse ({err}); using fallback");
            Self::fallback()
        })
    }
}

impl StoryContent {
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::default()
    }

    /// Minimal compiled-in content used when the embedded JSON is broken.
    fn fallback() -> Self {
        let scenes = vec![
            Scene {
                id: 1,
                asset: String::from("/hie/11.png"),
                caption: String::from("Every story has a beginning..."),
                duration_ms: 6_000,
            },
            Scene {
                id: 2,
                asset: String::from("/hie/2.png"),
                caption: String::from("...some start in quiet, magical places..."),
                duration_ms: 8_000,
            },
            Scene {
                id: 3,
                asset: String::from("/hie/3.png"),
                caption: String::from(
                    "...and some moments are just meant to be celebrated.",
                ),
                duration_ms: 8_000,
            },
            Scene {
                id: 4,
                asset: String::from("/hie/8.png"),
                caption: String::from(
                    "In a sea of wishes, I wanted to create something different...",
                ),
                duration_ms: 8_000,
            },
        ];
        let achievements = vec![
            AchievementInfo {
                key: AchievementKey::MusicStart,
                icon: String::from("🎵"),
                title: String::from("Music Lover"),
                description: String::from("Started the birthday celebration!"),
            },
            AchievementInfo {
                key: AchievementKey::Section2,
                icon: String::from("🎮"),
                title: String::from("Memory Lane"),
                description: String::from("Explored the nostalgia trip!"),
            },
            AchievementInfo {
                key: AchievementKey::Section3,
                icon: String::from("👑"),
                title: String::from("Birthday Explorer"),
                description: String::from("Reached the final chapter!"),
            },
            AchievementInfo {
                key: AchievementKey::BackToTop,
                icon: String::from("🔄"),
                title: String::from("Full Circle"),
                description: String::from("Completed the journey!"),
            },
        ];
        Self {
            scenes,
            achievements,
            messages: Vec::new(),
        }
    }

    /// Toast display data for `key`.
    #[must_use]
    pub fn achievement(&self, key: AchievementKey) -> Option<&AchievementInfo> {
        self.achievements.iter().find(|a| a.key == key)
    }

    /// Build the intro scene script from this content.
    ///
    /// # Errors
    ///
    /// Returns an error if the scene list fails validation.
    pub fn scene_script(&self) -> Result<SceneScript, ScriptError> {
        SceneScript::new(self.scenes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_story_data_parses() {
        let content = StoryContent::load_from_static();
        assert_eq!(content.scenes.len(), 4);
        assert_eq!(content.achievements.len(), 4);
        assert_eq!(content.messages.len(), 8);
        for key in AchievementKey::ALL {
            assert!(content.achievement(key).is_some(), "missing {key:?}");
        }
    }

    #[test]
    fn scene_script_validates_durations() {
        let content = StoryContent::load_from_static();
        let script = content.scene_script().unwrap();
        assert_eq!(script.len(), 4);
        assert_eq!(script.last_index(), 3);
        assert_eq!(script.total_duration_ms(), 30_000);
        assert_eq!(script.duration_of(0), Some(6_000));
    }

    #[test]
    fn empty_script_is_rejected() {
        assert_eq!(SceneScript::new(Vec::new()), Err(ScriptError::Empty));
    }

    #[test]
    fn zero_duration_scene_is_rejected() {
        let mut scenes = StoryContent::load_from_static().scenes;
        scenes[2].duration_ms = 0;
        assert_eq!(SceneScript::new(scenes), Err(ScriptError::ZeroDuration(3)));
    }
}
