//! Static lesson catalog.

use std::{collections::HashSet, fs, path::Path};

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, GameError};

/// A single term and its definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonEntry {
    /// Short term shown on the term card. Also used as the pair key.
    pub term: String,
    /// Longer text shown on the definition card.
    pub definition: String,
}

impl LessonEntry {
    /// Convenience constructor.
    pub fn new(term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            definition: definition.into(),
        }
    }
}

/// One lesson of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonDefinition {
    /// Display identifier (1-based in the built-in catalog).
    pub id: u32,
    /// Lesson heading.
    pub title: String,
    /// Ordered entries; terms are unique within a lesson.
    #[serde(alias = "terms")]
    pub entries: Vec<LessonEntry>,
}

impl LessonDefinition {
    /// Number of term/definition pairs in this lesson.
    pub fn pair_count(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    lessons: Vec<LessonDefinition>,
}

/// Immutable list of lessons available to the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonCatalog {
    lessons: Vec<LessonDefinition>,
}

static BUILTIN: Lazy<LessonCatalog> = Lazy::new(|| LessonCatalog {
    lessons: vec![
        LessonDefinition {
            id: 1,
            title: "Basic Components".to_string(),
            entries: vec![
                LessonEntry::new(
                    "Computer",
                    "Electronic machine that processes information and stores data",
                ),
                LessonEntry::new(
                    "Monitor",
                    "Display device that shows visual output from computer",
                ),
                LessonEntry::new("Keyboard", "Input device used to type texts and commands"),
                LessonEntry::new(
                    "Mouse",
                    "Digital pointer used to move cursor and select items",
                ),
            ],
        },
        LessonDefinition {
            id: 2,
            title: "Basic Controls".to_string(),
            entries: vec![
                LessonEntry::new(
                    "Left Click",
                    "Select items and open programs with double-click",
                ),
                LessonEntry::new("Right Click", "Opens menus with additional options"),
                LessonEntry::new("Space Bar", "Create spaces between words"),
                LessonEntry::new("Enter Key", "Start new line or confirm actions"),
                LessonEntry::new(
                    "Mouse Scroll",
                    "Wheel in the middle used to scroll through pages",
                ),
                LessonEntry::new("Backspace", "Erases characters behind the cursor"),
            ],
        },
        LessonDefinition {
            id: 3,
            title: "Essential Shortcuts".to_string(),
            entries: vec![
                LessonEntry::new("CTRL + C", "Copy selected text or files"),
                LessonEntry::new("CTRL + V", "Paste copied content"),
                LessonEntry::new("CTRL + Z", "Undo the last action"),
                LessonEntry::new("CAPS LOCK", "Toggle uppercase writing mode"),
                LessonEntry::new("CTRL + A", "Select all content in active window"),
                LessonEntry::new("CTRL + S", "Save the current document"),
            ],
        },
        LessonDefinition {
            id: 4,
            title: "File Management".to_string(),
            entries: vec![
                LessonEntry::new("Folder", "Digital container to organize and store files"),
                LessonEntry::new("File", "Document or item stored on the computer"),
                LessonEntry::new("Save", "Store a document permanently"),
                LessonEntry::new("New Folder", "Create a container for organizing files"),
                LessonEntry::new("Delete", "Remove files or folders from the computer"),
                LessonEntry::new("Rename", "Change the name of a file or folder"),
            ],
        },
    ],
});

impl LessonCatalog {
    /// Build a catalog after validating lesson contents.
    pub fn new(lessons: Vec<LessonDefinition>) -> Result<Self, CatalogError> {
        if lessons.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut ids = HashSet::new();
        for lesson in &lessons {
            if !ids.insert(lesson.id) {
                return Err(CatalogError::DuplicateLessonId { id: lesson.id });
            }
            if lesson.entries.is_empty() {
                return Err(CatalogError::EmptyLesson { id: lesson.id });
            }
            let mut terms = HashSet::new();
            for entry in &lesson.entries {
                if !terms.insert(entry.term.as_str()) {
                    return Err(CatalogError::DuplicateTerm {
                        id: lesson.id,
                        term: entry.term.clone(),
                    });
                }
            }
        }

        Ok(Self { lessons })
    }

    /// The four lessons shipped with the game.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Load and validate a catalog from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read lesson catalog {}", path.display()))?;
        let file: CatalogFile = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse lesson catalog {}", path.display()))?;
        let catalog = Self::new(file.lessons)
            .with_context(|| format!("invalid lesson catalog {}", path.display()))?;
        Ok(catalog)
    }

    /// Look up a lesson by position.
    pub fn lesson_at(&self, index: usize) -> Result<&LessonDefinition, GameError> {
        self.lessons.get(index).ok_or(GameError::Index {
            index,
            len: self.lessons.len(),
        })
    }

    /// Number of lessons.
    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    /// Always false for a validated catalog.
    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    /// All lessons in catalog order.
    pub fn lessons(&self) -> &[LessonDefinition] {
        &self.lessons
    }

    /// Iterate lessons in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &LessonDefinition> {
        self.lessons.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn builtin_catalog_has_four_lessons() {
        let catalog = LessonCatalog::builtin();
        assert_eq!(catalog.len(), 4);
        let first = catalog.lesson_at(0).expect("first lesson");
        assert_eq!(first.title, "Basic Components");
        assert_eq!(first.pair_count(), 4);
        assert_eq!(catalog.lesson_at(3).map(|l| l.id), Ok(4));
    }

    #[test]
    fn lesson_at_rejects_out_of_range() {
        let catalog = LessonCatalog::builtin();
        assert_eq!(
            catalog.lesson_at(5),
            Err(GameError::Index { index: 5, len: 4 })
        );
    }

    #[test]
    fn validation_catches_bad_lessons() {
        assert_eq!(LessonCatalog::new(Vec::new()), Err(CatalogError::Empty));

        let empty = LessonDefinition {
            id: 7,
            title: "Nothing".to_string(),
            entries: Vec::new(),
        };
        assert_eq!(
            LessonCatalog::new(vec![empty]),
            Err(CatalogError::EmptyLesson { id: 7 })
        );

        let duplicate = LessonDefinition {
            id: 1,
            title: "Twice".to_string(),
            entries: vec![LessonEntry::new("A", "first"), LessonEntry::new("A", "second")],
        };
        assert_eq!(
            LessonCatalog::new(vec![duplicate]),
            Err(CatalogError::DuplicateTerm {
                id: 1,
                term: "A".to_string()
            })
        );

        let lesson = LessonDefinition {
            id: 2,
            title: "One".to_string(),
            entries: vec![LessonEntry::new("A", "a")],
        };
        assert_eq!(
            LessonCatalog::new(vec![lesson.clone(), lesson]),
            Err(CatalogError::DuplicateLessonId { id: 2 })
        );
    }

    #[test]
    fn loads_catalog_from_json() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("lessons.json");
        fs::write(
            &path,
            r#"{
  "lessons": [
    {
      "id": 10,
      "title": "Networking",
      "terms": [
        { "term": "Router", "definition": "Forwards packets between networks" },
        { "term": "Switch", "definition": "Connects devices on one network" }
      ]
    }
  ]
}"#,
        )?;

        let catalog = LessonCatalog::load(&path)?;
        assert_eq!(catalog.len(), 1);
        let lesson = catalog.lesson_at(0)?;
        assert_eq!(lesson.id, 10);
        assert_eq!(lesson.entries[1].term, "Switch");
        Ok(())
    }

    #[test]
    fn load_reports_invalid_catalog() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("lessons.json");
        fs::write(&path, r#"{ "lessons": [] }"#)?;

        let err = LessonCatalog::load(&path).expect_err("empty catalog must fail");
        assert!(err.to_string().contains("invalid lesson catalog"));
        Ok(())
    }
}
