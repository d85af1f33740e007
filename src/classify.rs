use serde::Deserialize;
use serde::Serialize;
use std::fmt::Display;

/// Event categories a timetable block can fall into.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Lecture,
    Exercise,
    Lab,
}

impl Category {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Category::Lecture => "lecture",
            Category::Exercise => "exercise",
            Category::Lab => "lab",
        }
    }

    /// Parses a category name, accepting the German labels used by the timetables.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "lecture" | "vorlesung" => Some(Self::Lecture),
            "exercise" | "übung" | "uebung" => Some(Self::Exercise),
            "lab" | "labor" => Some(Self::Lab),
            _ => None,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Marker-substring classifier.
///
/// Lab markers are checked before exercise markers, so a text carrying
/// both is a lab.
#[derive(Clone, Debug)]
pub struct Classifier {
    lab_markers: Vec<String>,
    exercise_markers: Vec<String>,
}

impl Classifier {
    pub fn new(lab_markers: Vec<String>, exercise_markers: Vec<String>) -> Self {
        Self {
            lab_markers,
            exercise_markers,
        }
    }

    pub fn classify(&self, text: &str) -> Category {
        if contains_any(text, &self.lab_markers) {
            Category::Lab
        } else if contains_any(text, &self.exercise_markers) {
            Category::Exercise
        } else {
            Category::Lecture
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(
            vec!["-ÜL".to_owned(), "ÜL-".to_owned()],
            vec!["-Ü".to_owned(), "Ü-".to_owned()],
        )
    }
}

fn contains_any(text: &str, markers: &[String]) -> bool {
    markers
        .iter()
        .filter(|marker| !marker.is_empty())
        .any(|marker| text.contains(marker.as_str()))
}
