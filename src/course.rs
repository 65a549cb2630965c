//! Course tree: quiz questions, sections, chapters and courses
//!
//! Ingestion produces the `Parsed*` types, which carry no identifiers. A
//! [`ParsedCourse`] becomes a [`Course`] through [`ParsedCourse::publish`], which
//! validates the tree and derives every id from the course id and positions.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::PublishError;

/// Display gradients a course card can use, as `(name, token)`.
pub const COURSE_COLORS: &[(&str, &str)] = &[
    ("Bleu", "from-blue-500 to-indigo-600"),
    ("Vert", "from-emerald-500 to-teal-600"),
    ("Orange", "from-orange-500 to-amber-600"),
    ("Rouge", "from-red-500 to-rose-600"),
    ("Violet", "from-purple-500 to-violet-600"),
    ("Cyan", "from-cyan-500 to-sky-600"),
    ("Rose", "from-pink-500 to-fuchsia-600"),
];

/// Icons offered for custom courses.
pub const COURSE_ICONS: &[&str] = &[
    "📚", "📖", "📝", "⚖️", "💼", "🏛️", "📋", "🔬", "💡", "🎯", "🧠", "📊",
    "🔐", "🌍", "💰", "🏥", "🎓", "✨", "🔧", "🎨", "🌱", "⚡", "🔮", "🎪",
];

pub const DEFAULT_ICON: &str = COURSE_ICONS[0];
pub const DEFAULT_COLOR: &str = COURSE_COLORS[0].1;

/// Kind of a quiz question, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Mcq,
    Tf,
    Short,
}

/// A quiz question; the shape of `correctAnswer` follows from `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QuizQuestion {
    /// Multiple choice, `correct_answer` indexes into `choices`.
    #[serde(rename = "mcq")]
    Mcq {
        question: String,
        choices: Vec<String>,
        #[serde(rename = "correctAnswer")]
        correct_answer: usize,
        explanation: String,
    },
    #[serde(rename = "tf")]
    TrueFalse {
        question: String,
        #[serde(rename = "correctAnswer")]
        correct_answer: bool,
        explanation: String,
    },
    /// Free text graded by keyword matching.
    #[serde(rename = "short")]
    Short {
        question: String,
        #[serde(rename = "correctAnswer")]
        correct_answer: Vec<String>,
        explanation: String,
    },
}

impl QuizQuestion {
    pub fn kind(&self) -> QuestionKind {
        match self {
            Self::Mcq { .. } => QuestionKind::Mcq,
            Self::TrueFalse { .. } => QuestionKind::Tf,
            Self::Short { .. } => QuestionKind::Short,
        }
    }

    pub fn question(&self) -> &str {
        match self {
            Self::Mcq { question, .. }
            | Self::TrueFalse { question, .. }
            | Self::Short { question, .. } => question,
        }
    }

    pub fn explanation(&self) -> &str {
        match self {
            Self::Mcq { explanation, .. }
            | Self::TrueFalse { explanation, .. }
            | Self::Short { explanation, .. } => explanation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSection {
    pub title: String,
    /// HTML-like markup with emphasis spans
    pub content: String,
    pub quiz: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedChapter {
    pub title: String,
    pub sections: Vec<ParsedSection>,
}

/// Output of the ingestion pipeline, not yet published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCourse {
    pub title: String,
    pub chapters: Vec<ParsedChapter>,
}

impl ParsedCourse {
    pub fn section_count(&self) -> usize {
        self.chapters.iter().map(|c| c.sections.len()).sum()
    }

    pub fn question_count(&self) -> usize {
        self.chapters
            .iter()
            .flat_map(|c| &c.sections)
            .map(|s| s.quiz.len())
            .sum()
    }

    /// Publish under a freshly generated course id.
    pub fn publish(self, icon: &str, color: &str) -> Result<Course, PublishError> {
        self.publish_with_id(generate_course_id(), icon, color)
    }

    /// Publish under `course_id`, replacing any previous identity of the tree.
    ///
    /// Every chapter needs at least one section and every section a non-blank title.
    /// A blank icon or color falls back to the catalog default.
    pub fn publish_with_id(
        self,
        course_id: impl Into<String>,
        icon: &str,
        color: &str,
    ) -> Result<Course, PublishError> {
        self.check_publishable()?;
        let id = course_id.into();

        let chapters = self
            .chapters
            .into_iter()
            .enumerate()
            .map(|(ch_index, chapter)| {
                let chapter_id = format!("{id}_ch{}", ch_index + 1);
                Chapter {
                    sections: chapter
                        .sections
                        .into_iter()
                        .enumerate()
                        .map(|(sec_index, section)| Section {
                            id: format!("{chapter_id}_s{}", sec_index + 1),
                            title: section.title,
                            content: section.content,
                            quiz: section.quiz,
                        })
                        .collect(),
                    id: chapter_id,
                    title: chapter.title,
                }
            })
            .collect();

        tracing::debug!(course_id = %id, "published course");

        Ok(Course {
            id,
            title: self.title,
            icon: or_default(icon, DEFAULT_ICON),
            color: or_default(color, DEFAULT_COLOR),
            chapters,
        })
    }

    fn check_publishable(&self) -> Result<(), PublishError> {
        if self.chapters.is_empty() {
            return Err(PublishError::NoChapters);
        }
        for (ch_index, chapter) in self.chapters.iter().enumerate() {
            if chapter.sections.is_empty() {
                return Err(PublishError::EmptyChapter { index: ch_index + 1 });
            }
            let untitled = chapter.sections.iter().position(|s| s.title.trim().is_empty());
            if let Some(sec_index) = untitled {
                return Err(PublishError::UntitledSection {
                    chapter: ch_index + 1,
                    section: sec_index + 1,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub content: String,
    pub quiz: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    pub title: String,
    pub sections: Vec<Section>,
}

/// A published course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub color: String,
    pub chapters: Vec<Chapter>,
}

impl Course {
    pub fn section(&self, section_id: &str) -> Option<&Section> {
        self.chapters
            .iter()
            .flat_map(|c| &c.sections)
            .find(|s| s.id == section_id)
    }

    /// Strip identifiers, e.g. to re-publish an edited copy.
    pub fn to_parsed(&self) -> ParsedCourse {
        ParsedCourse {
            title: self.title.clone(),
            chapters: self
                .chapters
                .iter()
                .map(|c| ParsedChapter {
                    title: c.title.clone(),
                    sections: c
                        .sections
                        .iter()
                        .map(|s| ParsedSection {
                            title: s.title.clone(),
                            content: s.content.clone(),
                            quiz: s.quiz.clone(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Copy under a new id, titled `"<title> (copie)"`.
    pub fn duplicate(&self) -> Result<Self, PublishError> {
        let mut parsed = self.to_parsed();
        parsed.title = format!("{} (copie)", self.title);
        parsed.publish(&self.icon, &self.color)
    }
}

fn or_default(value: &str, default: &str) -> String {
    let value = value.trim();
    if value.is_empty() { default } else { value }.to_string()
}

/// `custom_<unix millis>_<9 base36 chars>`
pub fn generate_course_id() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("custom_{}_{}", Utc::now().timestamp_millis(), suffix)
}
