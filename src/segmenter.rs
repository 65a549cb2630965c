//! Free-text course segmentation
//!
//! Lines are classified as chapter heading, section heading or content using
//! ordered pattern lists. The scan never fails: content before any heading lands
//! in a default chapter, and a non-blank input always yields at least one
//! chapter with one section.

use regex::Regex;
use std::sync::LazyLock;

use crate::course::{ParsedChapter, ParsedCourse, ParsedSection};
use crate::formatter::{ends_with_sentence_punctuation, Formatter};
use crate::questions::synthesize_quiz;

pub const DEFAULT_COURSE_TITLE: &str = "Cours importé";
const DEFAULT_CHAPTER_TITLE: &str = "Introduction";

/// Explicit "chapter"/"section" keyword headings; never taken as the course title.
/// The keyword must end a word or be followed directly by its number.
static CHAPTER_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:chapitre|chapter|partie|part)(?:(\d+)|\b\s*[:\-]?\s*(\d+)?)[:\-.\s]*(.+)")
        .expect("valid chapter keyword regex")
});
static SECTION_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:section|leçon|lecon|lesson)(?:(\d+)|\b\s*[:\-]?\s*(\d+)?)[:\-.\s]*(.+)")
        .expect("valid section keyword regex")
});

static CHAPTER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        CHAPTER_KEYWORD.clone(),
        Regex::new(r"^#{1,2}\s*([^#].*)").expect("valid markdown chapter regex"),
        Regex::new(r"^([IVXLCDM]+)[.\-:\s]+(.+)").expect("valid roman numeral regex"),
    ]
});
static SECTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        SECTION_KEYWORD.clone(),
        Regex::new(r"^#{3,4}\s*(.+)").expect("valid markdown section regex"),
        Regex::new(r"^(\d+)[.\-)\s]+(.+)").expect("valid numbered section regex"),
        Regex::new(r"(?i)^([a-z])[.\-)]\s*(.+)").expect("valid lettered section regex"),
    ]
});
static TITLE_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#+\s*").expect("valid title marker regex"));

#[derive(Debug)]
struct SectionDraft {
    title: String,
    lines: Vec<String>,
}

#[derive(Debug)]
struct ChapterDraft {
    title: String,
    sections: Vec<SectionDraft>,
}

/// Where the scan currently is.
#[derive(Debug)]
enum Cursor {
    NoChapter,
    InChapter(ChapterDraft),
    InSection(ChapterDraft, SectionDraft),
}

impl Cursor {
    fn has_chapter(&self) -> bool {
        !matches!(self, Self::NoChapter)
    }
}

/// Close the open section, if any, into its chapter.
fn close_section(cursor: Cursor) -> Cursor {
    match cursor {
        Cursor::InSection(mut chapter, section) => {
            chapter.sections.push(section);
            Cursor::InChapter(chapter)
        }
        other => other,
    }
}

/// Close the open chapter into `chapters`; chapters without sections are dropped.
fn close_chapter(cursor: Cursor, chapters: &mut Vec<ChapterDraft>) {
    if let Cursor::InChapter(chapter) = close_section(cursor) {
        if chapter.sections.is_empty() {
            tracing::debug!(chapter = %chapter.title, "dropping chapter without sections");
        } else {
            chapters.push(chapter);
        }
    }
}

/// Route a plain content line into the tree, opening defaults as needed.
fn push_content(cursor: Cursor, line: &str) -> Cursor {
    match cursor {
        Cursor::NoChapter => push_content(
            Cursor::InChapter(ChapterDraft {
                title: DEFAULT_CHAPTER_TITLE.to_string(),
                sections: Vec::new(),
            }),
            line,
        ),
        Cursor::InChapter(chapter) => {
            // A short first line names its section; a long one is content
            let section = if line.chars().count() < 80 {
                SectionDraft {
                    title: line.to_string(),
                    lines: Vec::new(),
                }
            } else {
                SectionDraft {
                    title: format!("Section {}", chapter.sections.len() + 1),
                    lines: vec![line.to_string()],
                }
            };
            Cursor::InSection(chapter, section)
        }
        Cursor::InSection(chapter, mut section) => {
            section.lines.push(line.to_string());
            Cursor::InSection(chapter, section)
        }
    }
}

/// Title of the first matching pattern: its last non-empty capture group.
fn match_heading(line: &str, patterns: &[Regex]) -> Option<String> {
    let caps = patterns.iter().find_map(|p| p.captures(line))?;
    let title = caps
        .iter()
        .skip(1)
        .flatten()
        .map(|m| m.as_str().trim())
        .filter(|t| !t.is_empty())
        .last()?;
    Some(title.to_string())
}

fn is_course_title(line: &str) -> bool {
    line.chars().count() < 100
        && !ends_with_sentence_punctuation(line)
        && !CHAPTER_KEYWORD.is_match(line)
        && !SECTION_KEYWORD.is_match(line)
}

/// Segment free text with the built-in formatter.
pub fn parse_text(raw: &str) -> ParsedCourse {
    parse_text_with(raw, Formatter::builtin())
}

/// Segment free text into a course tree, formatting content and generating
/// quizzes for every section.
pub fn parse_text_with(raw: &str, formatter: &Formatter) -> ParsedCourse {
    let lines: Vec<&str> = raw.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    if lines.is_empty() {
        return ParsedCourse {
            title: DEFAULT_COURSE_TITLE.to_string(),
            chapters: Vec::new(),
        };
    }

    let (title, body) = if is_course_title(lines[0]) {
        (TITLE_MARKERS.replace(lines[0], "").into_owned(), &lines[1..])
    } else {
        (DEFAULT_COURSE_TITLE.to_string(), &lines[..])
    };

    let mut drafts = Vec::new();
    let mut cursor = Cursor::NoChapter;

    for &line in body {
        if let Some(chapter_title) = match_heading(line, &CHAPTER_PATTERNS) {
            close_chapter(cursor, &mut drafts);
            cursor = Cursor::InChapter(ChapterDraft {
                title: chapter_title,
                sections: Vec::new(),
            });
            continue;
        }

        if cursor.has_chapter() {
            if let Some(section_title) = match_heading(line, &SECTION_PATTERNS) {
                cursor = match close_section(cursor) {
                    Cursor::InChapter(chapter) => Cursor::InSection(
                        chapter,
                        SectionDraft {
                            title: section_title,
                            lines: Vec::new(),
                        },
                    ),
                    other => other,
                };
                continue;
            }
        }

        cursor = push_content(cursor, line);
    }
    close_chapter(cursor, &mut drafts);

    if drafts.is_empty() {
        // Only a title, or headings without content
        let fallback = if body.is_empty() { &lines[..] } else { body };
        drafts.push(ChapterDraft {
            title: "Chapitre 1".to_string(),
            sections: vec![SectionDraft {
                title: "Section 1".to_string(),
                lines: fallback.iter().map(|l| (*l).to_string()).collect(),
            }],
        });
    }

    tracing::debug!(title = %title, chapters = drafts.len(), "segmented free text");

    ParsedCourse {
        title,
        chapters: drafts
            .into_iter()
            .map(|chapter| ParsedChapter {
                title: chapter.title,
                sections: chapter
                    .sections
                    .into_iter()
                    .map(|section| finish_section(section, formatter))
                    .collect(),
            })
            .collect(),
    }
}

fn finish_section(section: SectionDraft, formatter: &Formatter) -> ParsedSection {
    let content = formatter.format(&section.lines.join("\n"));
    let quiz = synthesize_quiz(&content, &section.title);
    ParsedSection {
        title: section.title,
        content,
        quiz,
    }
}
