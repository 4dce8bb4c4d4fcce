//! Chapter Reading
//!
//! Everything the reader needs that is not DOM work: persisted reading
//! preferences, paragraph splitting, previous/next chapter lookup, scroll
//! progress and terminal paging.

use crate::models::{Chapter, ChapterId, Novel, ProgressUpdate};
use crate::store::{Storage, StorageResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::Duration;

pub const PREFERENCES_KEY: &str = "readingPreferences";
pub const MIN_FONT_SIZE: u8 = 12;
pub const MAX_FONT_SIZE: u8 = 32;
pub const FONT_SIZE_STEP: i16 = 2;

/// Quiet period after the last scroll event before progress is saved
pub const SCROLL_SAVE_DEBOUNCE: Duration = Duration::from_millis(1000);

pub const FIRST_CHAPTER_MESSAGE: &str = "This is the first chapter";
pub const LAST_CHAPTER_MESSAGE: &str = "This is the last chapter";
pub const EMPTY_CHAPTER_MESSAGE: &str = "No content found for this chapter";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontFamily {
    #[serde(rename = "Georgia, serif")]
    Serif,
    #[serde(rename = "Arial, sans-serif")]
    SansSerif,
    #[serde(rename = "'Courier New', monospace")]
    Monospace,
}

impl FontFamily {
    pub const ALL: [FontFamily; 3] = [FontFamily::Serif, FontFamily::SansSerif, FontFamily::Monospace];

    pub fn css(&self) -> &'static str {
        match self {
            FontFamily::Serif => "Georgia, serif",
            FontFamily::SansSerif => "Arial, sans-serif",
            FontFamily::Monospace => "'Courier New', monospace",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FontFamily::Serif => "Serif",
            FontFamily::SansSerif => "Sans-Serif",
            FontFamily::Monospace => "Monospace",
        }
    }

    pub fn from_css(css: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.css() == css)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Sepia,
    Dark,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Light, Theme::Sepia, Theme::Dark];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Sepia => "sepia",
            Theme::Dark => "dark",
        }
    }

    /// CSS class applied to the reader container
    pub fn class(&self) -> String {
        format!("reader-container theme-{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingPreferences {
    /// Stored as a CSS length (`"18px"`)
    #[serde(serialize_with = "px_to_css", deserialize_with = "px_from_css")]
    pub font_size: u8,
    pub font_family: FontFamily,
    pub theme: Theme,
}

impl Default for ReadingPreferences {
    fn default() -> Self {
        Self {
            font_size: 18,
            font_family: FontFamily::Serif,
            theme: Theme::Light,
        }
    }
}

fn px_to_css<S: Serializer>(size: &u8, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{}px", size))
}

fn px_from_css<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let raw = String::deserialize(deserializer)?;
    let digits = raw.trim().trim_end_matches("px");
    let size: u8 = digits
        .parse()
        .map_err(|_| serde::de::Error::custom(format!("invalid font size: {}", raw)))?;
    Ok(size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE))
}

impl ReadingPreferences {
    /// Step the font size, staying within 12..=32 px
    pub fn adjust_font_size(&mut self, delta: i16) -> u8 {
        let next = (self.font_size as i16 + delta).clamp(MIN_FONT_SIZE as i16, MAX_FONT_SIZE as i16);
        self.font_size = next as u8;
        self.font_size
    }

    pub fn font_size_css(&self) -> String {
        format!("{}px", self.font_size)
    }

    /// Inline style for the text column
    pub fn text_style(&self) -> String {
        format!(
            "font-size: {}; font-family: {};",
            self.font_size_css(),
            self.font_family.css()
        )
    }
}

/// Stored preferences, or the defaults when absent or unreadable
pub fn load_preferences(storage: &dyn Storage) -> ReadingPreferences {
    match storage.get_item(PREFERENCES_KEY) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable reading preferences: {}", e);
            ReadingPreferences::default()
        }),
        Ok(None) => ReadingPreferences::default(),
        Err(e) => {
            tracing::warn!("Failed to read reading preferences: {}", e);
            ReadingPreferences::default()
        }
    }
}

pub fn save_preferences(storage: &dyn Storage, prefs: &ReadingPreferences) -> StorageResult<()> {
    let raw = serde_json::to_string(prefs)?;
    storage.set_item(PREFERENCES_KEY, &raw)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Paragraph {
    Text(String),
    /// Blank source line
    Break,
}

/// One paragraph per source line; blank lines become breaks
pub fn paragraphs(content: &str) -> Vec<Paragraph> {
    content
        .split('\n')
        .map(|line| {
            let line = line.trim();
            if line.is_empty() {
                Paragraph::Break
            } else {
                Paragraph::Text(line.to_string())
            }
        })
        .collect()
}

/// Chapter content if it has any visible text
pub fn readable_content(chapter: &Chapter) -> Option<&str> {
    chapter
        .content
        .as_deref()
        .filter(|c| !c.trim().is_empty())
}

/// Previous/next lookup by position in the novel's chapter list
#[derive(Debug, Clone, Copy)]
pub struct ChapterNav<'a> {
    chapters: &'a [Chapter],
    current: ChapterId,
}

impl<'a> ChapterNav<'a> {
    pub fn new(chapters: &'a [Chapter], current: ChapterId) -> Self {
        Self { chapters, current }
    }

    pub fn position(&self) -> Option<usize> {
        self.chapters
            .iter()
            .position(|c| c.chapter_id == self.current)
    }

    pub fn previous(&self) -> Option<&'a Chapter> {
        match self.position() {
            Some(i) if i > 0 => self.chapters.get(i - 1),
            _ => None,
        }
    }

    /// An unknown current chapter continues from the first one
    pub fn next(&self) -> Option<&'a Chapter> {
        match self.position() {
            Some(i) => self.chapters.get(i + 1),
            None => self.chapters.first(),
        }
    }

    pub fn is_first(&self) -> bool {
        self.previous().is_none()
    }

    pub fn is_last(&self) -> bool {
        self.next().is_none()
    }
}

/// Scroll position as a 0–100 percentage; 0 when nothing can scroll
pub fn scroll_percentage(scroll_top: f64, scroll_height: f64, client_height: f64) -> u8 {
    let scrollable = scroll_height - client_height;
    if scrollable <= 0.0 {
        return 0;
    }
    ((scroll_top / scrollable) * 100.0).round().clamp(0.0, 100.0) as u8
}

pub fn progress_update(
    novel: Option<&Novel>,
    chapter: &Chapter,
    novel_id: i64,
    scroll_position: i64,
    percentage: u8,
) -> ProgressUpdate {
    ProgressUpdate {
        novel_id,
        chapter_id: chapter.chapter_id,
        scroll_position,
        reading_percentage: percentage,
        novel_title: novel.map(|n| n.title.clone()),
        chapter_title: Some(chapter.display_title()),
    }
}

/// Fixed-size pages of word-wrapped chapter text for terminal reading
#[derive(Debug, Clone)]
pub struct TextPager {
    lines: Vec<String>,
    page_height: usize,
}

impl TextPager {
    pub fn new(content: &str, width: usize, page_height: usize) -> Self {
        let width = width.max(10);
        let mut lines = Vec::new();
        for paragraph in paragraphs(content) {
            match paragraph {
                Paragraph::Break => lines.push(String::new()),
                Paragraph::Text(text) => lines.extend(wrap(&text, width)),
            }
        }
        Self {
            lines,
            page_height: page_height.max(1),
        }
    }

    pub fn page_count(&self) -> usize {
        self.lines.len().div_ceil(self.page_height).max(1)
    }

    /// Zero-based page; `None` past the end
    pub fn page(&self, index: usize) -> Option<&[String]> {
        let start = index * self.page_height;
        if index >= self.page_count() {
            return None;
        }
        let end = (start + self.page_height).min(self.lines.len());
        Some(&self.lines[start.min(end)..end])
    }

    /// Reading percentage after finishing the given page
    pub fn percentage_at(&self, index: usize) -> u8 {
        let pages = self.page_count();
        (((index + 1).min(pages) * 100) as f64 / pages as f64).round() as u8
    }
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStorage;

    fn chapter(id: i64, number: u32) -> Chapter {
        Chapter {
            chapter_id: id,
            novel_id: Some(1),
            chapter_number: number,
            title: None,
            content: None,
            created_at: None,
        }
    }

    #[test]
    fn test_preferences_default_and_storage_format() {
        let storage = MemoryStorage::new();
        assert_eq!(load_preferences(&storage), ReadingPreferences::default());

        let prefs = ReadingPreferences {
            font_size: 22,
            font_family: FontFamily::Monospace,
            theme: Theme::Sepia,
        };
        save_preferences(&storage, &prefs).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&storage.get_item(PREFERENCES_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(raw["fontSize"], "22px");
        assert_eq!(raw["fontFamily"], "'Courier New', monospace");
        assert_eq!(raw["theme"], "sepia");

        assert_eq!(load_preferences(&storage), prefs);
    }

    #[test]
    fn test_unreadable_preferences_fall_back() {
        let storage = MemoryStorage::new();
        storage
            .set_item(PREFERENCES_KEY, r#"{"fontSize":"huge","fontFamily":"Georgia, serif","theme":"light"}"#)
            .unwrap();
        assert_eq!(load_preferences(&storage), ReadingPreferences::default());
    }

    #[test]
    fn test_font_size_clamped() {
        let mut prefs = ReadingPreferences::default();
        assert_eq!(prefs.adjust_font_size(FONT_SIZE_STEP), 20);
        for _ in 0..10 {
            prefs.adjust_font_size(FONT_SIZE_STEP);
        }
        assert_eq!(prefs.font_size, MAX_FONT_SIZE);
        for _ in 0..20 {
            prefs.adjust_font_size(-FONT_SIZE_STEP);
        }
        assert_eq!(prefs.font_size, MIN_FONT_SIZE);
        assert_eq!(prefs.text_style(), "font-size: 12px; font-family: Georgia, serif;");
    }

    #[test]
    fn test_paragraph_split() {
        let parts = paragraphs("First line\n\n  Second  \n");
        assert_eq!(
            parts,
            vec![
                Paragraph::Text("First line".into()),
                Paragraph::Break,
                Paragraph::Text("Second".into()),
                Paragraph::Break,
            ]
        );
    }

    #[test]
    fn test_chapter_nav() {
        let chapters = vec![chapter(10, 1), chapter(11, 2), chapter(12, 3)];

        let middle = ChapterNav::new(&chapters, 11);
        assert_eq!(middle.previous().unwrap().chapter_id, 10);
        assert_eq!(middle.next().unwrap().chapter_id, 12);

        let first = ChapterNav::new(&chapters, 10);
        assert!(first.is_first());
        let last = ChapterNav::new(&chapters, 12);
        assert!(last.is_last());

        let unknown = ChapterNav::new(&chapters, 99);
        assert!(unknown.previous().is_none());
        assert_eq!(unknown.next().unwrap().chapter_id, 10);

        let empty = ChapterNav::new(&[], 1);
        assert!(empty.is_first() && empty.is_last());
    }

    #[test]
    fn test_scroll_percentage() {
        assert_eq!(scroll_percentage(0.0, 500.0, 500.0), 0);
        assert_eq!(scroll_percentage(250.0, 1500.0, 500.0), 25);
        assert_eq!(scroll_percentage(1000.0, 1500.0, 500.0), 100);
        assert_eq!(scroll_percentage(1200.0, 1500.0, 500.0), 100);
        assert_eq!(scroll_percentage(333.0, 1500.0, 500.0), 33);
    }

    #[test]
    fn test_progress_update_titles() {
        let novel = Novel {
            novel_id: 1,
            title: "Dune".into(),
            author: None,
            description: None,
            cover_image: None,
            chapter_count: None,
            first_chapter_id: None,
            created_at: None,
            updated_at: None,
        };
        let update = progress_update(Some(&novel), &chapter(10, 4), 1, 0, 55);
        assert_eq!(update.chapter_id, 10);
        assert_eq!(update.novel_title.as_deref(), Some("Dune"));
        assert_eq!(update.chapter_title.as_deref(), Some("Chapter 4"));
        assert_eq!(update.reading_percentage, 55);
    }

    #[test]
    fn test_readable_content() {
        let mut ch = chapter(1, 1);
        assert!(readable_content(&ch).is_none());
        ch.content = Some("  \n ".into());
        assert!(readable_content(&ch).is_none());
        ch.content = Some("Text".into());
        assert_eq!(readable_content(&ch), Some("Text"));
    }

    #[test]
    fn test_text_pager() {
        let content = "one two three four five six seven eight nine ten\n\nend";
        let pager = TextPager::new(content, 14, 2);
        // "one two three" "four five six" "seven eight" "nine ten" "" "end"
        assert_eq!(pager.page_count(), 3);
        assert_eq!(pager.page(0).unwrap(), &["one two three".to_string(), "four five six".to_string()]);
        assert_eq!(pager.page(2).unwrap(), &[String::new(), "end".to_string()]);
        assert!(pager.page(3).is_none());
        assert_eq!(pager.percentage_at(0), 33);
        assert_eq!(pager.percentage_at(2), 100);

        let empty = TextPager::new("", 40, 10);
        assert_eq!(empty.page_count(), 1);
        assert_eq!(empty.page(0).unwrap().len(), 1);
    }
}
