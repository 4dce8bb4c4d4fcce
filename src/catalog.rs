//! Catalog presentation helpers
//!
//! Grid pagination, search highlighting, excerpts, star ratings, relative
//! times, cover URLs and the admin list cache. All functions are pure and
//! take the current time explicitly.

use crate::models::Novel;
use crate::router::paths;
use chrono::{DateTime, NaiveDateTime, Utc};
use regex::RegexBuilder;

pub const GRID_PAGE_SIZE: usize = 12;
pub const POPULAR_COUNT: usize = 10;
pub const CARD_EXCERPT_CHARS: usize = 80;
pub const ROW_EXCERPT_CHARS: usize = 100;
pub const PLACEHOLDER_COVER: &str = "assets/placeholder.png";

/// Admin novel list lifetime
pub const NOVEL_CACHE_TTL_SECS: i64 = 5 * 60;

/// Client-side pagination over an already-fetched list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    total: usize,
    page_size: usize,
    current: usize,
}

impl Paginator {
    pub fn new(total: usize, page_size: usize) -> Self {
        Self {
            total,
            page_size: page_size.max(1),
            current: 1,
        }
    }

    pub fn grid(total: usize) -> Self {
        Self::new(total, GRID_PAGE_SIZE)
    }

    /// At least one page, even for an empty list
    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.page_size).max(1)
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Jump to a 1-based page, clamped to the valid range
    pub fn go_to(&mut self, page: usize) -> usize {
        self.current = page.clamp(1, self.total_pages());
        self.current
    }

    pub fn has_prev(&self) -> bool {
        self.current > 1
    }

    pub fn has_next(&self) -> bool {
        self.current < self.total_pages()
    }

    pub fn prev(&mut self) -> usize {
        self.go_to(self.current.saturating_sub(1))
    }

    pub fn next(&mut self) -> usize {
        self.go_to(self.current + 1)
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = ((self.current - 1) * self.page_size).min(items.len());
        let end = (start + self.page_size).min(items.len());
        &items[start..end]
    }

    pub fn label(&self) -> String {
        format!("Page {} of {}", self.current, self.total_pages())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub highlighted: bool,
}

/// Split `text` into plain and highlighted runs of case-insensitive `query`
pub fn highlight(text: &str, query: &str) -> Vec<Segment> {
    let plain = || {
        vec![Segment {
            text: text.to_string(),
            highlighted: false,
        }]
    };
    let query = query.trim();
    if query.is_empty() || text.is_empty() {
        return plain();
    }
    let Ok(re) = RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    else {
        return plain();
    };

    let mut segments = Vec::new();
    let mut last = 0;
    for m in re.find_iter(text) {
        if m.start() > last {
            segments.push(Segment {
                text: text[last..m.start()].to_string(),
                highlighted: false,
            });
        }
        segments.push(Segment {
            text: m.as_str().to_string(),
            highlighted: true,
        });
        last = m.end();
    }
    if last < text.len() {
        segments.push(Segment {
            text: text[last..].to_string(),
            highlighted: false,
        });
    }
    segments
}

/// First `max_chars` characters, with `...` when truncated
pub fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Star {
    Full,
    Half,
    Empty,
}

impl Star {
    pub fn glyph(&self) -> char {
        match self {
            Star::Full => '★',
            Star::Half | Star::Empty => '☆',
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            Star::Full => "star full",
            Star::Half => "star half",
            Star::Empty => "star",
        }
    }
}

/// Five stars: full for each whole point, one half at a fraction of .5 or more
pub fn stars(rating: f64) -> [Star; 5] {
    let rating = rating.clamp(0.0, 5.0);
    let full = rating.floor() as usize;
    let half = rating.fract() >= 0.5;
    let mut out = [Star::Empty; 5];
    for (i, star) in out.iter_mut().enumerate() {
        if i < full {
            *star = Star::Full;
        } else if i == full && half {
            *star = Star::Half;
        }
    }
    out
}

pub fn stars_text(rating: f64) -> String {
    stars(rating).iter().map(Star::glyph).collect()
}

/// Average rating to one decimal
pub fn format_rating(average: f64) -> String {
    format!("{:.1}", average)
}

/// Avatar initials: first two characters, upper-cased
pub fn initials(username: &str) -> String {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return "U".to_string();
    }
    trimmed.chars().take(2).flat_map(char::to_uppercase).collect()
}

/// `just now`, `5m ago`, `3h ago`, `2d ago`, `1w ago`, `4mo ago`
pub fn time_ago(then: NaiveDateTime, now: NaiveDateTime) -> String {
    let seconds = (now - then).num_seconds().max(0);
    if seconds < 60 {
        return "just now".to_string();
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{}m ago", minutes);
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h ago", hours);
    }
    let days = hours / 24;
    if days < 7 {
        return format!("{}d ago", days);
    }
    let weeks = days / 7;
    if weeks < 4 {
        return format!("{}w ago", weeks);
    }
    format!("{}mo ago", days / 30)
}

/// Browser-facing URL for a stored cover path
pub fn cover_url(cover: Option<&str>, api_base: &str) -> String {
    let Some(path) = cover.map(str::trim).filter(|p| !p.is_empty()) else {
        return PLACEHOLDER_COVER.to_string();
    };
    if path.starts_with("http") || path.starts_with("/api") {
        return path.to_string();
    }
    if path.contains("/cover/") || path.starts_with("novels/") {
        return format!(
            "{}/pages/file?path={}",
            api_base.trim_end_matches('/'),
            urlencoding::encode(path)
        );
    }
    PLACEHOLDER_COVER.to_string()
}

/// Card click target: first chapter when known, else the detail page
pub fn read_link(novel: &Novel) -> String {
    match novel.first_chapter_id {
        Some(chapter_id) => paths::reader(novel.novel_id, chapter_id),
        None => paths::novel(novel.novel_id),
    }
}

pub fn chapter_count_label(count: Option<usize>) -> String {
    match count {
        Some(n) => format!("{} chapters", n),
        None => "... chapters".to_string(),
    }
}

/// Single-value cache that expires after a fixed lifetime
#[derive(Debug, Clone)]
pub struct TtlCache<T> {
    ttl_secs: i64,
    entry: Option<(DateTime<Utc>, T)>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            ttl_secs,
            entry: None,
        }
    }

    pub fn get(&self, now: DateTime<Utc>) -> Option<T> {
        self.entry.as_ref().and_then(|(stored_at, value)| {
            ((now - *stored_at).num_seconds() < self.ttl_secs).then(|| value.clone())
        })
    }

    pub fn put(&mut self, value: T, now: DateTime<Utc>) {
        self.entry = Some((now, value));
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

pub type NovelCache = TtlCache<Vec<Novel>>;

impl Default for NovelCache {
    fn default() -> Self {
        Self::new(NOVEL_CACHE_TTL_SECS)
    }
}
