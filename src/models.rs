//! Wire Models
//!
//! DTOs exchanged with the Novelly REST backend. Field names follow the
//! backend's camelCase JSON; aliases cover the alternate names older
//! endpoints still emit (`id`, `coverImageUrl`).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type NovelId = i64;
pub type ChapterId = i64;
pub type CommentId = i64;
pub type ReviewId = i64;

/// Account role as issued by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Creator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Creator => "CREATOR",
            Role::Admin => "ADMIN",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "id")]
    pub user_id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }
}

/// `POST /auth/register` and `POST /auth/login` response
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email_or_username: String,
    pub password: String,
}

/// Novel summary / detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Novel {
    #[serde(alias = "id")]
    pub novel_id: NovelId,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "coverImageUrl")]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub chapter_count: Option<u32>,
    #[serde(default)]
    pub first_chapter_id: Option<ChapterId>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl Novel {
    pub fn author_or_unknown(&self) -> &str {
        self.author.as_deref().unwrap_or("Unknown")
    }

    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// JSON body for `POST /novels`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNovel {
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Binary attachment for multipart uploads
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Multipart form for `POST /novels/upload` and `PUT /novels/{id}`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NovelForm {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<FileUpload>,
}

/// Chapter with optional text content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    #[serde(alias = "id")]
    pub chapter_id: ChapterId,
    #[serde(default)]
    pub novel_id: Option<NovelId>,
    pub chapter_number: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl Chapter {
    /// `Chapter N: Title`, or `Chapter N` when untitled
    pub fn label(&self) -> String {
        match self.title.as_deref().filter(|t| !t.trim().is_empty()) {
            Some(title) => format!("Chapter {}: {}", self.chapter_number, title),
            None => format!("Chapter {}", self.chapter_number),
        }
    }

    /// Title shown in the reader header
    pub fn display_title(&self) -> String {
        self.title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| format!("Chapter {}", self.chapter_number))
    }
}

/// JSON body for chapter create/update
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterDraft {
    pub novel_id: NovelId,
    pub chapter_number: u32,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(alias = "id")]
    pub comment_id: CommentId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub username: String,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(alias = "id")]
    pub review_id: ReviewId,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    pub username: String,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub review_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewReview {
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// One entry of a user's library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryItem {
    #[serde(default)]
    pub library_id: Option<i64>,
    pub novel: Novel,
    #[serde(default)]
    pub added_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryCheck {
    pub in_library: bool,
}

/// Stored reading position for one novel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingProgress {
    #[serde(default)]
    pub progress_id: Option<i64>,
    #[serde(default)]
    pub novel: Option<Novel>,
    #[serde(default)]
    pub chapter: Option<Chapter>,
    #[serde(default)]
    pub scroll_position: Option<i64>,
    #[serde(default)]
    pub reading_percentage: Option<f64>,
    #[serde(default)]
    pub last_read_at: Option<NaiveDateTime>,
}

/// JSON body for `POST /users/{id}/progress`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub novel_id: NovelId,
    pub chapter_id: ChapterId,
    pub scroll_position: i64,
    pub reading_percentage: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub novel_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_novel_accepts_backend_and_legacy_names() {
        let backend: Novel = serde_json::from_str(
            r#"{"novelId":6,"title":"Dune","author":"Herbert","coverImage":"novels/6/cover/a.jpg",
                "createdAt":"2024-03-01T10:15:30.123456"}"#,
        )
        .unwrap();
        assert_eq!(backend.novel_id, 6);
        assert_eq!(backend.cover_image.as_deref(), Some("novels/6/cover/a.jpg"));
        assert!(backend.created_at.is_some());

        let legacy: Novel =
            serde_json::from_str(r#"{"id":7,"title":"Emma","coverImageUrl":"/api/x.png"}"#).unwrap();
        assert_eq!(legacy.novel_id, 7);
        assert_eq!(legacy.cover_image.as_deref(), Some("/api/x.png"));
        assert_eq!(legacy.author_or_unknown(), "Unknown");
    }

    #[test]
    fn test_user_role_parsing() {
        let user: User = serde_json::from_str(
            r#"{"userId":1,"username":"ada","email":"ada@example.com","role":"ADMIN"}"#,
        )
        .unwrap();
        assert!(user.is_admin());
        assert_eq!(user.role.unwrap().to_string(), "ADMIN");

        let no_role: User = serde_json::from_str(r#"{"userId":2,"username":"bob","role":null}"#).unwrap();
        assert_eq!(no_role.role, None);
    }

    #[test]
    fn test_chapter_labels() {
        let mut chapter = Chapter {
            chapter_id: 3,
            novel_id: Some(1),
            chapter_number: 2,
            title: Some("The Storm".into()),
            content: None,
            created_at: None,
        };
        assert_eq!(chapter.label(), "Chapter 2: The Storm");
        assert_eq!(chapter.display_title(), "The Storm");

        chapter.title = Some("  ".into());
        assert_eq!(chapter.label(), "Chapter 2");
        assert_eq!(chapter.display_title(), "Chapter 2");
    }

    #[test]
    fn test_progress_update_serializes_camel_case() {
        let update = ProgressUpdate {
            novel_id: 1,
            chapter_id: 9,
            scroll_position: 0,
            reading_percentage: 40,
            novel_title: None,
            chapter_title: Some("Chapter 1".into()),
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["novelId"], 1);
        assert_eq!(json["readingPercentage"], 40);
        assert_eq!(json["chapterTitle"], "Chapter 1");
        assert!(json.get("novelTitle").is_none());
    }

    #[test]
    fn test_library_item_ignores_nested_user() {
        let item: LibraryItem = serde_json::from_str(
            r#"{"libraryId":4,"user":{"userId":1,"passwordHash":"x"},
                "novel":{"novelId":2,"title":"Ivanhoe"},"addedAt":"2024-01-02T03:04:05"}"#,
        )
        .unwrap();
        assert_eq!(item.novel.title, "Ivanhoe");
        assert_eq!(item.library_id, Some(4));
    }
}
