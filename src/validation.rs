//! Form validation rules
//!
//! Shared by the browser forms and the terminal client. Each rule returns
//! the message shown next to the offending field.

use crate::models::{ChapterDraft, FileUpload, NewReview, NovelForm, NovelId};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const STRONG_PASSWORD_LEN: usize = 8;
pub const MIN_SEARCH_LEN: usize = 2;
pub const MAX_REVIEW_CHARS: usize = 500;
pub const MIN_CHAPTER_CHARS: usize = 100;
pub const MAX_AVATAR_BYTES: u64 = 2 * 1024 * 1024;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type ValidationResult<T = ()> = Result<T, ValidationError>;

/// A validation failure tied to a form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

fn collect(errors: &mut Vec<FieldError>, field: &'static str, result: ValidationResult) {
    if let Err(e) = result {
        errors.push(FieldError {
            field,
            message: e.0,
        });
    }
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
}

fn username_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("valid username regex"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email.trim())
}

pub fn validate_email(email: &str) -> ValidationResult {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::new("Email is required"));
    }
    if !is_valid_email(email) {
        return Err(ValidationError::new("Please enter a valid email address"));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> ValidationResult {
    let username = username.trim();
    let len = username.chars().count();
    if len == 0 {
        return Err(ValidationError::new("Username is required"));
    }
    if len < 3 {
        return Err(ValidationError::new("Username must be at least 3 characters"));
    }
    if len > 20 {
        return Err(ValidationError::new("Username must not exceed 20 characters"));
    }
    if !username_regex().is_match(username) {
        return Err(ValidationError::new(
            "Username can only contain letters, numbers, hyphens, and underscores",
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str, min_len: usize) -> ValidationResult {
    if password.is_empty() {
        return Err(ValidationError::new("Password is required"));
    }
    if password.chars().count() < min_len {
        return Err(ValidationError::new(format!(
            "Password must be at least {} characters",
            min_len
        )));
    }
    Ok(())
}

pub fn validate_strong_password(password: &str) -> ValidationResult {
    if password.is_empty() {
        return Err(ValidationError::new("Password is required"));
    }
    if password.chars().count() < STRONG_PASSWORD_LEN {
        return Err(ValidationError::new("Password must be at least 8 characters"));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(ValidationError::new(
            "Password must contain at least one lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::new(
            "Password must contain at least one uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new("Password must contain at least one number"));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrengthLevel {
    None,
    Weak,
    Medium,
    Strong,
}

impl StrengthLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrengthLevel::None => "none",
            StrengthLevel::Weak => "weak",
            StrengthLevel::Medium => "medium",
            StrengthLevel::Strong => "strong",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            StrengthLevel::None => "",
            StrengthLevel::Weak => "Weak - Add uppercase, numbers, or symbols",
            StrengthLevel::Medium => "Medium - Add more variety for better security",
            StrengthLevel::Strong => "Strong - Great password!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordStrength {
    /// 0..=6
    pub score: u8,
    pub level: StrengthLevel,
}

const SYMBOLS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?";

pub fn password_strength(password: &str) -> PasswordStrength {
    if password.is_empty() {
        return PasswordStrength {
            score: 0,
            level: StrengthLevel::None,
        };
    }
    let len = password.chars().count();
    let checks = [
        len >= 8,
        len >= 12,
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| SYMBOLS.contains(c)),
    ];
    let score = checks.iter().filter(|passed| **passed).count() as u8;
    let level = match score {
        0..=2 => StrengthLevel::Weak,
        3..=4 => StrengthLevel::Medium,
        _ => StrengthLevel::Strong,
    };
    PasswordStrength { score, level }
}

pub fn validate_password_match(password: &str, confirm: &str) -> ValidationResult {
    if confirm.is_empty() {
        return Err(ValidationError::new("Please confirm your password"));
    }
    if password != confirm {
        return Err(ValidationError::new("Passwords do not match"));
    }
    Ok(())
}

/// Trimmed search term of at least two characters
pub fn validate_search_term(term: &str) -> ValidationResult<String> {
    let term = term.trim();
    if term.is_empty() {
        return Err(ValidationError::new("Please enter a search term"));
    }
    if term.chars().count() < MIN_SEARCH_LEN {
        return Err(ValidationError::new(
            "Search term must be at least 2 characters",
        ));
    }
    Ok(term.to_string())
}

/// Login accepts a username or an email; only the latter is format-checked
pub fn validate_login(identifier: &str, password: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let identifier = identifier.trim();
    if identifier.is_empty() {
        errors.push(FieldError {
            field: "identifier",
            message: "Please enter your email or username".to_string(),
        });
    } else if identifier.contains('@') {
        collect(&mut errors, "identifier", validate_email(identifier));
    }
    if password.trim().is_empty() {
        errors.push(FieldError {
            field: "password",
            message: "Please enter your password".to_string(),
        });
    }
    errors
}

pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
    confirm: &str,
) -> Vec<FieldError> {
    let mut errors = Vec::new();
    collect(&mut errors, "username", validate_username(username));
    collect(&mut errors, "email", validate_email(email));
    collect(&mut errors, "password", validate_password(password, MIN_PASSWORD_LEN));
    collect(&mut errors, "confirm", validate_password_match(password, confirm));
    errors
}

/// Rating 1–5 and an optional comment of at most 500 characters
pub fn validate_review(rating: u8, comment: &str) -> ValidationResult<NewReview> {
    if rating == 0 {
        return Err(ValidationError::new("Please select a rating"));
    }
    if rating > 5 {
        return Err(ValidationError::new("Rating must be between 1 and 5"));
    }
    let comment = comment.trim();
    if comment.chars().count() > MAX_REVIEW_CHARS {
        return Err(ValidationError::new(
            "Review must not exceed 500 characters",
        ));
    }
    Ok(NewReview {
        rating,
        comment: (!comment.is_empty()).then(|| comment.to_string()),
    })
}

pub fn validate_comment(content: &str) -> ValidationResult<String> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ValidationError::new("Please enter a comment"));
    }
    Ok(content.to_string())
}

/// Admin chapter form. A blank title becomes `Chapter N`.
pub fn validate_chapter_draft(
    novel_id: Option<NovelId>,
    chapter_number: &str,
    title: &str,
    content: &str,
) -> ValidationResult<ChapterDraft> {
    let novel_id = novel_id
        .filter(|id| *id > 0)
        .ok_or_else(|| ValidationError::new("Please select a novel"))?;

    let chapter_number: u32 = chapter_number
        .trim()
        .parse()
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| ValidationError::new("Please enter a valid chapter number"))?;

    let content = content.trim();
    if content.is_empty() {
        return Err(ValidationError::new("Please enter chapter content"));
    }
    if content.chars().count() < MIN_CHAPTER_CHARS {
        return Err(ValidationError::new(
            "Chapter content is too short (minimum 100 characters)",
        ));
    }

    let title = title.trim();
    Ok(ChapterDraft {
        novel_id,
        chapter_number,
        title: if title.is_empty() {
            format!("Chapter {}", chapter_number)
        } else {
            title.to_string()
        },
        content: content.to_string(),
    })
}

/// Admin "add novel" form; a cover image is mandatory
pub fn validate_new_novel(
    title: &str,
    author: &str,
    description: &str,
    cover: Option<FileUpload>,
) -> ValidationResult<NovelForm> {
    let title = title.trim();
    let author = author.trim();
    if title.is_empty() {
        return Err(ValidationError::new("Title is required"));
    }
    if author.is_empty() {
        return Err(ValidationError::new("Author is required"));
    }
    let cover = cover
        .filter(|c| !c.file_name.is_empty())
        .ok_or_else(|| ValidationError::new("Please select a cover image"))?;
    let description = description.trim();
    Ok(NovelForm {
        title: Some(title.to_string()),
        author: Some(author.to_string()),
        description: (!description.is_empty()).then(|| description.to_string()),
        cover_image: Some(cover),
    })
}

pub fn validate_avatar_size(bytes: u64) -> ValidationResult {
    if bytes > MAX_AVATAR_BYTES {
        return Err(ValidationError::new("Image must be less than 2MB"));
    }
    Ok(())
}

/// Raw edit-profile form input
#[derive(Debug, Clone, Default)]
pub struct ProfileEdit {
    pub username: String,
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
    pub avatar_bytes: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub password_changed: bool,
    pub avatar_changed: bool,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileEditError {
    #[error("No changes to save")]
    NoChanges,

    #[error("Please fix the highlighted fields")]
    Invalid(Vec<FieldError>),
}

pub fn validate_profile_edit(
    current_username: &str,
    edit: &ProfileEdit,
) -> Result<ProfileChanges, ProfileEditError> {
    let mut errors = Vec::new();
    let mut changes = ProfileChanges {
        username: None,
        password_changed: false,
        avatar_changed: false,
    };

    let username = edit.username.trim();
    if !username.is_empty() && username != current_username {
        collect(&mut errors, "username", validate_username(username));
        changes.username = Some(username.to_string());
    }

    let wants_password = !edit.current_password.is_empty()
        || !edit.new_password.is_empty()
        || !edit.confirm_password.is_empty();
    if wants_password {
        if edit.current_password.is_empty() {
            errors.push(FieldError {
                field: "current_password",
                message: "Current password is required".to_string(),
            });
        }
        if edit.new_password.is_empty() {
            errors.push(FieldError {
                field: "new_password",
                message: "New password is required".to_string(),
            });
        } else {
            collect(&mut errors, "new_password", validate_strong_password(&edit.new_password));
        }
        if edit.new_password != edit.confirm_password {
            errors.push(FieldError {
                field: "confirm_password",
                message: "Passwords do not match".to_string(),
            });
        }
        changes.password_changed = true;
    }

    if let Some(size) = edit.avatar_bytes {
        collect(&mut errors, "avatar", validate_avatar_size(size));
        changes.avatar_changed = true;
    }

    if changes.username.is_none() && !changes.password_changed && !changes.avatar_changed {
        return Err(ProfileEditError::NoChanges);
    }
    if !errors.is_empty() {
        return Err(ProfileEditError::Invalid(errors));
    }
    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_rules() {
        assert!(validate_email(" ada@example.com ").is_ok());
        assert_eq!(validate_email("  ").unwrap_err().to_string(), "Email is required");
        assert_eq!(
            validate_email("ada@example").unwrap_err().to_string(),
            "Please enter a valid email address"
        );
        assert!(!is_valid_email("a b@example.com"));
    }

    #[test]
    fn test_username_rules() {
        assert!(validate_username("ada_lovelace-1").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"a".repeat(21)).is_err());
        assert_eq!(
            validate_username("ada!").unwrap_err().to_string(),
            "Username can only contain letters, numbers, hyphens, and underscores"
        );
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("secret", MIN_PASSWORD_LEN).is_ok());
        assert_eq!(
            validate_password("12345", MIN_PASSWORD_LEN).unwrap_err().to_string(),
            "Password must be at least 6 characters"
        );
        assert!(validate_strong_password("Passw0rd").is_ok());
        assert_eq!(
            validate_strong_password("password1").unwrap_err().to_string(),
            "Password must contain at least one uppercase letter"
        );
        assert_eq!(
            validate_strong_password("Password").unwrap_err().to_string(),
            "Password must contain at least one number"
        );
        assert!(validate_password_match("a", "").is_err());
        assert!(validate_password_match("a", "b").is_err());
        assert!(validate_password_match("a", "a").is_ok());
    }

    #[test]
    fn test_password_strength_scores() {
        assert_eq!(password_strength("").level, StrengthLevel::None);
        let weak = password_strength("abc");
        assert_eq!((weak.score, weak.level), (1, StrengthLevel::Weak));
        let medium = password_strength("abcdefG1");
        assert_eq!((medium.score, medium.level), (4, StrengthLevel::Medium));
        let strong = password_strength("abcdefGHIJ1!");
        assert_eq!((strong.score, strong.level), (6, StrengthLevel::Strong));
        assert_eq!(strong.level.message(), "Strong - Great password!");
    }

    #[test]
    fn test_search_term() {
        assert_eq!(validate_search_term("  du ").unwrap(), "du");
        assert_eq!(
            validate_search_term("d").unwrap_err().to_string(),
            "Search term must be at least 2 characters"
        );
        assert_eq!(
            validate_search_term("   ").unwrap_err().to_string(),
            "Please enter a search term"
        );
    }

    #[test]
    fn test_login_and_registration_fields() {
        assert!(validate_login("ada", "pw").is_empty());
        let errors = validate_login("ada@", "");
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["identifier", "password"]);

        let errors = validate_registration("ad", "bad", "123", "321");
        assert_eq!(errors.len(), 4);
        assert!(validate_registration("ada", "ada@example.com", "secret", "secret").is_empty());
    }

    #[test]
    fn test_review_rules() {
        assert_eq!(validate_review(0, "").unwrap_err().to_string(), "Please select a rating");
        assert!(validate_review(6, "").is_err());
        assert!(validate_review(3, &"x".repeat(501)).is_err());
        let review = validate_review(5, "  Loved it ").unwrap();
        assert_eq!(review.comment.as_deref(), Some("Loved it"));
        assert!(validate_review(4, "   ").unwrap().comment.is_none());
    }

    #[test]
    fn test_chapter_draft_rules() {
        let content = "word ".repeat(30);
        assert_eq!(
            validate_chapter_draft(None, "1", "", &content).unwrap_err().to_string(),
            "Please select a novel"
        );
        assert!(validate_chapter_draft(Some(1), "0", "", &content).is_err());
        assert!(validate_chapter_draft(Some(1), "x", "", &content).is_err());
        assert_eq!(
            validate_chapter_draft(Some(1), "2", "", "  ").unwrap_err().to_string(),
            "Please enter chapter content"
        );
        assert_eq!(
            validate_chapter_draft(Some(1), "2", "", &"a".repeat(99)).unwrap_err().to_string(),
            "Chapter content is too short (minimum 100 characters)"
        );

        let draft = validate_chapter_draft(Some(1), " 3 ", " ", &content).unwrap();
        assert_eq!(draft.title, "Chapter 3");
        assert_eq!(draft.chapter_number, 3);
        assert_eq!(draft.content, content.trim());
    }

    #[test]
    fn test_new_novel_requires_cover() {
        let cover = FileUpload {
            file_name: "c.png".into(),
            content_type: "image/png".into(),
            bytes: vec![1],
        };
        assert_eq!(
            validate_new_novel("T", "A", "", None).unwrap_err().to_string(),
            "Please select a cover image"
        );
        assert!(validate_new_novel(" ", "A", "", Some(cover.clone())).is_err());
        let form = validate_new_novel("T", "A", " ", Some(cover)).unwrap();
        assert!(form.description.is_none());
    }

    #[test]
    fn test_avatar_limit() {
        assert!(validate_avatar_size(MAX_AVATAR_BYTES).is_ok());
        assert!(validate_avatar_size(MAX_AVATAR_BYTES + 1).is_err());
    }

    #[test]
    fn test_profile_edit() {
        let none = ProfileEdit {
            username: "ada".into(),
            ..Default::default()
        };
        assert_eq!(
            validate_profile_edit("ada", &none),
            Err(ProfileEditError::NoChanges)
        );

        let rename = ProfileEdit {
            username: "ada_l".into(),
            ..Default::default()
        };
        let changes = validate_profile_edit("ada", &rename).unwrap();
        assert_eq!(changes.username.as_deref(), Some("ada_l"));

        let bad_password = ProfileEdit {
            new_password: "weak".into(),
            confirm_password: "weak2".into(),
            ..Default::default()
        };
        match validate_profile_edit("ada", &bad_password) {
            Err(ProfileEditError::Invalid(errors)) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
                assert_eq!(fields, vec!["current_password", "new_password", "confirm_password"]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
