//! Endpoint groups of the Novelly REST API
//!
//! Each group borrows the [`ApiClient`] and maps one backend controller.

use super::{json_body, ApiClient, ApiResult, FormPart, Method, RequestBody};
use crate::models::{
    AuthResponse, Chapter, ChapterDraft, ChapterId, Comment, CommentId, LibraryCheck,
    LibraryItem, LoginRequest, NewNovel, NewReview, Novel, NovelForm, NovelId, ProgressUpdate,
    ReadingProgress, RegisterRequest, Review, ReviewId, ReviewStats, User, UserId,
};
use serde_json::json;

/// Result of adding a novel to a library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// Backend answered 409
    AlreadyPresent,
}

pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthResponse> {
        self.client.post("/auth/register", request).await
    }

    pub async fn login(&self, request: &LoginRequest) -> ApiResult<AuthResponse> {
        self.client.post("/auth/login", request).await
    }

    pub async fn me(&self) -> ApiResult<User> {
        self.client.get("/auth/me").await
    }

    /// Token introspection, shape defined by the backend
    pub async fn inspect(&self) -> ApiResult<serde_json::Value> {
        self.client.get("/auth/inspect").await
    }
}

pub struct NovelsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> NovelsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ApiResult<Vec<Novel>> {
        self.search("").await
    }

    /// Blank queries list everything
    pub async fn search(&self, query: &str) -> ApiResult<Vec<Novel>> {
        let query = query.trim();
        let q = (!query.is_empty()).then(|| query.to_string());
        self.client.get_with_query("/novels", &[("q", q)]).await
    }

    pub async fn get(&self, novel_id: NovelId) -> ApiResult<Novel> {
        self.client.get(&format!("/novels/{}", novel_id)).await
    }

    pub async fn create(&self, novel: &NewNovel) -> ApiResult<Novel> {
        self.client.post("/novels", novel).await
    }

    pub async fn upload(&self, form: &NovelForm) -> ApiResult<Novel> {
        self.client
            .post_multipart("/novels/upload", novel_form_parts(form))
            .await
    }

    pub async fn update(&self, novel_id: NovelId, form: &NovelForm) -> ApiResult<Novel> {
        self.client
            .put_multipart(&format!("/novels/{}", novel_id), novel_form_parts(form))
            .await
    }

    pub async fn delete(&self, novel_id: NovelId) -> ApiResult<()> {
        self.client.delete(&format!("/novels/{}", novel_id)).await
    }
}

/// Multipart fields for the novel forms. Unset text fields are omitted.
pub fn novel_form_parts(form: &NovelForm) -> Vec<FormPart> {
    let mut parts = Vec::new();
    for (name, value) in [
        ("title", &form.title),
        ("author", &form.author),
        ("description", &form.description),
    ] {
        if let Some(value) = value {
            parts.push(FormPart::text(name, value.clone()));
        }
    }
    if let Some(cover) = &form.cover_image {
        parts.push(FormPart::file("coverImage", cover.clone()));
    }
    parts
}

pub struct ChaptersApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ChaptersApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, novel_id: NovelId) -> ApiResult<Vec<Chapter>> {
        self.client
            .get(&format!("/novels/{}/chapters", novel_id))
            .await
    }

    pub async fn by_number(&self, novel_id: NovelId, number: u32) -> ApiResult<Chapter> {
        self.client
            .get(&format!("/novels/{}/chapters/{}", novel_id, number))
            .await
    }

    pub async fn get(&self, chapter_id: ChapterId) -> ApiResult<Chapter> {
        self.client.get(&format!("/chapters/{}", chapter_id)).await
    }

    pub async fn create(&self, draft: &ChapterDraft) -> ApiResult<Chapter> {
        self.client
            .post(&format!("/novels/{}/chapters", draft.novel_id), draft)
            .await
    }

    pub async fn update(&self, chapter_id: ChapterId, draft: &ChapterDraft) -> ApiResult<Chapter> {
        self.client
            .put(
                &format!("/novels/{}/chapters/{}", draft.novel_id, chapter_id),
                draft,
            )
            .await
    }

    pub async fn delete(&self, novel_id: NovelId, chapter_id: ChapterId) -> ApiResult<()> {
        self.client
            .delete(&format!("/novels/{}/chapters/{}", novel_id, chapter_id))
            .await
    }
}

pub struct ProgressApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ProgressApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, user_id: UserId) -> ApiResult<Vec<ReadingProgress>> {
        self.client
            .get(&format!("/users/{}/progress", user_id))
            .await
    }

    /// `None` when the user never opened the novel (backend 404)
    pub async fn for_novel(
        &self,
        user_id: UserId,
        novel_id: NovelId,
    ) -> ApiResult<Option<ReadingProgress>> {
        match self
            .client
            .get::<ReadingProgress>(&format!("/users/{}/progress/{}", user_id, novel_id))
            .await
        {
            Ok(progress) => Ok(Some(progress)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn save(&self, user_id: UserId, update: &ProgressUpdate) -> ApiResult<()> {
        self.client
            .send_unit(
                Method::Post,
                &format!("/users/{}/progress", user_id),
                json_body(update)?,
            )
            .await
    }

    pub async fn delete(&self, user_id: UserId, novel_id: NovelId) -> ApiResult<()> {
        self.client
            .delete(&format!("/users/{}/progress/{}", user_id, novel_id))
            .await
    }
}

pub struct LibraryApi<'a> {
    client: &'a ApiClient,
}

impl<'a> LibraryApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, user_id: UserId) -> ApiResult<Vec<LibraryItem>> {
        self.client.get(&format!("/users/{}/library", user_id)).await
    }

    pub async fn add(&self, user_id: UserId, novel_id: NovelId) -> ApiResult<AddOutcome> {
        let result = self
            .client
            .send_unit(
                Method::Post,
                &format!("/users/{}/library/{}", user_id, novel_id),
                RequestBody::Empty,
            )
            .await;
        match result {
            Ok(()) => Ok(AddOutcome::Added),
            Err(e) if e.is_conflict() => Ok(AddOutcome::AlreadyPresent),
            Err(e) => Err(e),
        }
    }

    pub async fn remove(&self, user_id: UserId, novel_id: NovelId) -> ApiResult<()> {
        self.client
            .delete(&format!("/users/{}/library/{}", user_id, novel_id))
            .await
    }

    pub async fn contains(&self, user_id: UserId, novel_id: NovelId) -> ApiResult<bool> {
        let check: LibraryCheck = self
            .client
            .get(&format!("/users/{}/library/{}/check", user_id, novel_id))
            .await?;
        Ok(check.in_library)
    }
}

pub struct CommentsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> CommentsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, novel_id: NovelId) -> ApiResult<Vec<Comment>> {
        self.client
            .get(&format!("/novels/{}/comments", novel_id))
            .await
    }

    pub async fn add(&self, novel_id: NovelId, content: &str) -> ApiResult<Comment> {
        self.client
            .post(
                &format!("/novels/{}/comments", novel_id),
                &json!({ "content": content }),
            )
            .await
    }

    pub async fn update(&self, comment_id: CommentId, content: &str) -> ApiResult<Comment> {
        self.client
            .put(
                &format!("/comments/{}", comment_id),
                &json!({ "content": content }),
            )
            .await
    }

    pub async fn delete(&self, comment_id: CommentId) -> ApiResult<()> {
        self.client.delete(&format!("/comments/{}", comment_id)).await
    }
}

pub struct ReviewsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ReviewsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, novel_id: NovelId) -> ApiResult<Vec<Review>> {
        self.client
            .get(&format!("/reviews/novel/{}", novel_id))
            .await
    }

    pub async fn stats(&self, novel_id: NovelId) -> ApiResult<ReviewStats> {
        self.client
            .get(&format!("/reviews/novel/{}/stats", novel_id))
            .await
    }

    pub async fn add(&self, novel_id: NovelId, review: &NewReview) -> ApiResult<Review> {
        self.client
            .post(&format!("/reviews/novel/{}", novel_id), review)
            .await
    }

    pub async fn delete(&self, review_id: ReviewId) -> ApiResult<()> {
        self.client.delete(&format!("/reviews/{}", review_id)).await
    }
}

pub struct UsersApi<'a> {
    client: &'a ApiClient,
}

impl<'a> UsersApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ApiResult<Vec<User>> {
        self.client.get("/users").await
    }

    pub async fn get(&self, user_id: UserId) -> ApiResult<User> {
        self.client.get(&format!("/users/{}", user_id)).await
    }
}

#[cfg(all(test, feature = "native"))]
mod tests {
    use super::super::mock::MockTransport;
    use super::super::PartValue;
    use super::*;
    use crate::models::FileUpload;
    use crate::store::Store;
    use std::rc::Rc;

    fn setup() -> (Rc<MockTransport>, ApiClient) {
        let mock = Rc::new(MockTransport::new());
        let client = ApiClient::new("/api", mock.clone(), Rc::new(Store::in_memory()));
        (mock, client)
    }

    #[tokio::test]
    async fn test_search_trims_and_skips_blank_query() {
        let (mock, client) = setup();
        mock.push_json(200, json!([]));
        mock.push_json(200, json!([{"novelId": 1, "title": "Dune"}]));

        assert!(client.novels().search("   ").await.unwrap().is_empty());
        let found = client.novels().search("  dune ").await.unwrap();
        assert_eq!(found[0].title, "Dune");

        let urls: Vec<String> = mock.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(urls, vec!["/api/novels", "/api/novels?q=dune"]);
    }

    #[tokio::test]
    async fn test_library_add_conflict_is_already_present() {
        let (mock, client) = setup();
        mock.push_text(200, "Novel added to library");
        mock.push_text(409, "Novel already in library");
        mock.push_text(403, "You can only modify your own library");

        assert_eq!(client.library().add(1, 2).await.unwrap(), AddOutcome::Added);
        assert_eq!(
            client.library().add(1, 2).await.unwrap(),
            AddOutcome::AlreadyPresent
        );
        let err = client.library().add(1, 2).await.unwrap_err();
        assert_eq!(err.to_string(), "You can only modify your own library");
        assert_eq!(mock.last_request().url, "/api/users/1/library/2");
    }

    #[tokio::test]
    async fn test_progress_for_novel_missing_is_none() {
        let (mock, client) = setup();
        mock.push_text(404, "No reading progress found for this novel");
        assert!(client.progress().for_novel(3, 4).await.unwrap().is_none());

        mock.push_json(
            200,
            json!({"progressId": 1, "chapter": {"chapterId": 9, "chapterNumber": 2}}),
        );
        let progress = client.progress().for_novel(3, 4).await.unwrap().unwrap();
        assert_eq!(progress.chapter.unwrap().chapter_number, 2);
    }

    #[tokio::test]
    async fn test_chapter_paths() {
        let (mock, client) = setup();
        let draft = ChapterDraft {
            novel_id: 5,
            chapter_number: 1,
            title: "Chapter 1".into(),
            content: "x".repeat(120),
        };
        mock.push_json(200, json!({"chapterId": 10, "novelId": 5, "chapterNumber": 1}));
        mock.push_json(200, json!({"chapterId": 10, "novelId": 5, "chapterNumber": 1}));
        mock.push_empty(204);

        client.chapters().create(&draft).await.unwrap();
        client.chapters().update(10, &draft).await.unwrap();
        client.chapters().delete(5, 10).await.unwrap();

        let sent: Vec<(Method, String)> = mock
            .requests()
            .into_iter()
            .map(|r| (r.method, r.url))
            .collect();
        assert_eq!(
            sent,
            vec![
                (Method::Post, "/api/novels/5/chapters".to_string()),
                (Method::Put, "/api/novels/5/chapters/10".to_string()),
                (Method::Delete, "/api/novels/5/chapters/10".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_library_check_and_review_stats() {
        let (mock, client) = setup();
        mock.push_json(200, json!({"inLibrary": true}));
        mock.push_json(200, json!({"averageRating": 4.5, "reviewCount": 2}));

        assert!(client.library().contains(1, 2).await.unwrap());
        let stats = client.reviews().stats(2).await.unwrap();
        assert_eq!(stats.review_count, 2);
        assert!((stats.average_rating - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_novel_form_parts() {
        let form = NovelForm {
            title: Some("T".into()),
            author: None,
            description: Some("D".into()),
            cover_image: Some(FileUpload {
                file_name: "c.png".into(),
                content_type: "image/png".into(),
                bytes: vec![1, 2],
            }),
        };
        let parts = novel_form_parts(&form);
        let names: Vec<&str> = parts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["title", "description", "coverImage"]);
        assert!(matches!(parts[2].value, PartValue::File(_)));
    }

    #[tokio::test]
    async fn test_comment_body() {
        let (mock, client) = setup();
        mock.push_json(
            200,
            json!({"commentId": 1, "username": "ada", "content": "Great"}),
        );
        let comment = client.comments().add(8, "Great").await.unwrap();
        assert_eq!(comment.username, "ada");
        assert_eq!(
            mock.last_request().body,
            RequestBody::Json(json!({"content": "Great"}))
        );
    }
}
