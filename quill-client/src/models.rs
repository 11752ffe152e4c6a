use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Роль пользователя.
pub enum Role {
    /// Обычный пользователь.
    #[default]
    #[serde(rename = "user", alias = "standard")]
    Standard,
    /// Администратор.
    #[serde(rename = "admin")]
    Admin,
    /// Любое другое значение с сервера. Никогда не даёт прав администратора.
    #[serde(other, rename = "other")]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Профиль вошедшего пользователя.
pub struct Identity {
    /// Идентификатор пользователя.
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Логин.
    pub username: String,
    /// Email.
    pub email: String,
    /// Роль.
    #[serde(default)]
    pub role: Role,
    /// URL аватара.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
    /// О себе.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Дата и время регистрации (UTC). Ответ входа может прийти без неё.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Identity {
    /// `true` для администратора.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Bearer-токен сессии.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Оборачивает сырой токен. Пустая строка токеном не считается.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let token = raw.trim();
        if token.is_empty() {
            return None;
        }
        Some(Self(token.to_string()))
    }

    /// Значение для заголовка `Authorization: Bearer ...`.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Debug, Clone)]
/// Ответ после успешного входа или регистрации.
pub struct AuthResponse {
    /// Выданный токен.
    pub credential: Credential,
    /// Данные пользователя.
    pub identity: Identity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Краткие данные автора, которые сервер подставляет в посты и комментарии.
pub struct AuthorSummary {
    /// Идентификатор автора.
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Логин автора.
    #[serde(default)]
    pub username: Option<String>,
    /// URL аватара.
    #[serde(default, rename = "profilePic")]
    pub profile_pic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
/// Ссылка на автора: развёрнутая (populate) или голый идентификатор.
pub enum AuthorRef {
    /// Развёрнутая ссылка.
    Profile(AuthorSummary),
    /// Только идентификатор.
    Id(String),
}

impl AuthorRef {
    /// Идентификатор автора.
    pub fn id(&self) -> &str {
        match self {
            Self::Profile(author) => &author.id,
            Self::Id(id) => id,
        }
    }

    /// Логин автора, если сервер его прислал.
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Profile(author) => author.username.as_deref(),
            Self::Id(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Категория постов.
pub struct Category {
    /// Идентификатор категории.
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Название.
    pub name: String,
    /// Описание.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Slug для URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
/// Ссылка на категорию: развёрнутая или голый идентификатор.
pub enum CategoryRef {
    /// Развёрнутая категория.
    Full(Category),
    /// Только идентификатор.
    Id(String),
}

impl CategoryRef {
    /// Идентификатор категории.
    pub fn id(&self) -> &str {
        match self {
            Self::Full(category) => &category.id,
            Self::Id(id) => id,
        }
    }

    /// Название категории, если оно известно.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Full(category) => Some(&category.name),
            Self::Id(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Развёрнутая запись комментария внутри поста: нужен только идентификатор.
pub struct CommentSummary {
    /// Идентификатор комментария.
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
/// Ссылка на комментарий в посте: развёрнутая или голый идентификатор.
pub enum CommentRef {
    /// Развёрнутая запись.
    Entry(CommentSummary),
    /// Только идентификатор.
    Id(String),
}

impl CommentRef {
    /// Идентификатор комментария.
    pub fn id(&self) -> &str {
        match self {
            Self::Entry(entry) => &entry.id,
            Self::Id(id) => id,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Статус публикации поста.
pub enum PostStatus {
    /// Черновик.
    Draft,
    /// Опубликован.
    #[default]
    Published,
    /// Любой другой статус.
    #[serde(other)]
    Other,
}

impl PostStatus {
    /// Значение для формы/запроса.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Публичная модель поста.
pub struct Post {
    /// Идентификатор поста.
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Заголовок.
    pub title: String,
    /// Содержимое.
    #[serde(default)]
    pub content: String,
    /// Краткое описание.
    #[serde(default)]
    pub excerpt: Option<String>,
    /// Автор.
    #[serde(default)]
    pub author: Option<AuthorRef>,
    /// Категория.
    #[serde(default)]
    pub category: Option<CategoryRef>,
    /// Теги.
    #[serde(default)]
    pub tags: Vec<String>,
    /// URL изображений.
    #[serde(default)]
    pub images: Vec<String>,
    /// URL обложки.
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Идентификаторы пользователей, поставивших лайк.
    #[serde(default)]
    pub likes: Vec<String>,
    /// Комментарии поста: идентификаторы или развёрнутые записи.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<CommentRef>,
    /// Количество комментариев, если сервер прислал только число.
    #[serde(default)]
    pub comments_count: u64,
    /// Количество просмотров.
    #[serde(default)]
    pub views: u64,
    /// Статус публикации.
    #[serde(default)]
    pub status: PostStatus,
    /// Дата и время создания (UTC).
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Дата и время последнего обновления (UTC).
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Состояние лайка с точки зрения `viewer`.
    pub fn like_state(&self, viewer: Option<&Identity>) -> LikeState {
        let liked = viewer.is_some_and(|viewer| self.likes.iter().any(|id| *id == viewer.id));
        LikeState {
            liked,
            count: self.likes.len() as u64,
        }
    }

    /// Может ли `actor` редактировать и удалять пост: автор или администратор.
    pub fn can_be_managed_by(&self, actor: &Identity) -> bool {
        actor.is_admin()
            || self
                .author
                .as_ref()
                .is_some_and(|author| author.id() == actor.id)
    }

    /// Число комментариев: длина списка `comments`, иначе `commentsCount`.
    pub fn comment_count(&self) -> u64 {
        if self.comments.is_empty() {
            self.comments_count
        } else {
            self.comments.len() as u64
        }
    }

    /// Обложка: `thumbnail` или первое изображение.
    pub fn display_image(&self) -> Option<&str> {
        self.thumbnail
            .as_deref()
            .or_else(|| self.images.first().map(String::as_str))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Локальное отображение лайка: отмечен ли и сколько всего.
pub struct LikeState {
    /// Текущий пользователь поставил лайк.
    pub liked: bool,
    /// Всего лайков.
    pub count: u64,
}

impl LikeState {
    /// Состояние после переключения лайка.
    pub fn toggled(self) -> Self {
        if self.liked {
            Self {
                liked: false,
                count: self.count.saturating_sub(1),
            }
        } else {
            Self {
                liked: true,
                count: self.count.saturating_add(1),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Комментарий к посту.
pub struct Comment {
    /// Идентификатор комментария.
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Текст.
    pub content: String,
    /// Автор.
    #[serde(default)]
    pub author: Option<AuthorRef>,
    /// Дата и время создания (UTC).
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Дата и время последнего изменения (UTC).
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Параметры пагинации из ответа сервера.
pub struct Pagination {
    /// Номер текущей страницы (с 1).
    #[serde(default = "first_page")]
    pub current_page: u32,
    /// Всего страниц.
    #[serde(default = "first_page")]
    pub total_pages: u32,
    /// Всего постов.
    #[serde(default, alias = "total")]
    pub total_posts: u64,
}

fn first_page() -> u32 {
    1
}

impl Pagination {
    /// Пагинация для ответа без метаданных: одна страница.
    pub fn single_page(total: usize) -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            total_posts: total as u64,
        }
    }

    /// Есть ли следующая страница.
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Страница постов.
pub struct PostPage {
    /// Посты текущей страницы.
    pub posts: Vec<Post>,
    /// Пагинация.
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Фильтры и пагинация списка постов.
pub struct PostQuery {
    /// Номер страницы (с 1).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Размер страницы.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Поисковая строка.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Идентификатор категории.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Статус. Пустая строка просит сервер вернуть посты с любым статусом.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl PostQuery {
    /// Страница `page` без фильтров.
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page.max(1)),
            ..Self::default()
        }
    }

    /// Добавляет поиск; пустая строка фильтр не включает.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        let search = search.trim();
        self.search = (!search.is_empty()).then(|| search.to_string());
        self
    }

    /// Добавляет фильтр по категории.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Вид AI-подсказки для черновика.
pub enum AssistKind {
    /// Придумать заголовок.
    GenerateTitle,
    /// Улучшить текст.
    Improve,
    /// Расширить текст.
    Expand,
    /// Продолжить текст.
    Continue,
    /// Упростить текст.
    Simplify,
    /// Сгенерировать краткое описание.
    GenerateExcerpt,
    /// Предложить теги.
    SuggestTags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Поле черновика, к которому применяется подсказка.
pub enum DraftField {
    /// Заголовок.
    Title,
    /// Содержимое.
    Content,
    /// Краткое описание.
    Excerpt,
    /// Теги (через запятую).
    Tags,
}

impl AssistKind {
    /// Поле черновика, которое заменяет результат подсказки.
    pub fn target(self) -> DraftField {
        match self {
            Self::GenerateTitle => DraftField::Title,
            Self::Improve | Self::Expand | Self::Continue | Self::Simplify => DraftField::Content,
            Self::GenerateExcerpt => DraftField::Excerpt,
            Self::SuggestTags => DraftField::Tags,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
/// Сводка для панели управления.
pub struct DashboardStats {
    /// Всего постов.
    pub total_posts: usize,
    /// Опубликовано.
    pub published_posts: usize,
    /// Черновиков.
    pub draft_posts: usize,
    /// Категорий.
    pub total_categories: usize,
}

impl DashboardStats {
    /// Считает сводку по уже загруженным постам и категориям.
    pub fn collect(posts: &[Post], categories: &[Category]) -> Self {
        Self {
            total_posts: posts.len(),
            published_posts: posts
                .iter()
                .filter(|post| post.status == PostStatus::Published)
                .count(),
            draft_posts: posts
                .iter()
                .filter(|post| post.status == PostStatus::Draft)
                .count(),
            total_categories: categories.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(id: &str, role: Role) -> Identity {
        Identity {
            id: id.to_string(),
            username: "reader".to_string(),
            email: "reader@example.com".to_string(),
            role,
            profile_pic: None,
            bio: None,
            created_at: Some(Utc::now()),
        }
    }

    #[test]
    fn identity_accepts_mongo_style_payload() {
        let raw = r#"{"_id":"u1","username":"u","email":"u@example.com","role":"admin","profilePic":"https://img/u.png","createdAt":"2025-12-04T10:00:00Z"}"#;
        let parsed: Identity = serde_json::from_str(raw).expect("identity must parse");
        assert_eq!(parsed.id, "u1");
        assert!(parsed.is_admin());
        assert_eq!(parsed.profile_pic.as_deref(), Some("https://img/u.png"));
    }

    #[test]
    fn unknown_role_is_not_admin() {
        let raw = r#"{"id":"u2","username":"u","email":"u@example.com","role":"moderator","createdAt":"2025-12-04T10:00:00Z"}"#;
        let parsed: Identity = serde_json::from_str(raw).expect("identity must parse");
        assert_eq!(parsed.role, Role::Other);
        assert!(!parsed.is_admin());
    }

    #[test]
    fn missing_role_defaults_to_standard() {
        let raw = r#"{"id":"u3","username":"u","email":"u@example.com","createdAt":"2025-12-04T10:00:00Z"}"#;
        let parsed: Identity = serde_json::from_str(raw).expect("identity must parse");
        assert_eq!(parsed.role, Role::Standard);
    }

    #[test]
    fn credential_debug_is_redacted() {
        let credential = Credential::new("secret.jwt.value").expect("non-empty token");
        assert_eq!(format!("{credential:?}"), "Credential(***)");
        assert!(Credential::new("   ").is_none());
    }

    #[test]
    fn post_tolerates_populated_and_bare_references() {
        let populated = r#"{"_id":"p1","title":"t","content":"c","author":{"_id":"u1","username":"ann"},"category":{"_id":"c1","name":"Rust"},"likes":["u2"],"createdAt":"2025-12-04T10:00:00Z"}"#;
        let bare = r#"{"_id":"p2","title":"t","author":"u1","category":"c1","createdAt":"2025-12-04T10:00:00Z"}"#;

        let populated: Post = serde_json::from_str(populated).expect("post must parse");
        let bare: Post = serde_json::from_str(bare).expect("post must parse");

        assert_eq!(populated.author.as_ref().map(AuthorRef::id), Some("u1"));
        assert_eq!(populated.author.as_ref().and_then(AuthorRef::username), Some("ann"));
        assert_eq!(populated.category.as_ref().and_then(CategoryRef::name), Some("Rust"));
        assert_eq!(bare.author.as_ref().map(AuthorRef::id), Some("u1"));
        assert_eq!(bare.category.as_ref().map(CategoryRef::id), Some("c1"));
        assert_eq!(bare.status, PostStatus::Published);
    }

    #[test]
    fn like_state_reflects_viewer() {
        let raw = r#"{"_id":"p1","title":"t","likes":["u1","u2"],"createdAt":"2025-12-04T10:00:00Z"}"#;
        let post: Post = serde_json::from_str(raw).expect("post must parse");

        let viewer = identity("u2", Role::Standard);
        assert_eq!(
            post.like_state(Some(&viewer)),
            LikeState {
                liked: true,
                count: 2
            }
        );
        assert!(!post.like_state(None).liked);
    }

    #[test]
    fn like_state_toggle_never_underflows() {
        let state = LikeState {
            liked: true,
            count: 0,
        };
        assert_eq!(state.toggled().count, 0);
        assert_eq!(LikeState::default().toggled().count, 1);
    }

    #[test]
    fn management_is_limited_to_author_or_admin() {
        let raw = r#"{"_id":"p1","title":"t","author":"u1","createdAt":"2025-12-04T10:00:00Z"}"#;
        let post: Post = serde_json::from_str(raw).expect("post must parse");

        assert!(post.can_be_managed_by(&identity("u1", Role::Standard)));
        assert!(post.can_be_managed_by(&identity("u9", Role::Admin)));
        assert!(!post.can_be_managed_by(&identity("u9", Role::Standard)));
    }

    #[test]
    fn assist_kinds_target_their_fields() {
        assert_eq!(AssistKind::GenerateTitle.target(), DraftField::Title);
        assert_eq!(AssistKind::Simplify.target(), DraftField::Content);
        assert_eq!(AssistKind::SuggestTags.target(), DraftField::Tags);
        let wire = serde_json::to_string(&AssistKind::GenerateExcerpt).expect("serialize");
        assert_eq!(wire, r#""generate-excerpt""#);
    }

    #[test]
    fn dashboard_stats_count_statuses() {
        let published = r#"{"_id":"p1","title":"a","status":"published","createdAt":"2025-12-04T10:00:00Z"}"#;
        let draft = r#"{"_id":"p2","title":"b","status":"draft","createdAt":"2025-12-04T10:00:00Z"}"#;
        let posts: Vec<Post> = [published, draft]
            .iter()
            .map(|raw| serde_json::from_str(raw).expect("post must parse"))
            .collect();

        let stats = DashboardStats::collect(&posts, &[]);
        assert_eq!(stats.total_posts, 2);
        assert_eq!(stats.published_posts, 1);
        assert_eq!(stats.draft_posts, 1);
        assert_eq!(stats.total_categories, 0);
    }

    #[test]
    fn slim_login_user_parses_without_timestamp() {
        let raw = r#"{"id":"u1","username":"u","email":"u@example.com","role":"user"}"#;
        let parsed: Identity = serde_json::from_str(raw).expect("identity must parse");
        assert_eq!(parsed.id, "u1");
        assert_eq!(parsed.role, Role::Standard);
        assert!(parsed.created_at.is_none());

        let persisted = serde_json::to_string(&parsed).expect("serialize");
        assert!(!persisted.contains("createdAt"));
    }

    #[test]
    fn comment_and_post_parse_without_timestamp() {
        let comment: Comment =
            serde_json::from_str(r#"{"_id":"c1","content":"hi"}"#).expect("comment must parse");
        assert_eq!(comment.content, "hi");
        assert!(comment.created_at.is_none());

        let post: Post =
            serde_json::from_str(r#"{"_id":"p1","title":"t"}"#).expect("post must parse");
        assert!(post.created_at.is_none());
    }

    #[test]
    fn comment_count_follows_comments_list() {
        let ids = r#"{"_id":"p1","title":"t","comments":["c1","c2","c3"]}"#;
        let populated = r#"{"_id":"p2","title":"t","comments":[{"_id":"c1","content":"a"},{"id":"c2"}],"commentsCount":7}"#;
        let counted = r#"{"_id":"p3","title":"t","commentsCount":4}"#;

        let ids: Post = serde_json::from_str(ids).expect("post must parse");
        let populated: Post = serde_json::from_str(populated).expect("post must parse");
        let counted: Post = serde_json::from_str(counted).expect("post must parse");

        assert_eq!(ids.comment_count(), 3);
        assert_eq!(populated.comment_count(), 2);
        assert_eq!(populated.comments[1].id(), "c2");
        assert_eq!(counted.comment_count(), 4);
    }
}
