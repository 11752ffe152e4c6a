//! Авторизованный API-клиент.
//!
//! Каждый запрос, кроме входа и регистрации, уходит с текущим токеном, если он
//! есть. Ответ 401 с причиной про токен приводит к принудительному выходу и
//! переходу на страницу входа; остальные ошибки возвращаются как есть.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::engagement::EngagementApi;
use crate::envelope;
use crate::error::{AuthFailure, QuillClientError, QuillClientResult};
use crate::http_client::{CallKind, HttpClient, HttpConfig, Payload, post_form, profile_form};
use crate::models::{
    AssistKind, AuthResponse, Category, Comment, Credential, DashboardStats, Identity, Post,
    PostPage, PostQuery,
};
use crate::navigation::{LOGIN_PATH, Navigator, is_auth_entry_point};
use crate::requests::{
    CategoryInput, NewAccount, PasswordChange, PostDraft, ProfileUpdate, validate_comment,
    validate_login,
};
use crate::session::{AuthApi, SessionStore};
use crate::validation::is_required;

/// Лимит выборки постов для панели администратора.
pub const ADMIN_DASHBOARD_LIMIT: u32 = 1000;

/// Собирает путь из сегментов, кодируя каждый сегмент целиком.
fn resource_path(segments: &[&str]) -> String {
    segments.iter().fold(String::new(), |mut path, segment| {
        path.push('/');
        path.push_str(&urlencoding::encode(segment));
        path
    })
}

#[derive(Debug, Serialize)]
struct LoginRequestDto<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthResponseDto {
    #[serde(alias = "access_token", alias = "accessToken")]
    token: String,
    user: Identity,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordChangeDto<'a> {
    current_password: &'a str,
    new_password: &'a str,
}

#[derive(Debug, Serialize)]
struct CommentDto<'a> {
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct AssistRequestDto<'a> {
    #[serde(rename = "type")]
    kind: AssistKind,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct AssistResponseDto {
    result: String,
}

#[derive(Debug, Serialize)]
struct IdeasRequestDto<'a> {
    category: &'a str,
    keywords: &'a str,
}

#[derive(Debug, Serialize)]
struct LimitQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
}

impl TryFrom<AuthResponseDto> for AuthResponse {
    type Error = QuillClientError;

    fn try_from(value: AuthResponseDto) -> Result<Self, Self::Error> {
        let credential = Credential::new(value.token).ok_or_else(|| QuillClientError::Server {
            status: 200,
            message: "server issued an empty token".to_string(),
        })?;
        Ok(Self {
            credential,
            identity: value.user,
        })
    }
}

#[derive(Debug, Clone)]
/// Данные панели управления.
pub struct Dashboard {
    /// Посты: все для администратора, свои для остальных.
    pub posts: Vec<Post>,
    /// Все категории.
    pub categories: Vec<Category>,
    /// Сводка.
    pub stats: DashboardStats,
}

#[derive(Clone)]
/// HTTP-клиент блога с подстановкой токена и общей политикой ошибок 401.
pub struct ApiClient {
    http: HttpClient,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("http", &self.http)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Создаёт клиент поверх общей сессии и навигации.
    pub fn new(
        config: &HttpConfig,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> QuillClientResult<Self> {
        Ok(Self {
            http: HttpClient::new(config)?,
            session,
            navigator,
        })
    }

    /// Сессия, с которой работает клиент.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Авторизованный запрос: подставляет токен и применяет политику 401.
    async fn call<Q, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        payload: Payload<'_, B>,
    ) -> QuillClientResult<Value>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let credential = self.session.credential();
        match &credential {
            Some(_) => debug!(%method, path, "attaching bearer credential"),
            None => debug!(%method, path, "no credential in session, sending anonymously"),
        }

        let request = self
            .http
            .request(method, path, query, payload, credential.as_ref());
        match self.http.execute(request, CallKind::Regular).await {
            Ok(body) => {
                if let Some(credential) = &credential {
                    self.session.mark_verified(credential);
                }
                Ok(body)
            }
            Err(err) => {
                if err.is_credential_rejected() {
                    self.force_logout();
                }
                Err(err)
            }
        }
    }

    async fn get(&self, path: &str) -> QuillClientResult<Value> {
        self.call::<(), Value>(Method::GET, path, None, Payload::Empty)
            .await
    }

    async fn get_with<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> QuillClientResult<Value> {
        self.call::<Q, Value>(Method::GET, path, Some(query), Payload::Empty)
            .await
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> QuillClientResult<Value> {
        self.call::<(), B>(method, path, None, Payload::Json(body))
            .await
    }

    async fn send_empty(&self, method: Method, path: &str) -> QuillClientResult<()> {
        self.call::<(), Value>(method, path, None, Payload::Empty)
            .await
            .map(|_| ())
    }

    fn force_logout(&self) {
        info!("credential rejected by server, forcing logout");
        self.session.expire();

        let current = self.navigator.current_path();
        if !is_auth_entry_point(&current) {
            self.navigator.navigate(LOGIN_PATH);
        }
    }

    /// Профиль текущего пользователя или переход на вход.
    fn require_identity(&self) -> QuillClientResult<Identity> {
        match self.session.identity() {
            Some(identity) => Ok(identity),
            None => {
                if !is_auth_entry_point(&self.navigator.current_path()) {
                    self.navigator.navigate(LOGIN_PATH);
                }
                Err(QuillClientError::auth(
                    AuthFailure::MissingCredential,
                    "login required",
                ))
            }
        }
    }

    async fn issue_identity<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> QuillClientResult<AuthResponse> {
        let request =
            self.http
                .request::<(), B>(Method::POST, path, None, Payload::Json(body), None);
        let body = self
            .http
            .execute(request, CallKind::IdentityIssuing)
            .await?;
        let dto: AuthResponseDto = envelope::unwrap(body, "data")?;
        dto.try_into()
    }

    /// Обновляет профиль и записывает новый профиль в сессию.
    pub async fn update_profile(&self, update: ProfileUpdate) -> QuillClientResult<Identity> {
        let update = update.validate()?;
        let form = profile_form(&update)?;
        let body = self
            .call::<(), Value>(Method::PUT, "/auth/profile", None, Payload::Multipart(form))
            .await?;
        let identity: Identity = envelope::unwrap(body, "user")?;
        self.session.update_identity(identity.clone())?;
        Ok(identity)
    }

    /// Меняет пароль.
    pub async fn change_password(&self, change: PasswordChange) -> QuillClientResult<()> {
        let change = change.validate()?;
        let payload = PasswordChangeDto {
            current_password: &change.current_password,
            new_password: &change.new_password,
        };
        self.send_json(Method::PUT, "/auth/change-password", &payload)
            .await
            .map(|_| ())
    }

    /// Страница постов с фильтрами.
    pub async fn list_posts(&self, query: &PostQuery) -> QuillClientResult<PostPage> {
        let body = self.get_with("/posts", query).await?;
        envelope::post_page(body)
    }

    /// Пост по идентификатору.
    pub async fn get_post(&self, id: &str) -> QuillClientResult<Post> {
        let body = self.get(&resource_path(&["posts", id])).await?;
        envelope::unwrap(body, "post")
    }

    /// Популярные посты.
    pub async fn trending_posts(&self, limit: Option<u32>) -> QuillClientResult<Vec<Post>> {
        let body = self
            .get_with("/posts/trending", &LimitQuery { limit })
            .await?;
        envelope::unwrap(body, "posts")
    }

    /// Посты автора.
    pub async fn posts_by_author(
        &self,
        author_id: &str,
        query: &PostQuery,
    ) -> QuillClientResult<PostPage> {
        let body = self
            .get_with(&resource_path(&["posts", "author", author_id]), query)
            .await?;
        envelope::post_page(body)
    }

    /// Похожие посты.
    pub async fn related_posts(&self, id: &str) -> QuillClientResult<Vec<Post>> {
        let body = self.get(&resource_path(&["posts", id, "related"])).await?;
        envelope::unwrap(body, "posts")
    }

    /// Создаёт пост.
    pub async fn create_post(&self, draft: PostDraft) -> QuillClientResult<Post> {
        let draft = draft.validate()?;
        let form = post_form(&draft)?;
        let body = self
            .call::<(), Value>(Method::POST, "/posts", None, Payload::Multipart(form))
            .await?;
        envelope::unwrap(body, "post")
    }

    /// Обновляет пост.
    pub async fn update_post(&self, id: &str, draft: PostDraft) -> QuillClientResult<Post> {
        let draft = draft.validate()?;
        let form = post_form(&draft)?;
        let body = self
            .call::<(), Value>(
                Method::PUT,
                &resource_path(&["posts", id]),
                None,
                Payload::Multipart(form),
            )
            .await?;
        envelope::unwrap(body, "post")
    }

    /// Удаляет пост.
    pub async fn delete_post(&self, id: &str) -> QuillClientResult<()> {
        self.send_empty(Method::DELETE, &resource_path(&["posts", id]))
            .await
    }

    /// Ставит или снимает лайк.
    pub async fn toggle_like(&self, id: &str) -> QuillClientResult<()> {
        self.send_empty(Method::POST, &resource_path(&["posts", id, "like"]))
            .await
    }

    /// Комментарии к посту.
    pub async fn comments_for_post(&self, post_id: &str) -> QuillClientResult<Vec<Comment>> {
        let body = self.get(&resource_path(&["comments", "post", post_id])).await?;
        envelope::unwrap(body, "comments")
    }

    /// Комментарии пользователя.
    pub async fn comments_by_user(&self, user_id: &str) -> QuillClientResult<Vec<Comment>> {
        let body = self.get(&resource_path(&["comments", "user", user_id])).await?;
        envelope::unwrap(body, "comments")
    }

    /// Комментарий по идентификатору.
    pub async fn get_comment(&self, id: &str) -> QuillClientResult<Comment> {
        let body = self.get(&resource_path(&["comments", id])).await?;
        envelope::unwrap(body, "comment")
    }

    /// Добавляет комментарий.
    pub async fn add_comment(&self, post_id: &str, content: &str) -> QuillClientResult<Comment> {
        let content = validate_comment(content)?;
        let body = self
            .send_json(
                Method::POST,
                &resource_path(&["comments", "post", post_id]),
                &CommentDto { content: &content },
            )
            .await?;
        envelope::unwrap(body, "comment")
    }

    /// Изменяет комментарий.
    pub async fn update_comment(&self, id: &str, content: &str) -> QuillClientResult<Comment> {
        let content = validate_comment(content)?;
        let body = self
            .send_json(
                Method::PUT,
                &resource_path(&["comments", id]),
                &CommentDto { content: &content },
            )
            .await?;
        envelope::unwrap(body, "comment")
    }

    /// Удаляет комментарий.
    pub async fn delete_comment(&self, id: &str) -> QuillClientResult<()> {
        self.send_empty(Method::DELETE, &resource_path(&["comments", id]))
            .await
    }

    /// Все категории.
    pub async fn categories(&self) -> QuillClientResult<Vec<Category>> {
        let body = self.get("/categories").await?;
        envelope::unwrap(body, "categories")
    }

    /// Создаёт категорию.
    pub async fn create_category(&self, input: &CategoryInput) -> QuillClientResult<Category> {
        let body = self
            .send_json(Method::POST, "/categories", input)
            .await?;
        envelope::unwrap(body, "category")
    }

    /// Изменяет категорию.
    pub async fn update_category(
        &self,
        id: &str,
        input: &CategoryInput,
    ) -> QuillClientResult<Category> {
        let body = self
            .send_json(Method::PUT, &resource_path(&["categories", id]), input)
            .await?;
        envelope::unwrap(body, "category")
    }

    /// Удаляет категорию.
    pub async fn delete_category(&self, id: &str) -> QuillClientResult<()> {
        self.send_empty(Method::DELETE, &resource_path(&["categories", id]))
            .await
    }

    /// AI-подсказка для черновика.
    pub async fn assist(&self, kind: AssistKind, input: &str) -> QuillClientResult<String> {
        if !is_required(input) {
            return Err(QuillClientError::validation(
                "input",
                "please enter some content first",
            ));
        }
        let body = self
            .send_json(Method::POST, "/ai/assist", &AssistRequestDto { kind, input })
            .await?;
        let response: AssistResponseDto = envelope::unwrap(body, "data")?;
        Ok(response.result)
    }

    /// Идеи для постов по категории и ключевым словам.
    pub async fn generate_ideas(
        &self,
        category: &str,
        keywords: &str,
    ) -> QuillClientResult<Vec<String>> {
        let body = self
            .send_json(
                Method::POST,
                "/ai/ideas",
                &IdeasRequestDto { category, keywords },
            )
            .await?;
        envelope::unwrap(body, "ideas")
    }

    /// Панель управления: администратор видит все посты, включая черновики,
    /// остальные только свои.
    pub async fn dashboard(&self) -> QuillClientResult<Dashboard> {
        let identity = self.require_identity()?;

        let page = if identity.is_admin() {
            let query = PostQuery {
                status: Some(String::new()),
                limit: Some(ADMIN_DASHBOARD_LIMIT),
                ..PostQuery::default()
            };
            self.list_posts(&query).await?
        } else {
            self.posts_by_author(&identity.id, &PostQuery::default())
                .await?
        };
        let categories = self.categories().await?;
        let stats = DashboardStats::collect(&page.posts, &categories);

        Ok(Dashboard {
            posts: page.posts,
            categories,
            stats,
        })
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn authenticate(&self, email: &str, password: &str) -> QuillClientResult<AuthResponse> {
        let email = validate_login(email, password)?;
        self.issue_identity(
            "/auth/login",
            &LoginRequestDto {
                email: &email,
                password,
            },
        )
        .await
    }

    async fn create_identity(&self, account: &NewAccount) -> QuillClientResult<AuthResponse> {
        let account = account.clone().validate()?;
        self.issue_identity("/auth/register", &account).await
    }

    /// Отзыв сессии идёт мимо политики 401: выход всё равно состоится.
    async fn invalidate_session(&self) -> QuillClientResult<()> {
        let credential = self.session.credential();
        let request = self.http.request::<(), Value>(
            Method::POST,
            "/auth/logout",
            None,
            Payload::Empty,
            credential.as_ref(),
        );
        self.http
            .execute(request, CallKind::Regular)
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl EngagementApi for ApiClient {
    async fn toggle_engagement(&self, post_id: &str) -> QuillClientResult<()> {
        self.toggle_like(post_id).await
    }

    async fn post_comment(&self, post_id: &str, content: &str) -> QuillClientResult<Comment> {
        self.add_comment(post_id, content).await
    }
}
