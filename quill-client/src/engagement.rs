//! Лайки и комментарии с оптимистичным отображением.
//!
//! Анонимный пользователь отправляется на страницу входа, локальное состояние
//! при этом не меняется и запрос не уходит.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::error::QuillClientResult;
use crate::models::{AuthorRef, AuthorSummary, Comment, Identity, LikeState, Post};
use crate::navigation::{LOGIN_PATH, Navigator};
use crate::optimistic::Optimistic;
use crate::requests::validate_comment;
use crate::session::SessionStore;

/// Префикс идентификатора комментария, который ещё не подтвердил сервер.
pub const PENDING_COMMENT_PREFIX: &str = "pending-";

/// Запросы, которые меняют вовлечённость пользователя в пост.
#[async_trait]
pub trait EngagementApi: Send + Sync {
    /// Переключает лайк.
    async fn toggle_engagement(&self, post_id: &str) -> QuillClientResult<()>;

    /// Публикует комментарий.
    async fn post_comment(&self, post_id: &str, content: &str) -> QuillClientResult<Comment>;
}

#[derive(Debug, Clone, PartialEq)]
/// Итог действия, требующего входа.
pub enum Engagement<T> {
    /// Действие выполнено, значение после него.
    Applied(T),
    /// Пользователь не вошёл и отправлен на вход.
    LoginRequired,
}

fn redirect_anonymous(session: &SessionStore, navigator: &dyn Navigator) -> Option<Identity> {
    let identity = session.identity();
    if identity.is_none() {
        navigator.navigate(LOGIN_PATH);
    }
    identity
}

/// Лайк одного поста.
pub struct LikeToggle {
    post_id: String,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
    state: Optimistic<LikeState>,
}

impl LikeToggle {
    /// Начальное состояние берётся из поста для текущего пользователя.
    pub fn new(post: &Post, session: SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        let state = Optimistic::new(post.like_state(session.identity().as_ref()));
        Self {
            post_id: post.id.clone(),
            session,
            navigator,
            state,
        }
    }

    /// Текущее отображаемое состояние.
    pub fn state(&self) -> LikeState {
        self.state.get()
    }

    /// Переключает лайк: сразу локально, затем на сервере. Ошибка откатывает
    /// состояние к снимку этого вызова.
    pub async fn toggle<A>(&self, api: &A) -> QuillClientResult<Engagement<LikeState>>
    where
        A: EngagementApi + ?Sized,
    {
        if redirect_anonymous(&self.session, self.navigator.as_ref()).is_none() {
            info!(post_id = %self.post_id, "like requires login, redirecting");
            return Ok(Engagement::LoginRequired);
        }

        let next = self.state.get().toggled();
        self.state
            .commit(next, api.toggle_engagement(&self.post_id))
            .await?;
        Ok(Engagement::Applied(self.state.get()))
    }
}

/// Комментарии одного поста, новые сверху.
pub struct CommentThread {
    post_id: String,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
    comments: Optimistic<Vec<Comment>>,
    pending_seq: AtomicU64,
}

impl CommentThread {
    /// Тред с уже загруженными комментариями.
    pub fn new(
        post_id: impl Into<String>,
        comments: Vec<Comment>,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            post_id: post_id.into(),
            session,
            navigator,
            comments: Optimistic::new(comments),
            pending_seq: AtomicU64::new(0),
        }
    }

    /// Текущий список.
    pub fn comments(&self) -> Vec<Comment> {
        self.comments.get()
    }

    /// Комментарий ещё не подтверждён сервером.
    pub fn is_pending(comment: &Comment) -> bool {
        comment.id.starts_with(PENDING_COMMENT_PREFIX)
    }

    /// Публикует комментарий. До ответа сервера в списке стоит черновик,
    /// после успеха он заменяется ответом, после ошибки список откатывается.
    pub async fn post<A>(&self, api: &A, content: &str) -> QuillClientResult<Engagement<Comment>>
    where
        A: EngagementApi + ?Sized,
    {
        let Some(identity) = redirect_anonymous(&self.session, self.navigator.as_ref()) else {
            info!(post_id = %self.post_id, "comment requires login, redirecting");
            return Ok(Engagement::LoginRequired);
        };
        let content = validate_comment(content)?;

        let placeholder = self.placeholder(&identity, &content);
        let placeholder_id = placeholder.id.clone();
        let comment = self
            .comments
            .commit_with(
                |current| {
                    let mut next = Vec::with_capacity(current.len() + 1);
                    next.push(placeholder);
                    next.extend(current.iter().cloned());
                    next
                },
                api.post_comment(&self.post_id, &content),
            )
            .await?;

        self.comments.update(|list| {
            match list.iter().position(|entry| entry.id == placeholder_id) {
                Some(index) => list[index] = comment.clone(),
                None => list.insert(0, comment.clone()),
            }
        });
        Ok(Engagement::Applied(comment))
    }

    fn placeholder(&self, identity: &Identity, content: &str) -> Comment {
        let seq = self.pending_seq.fetch_add(1, Ordering::Relaxed);
        Comment {
            id: format!("{PENDING_COMMENT_PREFIX}{seq}"),
            content: content.to_string(),
            author: Some(AuthorRef::Profile(AuthorSummary {
                id: identity.id.clone(),
                username: Some(identity.username.clone()),
                profile_pic: identity.profile_pic.clone(),
            })),
            created_at: Some(Utc::now()),
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tokio::sync::Notify;

    use super::*;
    use crate::error::QuillClientError;
    use crate::models::{AuthResponse, Credential, Role};
    use crate::navigation::MemoryNavigator;
    use crate::requests::NewAccount;
    use crate::session::AuthApi;
    use crate::storage::{MemoryStorage, SessionStorage};

    #[derive(Default)]
    struct FakeEngagementApi {
        fail: bool,
        calls: Mutex<Vec<String>>,
        gate: Option<Arc<Notify>>,
    }

    impl FakeEngagementApi {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("calls mutex poisoned").clone()
        }

        async fn answer(&self, call: String) -> QuillClientResult<()> {
            self.calls.lock().expect("calls mutex poisoned").push(call);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail {
                return Err(QuillClientError::Server {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl EngagementApi for FakeEngagementApi {
        async fn toggle_engagement(&self, post_id: &str) -> QuillClientResult<()> {
            self.answer(format!("like {post_id}")).await
        }

        async fn post_comment(&self, post_id: &str, content: &str) -> QuillClientResult<Comment> {
            self.answer(format!("comment {post_id}")).await?;
            Ok(Comment {
                id: "c-server".to_string(),
                content: content.to_string(),
                author: Some(AuthorRef::Id("u1".to_string())),
                created_at: Some(Utc::now()),
                updated_at: None,
            })
        }
    }

    struct StaticAuth;

    #[async_trait]
    impl AuthApi for StaticAuth {
        async fn authenticate(&self, _: &str, _: &str) -> QuillClientResult<AuthResponse> {
            Ok(AuthResponse {
                credential: Credential::new("token").expect("token"),
                identity: identity(),
            })
        }

        async fn create_identity(&self, _: &NewAccount) -> QuillClientResult<AuthResponse> {
            self.authenticate("", "").await
        }

        async fn invalidate_session(&self) -> QuillClientResult<()> {
            Ok(())
        }
    }

    fn identity() -> Identity {
        Identity {
            id: "u1".to_string(),
            username: "reader".to_string(),
            email: "user@example.com".to_string(),
            role: Role::Standard,
            profile_pic: None,
            bio: None,
            created_at: Some(Utc::now()),
        }
    }

    fn post(likes: &[&str]) -> Post {
        serde_json::from_value(serde_json::json!({
            "_id": "p1",
            "title": "Hello",
            "likes": likes,
            "createdAt": "2025-12-04T10:00:00Z"
        }))
        .expect("post must parse")
    }

    async fn signed_in() -> SessionStore {
        let storage: Arc<dyn SessionStorage> = Arc::new(MemoryStorage::new());
        let session = SessionStore::new(storage);
        session
            .login(&StaticAuth, "user@example.com", "secret1")
            .await
            .expect("login must succeed");
        session
    }

    fn anonymous() -> SessionStore {
        let storage: Arc<dyn SessionStorage> = Arc::new(MemoryStorage::new());
        let session = SessionStore::new(storage);
        session.restore();
        session
    }

    #[tokio::test]
    async fn anonymous_like_redirects_without_change() {
        let navigator = Arc::new(MemoryNavigator::new("/post/p1"));
        let api = FakeEngagementApi::default();
        let toggle = LikeToggle::new(&post(&["x"]), anonymous(), navigator.clone());

        let outcome = toggle.toggle(&api).await.expect("toggle must not fail");

        assert_eq!(outcome, Engagement::LoginRequired);
        assert!(navigator.visited(LOGIN_PATH));
        assert!(api.calls().is_empty());
        assert_eq!(toggle.state(), LikeState { liked: false, count: 1 });
    }

    #[tokio::test]
    async fn like_is_visible_before_server_answers() {
        let gate = Arc::new(Notify::new());
        let api = FakeEngagementApi {
            gate: Some(gate.clone()),
            ..FakeEngagementApi::default()
        };
        let navigator = Arc::new(MemoryNavigator::new("/post/p1"));
        let toggle = LikeToggle::new(&post(&[]), signed_in().await, navigator);

        let observe = async {
            tokio::task::yield_now().await;
            let seen = toggle.state();
            gate.notify_one();
            seen
        };
        let (outcome, seen) = tokio::join!(toggle.toggle(&api), observe);

        assert_eq!(seen, LikeState { liked: true, count: 1 });
        assert_eq!(
            outcome.expect("toggle must succeed"),
            Engagement::Applied(LikeState { liked: true, count: 1 })
        );
        assert_eq!(api.calls(), vec!["like p1".to_string()]);
    }

    #[tokio::test]
    async fn failed_unlike_restores_previous_state() {
        let api = FakeEngagementApi::failing();
        let navigator = Arc::new(MemoryNavigator::new("/post/p1"));
        let toggle = LikeToggle::new(&post(&["u1", "u2"]), signed_in().await, navigator);
        assert_eq!(toggle.state(), LikeState { liked: true, count: 2 });

        let err = toggle.toggle(&api).await.expect_err("toggle must fail");

        assert!(matches!(err, QuillClientError::Server { status: 500, .. }));
        assert_eq!(toggle.state(), LikeState { liked: true, count: 2 });
    }

    #[tokio::test]
    async fn comment_placeholder_is_replaced_by_server_copy() {
        let api = FakeEngagementApi::default();
        let navigator = Arc::new(MemoryNavigator::new("/post/p1"));
        let thread = CommentThread::new("p1", Vec::new(), signed_in().await, navigator);

        let outcome = thread
            .post(&api, "  Nice post  ")
            .await
            .expect("comment must succeed");

        let Engagement::Applied(comment) = outcome else {
            panic!("expected applied comment");
        };
        assert_eq!(comment.id, "c-server");
        assert_eq!(comment.content, "Nice post");
        let comments = thread.comments();
        assert_eq!(comments.len(), 1);
        assert!(!CommentThread::is_pending(&comments[0]));
    }

    #[tokio::test]
    async fn failed_comment_is_rolled_back() {
        let api = FakeEngagementApi::failing();
        let navigator = Arc::new(MemoryNavigator::new("/post/p1"));
        let thread = CommentThread::new("p1", Vec::new(), signed_in().await, navigator);

        assert!(thread.post(&api, "Nice post").await.is_err());
        assert!(thread.comments().is_empty());
    }

    #[tokio::test]
    async fn empty_comment_is_rejected_before_request() {
        let api = FakeEngagementApi::default();
        let navigator = Arc::new(MemoryNavigator::new("/post/p1"));
        let thread = CommentThread::new("p1", Vec::new(), signed_in().await, navigator);

        let err = thread.post(&api, "   ").await.expect_err("must fail");
        assert!(matches!(err, QuillClientError::Validation(_)));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn anonymous_comment_redirects() {
        let api = FakeEngagementApi::default();
        let navigator = Arc::new(MemoryNavigator::new("/post/p1"));
        let thread = CommentThread::new("p1", Vec::new(), anonymous(), navigator.clone());

        let outcome = thread.post(&api, "hi").await.expect("must not fail");
        assert_eq!(outcome, Engagement::LoginRequired);
        assert!(navigator.visited(LOGIN_PATH));
        assert!(api.calls().is_empty());
    }
}
