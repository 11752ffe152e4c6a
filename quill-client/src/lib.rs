//! Клиентское ядро блога Quill.
//!
//! - `SessionStore` хранит текущего пользователя и сохраняет его между запусками;
//! - `ApiClient` ходит в REST API, подставляет токен и сам обрабатывает
//!   отклонённый токен (выход и переход на вход);
//! - `Optimistic`, `LikeToggle` и `CommentThread` показывают изменения до ответа
//!   сервера и откатывают их при ошибке.
//!
//! Презентационный слой подключается через `Navigator` и `SessionStorage`.
#![warn(missing_docs)]

mod api_client;
mod engagement;
mod envelope;
mod error;
mod http_client;
mod models;
mod navigation;
mod optimistic;
mod requests;
mod session;
mod storage;

/// Проверки полей форм.
pub mod validation;

pub use api_client::{ADMIN_DASHBOARD_LIMIT, ApiClient, Dashboard};
pub use engagement::{
    CommentThread, Engagement, EngagementApi, LikeToggle, PENDING_COMMENT_PREFIX,
};
pub use error::{AuthFailure, QuillClientError, QuillClientResult};
pub use http_client::HttpConfig;
pub use models::{
    AssistKind, AuthResponse, AuthorRef, AuthorSummary, Category, CategoryRef, Comment, CommentRef,
    CommentSummary, Credential, DashboardStats, DraftField, Identity, LikeState, Pagination, Post,
    PostPage, PostQuery, PostStatus, Role,
};
pub use navigation::{LOGIN_PATH, MemoryNavigator, Navigator, SIGNUP_PATH, is_auth_entry_point};
pub use optimistic::Optimistic;
pub use requests::{
    CategoryInput, EXCERPT_LEN, ImageUpload, NewAccount, PasswordChange, PostDraft, ProfileUpdate,
    parse_tags,
};
pub use session::{AuthApi, SessionAuth, SessionState, SessionStore};
pub use storage::{
    FileStorage, MemoryStorage, SessionStorage, StorageError, StorageOp, TOKEN_KEY, USER_KEY,
};
