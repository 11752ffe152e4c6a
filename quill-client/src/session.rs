//! Хранилище сессии: кто вошёл, его права и сохранение между запусками.
//!
//! `SessionStore` создаётся один раз при старте и передаётся всем, кому нужна
//! сессия. Состояние живёт в `tokio::sync::watch`, подписчики получают каждое
//! изменение.
//!
//! Проверка токена ленивая: `restore` не ходит на сервер и поднимает сессию в
//! состоянии `verified = false`. Первый успешный авторизованный запрос
//! подтверждает её (`mark_verified`), первый ответ «токен недействителен»
//! сбрасывает (`expire`).

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::{AuthFailure, QuillClientError, QuillClientResult};
use crate::models::{AuthResponse, Credential, Identity};
use crate::requests::NewAccount;
use crate::storage::{SessionStorage, StorageError, StorageOp, TOKEN_KEY, USER_KEY};

/// Операции внешнего API, выдающие и отзывающие сессию.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Вход по email и паролю.
    async fn authenticate(&self, email: &str, password: &str) -> QuillClientResult<AuthResponse>;

    /// Регистрация нового пользователя.
    async fn create_identity(&self, account: &NewAccount) -> QuillClientResult<AuthResponse>;

    /// Отзыв сессии на сервере. Ошибка не мешает локальному выходу.
    async fn invalidate_session(&self) -> QuillClientResult<()>;
}

#[derive(Debug, Clone, PartialEq)]
/// Активная сессия: профиль и токен существуют только вместе.
pub struct SessionAuth {
    /// Профиль пользователя.
    pub identity: Identity,
    /// Токен.
    pub credential: Credential,
    /// Сервер уже принял этот токен в текущем процессе.
    pub verified: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Состояние сессии.
pub enum SessionState {
    /// `restore` ещё не выполнен: неизвестно, вошёл ли пользователь.
    #[default]
    Restoring,
    /// Пользователь не вошёл.
    Anonymous,
    /// Пользователь вошёл.
    Authenticated(SessionAuth),
}

impl SessionState {
    /// Восстановление завершено.
    pub fn is_restored(&self) -> bool {
        !matches!(self, Self::Restoring)
    }

    /// Есть профиль.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Профиль есть и его роль `admin`.
    pub fn is_admin(&self) -> bool {
        self.identity().is_some_and(Identity::is_admin)
    }

    /// Профиль вошедшего пользователя.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated(auth) => Some(&auth.identity),
            _ => None,
        }
    }

    /// Токен вошедшего пользователя.
    pub fn credential(&self) -> Option<&Credential> {
        match self {
            Self::Authenticated(auth) => Some(&auth.credential),
            _ => None,
        }
    }
}

struct SessionInner {
    storage: Arc<dyn SessionStorage>,
    state: watch::Sender<SessionState>,
}

#[derive(Clone)]
/// Единственный источник правды о текущем пользователе.
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Создаёт хранилище в состоянии [`SessionState::Restoring`].
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                storage,
                state: watch::Sender::new(SessionState::Restoring),
            }),
        }
    }

    /// Поднимает сессию из хранилища без обращения к серверу.
    ///
    /// Неполная или нечитаемая сохранённая сессия удаляется целиком.
    pub fn restore(&self) -> SessionState {
        let restored = match self.read_persisted() {
            Ok(Some(auth)) => SessionState::Authenticated(auth),
            Ok(None) => SessionState::Anonymous,
            Err(err) => {
                warn!(error = %err, "failed to read persisted session, starting anonymous");
                if let Err(err) = self.clear_persisted() {
                    warn!(error = %err, "failed to discard unreadable session");
                }
                SessionState::Anonymous
            }
        };
        self.inner.state.send_replace(restored.clone());
        restored
    }

    fn read_persisted(&self) -> Result<Option<SessionAuth>, StorageError> {
        let storage = &self.inner.storage;
        let credential = storage.load(TOKEN_KEY)?.and_then(Credential::new);
        let user = storage.load(USER_KEY)?;

        match (credential, user) {
            (None, None) => Ok(None),
            (Some(credential), Some(raw)) => match serde_json::from_str::<Identity>(&raw) {
                Ok(identity) => Ok(Some(SessionAuth {
                    identity,
                    credential,
                    verified: false,
                })),
                Err(err) => {
                    warn!(error = %err, "persisted identity is unreadable, clearing session");
                    self.clear_persisted()?;
                    Ok(None)
                }
            },
            _ => {
                warn!("persisted session is incomplete, clearing session");
                self.clear_persisted()?;
                Ok(None)
            }
        }
    }

    /// Вход. При успехе токен и профиль сохраняются одной пачкой.
    pub async fn login<A>(
        &self,
        api: &A,
        email: &str,
        password: &str,
    ) -> QuillClientResult<Identity>
    where
        A: AuthApi + ?Sized,
    {
        let response = api.authenticate(email, password).await?;
        self.establish(response)
    }

    /// Регистрация. Контракт тот же, что у [`SessionStore::login`].
    pub async fn register<A>(&self, api: &A, account: &NewAccount) -> QuillClientResult<Identity>
    where
        A: AuthApi + ?Sized,
    {
        let response = api.create_identity(account).await?;
        self.establish(response)
    }

    /// Выход. Локальная сессия очищается всегда, даже если сервер не ответил
    /// или хранилище не удалось перезаписать.
    pub async fn logout<A>(&self, api: &A) -> QuillClientResult<()>
    where
        A: AuthApi + ?Sized,
    {
        if self.is_authenticated() {
            if let Err(err) = api.invalidate_session().await {
                warn!(error = %err, "server-side logout failed, clearing local session anyway");
            }
        }
        if let Err(err) = self.clear() {
            warn!(error = %err, "failed to clear persisted session on logout");
        }
        info!("session closed");
        Ok(())
    }

    /// Заменяет профиль (после редактирования), токен не трогает.
    pub fn update_identity(&self, identity: Identity) -> QuillClientResult<()> {
        let current = self.inner.state.borrow().clone();
        let SessionState::Authenticated(auth) = current else {
            return Err(QuillClientError::auth(
                AuthFailure::MissingCredential,
                "no active session",
            ));
        };

        let raw = serde_json::to_string(&identity).map_err(StorageError::from)?;
        self.inner.storage.apply(&[StorageOp::Set(USER_KEY, raw)])?;
        self.inner
            .state
            .send_replace(SessionState::Authenticated(SessionAuth { identity, ..auth }));
        Ok(())
    }

    /// Принудительный выход: сервер отверг токен.
    pub fn expire(&self) {
        if let Err(err) = self.clear() {
            warn!(error = %err, "failed to clear persisted session on expiry");
        }
    }

    /// Отмечает восстановленную сессию как подтверждённую сервером.
    ///
    /// Ничего не делает, если за время запроса токен сменился.
    pub fn mark_verified(&self, credential: &Credential) {
        self.inner.state.send_if_modified(|state| match state {
            SessionState::Authenticated(auth)
                if !auth.verified && auth.credential == *credential =>
            {
                auth.verified = true;
                true
            }
            _ => false,
        });
    }

    /// Текущее состояние.
    pub fn snapshot(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Подписка на изменения состояния.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Профиль вошедшего пользователя.
    pub fn identity(&self) -> Option<Identity> {
        self.inner.state.borrow().identity().cloned()
    }

    /// Токен вошедшего пользователя.
    pub fn credential(&self) -> Option<Credential> {
        self.inner.state.borrow().credential().cloned()
    }

    /// Пользователь вошёл.
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    /// Пользователь вошёл и он администратор.
    pub fn is_admin(&self) -> bool {
        self.inner.state.borrow().is_admin()
    }

    /// `restore` уже выполнен.
    pub fn is_restored(&self) -> bool {
        self.inner.state.borrow().is_restored()
    }

    fn establish(&self, response: AuthResponse) -> QuillClientResult<Identity> {
        let AuthResponse {
            credential,
            identity,
        } = response;

        let user = serde_json::to_string(&identity).map_err(StorageError::from)?;
        self.inner.storage.apply(&[
            StorageOp::Set(TOKEN_KEY, credential.expose().to_string()),
            StorageOp::Set(USER_KEY, user),
        ])?;

        info!(user_id = %identity.id, "session established");
        self.inner
            .state
            .send_replace(SessionState::Authenticated(SessionAuth {
                identity: identity.clone(),
                credential,
                verified: true,
            }));
        Ok(identity)
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.inner.state.send_replace(SessionState::Anonymous);
        self.clear_persisted()
    }

    fn clear_persisted(&self) -> Result<(), StorageError> {
        self.inner
            .storage
            .apply(&[StorageOp::Remove(TOKEN_KEY), StorageOp::Remove(USER_KEY)])
    }
}
