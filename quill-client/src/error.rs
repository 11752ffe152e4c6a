use thiserror::Error;

use crate::storage::StorageError;

/// Разновидность ошибки аутентификации.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// Сервер отклонил email/пароль при входе или регистрации.
    InvalidCredentials,
    /// Токен отсутствует, просрочен или недействителен.
    ///
    /// Единственный подтип, который `ApiClient` обрабатывает сам:
    /// принудительный выход и переход на страницу входа.
    CredentialRejected,
    /// Прочий ответ 401 при валидном токене.
    Denied,
    /// Ответ 403: недостаточно прав.
    Forbidden,
    /// Локальная операция требует активной сессии, а её нет.
    MissingCredential,
}

#[derive(Debug, Error)]
/// Ошибки клиентской библиотеки `quill-client`.
pub enum QuillClientError {
    /// Ошибка аутентификации или авторизации.
    #[error("authentication error ({kind:?}): {message}")]
    Authentication {
        /// Подтип ошибки.
        kind: AuthFailure,
        /// Сообщение сервера или клиента.
        message: String,
    },

    /// Некорректные входные данные (на клиенте или по ответу сервера).
    #[error("validation error: {0}")]
    Validation(String),

    /// Запрошенный ресурс не найден.
    #[error("not found: {0}")]
    NotFound(String),

    /// Ошибка транспорта (`reqwest`): соединение, таймаут, TLS.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Неожиданный ответ сервера.
    #[error("server error {status}: {message}")]
    Server {
        /// HTTP-статус ответа.
        status: u16,
        /// Сообщение сервера или описание проблемы.
        message: String,
    },

    /// Ошибка локального хранилища сессии.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Результат операций `quill-client`.
pub type QuillClientResult<T> = Result<T, QuillClientError>;

impl QuillClientError {
    pub(crate) fn auth(kind: AuthFailure, message: impl Into<String>) -> Self {
        Self::Authentication {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn validation(field: &str, message: &str) -> Self {
        Self::Validation(format!("{field}: {message}"))
    }

    /// Классифицирует неуспешный HTTP-ответ.
    ///
    /// `identity_call` выставляется для входа и регистрации: для них 401
    /// означает неверные учётные данные, а не проблему с токеном.
    pub(crate) fn from_http_status(
        status: reqwest::StatusCode,
        message: Option<String>,
        identity_call: bool,
    ) -> Self {
        let message = message.unwrap_or_else(|| format!("http status {status}"));
        match status {
            reqwest::StatusCode::UNAUTHORIZED => {
                let kind = if identity_call {
                    AuthFailure::InvalidCredentials
                } else if mentions_credential(&message) {
                    AuthFailure::CredentialRejected
                } else {
                    AuthFailure::Denied
                };
                Self::auth(kind, message)
            }
            reqwest::StatusCode::FORBIDDEN => Self::auth(AuthFailure::Forbidden, message),
            reqwest::StatusCode::NOT_FOUND => Self::NotFound(message),
            reqwest::StatusCode::BAD_REQUEST
            | reqwest::StatusCode::CONFLICT
            | reqwest::StatusCode::UNPROCESSABLE_ENTITY => Self::Validation(message),
            _ => Self::Server {
                status: status.as_u16(),
                message,
            },
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Server {
                status: err.status().map_or(200, |status| status.as_u16()),
                message: format!("unexpected response body: {err}"),
            };
        }
        if let Some(status) = err.status() {
            return Self::from_http_status(status, None, false);
        }
        Self::Network(err)
    }

    /// `true`, если сервер сообщил о недействительном или отсутствующем токене.
    pub fn is_credential_rejected(&self) -> bool {
        matches!(
            self,
            Self::Authentication {
                kind: AuthFailure::CredentialRejected,
                ..
            }
        )
    }

    /// Подтип ошибки аутентификации, если это она.
    pub fn auth_failure(&self) -> Option<AuthFailure> {
        match self {
            Self::Authentication { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Причина 401 относится к самому токену, а не к правам.
fn mentions_credential(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("token") || message.contains("authorization")
}
