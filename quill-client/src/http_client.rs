use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{QuillClientError, QuillClientResult};
use crate::models::Credential;
use crate::requests::{ImageUpload, PostDraft, ProfileUpdate};

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Clone)]
/// Параметры HTTP-транспорта.
pub struct HttpConfig {
    /// Базовый URL API, например `http://localhost:5000/api`.
    pub base_url: String,
    /// Таймаут установки соединения.
    pub connect_timeout: Duration,
    /// Таймаут всего запроса.
    pub request_timeout: Duration,
}

impl HttpConfig {
    /// Параметры по умолчанию для `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Кто выдаёт сессию: для входа и регистрации 401 значит «неверный пароль».
pub(crate) enum CallKind {
    IdentityIssuing,
    Regular,
}

/// Тело запроса.
pub(crate) enum Payload<'a, B: Serialize + ?Sized = Value> {
    Empty,
    Json(&'a B),
    Multipart(Form),
}

#[derive(Debug, Clone)]
/// HTTP-клиент для работы с REST API блога.
pub(crate) struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    /// Создаёт клиент с таймаутами из `config`.
    pub(crate) fn new(config: &HttpConfig) -> QuillClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(QuillClientError::Network)?;

        Ok(Self {
            base_url: config.base_url.clone(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn decode_error(response: reqwest::Response, kind: CallKind) -> QuillClientError {
        let status = response.status();

        let message = match response.json::<ErrorResponseDto>().await {
            Ok(body) => body.message.or(body.error),
            Err(_) => None,
        };
        QuillClientError::from_http_status(
            status,
            message,
            kind == CallKind::IdentityIssuing,
        )
    }

    /// Собирает запрос с query-параметрами, телом и токеном.
    pub(crate) fn request<Q, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        payload: Payload<'_, B>,
        credential: Option<&Credential>,
    ) -> RequestBuilder
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let mut request = self.client.request(method, self.endpoint(path));
        if let Some(query) = query {
            request = request.query(query);
        }
        request = match payload {
            Payload::Empty => request,
            Payload::Json(body) => request.json(body),
            Payload::Multipart(form) => request.multipart(form),
        };
        if let Some(credential) = credential {
            request = request.bearer_auth(credential.expose());
        }
        request
    }

    /// Отправляет запрос и возвращает JSON-тело. Пустое тело читается как `null`.
    pub(crate) async fn execute(
        &self,
        request: RequestBuilder,
        kind: CallKind,
    ) -> QuillClientResult<Value> {
        let response = request
            .send()
            .await
            .map_err(QuillClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response, kind).await);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(QuillClientError::from_reqwest)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|err| QuillClientError::Server {
            status: 200,
            message: format!("response is not valid json: {err}"),
        })
    }
}

fn image_part(image: &ImageUpload) -> QuillClientResult<Part> {
    Part::bytes(image.bytes.clone())
        .file_name(image.file_name.clone())
        .mime_str(&image.content_type)
        .map_err(|err| QuillClientError::Validation(format!("{}: {err}", image.file_name)))
}

/// Форма поста: `tags[]` и `existingImages[]` по одному полю на значение.
pub(crate) fn post_form(draft: &PostDraft) -> QuillClientResult<Form> {
    let mut form = Form::new()
        .text("title", draft.title.clone())
        .text("content", draft.content.clone())
        .text("excerpt", draft.effective_excerpt())
        .text("category", draft.category.clone());

    if let Some(status) = draft.status {
        form = form.text("status", status.as_str());
    }
    for tag in &draft.tags {
        form = form.text("tags[]", tag.clone());
    }
    for url in &draft.existing_images {
        form = form.text("existingImages[]", url.clone());
    }
    for image in &draft.images {
        form = form.part("images", image_part(image)?);
    }
    Ok(form)
}

/// Форма профиля.
pub(crate) fn profile_form(update: &ProfileUpdate) -> QuillClientResult<Form> {
    let mut form = Form::new()
        .text("username", update.username.clone())
        .text("email", update.email.clone())
        .text("bio", update.bio.clone());
    if let Some(pic) = &update.profile_pic {
        form = form.part("profilePic", image_part(pic)?);
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slashes() {
        let client = HttpClient::new(&HttpConfig::new("http://localhost:5000/api/"))
            .expect("client must build");
        assert_eq!(
            client.endpoint("/posts/1"),
            "http://localhost:5000/api/posts/1"
        );
        assert_eq!(client.endpoint("posts"), "http://localhost:5000/api/posts");
    }

    #[test]
    fn credential_is_sent_as_bearer() {
        let client = HttpClient::new(&HttpConfig::new("http://localhost:5000/api"))
            .expect("client must build");
        let credential = Credential::new("abc.def").expect("token");

        let request = client
            .request::<(), Value>(Method::GET, "/posts", None, Payload::Empty, Some(&credential))
            .build()
            .expect("request must build");

        let header = request
            .headers()
            .get(reqwest::header::AUTHORIZATION)
            .expect("authorization header");
        assert_eq!(header, "Bearer abc.def");
    }

    #[test]
    fn anonymous_request_has_no_authorization() {
        let client = HttpClient::new(&HttpConfig::new("http://localhost:5000/api"))
            .expect("client must build");

        let request = client
            .request(
                Method::GET,
                "/posts",
                Some(&[("page", "2")]),
                Payload::<Value>::Empty,
                None,
            )
            .build()
            .expect("request must build");

        assert!(request.headers().get(reqwest::header::AUTHORIZATION).is_none());
        assert_eq!(request.url().query(), Some("page=2"));
    }

    #[test]
    fn post_form_rejects_bad_mime() {
        let mut draft = PostDraft::new("t", "c", "c1");
        draft.images.push(ImageUpload {
            file_name: "x.png".to_string(),
            content_type: "not a mime".to_string(),
            bytes: vec![1, 2, 3],
        });
        assert!(post_form(&draft).is_err());
    }
}
