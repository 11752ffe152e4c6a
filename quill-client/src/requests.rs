//! Входные данные форм: регистрация, пост, профиль, пароль, категория.
//!
//! Каждая форма проверяется методом `validate`, который нормализует поля и
//! возвращает `QuillClientError::Validation` до сетевого запроса.

use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;
use validator::Validate;

use crate::error::{QuillClientError, QuillClientResult};
use crate::models::{AssistKind, DraftField, PostStatus};
use crate::validation::{
    DEFAULT_MAX_IMAGE_MB, is_required, is_valid_email, is_valid_file_size, is_valid_image_type,
    is_valid_password, is_valid_username,
};

/// Длина автоматического описания поста.
pub const EXCERPT_LEN: usize = 150;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Данные для регистрации.
pub struct NewAccount {
    /// Логин.
    pub username: String,
    /// Email.
    pub email: String,
    /// Пароль.
    pub password: String,
    /// О себе.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl NewAccount {
    /// Создаёт форму без `bio`.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            bio: None,
        }
    }

    /// Проверяет и нормализует форму: логин и email без пробелов по краям,
    /// email в нижнем регистре, пустое `bio` отбрасывается.
    pub fn validate(self) -> QuillClientResult<Self> {
        let username = self.username.trim().to_string();
        if !is_valid_username(&username) {
            return Err(QuillClientError::validation(
                "username",
                "must be 3..20 chars: letters, digits, underscore",
            ));
        }
        let email = self.email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(QuillClientError::validation("email", "must be a valid email"));
        }
        if !is_valid_password(&self.password) {
            return Err(QuillClientError::validation(
                "password",
                "must be at least 6 chars",
            ));
        }
        let bio = self
            .bio
            .map(|bio| bio.trim().to_string())
            .filter(|bio| !bio.is_empty());

        Ok(Self {
            username,
            email,
            password: self.password,
            bio,
        })
    }
}

/// Проверяет форму входа, возвращает нормализованный email.
pub(crate) fn validate_login(email: &str, password: &str) -> QuillClientResult<String> {
    let email = email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(QuillClientError::validation("email", "must be a valid email"));
    }
    if password.is_empty() {
        return Err(QuillClientError::validation("password", "must not be empty"));
    }
    Ok(email)
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Изображение для загрузки.
pub struct ImageUpload {
    /// Имя файла.
    pub file_name: String,
    /// MIME-тип.
    pub content_type: String,
    /// Содержимое.
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Читает файл с диска, MIME-тип определяется по расширению.
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let content_type = content_type_for(path).to_string();
        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    /// Проверяет тип и размер (не больше 5 МиБ).
    pub fn validate(&self) -> QuillClientResult<()> {
        if !is_valid_image_type(&self.content_type) {
            return Err(QuillClientError::Validation(format!(
                "{}: only jpeg, png, gif and webp images are allowed",
                self.file_name
            )));
        }
        if !is_valid_file_size(self.bytes.len() as u64, DEFAULT_MAX_IMAGE_MB) {
            return Err(QuillClientError::Validation(format!(
                "{}: image must not exceed {DEFAULT_MAX_IMAGE_MB} MB",
                self.file_name
            )));
        }
        Ok(())
    }
}

fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Черновик поста для создания или редактирования.
pub struct PostDraft {
    /// Заголовок.
    pub title: String,
    /// Содержимое.
    pub content: String,
    /// Краткое описание. Если пусто, берётся начало содержимого.
    pub excerpt: Option<String>,
    /// Идентификатор категории.
    pub category: String,
    /// Теги.
    pub tags: Vec<String>,
    /// Статус публикации; `None` оставляет выбор серверу.
    pub status: Option<PostStatus>,
    /// Новые изображения.
    pub images: Vec<ImageUpload>,
    /// URL уже загруженных изображений, которые нужно сохранить (при редактировании).
    pub existing_images: Vec<String>,
}

impl PostDraft {
    /// Черновик с обязательными полями.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            category: category.into(),
            ..Self::default()
        }
    }

    /// Проверяет обязательные поля и изображения.
    pub fn validate(self) -> QuillClientResult<Self> {
        if !is_required(&self.title) {
            return Err(QuillClientError::validation("title", "is required"));
        }
        if !is_required(&self.content) {
            return Err(QuillClientError::validation("content", "is required"));
        }
        if !is_required(&self.category) {
            return Err(QuillClientError::validation("category", "please select a category"));
        }
        for image in &self.images {
            image.validate()?;
        }

        Ok(Self {
            title: self.title.trim().to_string(),
            category: self.category.trim().to_string(),
            excerpt: self
                .excerpt
                .map(|excerpt| excerpt.trim().to_string())
                .filter(|excerpt| !excerpt.is_empty()),
            ..self
        })
    }

    /// Описание для отправки: заданное или первые [`EXCERPT_LEN`] символов текста.
    pub fn effective_excerpt(&self) -> String {
        match &self.excerpt {
            Some(excerpt) if !excerpt.trim().is_empty() => excerpt.clone(),
            _ => self.content.chars().take(EXCERPT_LEN).collect(),
        }
    }

    /// Применяет AI-подсказку к полю, на которое она рассчитана.
    pub fn apply_suggestion(&mut self, kind: AssistKind, suggestion: &str) {
        match kind.target() {
            DraftField::Title => self.title = suggestion.trim().to_string(),
            DraftField::Content => self.content = suggestion.to_string(),
            DraftField::Excerpt => self.excerpt = Some(suggestion.trim().to_string()),
            DraftField::Tags => self.tags = parse_tags(suggestion),
        }
    }
}

/// Разбирает теги через запятую, пустые отбрасывает.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Изменение профиля.
pub struct ProfileUpdate {
    /// Логин.
    pub username: String,
    /// Email.
    pub email: String,
    /// О себе.
    pub bio: String,
    /// Новый аватар.
    pub profile_pic: Option<ImageUpload>,
}

impl ProfileUpdate {
    /// Проверяет обязательные поля и аватар.
    pub fn validate(self) -> QuillClientResult<Self> {
        if !is_required(&self.username) {
            return Err(QuillClientError::validation("username", "is required"));
        }
        let email = self.email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(QuillClientError::validation("email", "must be a valid email"));
        }
        if let Some(pic) = &self.profile_pic {
            pic.validate()?;
        }
        Ok(Self {
            username: self.username.trim().to_string(),
            email,
            bio: self.bio.trim().to_string(),
            profile_pic: self.profile_pic,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Смена пароля.
pub struct PasswordChange {
    /// Текущий пароль.
    pub current_password: String,
    /// Новый пароль.
    pub new_password: String,
    /// Повтор нового пароля.
    pub confirm_password: String,
}

impl PasswordChange {
    /// Все поля заполнены, новый пароль не короче 6 символов и совпадает с повтором.
    pub fn validate(self) -> QuillClientResult<Self> {
        if self.current_password.is_empty()
            || self.new_password.is_empty()
            || self.confirm_password.is_empty()
        {
            return Err(QuillClientError::Validation(
                "all password fields are required".to_string(),
            ));
        }
        if !is_valid_password(&self.new_password) {
            return Err(QuillClientError::validation(
                "new_password",
                "must be at least 6 chars",
            ));
        }
        if self.new_password != self.confirm_password {
            return Err(QuillClientError::Validation(
                "passwords do not match".to_string(),
            ));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
/// Создание или изменение категории.
pub struct CategoryInput {
    /// Название.
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    /// Описание.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

impl CategoryInput {
    /// Нормализует и проверяет поля.
    pub fn normalized(
        name: impl Into<String>,
        description: Option<String>,
    ) -> QuillClientResult<Self> {
        let input = Self {
            name: name.into().trim().to_string(),
            description: description
                .map(|description| description.trim().to_string())
                .filter(|description| !description.is_empty()),
        };
        input
            .validate()
            .map_err(|err| QuillClientError::Validation(err.to_string()))?;
        Ok(input)
    }
}

/// Проверяет текст комментария.
pub(crate) fn validate_comment(content: &str) -> QuillClientResult<String> {
    let content = content.trim();
    if content.is_empty() {
        return Err(QuillClientError::validation("content", "comment must not be empty"));
    }
    Ok(content.to_string())
}
