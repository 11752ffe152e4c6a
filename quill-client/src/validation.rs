//! Клиентские проверки форм. Выполняются до сетевого запроса.

use validator::ValidateEmail;

/// Допустимые MIME-типы изображений.
pub const IMAGE_CONTENT_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// Максимальный размер изображения по умолчанию, МиБ.
pub const DEFAULT_MAX_IMAGE_MB: u64 = 5;

/// Минимальная длина пароля.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Корректный формат email.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim().to_string();
    !email.chars().any(char::is_whitespace) && email.validate_email()
}

/// Пароль не короче [`MIN_PASSWORD_LEN`] символов.
pub fn is_valid_password(password: &str) -> bool {
    min_length(password, MIN_PASSWORD_LEN)
}

/// Логин: 3..=20 символов, латиница, цифры и `_`.
pub fn is_valid_username(username: &str) -> bool {
    min_length(username, 3)
        && max_length(username, 20)
        && username
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

/// Поле заполнено не только пробелами.
pub fn is_required(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Не короче `min` символов.
pub fn min_length(value: &str, min: usize) -> bool {
    value.chars().count() >= min
}

/// Не длиннее `max` символов.
pub fn max_length(value: &str, max: usize) -> bool {
    value.chars().count() <= max
}

/// MIME-тип изображения допустим.
pub fn is_valid_image_type(content_type: &str) -> bool {
    IMAGE_CONTENT_TYPES.contains(&content_type.trim().to_ascii_lowercase().as_str())
}

/// Размер файла не превышает `max_mb` МиБ.
pub fn is_valid_file_size(size_bytes: u64, max_mb: u64) -> bool {
    size_bytes <= max_mb * 1024 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_format() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("  user@example.com "));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("us er@example.com"));
        assert!(!is_valid_email("plain"));
    }

    #[test]
    fn password_length() {
        assert!(!is_valid_password("12345"));
        assert!(is_valid_password("123456"));
        assert!(is_valid_password("пароль"));
    }

    #[test]
    fn username_rules() {
        assert!(is_valid_username("valid_user1"));
        assert!(!is_valid_username("ab"));
        assert!(is_valid_username("abc"));
        assert!(is_valid_username("exactly_twenty_chars"));
        assert!(!is_valid_username("has-dash"));
        assert!(!is_valid_username("a_very_long_username_over_20"));
    }

    #[test]
    fn length_helpers_count_chars() {
        assert!(is_required(" x "));
        assert!(!is_required("   "));
        assert!(min_length("привет", 6));
        assert!(max_length("привет", 6));
        assert!(!max_length("привет!", 6));
    }

    #[test]
    fn image_rules() {
        assert!(is_valid_image_type("image/PNG"));
        assert!(!is_valid_image_type("image/svg+xml"));
        assert!(is_valid_file_size(5 * 1024 * 1024, DEFAULT_MAX_IMAGE_MB));
        assert!(!is_valid_file_size(5 * 1024 * 1024 + 1, DEFAULT_MAX_IMAGE_MB));
    }
}
