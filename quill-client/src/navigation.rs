use std::sync::Mutex;

/// Точка входа для аутентификации.
pub const LOGIN_PATH: &str = "/login";
/// Страница регистрации.
pub const SIGNUP_PATH: &str = "/signup";

/// Навигация презентационного слоя.
///
/// Библиотека не знает, как устроен экран: она только спрашивает текущий путь
/// и просит перейти на другой.
pub trait Navigator: Send + Sync {
    /// Текущий путь, например `/post/42`.
    fn current_path(&self) -> String;

    /// Переход на `path`.
    fn navigate(&self, path: &str);
}

/// `true` для страниц входа и регистрации: с них на вход не перенаправляем.
pub fn is_auth_entry_point(path: &str) -> bool {
    path.contains(LOGIN_PATH) || path.contains(SIGNUP_PATH)
}

#[derive(Debug)]
/// Навигатор в памяти: хранит текущий путь и историю переходов.
pub struct MemoryNavigator {
    history: Mutex<Vec<String>>,
}

impl MemoryNavigator {
    /// Навигатор, стоящий на `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            history: Mutex::new(vec![path.into()]),
        }
    }

    /// Все посещённые пути, начиная с исходного.
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }

    /// Был ли переход на `path` после создания.
    pub fn visited(&self, path: &str) -> bool {
        self.history().iter().skip(1).any(|entry| entry == path)
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.history
            .lock()
            .ok()
            .and_then(|history| history.last().cloned())
            .unwrap_or_else(|| "/".to_string())
    }

    fn navigate(&self, path: &str) {
        if let Ok(mut history) = self.history.lock() {
            history.push(path.to_string());
        }
    }
}
