use std::sync::Mutex;

use quill_client::{LOGIN_PATH, Navigator};

/// Навигатор командной строки: «экран» задаётся командой, переход на вход
/// запоминается и показывается подсказкой после её завершения.
#[derive(Debug)]
pub struct CliNavigator {
    screen: String,
    redirect: Mutex<Option<String>>,
}

impl CliNavigator {
    pub fn new(screen: impl Into<String>) -> Self {
        Self {
            screen: screen.into(),
            redirect: Mutex::new(None),
        }
    }

    pub fn login_requested(&self) -> bool {
        self.redirect
            .lock()
            .map(|redirect| redirect.as_deref() == Some(LOGIN_PATH))
            .unwrap_or(false)
    }
}

impl Navigator for CliNavigator {
    fn current_path(&self) -> String {
        self.screen.clone()
    }

    fn navigate(&self, path: &str) {
        tracing::debug!(from = %self.screen, to = path, "navigation requested");
        if let Ok(mut redirect) = self.redirect.lock() {
            *redirect = Some(path.to_string());
        }
    }
}
