//! Оптимистичное изменение: новое значение видно сразу, запрос идёт следом,
//! при ошибке возвращается снимок, сделанный перед этим вызовом.
//!
//! Вызовы не сериализуются. Если два запроса завершились ошибкой, побеждает
//! откат того, кто ответил последним.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

#[derive(Debug)]
/// Значение с оптимистичными изменениями. Клоны разделяют одно значение.
pub struct Optimistic<T> {
    value: Arc<watch::Sender<T>>,
}

impl<T> Clone for Optimistic<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
        }
    }
}

impl<T: Clone> Optimistic<T> {
    /// Начальное значение, обычно пришедшее с сервера.
    pub fn new(initial: T) -> Self {
        Self {
            value: Arc::new(watch::Sender::new(initial)),
        }
    }

    /// Текущее значение.
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Изменяет значение на месте.
    pub fn update(&self, modify: impl FnOnce(&mut T)) {
        self.value.send_modify(modify);
    }

    /// Подписка на изменения.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.value.subscribe()
    }

    /// Меняет значение на `next` до начала запроса и возвращает прежнее, если
    /// `request` завершился ошибкой.
    pub async fn commit<R, E, Fut>(&self, next: T, request: Fut) -> Result<R, E>
    where
        Fut: Future<Output = Result<R, E>>,
    {
        let previous = self.value.send_replace(next);
        let result = request.await;
        if result.is_err() {
            debug!("optimistic request failed, reverting");
            self.value.send_replace(previous);
        }
        result
    }

    /// То же, что [`Optimistic::commit`], но следующее значение вычисляется из
    /// текущего.
    pub async fn commit_with<R, E, Fut>(
        &self,
        next: impl FnOnce(&T) -> T,
        request: Fut,
    ) -> Result<R, E>
    where
        Fut: Future<Output = Result<R, E>>,
    {
        let next = next(&self.value.borrow());
        self.commit(next, request).await
    }
}
