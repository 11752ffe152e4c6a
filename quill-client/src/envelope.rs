//! Нормализация ответов сервера.
//!
//! Сервер отвечает то конвертом (`{"post": {...}}`, `{"posts": [...],
//! "pagination": {...}}`), то голым значением. Здесь оба варианта сводятся к
//! одному типу, дальше по коду форма ответа не проверяется.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{QuillClientError, QuillClientResult};
use crate::models::{Pagination, Post, PostPage};

/// Достаёт значение из конверта `key` или принимает ответ как есть.
pub(crate) fn unwrap<T: DeserializeOwned>(body: Value, key: &str) -> QuillClientResult<T> {
    let payload = match body {
        Value::Object(mut map) if map.contains_key(key) => map.remove(key).unwrap_or(Value::Null),
        other => other,
    };
    serde_json::from_value(payload).map_err(|err| QuillClientError::Server {
        status: 200,
        message: format!("unexpected response shape for '{key}': {err}"),
    })
}

/// Список постов с пагинацией. Голый массив считается одной страницей.
pub(crate) fn post_page(body: Value) -> QuillClientResult<PostPage> {
    let pagination = match &body {
        Value::Object(map) => map
            .get("pagination")
            .cloned()
            .map(serde_json::from_value::<Pagination>)
            .transpose()
            .map_err(|err| QuillClientError::Server {
                status: 200,
                message: format!("unexpected pagination shape: {err}"),
            })?,
        _ => None,
    };
    let posts: Vec<Post> = unwrap(body, "posts")?;
    let pagination = pagination.unwrap_or_else(|| Pagination::single_page(posts.len()));
    Ok(PostPage { posts, pagination })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::Category;

    fn post_json(id: &str) -> Value {
        json!({"_id": id, "title": "t", "createdAt": "2025-12-04T10:00:00Z"})
    }

    #[test]
    fn wrapped_and_bare_payloads_normalize_to_same_value() {
        let category = json!({"_id": "c1", "name": "Rust"});
        let wrapped: Category = unwrap(json!({"category": category.clone()}), "category")
            .expect("wrapped must parse");
        let bare: Category = unwrap(category, "category").expect("bare must parse");
        assert_eq!(wrapped, bare);
    }

    #[test]
    fn page_with_pagination_is_kept() {
        let body = json!({
            "posts": [post_json("p1"), post_json("p2")],
            "pagination": {"currentPage": 2, "totalPages": 5, "totalPosts": 42}
        });
        let page = post_page(body).expect("page must parse");
        assert_eq!(page.posts.len(), 2);
        assert_eq!(page.pagination.current_page, 2);
        assert_eq!(page.pagination.total_pages, 5);
        assert!(page.pagination.has_next());
    }

    #[test]
    fn bare_array_is_single_page() {
        let page = post_page(json!([post_json("p1")])).expect("page must parse");
        assert_eq!(page.pagination, Pagination::single_page(1));
        assert!(!page.pagination.has_next());
    }

    #[test]
    fn wrong_shape_is_server_error() {
        let err = unwrap::<Vec<Post>>(json!({"posts": "nope"}), "posts").expect_err("must fail");
        assert!(matches!(err, QuillClientError::Server { .. }));
    }
}
