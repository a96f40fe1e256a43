mod codec;
mod config;
mod cookie;
mod format;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use codec::SessionCodec;
pub use config::{CookieConfig, DEFAULT_MAX_AGE, SameSite};
pub use cookie::{parse_cookie, parse_cookie_headers, serialize_set_cookie};
pub use format::{FnFormat, JsonFormat, SessionFormat};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::SessionError;

/// The contents of a session: a JSON object.
pub type SessionData = serde_json::Map<String, Value>;

/// Handle to the session of the request being served.
///
/// Clones share the same data, which is how changes made by a handler reach
/// the middleware that writes the cookie. A new `Session` is built for every
/// request, so handles are never shared across requests.
#[derive(Debug, Clone, Default)]
pub struct Session {
    data: Arc<Mutex<SessionData>>,
}

impl Session {
    #[must_use]
    pub fn new(data: SessionData) -> Self {
        Self {
            data: Arc::new(Mutex::new(data)),
        }
    }

    // Session data is plain JSON, a panic mid-update cannot leave it invalid.
    fn lock(&self) -> MutexGuard<'_, SessionData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reads `key` as `T`. Returns `None` if the key is missing or holds a
    /// value of another shape.
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get_value(key)?;
        serde_json::from_value(value).ok()
    }

    #[must_use]
    pub fn get_value(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    /// Stores `value` under `key`, returning the previous value.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Encode` if `value` has no JSON representation
    /// (for example a map with non-string keys).
    pub fn insert<T: Serialize>(
        &self,
        key: &str,
        value: T,
    ) -> Result<Option<Value>, SessionError> {
        let value =
            serde_json::to_value(value).map_err(|e| SessionError::Encode(e.to_string()))?;
        Ok(self.insert_value(key, value))
    }

    pub fn insert_value(&self, key: &str, value: Value) -> Option<Value> {
        self.lock().insert(key.to_owned(), value)
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.lock().remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Runs `f` with mutable access to the whole session.
    ///
    /// ```rust
    /// use sealed_session::Session;
    ///
    /// let session = Session::default();
    /// session.insert_value("value", 0.into());
    /// session.update(|data| {
    ///     let current = data["value"].as_i64().unwrap_or(0);
    ///     data.insert("value".to_owned(), (current + 120).into());
    /// });
    /// assert_eq!(session.get::<i64>("value"), Some(120));
    /// ```
    pub fn update<R>(&self, f: impl FnOnce(&mut SessionData) -> R) -> R {
        f(&mut self.lock())
    }

    /// Copies the current contents out of the handle.
    #[must_use]
    pub fn snapshot(&self) -> SessionData {
        self.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Cart {
        items: Vec<String>,
        total: u32,
    }

    #[test]
    fn test_typed_get_and_insert() {
        let session = Session::default();
        assert!(session.is_empty());

        let previous = session
            .insert(
                "cart",
                Cart {
                    items: vec!["book".to_owned()],
                    total: 12,
                },
            )
            .unwrap();
        assert_eq!(previous, None);

        let cart: Cart = session.get("cart").unwrap();
        assert_eq!(cart.items, vec!["book".to_owned()]);
        assert_eq!(cart.total, 12);
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn test_get_wrong_shape_is_none() {
        let session = Session::default();
        session.insert_value("value", json!("not a number"));

        assert_eq!(session.get::<u64>("value"), None);
        assert_eq!(session.get::<u64>("missing"), None);
        assert_eq!(session.get::<String>("value"), Some("not a number".to_owned()));
    }

    #[test]
    fn test_insert_unrepresentable_value() {
        let session = Session::default();
        let mut map = HashMap::new();
        map.insert((1, 2), "tuple keys have no JSON form");

        assert!(matches!(
            session.insert("bad", map),
            Err(SessionError::Encode(_))
        ));
        assert!(!session.contains_key("bad"));
    }

    #[test]
    fn test_remove_and_clear() {
        let session = Session::default();
        session.insert_value("a", json!(1));
        session.insert_value("b", json!(2));

        assert_eq!(session.remove("a"), Some(json!(1)));
        assert!(!session.contains_key("a"));

        session.clear();
        assert!(session.is_empty());
    }

    #[test]
    fn test_clones_share_data() {
        let session = Session::default();
        let handler_view = session.clone();

        handler_view.insert_value("value", json!(120));

        assert_eq!(session.get::<i64>("value"), Some(120));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let session = Session::default();
        session.insert_value("value", json!(1));

        let snapshot = session.snapshot();
        session.insert_value("value", json!(2));

        assert_eq!(snapshot.get("value"), Some(&json!(1)));
    }

    #[test]
    fn test_new_sessions_do_not_share_data() {
        let mut default = SessionData::new();
        default.insert("value".to_owned(), json!(0));

        let first = Session::new(default.clone());
        let second = Session::new(default.clone());
        first.insert_value("value", json!(99));

        assert_eq!(second.get::<i64>("value"), Some(0));
        assert_eq!(default.get("value"), Some(&json!(0)));
    }

    #[test]
    fn test_update_returns_closure_result() {
        let session = Session::default();
        session.insert_value("value", json!(0));

        let updated = session.update(|data| {
            let value = data.get("value").and_then(Value::as_i64).unwrap_or(0) + 120;
            data.insert("value".to_owned(), json!(value));
            value
        });

        assert_eq!(updated, 120);
        assert_eq!(session.get::<i64>("value"), Some(120));
    }
}
