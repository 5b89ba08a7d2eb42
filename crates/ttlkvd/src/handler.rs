//! Command handler shared by the RPC and HTTP front ends
//!
//! Both front ends go through this type, so a missing or expired key yields the
//! same reply no matter which one served the call.

use std::sync::Arc;
use tracing::debug;
use ttlkv::protocol::{Method, Reply, Request};
use ttlkv::Store;

#[derive(Clone)]
pub struct CommandHandler {
    store: Arc<Store>,
}

impl CommandHandler {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn handle(&self, method: Method, req: Request) -> Reply {
        match method {
            Method::Set => self.handle_set(req),
            Method::Get => self.handle_get(&req.key),
            Method::Delete => self.handle_delete(&req.key),
        }
    }

    pub fn handle_set(&self, req: Request) -> Reply {
        debug!(key = %req.key, ttl = req.ttl, "SET");
        self.store.set(req.key, req.value, req.ttl);
        Reply::ok()
    }

    pub fn handle_get(&self, key: &str) -> Reply {
        match self.store.get(key) {
            Some(value) => Reply::with_data(value),
            None => {
                debug!(key, "GET miss");
                Reply::not_found()
            }
        }
    }

    pub fn handle_delete(&self, key: &str) -> Reply {
        debug!(key, "DELETE");
        self.store.delete(key);
        Reply::ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn handler() -> CommandHandler {
        CommandHandler::new(Arc::new(Store::new()))
    }

    #[test]
    fn test_set_get_delete_scenario() {
        let handler = handler();

        let resp = handler.handle(Method::Set, Request::set("foo", "bar", 0));
        assert_eq!(resp, Reply::ok());

        let resp = handler.handle(Method::Get, Request::key("foo"));
        assert_eq!(resp, Reply::with_data("bar".to_string()));

        let resp = handler.handle(Method::Delete, Request::key("foo"));
        assert_eq!(resp, Reply::ok());

        let resp = handler.handle(Method::Get, Request::key("foo"));
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("Key not found or expired"));
        assert_eq!(resp.data, None);
    }

    #[test]
    fn test_delete_missing_succeeds() {
        let handler = handler();

        assert_eq!(handler.handle_delete("ghost"), Reply::ok());
        assert_eq!(handler.handle_delete("ghost"), Reply::ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_matches_missing() {
        let handler = handler();
        handler.handle_set(Request::set("x", "1", 5));

        tokio::time::advance(Duration::from_secs(6)).await;

        assert_eq!(handler.handle_get("x"), handler.handle_get("never-set"));
        assert_eq!(handler.handle_get("x"), Reply::not_found());
    }

    #[test]
    fn test_shares_store() {
        let handler = handler();
        let clone = handler.clone();

        handler.handle_set(Request::set("k", "v", 0));

        assert!(Arc::ptr_eq(handler.store(), clone.store()));
        assert_eq!(clone.handle_get("k"), Reply::with_data("v".to_string()));
    }
}
