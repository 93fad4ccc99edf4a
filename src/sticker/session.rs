use super::CollectionName;
use dashmap::DashMap;
use std::fmt;
use teloxide::types::UserId;

/// Remembers the sticker set name each user has chosen but not published yet.
///
/// Telegram updates from different chats are handled concurrently, so the
/// implementations must be safe to share between tasks.
pub(crate) trait SessionStore: fmt::Debug + Send + Sync {
    /// Replaces the pending name of the user if there was one
    fn set(&self, user: UserId, name: CollectionName);

    fn get(&self, user: UserId) -> Option<CollectionName>;

    fn clear(&self, user: UserId);
}

/// Sessions that live only as long as the process does
#[derive(Debug, Default)]
pub(crate) struct InMemorySessionStore {
    names: DashMap<UserId, CollectionName>,
}

impl SessionStore for InMemorySessionStore {
    fn set(&self, user: UserId, name: CollectionName) {
        self.names.insert(user, name);
    }

    fn get(&self, user: UserId) -> Option<CollectionName> {
        self.names.get(&user).map(|entry| entry.value().clone())
    }

    fn clear(&self, user: UserId) {
        self.names.remove(&user);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sticker::naming::resolve;

    fn name(slug: &str) -> CollectionName {
        resolve(slug, "stickbot").unwrap()
    }

    #[test]
    fn last_write_wins() {
        let store = InMemorySessionStore::default();
        let user = UserId(1);

        assert_eq!(store.get(user), None);

        store.set(user, name("first"));
        store.set(user, name("second"));

        assert_eq!(store.get(user), Some(name("second")));
    }

    #[test]
    fn users_are_isolated() {
        let store = InMemorySessionStore::default();

        store.set(UserId(1), name("cats"));
        store.set(UserId(2), name("dogs"));
        store.clear(UserId(1));

        assert_eq!(store.get(UserId(1)), None);
        assert_eq!(store.get(UserId(2)), Some(name("dogs")));
    }

    #[test]
    fn clearing_missing_entry_is_noop() {
        let store = InMemorySessionStore::default();
        store.clear(UserId(42));
        assert_eq!(store.get(UserId(42)), None);
    }
}
