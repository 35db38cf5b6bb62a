//! Contact and group list, persisted as a JSON array of `{"name": ...}` objects

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::constants::prefs;
use crate::error::{ChatError, ChatResult};
use crate::storage::PreferenceStore;

/// A contact, or a group rendered as `"<group> (<member>, ...)"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatsModel {
    pub name: String,
}

impl ChatsModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Result of adding a contact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactInsert {
    Added,
    EmptyName,
    Duplicate,
}

pub fn encode_chat_list(chats: &[ChatsModel]) -> ChatResult<String> {
    Ok(serde_json::to_string(chats)?)
}

pub fn decode_chat_list(json: &str) -> ChatResult<Vec<ChatsModel>> {
    Ok(serde_json::from_str(json)?)
}

/// The home screen's list of chats backed by the `chats` store
pub struct ChatList {
    store: PreferenceStore,
    chats: Vec<ChatsModel>,
}

impl ChatList {
    /// Load the list; a malformed stored value is logged and treated as empty.
    pub fn load(store: PreferenceStore) -> ChatResult<Self> {
        let chats = match store.get_string(prefs::KEY_CHAT_LIST)? {
            Some(json) if !json.is_empty() => decode_chat_list(&json).unwrap_or_else(|e| {
                warn!("Ignoring malformed chat list in {:?}: {}", store.path(), e);
                Vec::new()
            }),
            _ => Vec::new(),
        };
        Ok(Self { store, chats })
    }

    pub fn chats(&self) -> &[ChatsModel] {
        &self.chats
    }

    pub fn len(&self) -> usize {
        self.chats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chats.is_empty()
    }

    fn find(&self, name: &str) -> Option<&ChatsModel> {
        let name = name.to_lowercase();
        self.chats.iter().find(|c| c.name.to_lowercase() == name)
    }

    pub fn add_contact(&mut self, name: &str) -> ChatResult<ContactInsert> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(ContactInsert::EmptyName);
        }
        if self.find(name).is_some() {
            return Ok(ContactInsert::Duplicate);
        }

        self.chats.push(ChatsModel::new(name));
        self.save()?;
        info!("Added contact {}", name);
        Ok(ContactInsert::Added)
    }

    /// Create a group from existing entries. Returns `None` when no member
    /// was given or the group name is blank.
    pub fn create_group(&mut self, group_name: &str, members: &[String]) -> ChatResult<Option<ChatsModel>> {
        if members.is_empty() {
            return Ok(None);
        }

        let mut selected = Vec::with_capacity(members.len());
        for member in members {
            let chat = self
                .find(member.trim())
                .ok_or_else(|| ChatError::UnknownContact(member.clone()))?;
            selected.push(chat.name.clone());
        }

        let group_name = group_name.trim();
        if group_name.is_empty() {
            return Ok(None);
        }

        let group = ChatsModel::new(format!("{} ({})", group_name, selected.join(", ")));
        self.chats.push(group.clone());
        self.save()?;
        info!("Created group {}", group.name);
        Ok(Some(group))
    }

    fn save(&self) -> ChatResult<()> {
        let json = encode_chat_list(&self.chats)?;
        self.store.put_string(prefs::KEY_CHAT_LIST, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;

    fn open(dir: &tempfile::TempDir) -> ChatList {
        let storage = Storage::new(dir.path()).unwrap();
        ChatList::load(storage.store(prefs::CHATS_STORE)).unwrap()
    }

    #[test]
    fn test_wire_format() {
        let chats = vec![ChatsModel::new("Alice"), ChatsModel::new("Team (Alice, Bob)")];
        let json = encode_chat_list(&chats).unwrap();
        assert_eq!(json, r#"[{"name":"Alice"},{"name":"Team (Alice, Bob)"}]"#);
        assert_eq!(decode_chat_list(&json).unwrap(), chats);
    }

    #[test]
    fn test_add_contact_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut list = open(&dir);

        assert_eq!(list.add_contact("  Alice ").unwrap(), ContactInsert::Added);
        assert_eq!(list.add_contact("Bob").unwrap(), ContactInsert::Added);

        let reloaded = open(&dir);
        let names: Vec<_> = reloaded.chats().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_add_contact_rejects_empty_and_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let mut list = open(&dir);

        assert_eq!(list.add_contact("   ").unwrap(), ContactInsert::EmptyName);
        assert_eq!(list.add_contact("Alice").unwrap(), ContactInsert::Added);
        assert_eq!(list.add_contact("aLiCe").unwrap(), ContactInsert::Duplicate);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_create_group() {
        let dir = tempfile::tempdir().unwrap();
        let mut list = open(&dir);
        list.add_contact("Alice").unwrap();
        list.add_contact("Bob").unwrap();

        let group = list
            .create_group(" Hikers ", &["alice".to_string(), "Bob".to_string()])
            .unwrap()
            .unwrap();
        assert_eq!(group.name, "Hikers (Alice, Bob)");
        assert_eq!(open(&dir).chats().last(), Some(&group));
    }

    #[test]
    fn test_create_group_requires_members_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut list = open(&dir);
        list.add_contact("Alice").unwrap();

        assert_eq!(list.create_group("Hikers", &[]).unwrap(), None);
        assert_eq!(list.create_group("  ", &["Alice".to_string()]).unwrap(), None);
        assert!(matches!(
            list.create_group("Hikers", &["Carol".to_string()]),
            Err(ChatError::UnknownContact(_))
        ));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_malformed_list_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path()).unwrap();
        let store = storage.store(prefs::CHATS_STORE);
        store.put_string(prefs::KEY_CHAT_LIST, "{not json").unwrap();

        let list = ChatList::load(store).unwrap();
        assert!(list.is_empty());
    }
}
