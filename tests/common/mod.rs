//! Shared test doubles for the bot transport and media storage seams.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use konfess::bot::transport::{BotTransport, Formatting, TransportError};
use konfess::storage::{MediaStore, StorageError, UploadedMedia};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Message {
        chat_id: i64,
        text: String,
        formatting: Formatting,
    },
    Photo {
        chat_id: i64,
        url: String,
        caption: String,
    },
    Document {
        chat_id: i64,
        url: String,
        caption: String,
    },
}

/// Records every send; deliveries to chat ids in `failing` are rejected.
#[derive(Default)]
pub struct MockTransport {
    pub sent: Mutex<Vec<Sent>>,
    pub failing: HashSet<i64>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(chat_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: chat_ids.into_iter().collect(),
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().expect("transport lock").clone()
    }

    fn check(&self, chat_id: i64) -> Result<(), TransportError> {
        if self.failing.contains(&chat_id) {
            return Err(TransportError::Send(format!("chat {chat_id} rejected")));
        }
        Ok(())
    }
}

#[async_trait]
impl BotTransport for MockTransport {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        formatting: Formatting,
    ) -> Result<(), TransportError> {
        self.check(chat_id)?;
        self.sent.lock().expect("transport lock").push(Sent::Message {
            chat_id,
            text: text.to_owned(),
            formatting,
        });
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        url: &str,
        caption: &str,
        _formatting: Formatting,
    ) -> Result<(), TransportError> {
        self.check(chat_id)?;
        self.sent.lock().expect("transport lock").push(Sent::Photo {
            chat_id,
            url: url.to_owned(),
            caption: caption.to_owned(),
        });
        Ok(())
    }

    async fn send_document(
        &self,
        chat_id: i64,
        url: &str,
        caption: &str,
        _formatting: Formatting,
    ) -> Result<(), TransportError> {
        self.check(chat_id)?;
        self.sent.lock().expect("transport lock").push(Sent::Document {
            chat_id,
            url: url.to_owned(),
            caption: caption.to_owned(),
        });
        Ok(())
    }
}

/// Counts uploads and records deleted ids.
#[derive(Default)]
pub struct MockMediaStore {
    pub uploads: Mutex<Vec<String>>,
    pub deletes: Mutex<Vec<String>>,
    pub fail_delete: bool,
}

impl MockMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uploaded_ids(&self) -> Vec<String> {
        self.uploads.lock().expect("media lock").clone()
    }

    pub fn deleted_ids(&self) -> Vec<String> {
        self.deletes.lock().expect("media lock").clone()
    }
}

#[async_trait]
impl MediaStore for MockMediaStore {
    async fn upload(&self, _bytes: Vec<u8>, folder: &str) -> Result<UploadedMedia, StorageError> {
        let mut uploads = self.uploads.lock().expect("media lock");
        let id = format!("{folder}/upload-{}", uploads.len());
        uploads.push(id.clone());
        Ok(UploadedMedia {
            url: format!("https://media.test/{id}"),
            id,
        })
    }

    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        if self.fail_delete {
            return Err(StorageError::Delete(format!("{id}: simulated")));
        }
        self.deletes
            .lock()
            .expect("media lock")
            .push(id.to_owned());
        Ok(())
    }
}
