//! Test doubles for the outbound seams.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use beerfinder_shared::clients::storage::{object_key_from_url, public_object_url, PhotoStorage, StorageError};

use crate::dto::ChatMessage;
use crate::services::chat_service::{match_topic, ChatBroadcaster};

const PUBLIC_URL: &str = "http://storage.test";
const BUCKET: &str = "photos";

#[derive(Default)]
pub struct FakePhotoStorage {
    objects: Mutex<Vec<String>>,
    fail_deletes: AtomicBool,
}

impl FakePhotoStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn objects(&self) -> Vec<String> {
        self.objects.lock().unwrap().clone()
    }
}

#[async_trait]
impl PhotoStorage for FakePhotoStorage {
    async fn upload(&self, key: &str, _body: Vec<u8>, _content_type: &str) -> Result<String, StorageError> {
        self.objects.lock().unwrap().push(key.to_string());
        Ok(public_object_url(PUBLIC_URL, BUCKET, key))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::Delete("storage unavailable".into()));
        }
        self.objects.lock().unwrap().retain(|k| k != key);
        Ok(())
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        object_key_from_url(PUBLIC_URL, BUCKET, url)
    }
}

/// Remembers every publish as `(topic, payload)`.
#[derive(Default)]
pub struct RecordingBroadcaster {
    published: Mutex<Vec<(String, ChatMessage)>>,
    fail: bool,
}

impl RecordingBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn published(&self) -> Vec<(String, ChatMessage)> {
        self.published.lock().unwrap().clone()
    }
}

impl ChatBroadcaster for RecordingBroadcaster {
    fn publish(&self, match_id: i64, message: &ChatMessage) -> Result<(), String> {
        if self.fail {
            return Err("no transport".into());
        }
        self.published
            .lock()
            .unwrap()
            .push((match_topic(match_id), message.clone()));
        Ok(())
    }
}
