//! File backed transcript storage, one JSON file per conversation.
//!
//! The file is the only copy of a transcript between messages. Storage
//! failures never reach the caller: a failed read yields a fresh
//! transcript and a failed write is logged and dropped.
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Error, Result, bail};
use tokio::fs;

use crate::ai::chat::Transcript;
use crate::openai::Message;

#[derive(Clone, Debug)]
pub struct ConversationStore {
    dir: PathBuf,
    system_message: String,
}

impl ConversationStore {
    pub fn new(dir: impl Into<PathBuf>, system_message: &str) -> Self {
        Self {
            dir: dir.into(),
            system_message: system_message.to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, chat_id: i64) -> PathBuf {
        self.dir.join(format!("chat_{}.json", chat_id))
    }

    /// A transcript holding only the system turn.
    pub fn fresh(&self) -> Transcript {
        Transcript::new_with_system(&self.system_message)
    }

    async fn read(&self, chat_id: i64) -> Result<Option<Transcript>, Error> {
        let path = self.path_for(chat_id);
        let data = match fs::read_to_string(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let transcript: Transcript = serde_json::from_str(&data)?;
        if !transcript.starts_with_system() {
            bail!("Transcript at {} doesn't start with a system turn", path.display());
        }
        Ok(Some(transcript))
    }

    /// Loads the conversation's transcript, or a fresh one if there is
    /// nothing usable on disk.
    pub async fn load(&self, chat_id: i64) -> Transcript {
        match self.read(chat_id).await {
            Ok(Some(transcript)) => transcript,
            Ok(None) => self.fresh(),
            Err(e) => {
                tracing::warn!("Error loading chat history for {}: {}", chat_id, e);
                self.fresh()
            }
        }
    }

    /// Appends a turn. Nothing is written until `save`.
    pub fn append(transcript: Transcript, msg: Message) -> Transcript {
        transcript.append(msg)
    }

    async fn write(&self, chat_id: i64, transcript: &Transcript) -> Result<(), Error> {
        fs::create_dir_all(&self.dir).await?;
        let data = serde_json::to_string_pretty(transcript)?;
        fs::write(self.path_for(chat_id), data).await?;
        Ok(())
    }

    /// Overwrites the stored transcript with `transcript`.
    pub async fn save(&self, chat_id: i64, transcript: &Transcript) {
        if let Err(e) = self.write(chat_id, transcript).await {
            tracing::error!("Error saving chat history for {}: {}", chat_id, e);
        }
    }

    /// Removes the stored transcript. Missing files are fine.
    pub async fn clear(&self, chat_id: i64) {
        match fs::remove_file(self.path_for(chat_id)).await {
            Ok(()) => tracing::debug!("Cleared chat history for {}", chat_id),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::error!("Error clearing chat history for {}: {}", chat_id, e),
        }
    }
}
