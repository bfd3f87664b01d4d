use crate::model::Roster;
use anyhow::{anyhow, Context};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// Support persistant d'un roster.
pub trait Storage {
    /// Charge le roster courant.
    fn load(&self) -> anyhow::Result<Roster>;
    /// Sauvegarde de manière atomique.
    fn save(&self, roster: &Roster) -> anyhow::Result<()>;
}

/// Roster dans un fichier JSON, réécrit par renommage atomique.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Roster vide si le fichier n'existe pas encore.
    pub fn load_or_default(&self) -> anyhow::Result<Roster> {
        if self.path.exists() {
            self.load()
        } else {
            Ok(Roster::default())
        }
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<Roster> {
        let data =
            fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let roster: Roster = serde_json::from_slice(&data)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(roster)
    }

    fn save(&self, roster: &Roster) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(roster)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).context("creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).context("atomic rename")?;
        Ok(())
    }
}

/// Stockage en mémoire, pour les tests et les appelants embarqués.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    roster: Mutex<Roster>,
}

impl MemoryStorage {
    pub fn new(roster: Roster) -> Self {
        Self {
            roster: Mutex::new(roster),
        }
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> anyhow::Result<Roster> {
        let guard = self.roster.lock().map_err(|_| anyhow!("storage lock poisoned"))?;
        Ok(guard.clone())
    }

    fn save(&self, roster: &Roster) -> anyhow::Result<()> {
        let mut guard = self.roster.lock().map_err(|_| anyhow!("storage lock poisoned"))?;
        *guard = roster.clone();
        Ok(())
    }
}
