//! Seed collections for the views that are not backed by the REST API.
//! Loaded once at startup and held read-only.

use ev_core::models::{Event, Hackathon};
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs;

#[derive(Debug, Default)]
pub struct Catalog {
    pub events: Vec<Event>,
    pub hackathons: Vec<Hackathon>,
}

impl Catalog {
    /// Reads `events.json` and `hackathons.json` from `dir`. A missing file
    /// yields an empty collection; a malformed one is an error.
    pub async fn load(dir: &Path) -> anyhow::Result<Self> {
        Ok(Self {
            events: read_collection(&dir.join("events.json")).await?,
            hackathons: read_collection(&dir.join("hackathons.json")).await?,
        })
    }
}

async fn read_collection<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    match fs::read_to_string(path).await {
        Ok(raw) => {
            let items: Vec<T> = serde_json::from_str(&raw)
                .map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))?;
            log::info!("loaded {} record(s) from {}", items.len(), path.display());
            Ok(items)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("{} not found; starting with an empty collection", path.display());
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn loads_present_files_and_tolerates_missing_ones() {
        let dir = std::env::temp_dir().join(format!("ev-catalog-{}", Uuid::now_v7()));
        fs::create_dir_all(&dir).await.unwrap();
        fs::write(dir.join("events.json"), r#"[{"id":1,"title":"Tech Summit","type":"conference"}]"#)
            .await
            .unwrap();

        let catalog = Catalog::load(&dir).await.unwrap();
        assert_eq!(catalog.events.len(), 1);
        assert_eq!(catalog.events[0].kind.as_deref(), Some("conference"));
        assert!(catalog.hackathons.is_empty());

        fs::write(dir.join("hackathons.json"), "{ nope").await.unwrap();
        assert!(Catalog::load(&dir).await.is_err());

        fs::remove_dir_all(dir).await.unwrap();
    }
}
