use tabled::Table;

use crate::{error, success, types::SyncedArtistRow, warning};

use super::{Services, spinner};

pub async fn sync(services: &Services, artist_ids: Vec<String>) {
    let ids = crate::utils::distinct(&artist_ids);
    let pb = spinner(&format!("Syncing {} artists...", ids.len()));

    let artists = match services.engine.sync_artists(&ids).await {
        Ok(artists) => artists,
        Err(e) => {
            pb.finish_and_clear();
            error!("Sync failed at {}. Err: {}", e.stage(), e);
        }
    };
    pb.finish_and_clear();

    if artists.len() < ids.len() {
        warning!(
            "{} of {} artists were not found upstream",
            ids.len() - artists.len(),
            ids.len()
        );
    }

    let rows: Vec<SyncedArtistRow> = artists
        .into_iter()
        .map(|a| SyncedArtistRow {
            genres: a.genre_refs.len(),
            name: a.name,
            spotify_id: a.external_id,
            local_id: a.id,
            followers: a.followers,
        })
        .collect();
    let synced = rows.len();

    println!("{}", Table::new(rows));

    match services.store.counts().await {
        Ok(counts) => success!(
            "Synced {} artists. Catalog now holds {} artists, {} albums, {} tracks and {} genres.",
            synced,
            counts.artists,
            counts.albums,
            counts.tracks,
            counts.genres
        ),
        Err(e) => warning!("Synced {} artists, but counting the catalog failed: {}", synced, e),
    }
}
