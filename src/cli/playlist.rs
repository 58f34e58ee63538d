use tabled::Table;

use crate::{
    error,
    management::PageRequest,
    store::{NewPlaylist, Playlist},
    success,
    types::{PlaylistTableRow, TrackTableRow},
    utils, warning,
};

use super::Services;

pub async fn create_playlist(
    services: &Services,
    name: String,
    description: Option<String>,
    owner: String,
    private: bool,
) {
    let new = NewPlaylist {
        name,
        description: description.unwrap_or_default(),
        owner,
        is_public: !private,
    };

    match services.playlists.create(new).await {
        Ok(playlist) => success!(
            "Created playlist '{}' with slug '{}' (id {})",
            playlist.name,
            playlist.slug,
            playlist.id
        ),
        Err(e) => error!("Cannot create playlist. Err: {}", e),
    }
}

pub async fn add_playlist_track(
    services: &Services,
    playlist_id: String,
    track_id: String,
    owner: String,
) {
    match services
        .playlists
        .add_track(&playlist_id, &track_id, &owner)
        .await
    {
        Ok(playlist) => report_tracks(&playlist),
        Err(e) => error!("Cannot add track {}. Err: {}", track_id, e),
    }
}

pub async fn remove_playlist_track(
    services: &Services,
    playlist_id: String,
    track_id: String,
    owner: String,
) {
    match services
        .playlists
        .remove_track(&playlist_id, &track_id, &owner)
        .await
    {
        Ok(playlist) => report_tracks(&playlist),
        Err(e) => error!("Cannot remove track {}. Err: {}", track_id, e),
    }
}

pub async fn delete_playlist(services: &Services, playlist_id: String, owner: String) {
    match services.playlists.delete(&playlist_id, &owner).await {
        Ok(playlist) => success!("Deleted playlist '{}'", playlist.name),
        Err(e) => error!("Cannot delete playlist {}. Err: {}", playlist_id, e),
    }
}

pub async fn list_playlist_tracks(services: &Services, slug: String, limit: usize, skip: usize) {
    let page = match services
        .playlists
        .tracks(&slug, PageRequest::new(limit, skip))
        .await
    {
        Ok(page) => page,
        Err(e) if e.is_not_found() => error!("Playlist '{}' does not exist", slug),
        Err(e) => error!("Cannot read playlist '{}'. Err: {}", slug, e),
    };

    if page.items.is_empty() {
        warning!("No tracks on this page ({} in total)", page.total);
        return;
    }

    let rows: Vec<TrackTableRow> = page
        .items
        .into_iter()
        .enumerate()
        .map(|(i, item)| TrackTableRow {
            position: skip + i + 1,
            artists: utils::join_names(item.artists.iter().map(|a| a.name.as_str()), 3),
            album: item.album.map(|a| a.name).unwrap_or_default(),
            name: item.track.name,
            plays: item.track.play_count,
        })
        .collect();

    println!("{}", Table::new(rows));
    if page.has_next {
        crate::info!(
            "More tracks available, continue with --skip {}",
            skip + limit
        );
    }
}

pub async fn list_playlists(services: &Services, owner: String, limit: usize, skip: usize) {
    let page = match services
        .playlists
        .owned_by(&owner, PageRequest::new(limit, skip))
        .await
    {
        Ok(page) => page,
        Err(e) => error!("Cannot list playlists of {}. Err: {}", owner, e),
    };

    if page.items.is_empty() {
        warning!("{} has no playlists on this page ({} in total)", owner, page.total);
        return;
    }

    let rows: Vec<PlaylistTableRow> = page
        .items
        .into_iter()
        .map(|p| PlaylistTableRow {
            tracks: p.tracks.len(),
            name: p.name,
            slug: p.slug,
            id: p.id,
            public: p.is_public,
        })
        .collect();
    println!("{}", Table::new(rows));
}

pub async fn show_playlist(services: &Services, slug: String) {
    match services.playlists.by_slug(&slug).await {
        Ok(playlist) => {
            report_tracks(&playlist);
            if !playlist.description.is_empty() {
                crate::info!("{}", playlist.description);
            }
        }
        Err(e) if e.is_not_found() => error!("Playlist '{}' does not exist", slug),
        Err(e) => error!("Cannot read playlist '{}'. Err: {}", slug, e),
    }
}

fn report_tracks(playlist: &Playlist) {
    success!(
        "Playlist '{}' now holds {} tracks",
        playlist.name,
        playlist.tracks.len()
    );
}
