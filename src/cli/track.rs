use crate::{error, success, utils};

use super::Services;

pub async fn show_track(services: &Services, track_id: String) {
    let item = match services.tracks.play(&track_id).await {
        Ok(item) => item,
        Err(e) => error!("Cannot read track {}. Err: {}", track_id, e),
    };

    let artists = utils::join_names(item.artists.iter().map(|a| a.name.as_str()), 5);
    let album = item.album.as_ref().map(|a| a.name.as_str()).unwrap_or("-");
    success!(
        "{} by {} on {} ({} plays)",
        item.track.name,
        artists,
        album,
        item.track.play_count
    );
}

pub async fn delete_track(services: &Services, track_id: String) {
    match services.tracks.delete(&track_id).await {
        Ok(track) => success!("Deleted track '{}'", track.name),
        Err(e) => error!("Cannot delete track {}. Err: {}", track_id, e),
    }
}
