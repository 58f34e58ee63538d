use tabled::Table;

use crate::{error, types::ArtistTableRow, utils};

use super::{Services, spinner};

pub async fn lookup(services: &Services, artist_id: String) {
    let pb = spinner("Looking up artist...");
    let artist = services.catalog.get_artist(&artist_id).await;
    pb.finish_and_clear();

    let artist = match artist {
        Ok(artist) => artist,
        Err(e) => error!("Cannot look up artist {}. Err: {}", artist_id, e),
    };

    let row = ArtistTableRow {
        genres: utils::join_names(artist.genres.iter().map(String::as_str), 3),
        name: artist.name,
        spotify_id: artist.id,
        popularity: artist.popularity,
    };
    println!("{}", Table::new(vec![row]));
}
