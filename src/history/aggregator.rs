use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::db::Track;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistPlays {
    pub artist: String,
    pub count: u64,
}

/// Play count per artist, highest first. Artists with equal counts keep the
/// order in which they first appear in `history`. Names are compared exactly.
pub fn most_played_artists(history: &[Track]) -> Vec<ArtistPlays> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut ranking: Vec<ArtistPlays> = Vec::new();

    for track in history {
        match index.get(track.artist.as_str()) {
            Some(&slot) => ranking[slot].count += 1,
            None => {
                index.insert(track.artist.as_str(), ranking.len());
                ranking.push(ArtistPlays {
                    artist: track.artist.clone(),
                    count: 1,
                });
            }
        }
    }

    // sort_by is stable, so first-appearance order breaks ties
    ranking.sort_by(|a, b| b.count.cmp(&a.count));
    ranking
}
