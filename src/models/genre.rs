/// Fixed lookup from TMDB numeric genre ids to display names
const GENRE_MAP: &[(u32, &str)] = &[
    (28, "Action"),
    (12, "Adventure"),
    (16, "Animation"),
    (35, "Comedy"),
    (80, "Crime"),
    (99, "Documentary"),
    (18, "Drama"),
    (10751, "Family"),
    (14, "Fantasy"),
    (36, "History"),
    (27, "Horror"),
    (10402, "Music"),
    (9648, "Mystery"),
    (10749, "Romance"),
    (878, "Science Fiction"),
    (10770, "TV Movie"),
    (53, "Thriller"),
    (10752, "War"),
    (37, "Western"),
];

/// Name shown for ids missing from the map in candidate listings
pub const UNKNOWN_GENRE: &str = "Unknown";

/// Looks up the display name of a TMDB genre id
pub fn genre_name(id: u32) -> Option<&'static str> {
    GENRE_MAP
        .iter()
        .find(|(genre_id, _)| *genre_id == id)
        .map(|(_, name)| *name)
}

/// Maps genre ids to names, dropping ids the map does not know
pub fn known_genre_names(ids: &[u32]) -> Vec<String> {
    ids.iter()
        .filter_map(|id| genre_name(*id))
        .map(str::to_string)
        .collect()
}

/// Maps genre ids to names, labelling unmapped ids as [`UNKNOWN_GENRE`]
pub fn genre_names_or_unknown(ids: &[u32]) -> Vec<String> {
    ids.iter()
        .map(|id| genre_name(*id).unwrap_or(UNKNOWN_GENRE).to_string())
        .collect()
}
