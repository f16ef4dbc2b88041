//! London borough dictionary.
//!
//! Maps the four-letter codes printed on map tiles to the region names used
//! in the dataset. Region matching in queries is exact and case-sensitive, so
//! names here must match the source spelling.

/// Borough codes and dataset region names.
pub const BOROUGHS: [(&str, &str); 33] = [
    ("ENFI", "Enfield"),
    ("WALT", "Waltham Forest"),
    ("HRGY", "Haringey"),
    ("BARN", "Barnet"),
    ("BREN", "Brent"),
    ("CAMD", "Camden"),
    ("ISLI", "Islington"),
    ("HACK", "Hackney"),
    ("REDB", "Redbridge"),
    ("HRRW", "Harrow"),
    ("HAVE", "Havering"),
    ("HILL", "Hillingdon"),
    ("EALI", "Ealing"),
    ("KENS", "Kensington And Chelsea"),
    ("WSTM", "Westminster"),
    ("TOWH", "Tower Hamlets"),
    ("NEWH", "Newham"),
    ("BARK", "Barking And Dagenham"),
    ("HOUN", "Hounslow"),
    ("HAMM", "Hammersmith And Fulham"),
    ("WAND", "Wandsworth"),
    ("CITY", "City Of London"),
    ("GWCH", "Greenwich"),
    ("BEXL", "Bexley"),
    ("LEWS", "Lewisham"),
    ("STHW", "Southwark"),
    ("RICH", "Richmond Upon Thames"),
    ("MERT", "Merton"),
    ("LAMB", "Lambeth"),
    ("KING", "Kingston Upon Thames"),
    ("SUTT", "Sutton"),
    ("CROY", "Croydon"),
    ("BROM", "Bromley"),
];

/// Resolves a borough code (case-insensitive) to its dataset name.
pub fn borough_name(code: &str) -> Option<&'static str> {
    let code = code.trim();
    BOROUGHS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

/// Resolves a dataset region name (exact match) to its borough code.
pub fn borough_code(name: &str) -> Option<&'static str> {
    BOROUGHS
        .iter()
        .find(|(_, known)| *known == name)
        .map(|(code, _)| *code)
}

#[cfg(test)]
mod tests {
    use super::{borough_code, borough_name, BOROUGHS};
    use std::collections::HashSet;

    #[test]
    fn codes_and_names_are_unique() {
        let codes: HashSet<_> = BOROUGHS.iter().map(|(code, _)| code).collect();
        let names: HashSet<_> = BOROUGHS.iter().map(|(_, name)| name).collect();
        assert_eq!(codes.len(), BOROUGHS.len());
        assert_eq!(names.len(), BOROUGHS.len());
    }

    #[test]
    fn lookups_work_both_ways() {
        assert_eq!(borough_name("kens"), Some("Kensington And Chelsea"));
        assert_eq!(borough_code("City Of London"), Some("CITY"));
        assert_eq!(borough_code("city of london"), None);
        assert_eq!(borough_name("XXXX"), None);
    }
}
