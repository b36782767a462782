// Sports category taxonomy - static two-level classification for videos

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MainCategory {
    pub key: &'static str,
    pub name: &'static str,
    pub subcategories: &'static [&'static str],
}

pub const SPORTS_CATEGORIES: &[MainCategory] = &[
    MainCategory {
        key: "strength_training",
        name: "Strength Training",
        subcategories: &[
            "powerlifting",
            "bodybuilding",
            "crossfit",
            "functional_training",
            "calisthenics",
            "olympic_weightlifting",
        ],
    },
    MainCategory {
        key: "cardio",
        name: "Cardio",
        subcategories: &[
            "running",
            "cycling",
            "rowing",
            "swimming",
            "hiit",
            "circuit_training",
            "jump_rope",
        ],
    },
    MainCategory {
        key: "combat_sports",
        name: "Combat Sports",
        subcategories: &[
            "boxing",
            "kickboxing",
            "muay_thai",
            "taekwondo",
            "karate",
            "jiu_jitsu",
            "mma",
            "kung_fu",
            "judo",
            "krav_maga",
        ],
    },
    MainCategory {
        key: "yoga_pilates",
        name: "Yoga & Pilates",
        subcategories: &[
            "hatha_yoga",
            "vinyasa_yoga",
            "ashtanga_yoga",
            "bikram_yoga",
            "yin_yoga",
            "power_yoga",
            "pilates_mat",
            "pilates_reformer",
        ],
    },
    MainCategory {
        key: "dance_fitness",
        name: "Dance & Fitness",
        subcategories: &[
            "zumba",
            "hip_hop",
            "ballet_fitness",
            "salsa",
            "bollywood",
            "contemporary",
            "latin_dance",
            "aerobics",
        ],
    },
    MainCategory {
        key: "team_sports",
        name: "Team Sports",
        subcategories: &[
            "basketball",
            "football",
            "soccer",
            "volleyball",
            "baseball",
            "hockey",
            "rugby",
            "tennis",
            "badminton",
            "table_tennis",
        ],
    },
    MainCategory {
        key: "outdoor_sports",
        name: "Outdoor Sports",
        subcategories: &[
            "hiking",
            "rock_climbing",
            "surfing",
            "skiing",
            "snowboarding",
            "mountain_biking",
            "trail_running",
            "kayaking",
            "paddleboarding",
        ],
    },
    MainCategory {
        key: "flexibility_mobility",
        name: "Flexibility & Mobility",
        subcategories: &[
            "stretching",
            "foam_rolling",
            "mobility_drills",
            "recovery_sessions",
            "meditation",
            "breathing_exercises",
        ],
    },
    MainCategory {
        key: "specialized_training",
        name: "Specialized Training",
        subcategories: &[
            "rehabilitation",
            "senior_fitness",
            "prenatal_fitness",
            "youth_training",
            "athlete_training",
            "injury_prevention",
        ],
    },
];

pub fn all() -> &'static [MainCategory] {
    SPORTS_CATEGORIES
}

pub fn find(key: &str) -> Option<&'static MainCategory> {
    SPORTS_CATEGORIES.iter().find(|c| c.key == key)
}

impl MainCategory {
    pub fn has_subcategory(&self, sub: &str) -> bool {
        self.subcategories.contains(&sub)
    }
}

/// True when `main` is a known category and `sub` belongs to it.
pub fn is_valid_pair(main: &str, sub: &str) -> bool {
    find(main).map_or(false, |c| c.has_subcategory(sub))
}

pub fn all_subcategories() -> Vec<&'static str> {
    SPORTS_CATEGORIES
        .iter()
        .flat_map(|c| c.subcategories.iter().copied())
        .collect()
}

/// Case-insensitive substring scan over category display names.
pub fn search(query: &str) -> Vec<&'static MainCategory> {
    let needle = query.to_lowercase();
    SPORTS_CATEGORIES
        .iter()
        .filter(|c| c.name.to_lowercase().contains(&needle))
        .collect()
}

/// "strength_training" -> "strength training"
pub fn humanize(key: &str) -> String {
    key.replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let cardio = find("cardio").unwrap();
        assert_eq!(cardio.name, "Cardio");
        assert!(cardio.has_subcategory("hiit"));
        assert!(find("underwater_basket_weaving").is_none());
    }

    #[test]
    fn test_valid_pair() {
        assert!(is_valid_pair("combat_sports", "muay_thai"));
        assert!(!is_valid_pair("combat_sports", "hiit"));
        assert!(!is_valid_pair("nope", "hiit"));
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let hits: Vec<_> = search("SPORTS").iter().map(|c| c.key).collect();
        assert_eq!(hits, vec!["combat_sports", "team_sports", "outdoor_sports"]);
        assert!(search("zzz").is_empty());
    }

    #[test]
    fn test_all_subcategories() {
        let subs = all_subcategories();
        assert!(subs.contains(&"pilates_reformer"));
        assert_eq!(subs.len(), 70);
    }
}
