use crate::printing::normalize_name;
use lazy_static::lazy_static;
use std::collections::HashMap;

/// Canonical basic land names followed by their printed forms.
const BASIC_LANDS: &[(&str, &[&str])] = &[
    (
        "Plains",
        &["平地", "平原", "들", "Ebene", "Plaine", "Llanura", "Pianura", "Planície", "Равнина"],
    ),
    (
        "Island",
        &["島", "海岛", "海島", "섬", "Insel", "Île", "Isla", "Isola", "Ilha", "Остров"],
    ),
    (
        "Swamp",
        &["沼", "沼泽", "沼澤", "늪", "Sumpf", "Marais", "Pantano", "Palude", "Pântano", "Болото"],
    ),
    (
        "Mountain",
        &["山", "山脉", "山脈", "산", "Gebirge", "Montagne", "Montaña", "Montagna", "Montanha", "Гора"],
    ),
    (
        "Forest",
        &["森", "树林", "樹林", "숲", "Wald", "Forêt", "Bosque", "Foresta", "Floresta", "Лес"],
    ),
    ("Wastes", &[]),
];

lazy_static! {
    static ref BY_NAME: HashMap<String, &'static str> = {
        let mut map = HashMap::new();
        for (canonical, printed) in BASIC_LANDS {
            map.insert(normalize_name(canonical), *canonical);
            for name in printed.iter() {
                map.insert(normalize_name(name), *canonical);
            }
        }
        map
    };
}

/// Canonical name of a basic land given any of its known spellings.
pub fn canonical_basic_land(name: &str) -> Option<&'static str> {
    BY_NAME.get(&normalize_name(name)).copied()
}
