use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageUris {
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub normal: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
    #[serde(default)]
    pub png: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct CardFace {
    pub name: String,
    #[serde(default)]
    pub printed_name: Option<String>,
    #[serde(default)]
    pub mana_cost: Option<String>,
    #[serde(default)]
    pub type_line: Option<String>,
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
}

/// One concrete printing of a card as the catalog returns it.
///
/// `oracle_id` is the abstract identity shared by every printing of the same
/// card. A printing is unique by `(set, lang, collector_number)`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Printing {
    pub id: String,
    #[serde(default)]
    pub oracle_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub printed_name: Option<String>,
    pub lang: String,
    pub set: String,
    #[serde(default)]
    pub set_type: Option<String>,
    pub collector_number: String,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub mana_cost: Option<String>,
    #[serde(default)]
    pub type_line: Option<String>,
    #[serde(default)]
    pub printed_type_line: Option<String>,
    #[serde(default)]
    pub printed_text: Option<String>,
    #[serde(default)]
    pub full_art: bool,
    #[serde(default)]
    pub oversized: bool,
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
    #[serde(default)]
    pub card_faces: Vec<CardFace>,
}

/// Key used to group printings of the same abstract card. Falls back to the
/// normalized canonical name when the catalog gives no identity.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum IdentityKey {
    Oracle(String),
    Name(String),
}

/// The display text the locale patch may overlay onto a resolved printing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocalizedFields {
    pub printed_name: Option<String>,
    pub printed_type_line: Option<String>,
    pub printed_text: Option<String>,
}

impl Printing {
    pub fn identity(&self) -> IdentityKey {
        match &self.oracle_id {
            Some(id) if !id.is_empty() => IdentityKey::Oracle(id.clone()),
            _ => IdentityKey::Name(normalize_name(&self.name)),
        }
    }

    /// Name shown to the user: the localized name when present.
    pub fn display_name(&self) -> &str {
        self.printed_name.as_deref().unwrap_or(&self.name)
    }

    /// Whether this printing answers to a requested name, by canonical,
    /// printed or face name.
    pub fn answers_to(&self, requested: &str) -> bool {
        let wanted = normalize_name(requested);
        if wanted.is_empty() {
            return false;
        }
        normalize_name(&self.name) == wanted
            || self
                .printed_name
                .as_deref()
                .map_or(false, |n| normalize_name(n) == wanted)
            || self.card_faces.iter().any(|face| {
                normalize_name(&face.name) == wanted
                    || face
                        .printed_name
                        .as_deref()
                        .map_or(false, |n| normalize_name(n) == wanted)
            })
    }

    pub fn is_basic_land(&self) -> bool {
        self.type_line
            .as_deref()
            .map_or(false, |t| t.contains("Basic") && t.contains("Land"))
    }

    pub fn localized_fields(&self) -> LocalizedFields {
        LocalizedFields {
            printed_name: self.printed_name.clone(),
            printed_type_line: self.printed_type_line.clone(),
            printed_text: self.printed_text.clone(),
        }
    }

    /// Copy of this printing with localized text replaced. Set, language and
    /// collector number stay as they are.
    pub fn with_localized(&self, fields: &LocalizedFields) -> Printing {
        let mut patched = self.clone();
        if fields.printed_name.is_some() {
            patched.printed_name = fields.printed_name.clone();
        }
        if fields.printed_type_line.is_some() {
            patched.printed_type_line = fields.printed_type_line.clone();
        }
        if fields.printed_text.is_some() {
            patched.printed_text = fields.printed_text.clone();
        }
        patched
    }

    /// Leading digits of the collector number, for ordering "12a" after "5".
    pub fn collector_rank(&self) -> u32 {
        let digits: String = self
            .collector_number
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().unwrap_or(u32::MAX)
    }
}

pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// One page of `GET /cards/search`.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct SearchPage {
    #[serde(default)]
    pub data: Vec<Printing>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_page: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum CardIdentifier {
    Printing {
        set: String,
        collector_number: String,
    },
    Name {
        name: String,
    },
}

#[derive(Serialize, Debug)]
pub struct CollectionRequest<'a> {
    pub identifiers: &'a [CardIdentifier],
}

#[derive(Deserialize, Debug, Default)]
pub struct CollectionResponse {
    #[serde(default)]
    pub data: Vec<Printing>,
    #[serde(default)]
    pub not_found: Vec<CardIdentifier>,
}
