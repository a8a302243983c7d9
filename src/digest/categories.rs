// src/digest/categories.rs
//! Fixed keyword table for title categorization.

use serde::Serialize;

pub const OTHER_KEY: &str = "other";
pub const OTHER_LABEL: &str = "Other";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub key: &'static str,
    pub label: &'static str,
    pub keywords: &'static [&'static str],
}

/// Order matters: the first category with a matching keyword wins.
pub const CATEGORIES: &[Category] = &[
    Category {
        key: "deals",
        label: "Deals & Discounts",
        keywords: &[
            "deal",
            "save",
            "discount",
            "sale",
            "price drop",
            "bundle",
            "clearance",
            "thomann",
            "andertons",
            "sweetwater",
        ],
    },
    Category {
        key: "pedals",
        label: "Pedals & Effects",
        keywords: &[
            "pedal",
            "overdrive",
            "distortion",
            "fuzz",
            "delay",
            "reverb",
            "chorus",
            "phaser",
            "flanger",
            "wah",
            "multifx",
            "multi-fx",
        ],
    },
    Category {
        key: "amps",
        label: "Amps & Modellers",
        keywords: &[
            "amp",
            "amplifier",
            "combo",
            "head",
            "cab",
            "kemper",
            "helix",
            "fractal",
            "quad cortex",
            "tonex",
            "neural",
            "modeler",
            "modeller",
        ],
    },
    Category {
        key: "guitars",
        label: "Guitars",
        keywords: &[
            "guitar", "strat", "tele", "les paul", "prs", "fender", "gibson", "ibanez", "acoustic",
        ],
    },
    Category {
        key: "midi",
        label: "MIDI & Control",
        keywords: &[
            "midi",
            "controller",
            "footswitch",
            "foot controller",
            "expression",
            "usb midi",
            "bluetooth midi",
        ],
    },
    Category {
        key: "mics",
        label: "Mics & Recording",
        keywords: &[
            "mic",
            "microphone",
            "interface",
            "preamp",
            "recording",
            "studio",
            "plugin",
            "audio interface",
            "di box",
        ],
    },
    Category {
        key: "pa",
        label: "Live Sound & PA",
        keywords: &[
            "pa",
            "speaker",
            "monitor",
            "mixer",
            "wireless",
            "in-ear",
            "iem",
            "front of house",
            "foh",
        ],
    },
];

/// Key + label pair as exposed to API consumers.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CategoryInfo {
    pub key: &'static str,
    pub label: &'static str,
}

/// Metadata for every declared category, in declaration order (without `other`).
pub fn category_infos() -> Vec<CategoryInfo> {
    CATEGORIES
        .iter()
        .map(|c| CategoryInfo {
            key: c.key,
            label: c.label,
        })
        .collect()
}

/// Every bucket key a digest carries: declared categories, then `other`.
pub fn all_keys() -> impl Iterator<Item = &'static str> {
    CATEGORIES
        .iter()
        .map(|c| c.key)
        .chain(std::iter::once(OTHER_KEY))
}

/// Case-insensitive substring match against the table; `other` when nothing hits.
///
/// No word boundaries: "Amplifier" matches `amp` and "Compact" matches `pa`.
pub fn categorize(title: &str) -> &'static str {
    let t = title.to_lowercase();
    CATEGORIES
        .iter()
        .find(|c| c.keywords.iter().any(|k| t.contains(k)))
        .map_or(OTHER_KEY, |c| c.key)
}

/// Human label for a bucket key.
pub fn label_for(key: &str) -> &'static str {
    CATEGORIES
        .iter()
        .find(|c| c.key == key)
        .map_or(OTHER_LABEL, |c| c.label)
}
