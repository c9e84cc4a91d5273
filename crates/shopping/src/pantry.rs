use weekmenu_shared::normalize_name;
use weekmenu_shared::shopping::PantryItem;
use weekmenu_shared::user::UserConfig;

use crate::AddOutcome;

/// Bulk-adds pantry items, skipping blanks and case-insensitive duplicates
pub fn add_pantry_items<S: AsRef<str>>(pantry: &mut Vec<PantryItem>, names: &[S]) -> Vec<AddOutcome> {
    names
        .iter()
        .map(|name| {
            let name = name.as_ref().trim();
            if name.is_empty() {
                return AddOutcome::Blank;
            }

            let key = normalize_name(name);
            if pantry.iter().any(|p| p.normalized() == key) {
                return AddOutcome::DuplicateSkipped(name.to_owned());
            }

            pantry.push(PantryItem::new(name));
            AddOutcome::Added(key)
        })
        .collect()
}

/// Bulk-adds excluded keywords, stored normalized
pub fn add_excluded_keywords<S: AsRef<str>>(config: &mut UserConfig, keywords: &[S]) -> Vec<AddOutcome> {
    keywords
        .iter()
        .map(|keyword| {
            let keyword = keyword.as_ref().trim();
            if keyword.is_empty() {
                return AddOutcome::Blank;
            }

            let key = normalize_name(keyword);
            if config
                .excluded_keywords
                .iter()
                .any(|k| normalize_name(k) == key)
            {
                return AddOutcome::DuplicateSkipped(keyword.to_owned());
            }

            config.excluded_keywords.insert(key.to_owned());
            AddOutcome::Added(key)
        })
        .collect()
}
