use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use anyhow::Result;
use regex::Regex;

const BUILTIN_PORTFOLIO: &str = include_str!("../data/portfolio.json");

/// Category shown when a lookup names one that doesn't exist
pub const FALLBACK_CATEGORY: &str = "dev";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    pub url: String,
    pub name: String,
    pub thumb_path: String,
    #[serde(default)]
    pub image_title: Option<String>,
    #[serde(default)]
    pub sub_content: SubContent,
}

impl PortfolioItem {
    pub fn display_title(&self) -> &str {
        self.image_title.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubContent {
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub video_link: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl SubContent {
    /// WebM first, then MP4, both derived from `video_link`.
    pub fn video_sources(&self) -> Vec<String> {
        match &self.video_link {
            Some(link) => vec![format!("{}.webm", link), format!("{}.mp4", link)],
            None => Vec::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Category {
    /// Absent means the category has no listing at all; empty is a valid listing
    #[serde(default)]
    pub items: Option<Vec<PortfolioItem>>,
}

/// Items of one category along with the key they were resolved under
#[derive(Debug, Clone, Copy)]
pub struct CategoryListing<'a> {
    pub category: &'a str,
    pub items: &'a [PortfolioItem],
}

/// Static, read-only portfolio content
pub struct Portfolio {
    categories: HashMap<String, Category>,
    non_word: Regex,
}

impl Portfolio {
    pub fn from_json(json: &str) -> Result<Self> {
        let categories: HashMap<String, Category> = serde_json::from_str(json)?;
        Ok(Self {
            categories,
            non_word: Regex::new(r"[^\w\s]")?,
        })
    }

    /// Portfolio bundled into the binary
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_PORTFOLIO)
    }

    /// Category keys in display order, then any extras alphabetically
    pub fn category_keys(&self) -> Vec<&str> {
        const ORDER: [&str; 4] = ["ai", "dev", "design", "photo"];
        let mut keys: Vec<&str> = ORDER
            .iter()
            .copied()
            .filter(|k| self.categories.contains_key(*k))
            .collect();
        let mut extras: Vec<&str> = self
            .categories
            .keys()
            .map(String::as_str)
            .filter(|k| !ORDER.contains(k))
            .collect();
        extras.sort_unstable();
        keys.extend(extras);
        keys
    }

    /// List a category by key or route path (`dev` or `/dev`).
    ///
    /// Unknown categories, and categories without an `items` list, fall back
    /// to the dev listing. A known category with an empty list is returned
    /// as-is. Returns `None` only if the fallback is missing too.
    pub fn category(&self, path: &str) -> Option<CategoryListing<'_>> {
        let key = self.non_word.replace_all(path, "");

        if let Some(listing) = self.listing(&key) {
            return Some(listing);
        }

        tracing::warn!(category = %key, "category not found, falling back to {}", FALLBACK_CATEGORY);
        self.listing(FALLBACK_CATEGORY)
    }

    fn listing(&self, key: &str) -> Option<CategoryListing<'_>> {
        let (name, category) = self.categories.get_key_value(key)?;
        Some(CategoryListing {
            category: name,
            items: category.items.as_deref()?,
        })
    }

    /// Detail record for a full item path such as `/dev/vi-1`.
    pub fn item(&self, path: &str) -> Option<&PortfolioItem> {
        let category = path.split('/').nth(1)?;
        self.categories
            .get(category)?
            .items
            .as_deref()?
            .iter()
            .find(|item| item.url == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn portfolio() -> Portfolio {
        Portfolio::builtin().unwrap()
    }

    #[test]
    fn test_builtin_has_all_categories() {
        assert_eq!(portfolio().category_keys(), ["ai", "dev", "design", "photo"]);
    }

    #[test]
    fn test_category_from_route_path() {
        let portfolio = portfolio();
        let listing = portfolio.category("/design").unwrap();
        assert_eq!(listing.category, "design");
        assert_eq!(listing.items[0].name, "Washed Away");

        let listing = portfolio.category("photo").unwrap();
        assert_eq!(listing.category, "photo");
        assert_eq!(listing.items.len(), 2);
    }

    #[test]
    fn test_unknown_category_falls_back_to_dev() {
        let portfolio = portfolio();
        let listing = portfolio.category("/nope").unwrap();
        assert_eq!(listing.category, "dev");
        assert_eq!(listing.items[0].url, "/dev/vi-1");
    }

    #[test]
    fn test_empty_category_kept_but_missing_items_fall_back() {
        let json = r#"{
            "dev": { "items": [ { "url": "/dev/x", "name": "X", "thumbPath": "/x.jpg" } ] },
            "photo": { "items": [] },
            "design": {}
        }"#;
        let portfolio = Portfolio::from_json(json).unwrap();

        let listing = portfolio.category("/photo").unwrap();
        assert_eq!(listing.category, "photo");
        assert!(listing.items.is_empty());

        // No items list at all is treated like an unknown category
        let listing = portfolio.category("design").unwrap();
        assert_eq!(listing.category, "dev");
        assert_eq!(listing.items.len(), 1);
    }

    #[test]
    fn test_item_lookup_by_full_path() {
        let portfolio = portfolio();
        let item = portfolio.item("/dev/vi-1").unwrap();
        assert_eq!(item.name, "Vi-1");
        assert_eq!(
            item.sub_content.video_sources(),
            ["/videos/dev/vi-1.webm", "/videos/dev/vi-1.mp4"]
        );

        assert!(portfolio.item("/dev/missing").is_none());
        assert!(portfolio.item("/nope/vi-1").is_none());
        assert!(portfolio.item("").is_none());
    }

    #[test]
    fn test_display_title_prefers_image_title() {
        let portfolio = portfolio();
        assert_eq!(
            portfolio.item("/photo/garden").unwrap().display_title(),
            "Morning in the garden"
        );
        assert_eq!(
            portfolio.item("/photo/coastline").unwrap().display_title(),
            "Coastline"
        );
    }

    #[test]
    fn test_optional_fields_default() {
        let json = r#"{ "dev": { "items": [
            { "url": "/dev/x", "name": "X", "thumbPath": "/x.jpg" }
        ] } }"#;
        let portfolio = Portfolio::from_json(json).unwrap();
        let item = portfolio.item("/dev/x").unwrap();
        assert_eq!(item.sub_content, SubContent::default());
        assert!(item.sub_content.video_sources().is_empty());
    }
}
