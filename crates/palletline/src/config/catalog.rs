//! Read-only lookup of packable articles, keyed by workplace.
//!
//! Built once from [`Config`] at startup and shared behind an `Arc`.

use std::collections::BTreeMap;

use serde::Serialize;

use super::schema::{ArticleConfig, Config};

/// Packing parameters for one article at one workplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSpec {
    pub workplace: String,
    pub article: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub pallet_size: u32,
    pub box_size: u32,
    pub hydra_process: String,
    pub pallet_process: String,
}

impl ArticleSpec {
    fn new(workplace: &str, article: &ArticleConfig) -> Self {
        Self {
            workplace: workplace.to_string(),
            article: article.article.clone(),
            name: article.name.clone(),
            kind: article.kind.clone(),
            pallet_size: article.pallet_size,
            box_size: article.box_size,
            hydra_process: article.hydra_process.clone(),
            pallet_process: article.pallet_process.clone(),
        }
    }

    /// Pieces on a pallet holding `boxes` boxes.
    pub fn total_quantity(&self, boxes: u32) -> u32 {
        boxes.saturating_mul(self.box_size)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ArticleCatalog {
    workplaces: BTreeMap<String, BTreeMap<String, ArticleSpec>>,
}

impl ArticleCatalog {
    pub fn from_config(config: &Config) -> Self {
        let workplaces = config
            .workplaces
            .iter()
            .map(|wp| {
                let articles = wp
                    .articles
                    .iter()
                    .map(|a| (a.article.clone(), ArticleSpec::new(&wp.id, a)))
                    .collect();
                (wp.id.clone(), articles)
            })
            .collect();
        Self { workplaces }
    }

    pub fn get(&self, workplace: &str, article: &str) -> Option<&ArticleSpec> {
        self.workplaces.get(workplace)?.get(article)
    }

    pub fn has_workplace(&self, workplace: &str) -> bool {
        self.workplaces.contains_key(workplace)
    }

    /// Articles configured at `workplace`, ordered by article number.
    pub fn articles(&self, workplace: &str) -> impl Iterator<Item = &ArticleSpec> {
        self.workplaces
            .get(workplace)
            .into_iter()
            .flat_map(|articles| articles.values())
    }

    pub fn workplaces(&self) -> impl Iterator<Item = &str> {
        self.workplaces.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_config;

    #[test]
    fn test_lookup_by_workplace_and_article() {
        let catalog = ArticleCatalog::from_config(&default_config().unwrap());

        let spec = catalog.get("eol136153", "28067").unwrap();
        assert_eq!(spec.box_size, 12);
        assert_eq!(spec.pallet_size, 25);
        assert_eq!(spec.hydra_process, "050");
        assert_eq!(spec.total_quantity(25), 300);

        assert!(catalog.get("eol136153", "99999").is_none());
        assert!(catalog.get("eol999", "28067").is_none());
    }

    #[test]
    fn test_article_listing_is_sorted() {
        let catalog = ArticleCatalog::from_config(&default_config().unwrap());
        let numbers: Vec<&str> = catalog
            .articles("eol136153")
            .map(|a| a.article.as_str())
            .collect();
        assert_eq!(numbers, vec!["28042", "28067"]);
        assert_eq!(catalog.articles("unknown").count(), 0);
        assert!(catalog.has_workplace("eol136153"));
        assert_eq!(catalog.workplaces().collect::<Vec<_>>(), vec!["eol136153"]);
    }
}
