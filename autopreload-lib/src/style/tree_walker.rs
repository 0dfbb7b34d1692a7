use crate::config::{PreloadConfig, PropertyLookup};
use crate::sheet::sheet_tree::{RuleLeaf, RuleNode, StyleDocument};
use crate::style::path_resolver::{
    file_directory, file_name, full_path, is_data_uri, is_url_value, url_tokens,
};
use crate::style::selector_filter::{self, Inspection};
use indexmap::IndexSet;

/// Property holding the images collected by a direct lookup.
pub const IMAGE_PROPERTY: &str = "background-image";

/// Collects the absolute image sources of every inspected rule, in document order.
pub fn collect_sources(document: &StyleDocument, config: &PreloadConfig) -> Vec<String> {
    let mut walker = TreeWalker::new(config);
    for sheet in &document.sheets {
        walker.walk(sheet, "");
    }
    walker.into_sources()
}

/// Depth-first, pre-order walk that accumulates deduplicated sources.
pub struct TreeWalker<'a> {
    config: &'a PreloadConfig,
    sources: IndexSet<String>,
}

impl<'a> TreeWalker<'a> {
    pub fn new(config: &'a PreloadConfig) -> Self {
        TreeWalker {
            config,
            sources: IndexSet::new(),
        }
    }

    pub fn walk(&mut self, node: &RuleNode, file_root: &str) {
        match node {
            RuleNode::Stylesheet(sheet) => {
                let href = sheet.href.as_deref();
                let sheet_name = href.map(file_name);
                if selector_filter::skips_sheet(sheet_name.as_deref(), self.config) {
                    log::debug!("Skipping ignored stylesheet {}", href.unwrap_or_default());
                    return;
                }
                let root = href.map_or(file_root, file_directory);
                for child in &sheet.children {
                    self.walk(child, root);
                }
            }
            RuleNode::RuleGroup(group) => {
                for child in &group.children {
                    self.walk(child, file_root);
                }
            }
            RuleNode::Rule(rule) => self.extract(rule, file_root),
        }
    }

    pub fn into_sources(self) -> Vec<String> {
        self.sources.into_iter().collect()
    }

    fn extract(&mut self, rule: &RuleLeaf, file_root: &str) {
        let Some(inspection) = selector_filter::inspect(&rule.selector_text, self.config) else {
            return;
        };

        for token in candidates(rule, self.config.lookup) {
            let source = full_path(token, file_root);
            let name = file_name(token);
            if self.accepts(&source, &name, inspection) {
                log::debug!("{} -> {}", rule.selector_text, source);
                self.sources.insert(source);
            }
        }
    }

    /// An empty name means `url("")` or a directory URL, neither of which is an image.
    fn accepts(&self, source: &str, name: &str, inspection: Inspection) -> bool {
        let images = &self.config.images;
        !name.is_empty()
            && !self.sources.contains(source)
            && !images.is_ignored(name)
            && !is_data_uri(name)
            && (!inspection.requires_added_image() || images.is_added(name))
    }
}

/// `url(...)` tokens of one rule, in declaration order.
fn candidates(rule: &RuleLeaf, lookup: PropertyLookup) -> Vec<&str> {
    match lookup {
        PropertyLookup::Direct => rule
            .declarations
            .get(IMAGE_PROPERTY)
            .map(url_tokens)
            .unwrap_or_default(),
        PropertyLookup::Enumerate => rule
            .declarations
            .iter()
            .filter(|(_, value)| is_url_value(value))
            .flat_map(|(_, value)| url_tokens(value))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn document(sheets: Vec<RuleNode>) -> StyleDocument {
        StyleDocument { sheets }
    }

    fn scenario() -> StyleDocument {
        document(vec![RuleNode::sheet(
            Some("http://h/css/styles.css"),
            vec![
                RuleNode::rule(".a:hover", &[("background-image", "url(\"img1.png\")")]),
                RuleNode::rule(".b", &[("background-image", "url(\"img2.png\")")]),
            ],
        )])
    }

    #[test]
    fn state_rules_only_by_default() {
        let sources = collect_sources(&scenario(), &PreloadConfig::default());
        assert_eq!(sources, vec!["http://h/css/img1.png"]);
    }

    #[test]
    fn added_selector_contributes() {
        let mut config = PreloadConfig::default();
        config.selectors.add(".b");

        let sources = collect_sources(&scenario(), &config);
        assert_eq!(sources, vec!["http://h/css/img1.png", "http://h/css/img2.png"]);
    }

    #[test]
    fn ignored_selector_contributes_nothing() {
        let mut config = PreloadConfig::default();
        config.selectors.ignore(".a:hover");

        assert!(collect_sources(&scenario(), &config).is_empty());
    }

    #[test]
    fn ignored_file_contributes_nothing() {
        let mut config = PreloadConfig::default();
        config.files.ignore("styles.css");

        assert!(collect_sources(&scenario(), &config).is_empty());
    }

    #[test]
    fn deduplicates_in_discovery_order() {
        let doc = document(vec![
            RuleNode::sheet(
                Some("http://h/css/a.css"),
                vec![
                    RuleNode::rule(".x:hover", &[("background-image", "url(b.png)")]),
                    RuleNode::group(
                        "@media screen",
                        vec![
                            RuleNode::rule(".y:focus", &[("background-image", "url(a.png)")]),
                            RuleNode::rule(".z:active", &[("background-image", "url(b.png)")]),
                        ],
                    ),
                ],
            ),
            RuleNode::sheet(
                Some("http://h/css/b.css"),
                vec![RuleNode::rule(
                    ".w:checked",
                    &[("background-image", "url('http://h/css/a.png')")],
                )],
            ),
        ]);

        let sources = collect_sources(&doc, &PreloadConfig::default());
        assert_eq!(sources, vec!["http://h/css/b.png", "http://h/css/a.png"]);
    }

    #[test]
    fn file_root_is_per_stylesheet() {
        let doc = document(vec![
            RuleNode::sheet(
                Some("http://one/css/a.css"),
                vec![RuleNode::group(
                    "@supports (display: grid)",
                    vec![RuleNode::rule(
                        ".a:hover",
                        &[("background-image", "url(/img/root.png)")],
                    )],
                )],
            ),
            RuleNode::sheet(
                Some("https://two/theme/b.css"),
                vec![RuleNode::rule(".b:hover", &[("background-image", "url(rel.png)")])],
            ),
        ]);

        let sources = collect_sources(&doc, &PreloadConfig::default());
        assert_eq!(
            sources,
            vec!["http://one/img/root.png", "https://two/theme/rel.png"]
        );
    }

    #[test]
    fn data_uris_are_never_collected() {
        let doc = document(vec![RuleNode::sheet(
            Some("http://h/css/a.css"),
            vec![RuleNode::rule(
                ".a:hover",
                &[(
                    "background-image",
                    "url(data:image/gif;base64,R0lGODlh), url(real.png)",
                )],
            )],
        )]);

        let sources = collect_sources(&doc, &PreloadConfig::default());
        assert_eq!(sources, vec!["http://h/css/real.png"]);
    }

    #[test]
    fn empty_urls_are_never_collected() {
        let doc = document(vec![RuleNode::sheet(
            Some("http://h/css/a.css"),
            vec![
                RuleNode::rule(".a:hover", &[("background-image", "url(\"\")")]),
                RuleNode::rule(".b:focus", &[("background-image", "url(''), url(img/)")]),
                RuleNode::rule(".c:active", &[("background-image", "url(c.png)")]),
            ],
        )]);

        let sources = collect_sources(&doc, &PreloadConfig::default());
        assert_eq!(sources, vec!["http://h/css/c.png"]);
    }

    #[test]
    fn added_images_filter_forced_rules_only() {
        let doc = document(vec![RuleNode::sheet(
            Some("http://h/css/a.css"),
            vec![
                RuleNode::rule(".a:hover", &[("background-image", "url(image-1.png)")]),
                RuleNode::rule(".b", &[("background-image", "url(image-14.png)")]),
                RuleNode::rule(".c", &[("background-image", "url(image-99.png)")]),
            ],
        )]);
        let mut config = PreloadConfig::default();
        config.images.add("image-14.png");

        let sources = collect_sources(&doc, &config);
        assert_eq!(
            sources,
            vec!["http://h/css/image-1.png", "http://h/css/image-14.png"]
        );
    }

    #[test]
    fn ignored_images_are_dropped() {
        let mut config = PreloadConfig::default();
        config.images.ignore("img1.png");

        assert!(collect_sources(&scenario(), &config).is_empty());
    }

    #[test]
    fn enumerate_lookup_scans_every_property() {
        let doc = document(vec![RuleNode::sheet(
            Some("http://h/css/a.css"),
            vec![RuleNode::rule(
                ".a:hover",
                &[
                    ("color", "red"),
                    ("list-style-image", "url(bullet.png)"),
                    ("background", "url(bg.png) no-repeat"),
                ],
            )],
        )]);
        let config = PreloadConfig {
            lookup: PropertyLookup::Enumerate,
            ..PreloadConfig::default()
        };

        let sources = collect_sources(&doc, &config);
        assert_eq!(sources, vec!["http://h/css/bullet.png"]);

        let direct = collect_sources(&doc, &PreloadConfig::default());
        assert!(direct.is_empty());
    }

    #[test]
    fn inline_sheets_leave_relative_paths_alone() {
        let doc = document(vec![RuleNode::sheet(
            None,
            vec![RuleNode::rule(".a:hover", &[("background-image", "url(img.png)")])],
        )]);

        assert_eq!(collect_sources(&doc, &PreloadConfig::default()), vec!["img.png"]);
    }

    #[test]
    fn repeated_collection_is_stable() {
        let config = PreloadConfig::default();
        let doc = scenario();

        assert_eq!(collect_sources(&doc, &config), collect_sources(&doc, &config));
    }
}
