//! Builds the tagged rule tree from CSS text using LightningCSS.
//!
//! The tree is built once up front, so the walker never has to look at the
//! parser's own rule types.

use crate::error::{PreloadError, Result};
use crate::sheet::sheet_tree::{Declarations, GroupNode, RuleLeaf, RuleNode, SheetNode, StyleDocument};
use crate::style::path_resolver::url_tokens;
use lightningcss::declaration::DeclarationBlock;
use lightningcss::rules::{style::StyleRule, CssRule, CssRuleList};
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet as LightningStyleSheet};
use lightningcss::traits::ToCss;
use std::fs;
use std::path::Path;

/// Parse a stylesheet loaded from `href` (inline sheets pass `None`).
///
/// Rules LightningCSS cannot make sense of are dropped rather than failing the sheet.
pub fn parse_stylesheet(css_text: &str, href: Option<&str>) -> Result<SheetNode> {
    let parser_opts = ParserOptions {
        filename: href.unwrap_or_default().to_string(),
        error_recovery: true,
        ..ParserOptions::default()
    };

    let sheet = LightningStyleSheet::parse(css_text, parser_opts).map_err(|e| {
        PreloadError::InvalidCss {
            sheet: href.unwrap_or("<inline>").to_string(),
            message: e.to_string(),
        }
    })?;

    let mut node = SheetNode::new(href.map(str::to_string));
    convert_rules(&sheet.rules, &mut node.children);
    log::debug!(
        "Parsed stylesheet {} ({} top-level rules)",
        href.unwrap_or("<inline>"),
        node.children.len()
    );
    Ok(node)
}

/// Read a stylesheet from disk. `href` defaults to the file's `file://` URL.
pub fn load_stylesheet<P: AsRef<Path>>(path: P, href: Option<&str>) -> Result<SheetNode> {
    let path = path.as_ref();
    let css_text = fs::read_to_string(path)?;
    let href = match href {
        Some(href) => href.to_string(),
        None => file_url(&fs::canonicalize(path)?),
    };
    parse_stylesheet(&css_text, Some(&href))
}

/// Parse several `(css, href)` pairs into one document, in order.
pub fn parse_document<'a, I>(sheets: I) -> Result<StyleDocument>
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    let mut document = StyleDocument::new();
    for (css_text, href) in sheets {
        document.push_sheet(parse_stylesheet(css_text, href)?);
    }
    Ok(document)
}

pub fn file_url(path: &Path) -> String {
    let path = path.to_string_lossy().replace('\\', "/");
    if path.starts_with('/') {
        format!("file://{}", path)
    } else {
        format!("file:///{}", path)
    }
}

fn convert_rules(rules: &CssRuleList<'_>, out: &mut Vec<RuleNode>) {
    for rule in &rules.0 {
        match rule {
            CssRule::Style(style_rule) => {
                out.push(RuleNode::Rule(convert_style_rule(style_rule)));
                if !style_rule.rules.0.is_empty() {
                    let mut nested = GroupNode::new(selector_text(style_rule));
                    convert_rules(&style_rule.rules, &mut nested.children);
                    out.push(RuleNode::RuleGroup(nested));
                }
            }
            CssRule::Media(media_rule) => {
                let query = media_rule
                    .query
                    .to_css_string(PrinterOptions::default())
                    .unwrap_or_default();
                let mut group = GroupNode::new(format!("@media {}", query));
                convert_rules(&media_rule.rules, &mut group.children);
                out.push(RuleNode::RuleGroup(group));
            }
            CssRule::Supports(supports_rule) => {
                let condition = supports_rule
                    .condition
                    .to_css_string(PrinterOptions::default())
                    .unwrap_or_default();
                let mut group = GroupNode::new(format!("@supports {}", condition));
                convert_rules(&supports_rule.rules, &mut group.children);
                out.push(RuleNode::RuleGroup(group));
            }
            CssRule::LayerBlock(layer_rule) => {
                let mut group = GroupNode::new("@layer");
                convert_rules(&layer_rule.rules, &mut group.children);
                out.push(RuleNode::RuleGroup(group));
            }
            CssRule::Container(container_rule) => {
                let mut group = GroupNode::new("@container");
                convert_rules(&container_rule.rules, &mut group.children);
                out.push(RuleNode::RuleGroup(group));
            }
            // @font-face, @keyframes, @import etc. never carry state selectors.
            _ => {}
        }
    }
}

fn selector_text(style_rule: &StyleRule<'_>) -> String {
    style_rule
        .selectors
        .to_css_string(PrinterOptions::default())
        .unwrap_or_default()
}

/// Copy a single StyleRule's selector text and declarations into a RuleLeaf.
fn convert_style_rule(style_rule: &StyleRule<'_>) -> RuleLeaf {
    let mut declarations = Declarations::new();
    copy_declarations(&style_rule.declarations, &mut declarations);
    RuleLeaf::new(selector_text(style_rule), declarations)
}

/// Normal declarations first, then `!important` ones, so the latter win on lookup.
fn copy_declarations(block: &DeclarationBlock<'_>, out: &mut Declarations) {
    for property in block
        .declarations
        .iter()
        .chain(block.important_declarations.iter())
    {
        let name = property.property_id().name().to_string();
        let Ok(value) = property.value_to_css_string(PrinterOptions::default()) else {
            continue;
        };
        let background_images = expand_background_shorthand(&name, &value);
        out.push(name, value);
        if let Some(images) = background_images {
            out.push("background-image", images);
        }
    }
}

/// The `background` shorthand also sets `background-image`; mirror that as a longhand.
fn expand_background_shorthand(name: &str, value: &str) -> Option<String> {
    if !name.eq_ignore_ascii_case("background") {
        return None;
    }
    let images = url_tokens(value);
    if images.is_empty() {
        None
    } else {
        Some(images.join(", "))
    }
}
