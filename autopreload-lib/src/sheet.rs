pub mod sheet_tree {
    /// Ordered property/value pairs of one style rule, in declaration order.
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct Declarations {
        entries: Vec<(String, String)>,
    }

    impl Declarations {
        pub fn new() -> Self {
            Declarations {
                entries: Vec::new(),
            }
        }

        pub fn push(&mut self, property: impl Into<String>, value: impl Into<String>) {
            self.entries.push((property.into(), value.into()));
        }

        /// Direct property lookup. A later declaration of the same property wins.
        pub fn get(&self, property: &str) -> Option<&str> {
            self.entries
                .iter()
                .rev()
                .find(|(name, _)| name.eq_ignore_ascii_case(property))
                .map(|(_, value)| value.as_str())
        }

        pub fn contains(&self, property: &str) -> bool {
            self.get(property).is_some()
        }

        pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
            self.entries
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str()))
        }

        pub fn len(&self) -> usize {
            self.entries.len()
        }

        pub fn is_empty(&self) -> bool {
            self.entries.is_empty()
        }
    }

    impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Declarations {
        fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
            let mut declarations = Declarations::new();
            for (property, value) in iter {
                declarations.push(property, value);
            }
            declarations
        }
    }

    /// A node of the style-rule tree.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum RuleNode {
        Stylesheet(SheetNode),
        RuleGroup(GroupNode),
        Rule(RuleLeaf),
    }

    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct SheetNode {
        /// Absolute URL the sheet was loaded from. Inline sheets have none.
        pub href: Option<String>,
        pub children: Vec<RuleNode>,
    }

    /// `@media`, `@supports`, `@layer` and friends, or the nested rules of a style rule.
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct GroupNode {
        pub prelude: String,
        pub children: Vec<RuleNode>,
    }

    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct RuleLeaf {
        pub selector_text: String,
        pub declarations: Declarations,
    }

    /// The ordered set of stylesheets attached to a document.
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct StyleDocument {
        pub sheets: Vec<RuleNode>,
    }

    impl SheetNode {
        pub fn new(href: Option<String>) -> Self {
            SheetNode {
                href,
                children: Vec::new(),
            }
        }
    }

    impl GroupNode {
        pub fn new(prelude: impl Into<String>) -> Self {
            GroupNode {
                prelude: prelude.into(),
                children: Vec::new(),
            }
        }
    }

    impl RuleLeaf {
        pub fn new(selector_text: impl Into<String>, declarations: Declarations) -> Self {
            RuleLeaf {
                selector_text: selector_text.into(),
                declarations,
            }
        }
    }

    impl RuleNode {
        /// Shorthand for a stylesheet node.
        pub fn sheet(href: Option<&str>, children: Vec<RuleNode>) -> Self {
            RuleNode::Stylesheet(SheetNode {
                href: href.map(str::to_string),
                children,
            })
        }

        pub fn group(prelude: &str, children: Vec<RuleNode>) -> Self {
            RuleNode::RuleGroup(GroupNode {
                prelude: prelude.to_string(),
                children,
            })
        }

        pub fn rule(selector_text: &str, declarations: &[(&str, &str)]) -> Self {
            RuleNode::Rule(RuleLeaf::new(
                selector_text,
                declarations.iter().copied().collect(),
            ))
        }

        /// Number of style rules below (and including) this node.
        pub fn rule_count(&self) -> usize {
            match self {
                RuleNode::Stylesheet(sheet) => sheet.children.iter().map(Self::rule_count).sum(),
                RuleNode::RuleGroup(group) => group.children.iter().map(Self::rule_count).sum(),
                RuleNode::Rule(_) => 1,
            }
        }
    }

    impl StyleDocument {
        pub fn new() -> Self {
            StyleDocument { sheets: Vec::new() }
        }

        /// A document holding the single stylesheet parsed from `css_text`.
        pub fn from_css(css_text: &str, href: Option<&str>) -> crate::error::Result<Self> {
            let sheet = crate::parser::css_sheet::parse_stylesheet(css_text, href)?;
            Ok(StyleDocument {
                sheets: vec![RuleNode::Stylesheet(sheet)],
            })
        }

        pub fn push_sheet(&mut self, sheet: SheetNode) {
            self.sheets.push(RuleNode::Stylesheet(sheet));
        }

        pub fn rule_count(&self) -> usize {
            self.sheets.iter().map(RuleNode::rule_count).sum()
        }
    }
}
