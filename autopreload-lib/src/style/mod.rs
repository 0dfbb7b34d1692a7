pub mod path_resolver;
pub mod selector_filter;
pub mod tree_walker;
