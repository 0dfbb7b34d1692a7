pub mod css_sheet;
