pub mod category_expander;
pub mod clean_data;
pub mod load_data;
pub mod process_data;
