pub mod use_cases;

pub use use_cases::category_expander::CategoryExpander;
pub use use_cases::clean_data::DataCleaner;
pub use use_cases::load_data::{DataLoader, LoadedData};
pub use use_cases::process_data::{ProcessDataRequest, ProcessDataSummary, ProcessDataUseCase};
