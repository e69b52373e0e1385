pub mod extractor;
pub mod test_utils;
pub mod time;
pub mod validation;
