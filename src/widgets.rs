pub mod controls;
pub mod datatable;
pub mod search_input;
