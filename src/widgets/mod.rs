pub mod controls;
pub mod debug;
pub mod filter_panel;
pub mod info;
pub mod table;
