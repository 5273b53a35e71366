pub mod compare;
pub mod form;
pub mod header;
pub mod result;
pub mod simulator;
pub mod slots;
pub mod statusbar;
pub mod strategy;
pub mod timetable;
