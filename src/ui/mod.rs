//! UI module - reusable widgets shared by the tab views

pub mod components;
