pub mod figure_view;
pub mod panels;
