pub mod calendar_view;
