pub mod app;
mod canvas;
mod compliments;
mod dates;
mod dialogs;
mod gallery;
mod home;
mod quiz;
mod state;
mod welcome;
