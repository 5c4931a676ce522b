use std::path::PathBuf;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::glib;

use crate::anim::balloons::BalloonDrift;
use crate::anim::confetti::ConfettiSystem;
use crate::anim::heart::HeartPulse;
use crate::anim::scheduler::Scheduler;
use crate::anim::surface::SceneStore;
use crate::game::MatchGame;
use crate::media::audio::MusicPlayer;
use crate::media::cache::ImageStore;

use super::quiz::GAME_WORDS;

/// Fallback canvas size while the drawing area is not yet realized.
pub const FALLBACK_CANVAS_WIDTH: f64 = 800.0;
pub const FALLBACK_CANVAS_HEIGHT: f64 = 500.0;

pub struct AppState {
    // Shared engine pieces; every field is initialized at construction.
    pub confetti: ConfettiSystem,
    pub heart: HeartPulse,
    pub balloons_left: BalloonDrift,
    pub balloons_right: BalloonDrift,
    pub game: MatchGame,
    pub images: Rc<ImageStore>,
    pub music: Rc<MusicPlayer>,

    // Window chrome.
    pub view_stack: Option<gtk::Stack>,
    pub greeting_label: Option<gtk::Label>,

    // Canvases redrawn once per scheduler tick.
    pub canvases: Vec<gtk::DrawingArea>,
    pub home_store: Option<Rc<SceneStore>>,

    // Home tab.
    pub home_column: Option<gtk::Box>,
    pub dates_box: Option<gtk::Box>,
    pub dates_labels: Vec<(gtk::Label, u32, u32, &'static str)>,
    pub dates_refresh: Option<glib::SourceId>,

    // Memories tab; the view owns the navigation index, not the cache.
    pub gallery_files: Vec<PathBuf>,
    pub gallery_index: usize,
    pub gallery_picture: Option<gtk::Picture>,
    pub gallery_status: Option<gtk::Label>,

    // Matching game tab.
    pub quiz_buttons: Vec<gtk::Button>,
    pub quiz_status: Option<gtk::Label>,
}

impl AppState {
    pub fn new(scheduler: Scheduler, images: Rc<ImageStore>, music: Rc<MusicPlayer>) -> Self {
        AppState {
            confetti: ConfettiSystem::new(scheduler.clone()),
            heart: HeartPulse::new(scheduler.clone()),
            balloons_left: BalloonDrift::new(scheduler.clone()),
            balloons_right: BalloonDrift::new(scheduler.clone()),
            game: MatchGame::with_pairs(scheduler, &GAME_WORDS),
            images,
            music,
            view_stack: None,
            greeting_label: None,
            canvases: Vec::new(),
            home_store: None,
            home_column: None,
            dates_box: None,
            dates_labels: Vec::new(),
            dates_refresh: None,
            gallery_files: Vec::new(),
            gallery_index: 0,
            gallery_picture: None,
            gallery_status: None,
            quiz_buttons: Vec::new(),
            quiz_status: None,
        }
    }
}
