use std::cell::RefCell;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::glib;
use gtk4::prelude::*;
use libadwaita as adw;
use adw::prelude::*;
use gio::SimpleAction;

use super::compliments::build_compliments_page;
use super::dialogs::{show_about_dialog, show_instructions_dialog};
use super::gallery::build_gallery_page;
use super::home::build_home_page;
use super::quiz::build_quiz_page;
use super::state::AppState;
use super::welcome::build_welcome_page;
use crate::anim::scheduler::{Scheduler, TICK_PERIOD};
use crate::media::audio::MusicPlayer;
use crate::media::cache::ImageStore;
use crate::media::decode::detect_backend;
use crate::media::music_file;

const APP_ID: &str = "io.github.surprise.Surprise";

const CSS: &str = "\
.surprise-board { padding: 6px; }
.surprise-card { border-radius: 12px; background: alpha(@accent_bg_color, 0.15); }
.surprise-card.active { background: @accent_bg_color; color: @accent_fg_color; }
.surprise-card.matched { background: alpha(@success_bg_color, 0.85); color: @success_fg_color; }
";

pub fn run() {
    glib::set_prgname(Some(APP_ID));
    let app = adw::Application::builder().application_id(APP_ID).build();

    app.connect_activate(move |app| {
        load_css();

        let scheduler = Scheduler::new(TICK_PERIOD);
        let images = Rc::new(ImageStore::new(detect_backend()));
        let music = Rc::new(MusicPlayer::new(&music_file()));
        let state = Rc::new(RefCell::new(AppState::new(
            scheduler.clone(),
            images,
            music,
        )));

        let instructions_action = SimpleAction::new("instructions", None);
        instructions_action.connect_activate({
            let app = app.clone();
            move |_, _| {
                show_instructions_dialog(&app);
            }
        });
        app.add_action(&instructions_action);

        let about_action = SimpleAction::new("about", None);
        about_action.connect_activate({
            let app = app.clone();
            move |_, _| {
                show_about_dialog(&app);
            }
        });
        app.add_action(&about_action);

        let quit_action = SimpleAction::new("quit", None);
        quit_action.connect_activate({
            let app = app.clone();
            move |_, _| app.quit()
        });
        app.add_action(&quit_action);

        let title = gtk::Label::new(None);
        title.set_markup("<b>Surprise</b>");
        title.set_halign(gtk::Align::Center);

        let header = adw::HeaderBar::builder().title_widget(&title).build();
        header.add_css_class("flat");

        let menu_model = gio::Menu::new();
        menu_model.append(Some("How it works"), Some("app.instructions"));
        menu_model.append(Some("About Surprise"), Some("app.about"));
        menu_model.append(Some("Quit"), Some("app.quit"));
        let menu_button = gtk::MenuButton::builder()
            .icon_name("open-menu-symbolic")
            .menu_model(&menu_model)
            .build();
        header.pack_end(&menu_button);

        let view_stack = gtk::Stack::new();
        view_stack.set_hexpand(true);
        view_stack.set_vexpand(true);
        view_stack.set_transition_type(gtk::StackTransitionType::SlideLeft);
        view_stack.set_transition_duration(300);

        state.borrow_mut().view_stack = Some(view_stack.clone());

        let welcome_view = build_welcome_page(&state);
        view_stack.add_named(&welcome_view, Some("welcome"));

        let main_view = build_main_view(&state);
        view_stack.add_named(&main_view, Some("main"));

        view_stack.set_visible_child_name("welcome");

        let toolbar = adw::ToolbarView::new();
        toolbar.set_hexpand(true);
        toolbar.set_vexpand(true);
        toolbar.add_top_bar(&header);
        toolbar.set_content(Some(&view_stack));

        let win = adw::ApplicationWindow::builder()
            .application(app)
            .title("Surprise")
            .icon_name(APP_ID)
            .default_width(900)
            .default_height(680)
            .content(&toolbar)
            .build();
        win.set_size_request(480, 560);

        // One shared driver advances every animation and repaints.
        let state_tick = state.clone();
        glib::timeout_add_local(scheduler.period(), move || {
            scheduler.tick();
            let st = state_tick.borrow();
            for canvas in &st.canvases {
                canvas.queue_draw();
            }
            glib::ControlFlow::Continue
        });

        win.connect_close_request({
            let state = state.clone();
            move |_| {
                state.borrow().music.stop();
                glib::Propagation::Proceed
            }
        });

        win.present();
    });

    app.run();
}

fn build_main_view(state: &Rc<RefCell<AppState>>) -> gtk::Widget {
    let root = gtk::Box::new(gtk::Orientation::Vertical, 0);
    root.set_hexpand(true);
    root.set_vexpand(true);

    let greeting = gtk::Label::new(Some("Hellooo! 💛"));
    greeting.add_css_class("title-2");
    greeting.set_margin_top(8);
    root.append(&greeting);
    state.borrow_mut().greeting_label = Some(greeting);

    let tabs = adw::ViewStack::new();
    tabs.set_hexpand(true);
    tabs.set_vexpand(true);

    tabs.add_titled_with_icon(
        &build_home_page(state),
        Some("home"),
        "Home",
        "go-home-symbolic",
    );
    tabs.add_titled_with_icon(
        &build_gallery_page(state),
        Some("memories"),
        "Memories",
        "image-x-generic-symbolic",
    );
    tabs.add_titled_with_icon(
        &build_quiz_page(state),
        Some("game"),
        "Game",
        "applications-games-symbolic",
    );
    tabs.add_titled_with_icon(
        &build_compliments_page(),
        Some("compliments"),
        "Compliments",
        "emblem-favorite-symbolic",
    );
    root.append(&tabs);

    let switcher = adw::ViewSwitcherBar::builder().stack(&tabs).reveal(true).build();
    root.append(&switcher);

    root.upcast()
}

fn load_css() {
    let Some(display) = gtk::gdk::Display::default() else {
        return;
    };
    let provider = gtk::CssProvider::new();
    provider.load_from_data(CSS);
    gtk::style_context_add_provider_for_display(
        &display,
        &provider,
        gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );
}
