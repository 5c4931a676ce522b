mod anim;
mod game;
mod media;
mod ui;

fn main() {
    ui::app::run();
}
