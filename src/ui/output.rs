use crate::output::is_quiet;
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::DATABASE, text.style(theme().header.clone()));
}

pub fn success(label: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn info(label: &str, value: &str) {
    if is_quiet() {
        return;
    }
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().info.clone()),
        label.style(theme().dim.clone()),
        value
    );
}

pub fn item_added(uri: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::NEW.style(theme().success.clone()), uri);
}

pub fn item_updated(uri: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::MOD.style(theme().warn.clone()), uri);
}

pub fn item_deleted(label: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::DEL.style(theme().error.clone()), label);
}

pub fn empty(label: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::EMPTY, label.style(theme().dim.clone()));
}
