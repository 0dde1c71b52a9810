//! DOM Binder
//!
//! Attaches the theme toggle, nav highlighting and signup form listeners.
//! Each binding checks that its elements exist and silently does nothing
//! otherwise.

use crate::document::{Document, DomEvent, Element, Selector};
use crate::forms::{check_confirmation, check_email, check_username, FieldState, PasswordStrength};
use crate::preferences::{AppPreferences, Theme};

pub const DARK_THEME_CLASS: &str = "dark-theme";
pub const MOON_ICON: &str = "fa-moon";
pub const SUN_ICON: &str = "fa-sun";
pub const INVALID_CLASS: &str = "is-invalid";

const INVALID_BORDER: &str = "#dc3545";
const MATCH_BORDER: &str = "#28a745";
const NEUTRAL_BORDER: &str = "#ced4da";

fn theme_icon<D: Document>(doc: &D) -> Option<D::Element> {
    doc.query(&Selector::id("theme-toggle").descendant(Selector::tag("i")))
}

fn show_icon<E: Element>(icon: &E, theme: Theme) {
    let (from, to) = if theme.is_dark() {
        (MOON_ICON, SUN_ICON)
    } else {
        (SUN_ICON, MOON_ICON)
    };
    icon.remove_class(from);
    icon.add_class(to);
}

/// Restore the stored theme and wire `#theme-toggle`.
///
/// The stored dark theme is only restored when the toggle's icon is on the
/// page. Returns whether a toggle button was bound.
pub fn bind_theme_toggle<D: Document>(doc: &D, prefs: &AppPreferences) -> bool {
    let icon = theme_icon(doc);

    if let (Theme::Dark, Some(icon), Some(body)) = (prefs.theme(), icon.as_ref(), doc.body()) {
        body.add_class(DARK_THEME_CLASS);
        show_icon(icon, Theme::Dark);
    }

    let Some(button) = doc.by_id("theme-toggle") else {
        return false;
    };

    let doc = doc.clone();
    let prefs = prefs.clone();
    button.listen(
        DomEvent::Click,
        Box::new(move || {
            let Some(body) = doc.body() else {
                return;
            };
            let theme = if body.toggle_class(DARK_THEME_CLASS) {
                Theme::Dark
            } else {
                Theme::Light
            };
            if let Some(icon) = icon.as_ref() {
                show_icon(icon, theme);
            }
            prefs.set_theme(theme);
            tracing::debug!("Theme switched to {}", theme);
        }),
    );
    true
}

/// Mark every `.nav-link` pointing at the current page as `active`
pub fn highlight_active_links<D: Document>(doc: &D) -> usize {
    let location = doc.location();
    let mut active = 0;
    for link in doc.query_all(&Selector::class("nav-link")) {
        if link.href().as_deref() == Some(location.as_str()) {
            link.add_class("active");
            active += 1;
        }
    }
    active
}

fn show_field_state<E: Element>(field: &E, state: FieldState, valid_border: &str) {
    match state {
        FieldState::Valid => {
            field.set_style("border-color", valid_border);
            field.remove_class(INVALID_CLASS);
        }
        FieldState::Invalid => {
            field.set_style("border-color", INVALID_BORDER);
            field.add_class(INVALID_CLASS);
        }
    }
}

fn bind_focus_effects<E: Element>(input: &E) {
    let target = input.clone();
    input.listen(
        DomEvent::Focus,
        Box::new(move || {
            target.set_style("transform", "scale(1.02)");
            target.set_style("box-shadow", "0 5px 15px rgba(0, 123, 255, 0.2)");
        }),
    );

    let target = input.clone();
    input.listen(
        DomEvent::Blur,
        Box::new(move || {
            target.set_style("transform", "scale(1)");
            target.set_style("box-shadow", "none");
        }),
    );
}

fn bind_strength_meter<D: Document>(doc: &D, password: &D::Element) {
    let meter = match attach_strength_meter(doc, password) {
        Ok(meter) => meter,
        Err(e) => {
            tracing::warn!("Password strength indicator unavailable: {}", e);
            return;
        }
    };

    let field = password.clone();
    password.listen(
        DomEvent::Input,
        Box::new(move || {
            let strength = PasswordStrength::classify(&field.value());
            meter.set_class_name(&strength.indicator_class());
        }),
    );
}

fn attach_strength_meter<D: Document>(
    doc: &D,
    password: &D::Element,
) -> Result<D::Element, crate::document::DocumentError> {
    let container = doc.create_element("div")?;
    container.set_class_name("password-strength-container");
    let meter = doc.create_element("div")?;
    meter.set_class_name("password-strength");
    container.append_child(&meter)?;

    if let Some(parent) = password.parent() {
        parent.append_child(&container)?;
    }
    Ok(meter)
}

fn bind_validation<E, F>(field: &E, valid_border: &'static str, check: F)
where
    E: Element,
    F: Fn(&str) -> FieldState + 'static,
{
    let target = field.clone();
    field.listen(
        DomEvent::Input,
        Box::new(move || {
            let state = check(&target.value());
            show_field_state(&target, state, valid_border);
        }),
    );
}

/// Wire the `.signup-form` field feedback. Returns whether a form was found.
pub fn bind_signup_form<D: Document>(doc: &D) -> bool {
    let Some(form) = doc.query(&Selector::class("signup-form")) else {
        return false;
    };

    for input in form.query_all(&Selector::class("form-control")) {
        bind_focus_effects(&input);
    }

    let password1 = doc.by_id("id_password1");
    let password2 = doc.by_id("id_password2");

    if let Some(password) = &password1 {
        bind_strength_meter(doc, password);
    }

    if let (Some(password), Some(confirmation)) = (password1, password2) {
        bind_validation(&confirmation, MATCH_BORDER, move |value| {
            check_confirmation(&password.value(), value)
        });
    }

    if let Some(email) = doc.by_id("id_email") {
        bind_validation(&email, NEUTRAL_BORDER, check_email);
    }

    if let Some(username) = doc.by_id("id_username") {
        bind_validation(&username, NEUTRAL_BORDER, check_username);
    }

    true
}
