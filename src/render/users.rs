use std::fmt::Write;

use crate::render::escape;
use crate::render::layout::{NavItem, PageContext, page};
use crate::users::{Role, User, UserForm, UserStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Outcome message shown at the top of the users page after a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// What the users page needs besides the list itself.
#[derive(Debug, Default)]
pub struct UsersView<'a> {
    pub notice: Option<&'a Notice>,
    /// User being edited; the form posts to its update route.
    pub editing: Option<&'a User>,
    /// Set when the list could not be loaded.
    pub load_error: Option<&'a str>,
}

#[must_use]
pub fn role_badge(role: Role) -> String {
    format!(
        r#"<span class="badge {}">{}</span>"#,
        role.as_str(),
        role.label()
    )
}

#[must_use]
pub fn users_page(users: &[User], view: &UsersView<'_>, ctx: &PageContext) -> String {
    let mut body = String::from("<h2>User management</h2>");

    if let Some(notice) = view.notice {
        let class = match notice.kind {
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
        };
        let _ = write!(
            body,
            r#"<div class="notice {class}">{}</div>"#,
            escape(&notice.message)
        );
    }
    if let Some(error) = view.load_error {
        let _ = write!(
            body,
            r#"<div class="notice error">Could not load users: {}</div>"#,
            escape(error)
        );
    }

    body.push_str(&user_form(view.editing));
    body.push_str(&user_table(users));
    body.push_str(&stats_panel(&UserStats::from_users(users)));

    page("Users", NavItem::Users, ctx, &body)
}

fn user_form(editing: Option<&User>) -> String {
    let (heading, action, form, password_label, submit) = match editing {
        Some(user) => (
            "Edit user",
            format!("/users/{}", path_segment(&user.id)),
            UserForm::for_user(user),
            "New password",
            "Save",
        ),
        None => (
            "New user",
            "/users".to_string(),
            UserForm::default(),
            "Password *",
            "Create",
        ),
    };
    let password_required = if editing.is_some() { "" } else { " required" };

    let options: String = Role::ALL
        .into_iter()
        .map(|role| {
            let selected = if role == form.role { " selected" } else { "" };
            format!(
                r#"<option value="{value}"{selected}>{label}</option>"#,
                value = role.as_str(),
                label = role.label()
            )
        })
        .collect();

    let cancel = if editing.is_some() {
        r#"<a href="/users">Cancel</a>"#
    } else {
        ""
    };

    format!(
        r#"<form class="user-form" method="post" action="{action}">
<h3>{heading}</h3>
<label>Full name *<input type="text" name="name" value="{name}" required></label>
<label>Email *<input type="email" name="email" value="{email}" required></label>
<label>{password_label}<input type="password" name="password"{password_required}></label>
<label>Role *<select name="role">{options}</select></label>
<div>{cancel}<button type="submit">{submit}</button></div>
</form>"#,
        name = escape(&form.name),
        email = escape(&form.email),
    )
}

fn user_table(users: &[User]) -> String {
    let mut table = String::from(
        "<table><thead><tr><th>User</th><th>Role</th><th>Created</th><th>Actions</th></tr></thead><tbody>",
    );
    for user in users {
        let created = user
            .created_at
            .map_or_else(|| "—".to_string(), |dt| dt.format("%Y-%m-%d").to_string());
        let id = path_segment(&user.id);
        let _ = write!(
            table,
            r#"<tr><td><div>{name}</div><small>{email}</small></td><td>{badge}</td><td>{created}</td><td><a href="/users?edit={id}">Edit</a><form method="post" action="/users/{id}/delete"><label><input type="checkbox" name="confirm" value="true"> Confirm</label><button type="submit">Delete</button></form></td></tr>"#,
            name = escape(&user.name),
            email = escape(&user.email),
            badge = role_badge(user.role),
        );
    }
    table.push_str("</tbody></table>");
    table
}

/// Percent-encoded id, safe both as a path segment and as a query value.
fn path_segment(id: &str) -> String {
    escape(&urlencoding::encode(id))
}

fn stats_panel(stats: &UserStats) -> String {
    format!(
        r#"<div class="stats"><div class="card"><div class="card-title">Total users</div><div class="card-value">{}</div></div><div class="card"><div class="card-title">Administrators</div><div class="card-value">{}</div></div><div class="card"><div class="card-title">Technicians</div><div class="card-value">{}</div></div></div>"#,
        stats.total, stats.admins, stats.technicians
    )
}
