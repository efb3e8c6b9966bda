use crate::render::escape;

/// Name of the cookie holding the logged-in user's display name.
pub const USER_COOKIE: &str = "coop_user";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavItem {
    Dashboard,
    Users,
}

/// Page-level options shared by every screen.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    /// Logged-in marker, if the browser carries one.
    pub user: Option<String>,
    /// Reload the page every this many seconds.
    pub refresh_secs: Option<u64>,
}

/// Read the logged-in marker out of a `Cookie` header value.
#[must_use]
pub fn user_from_cookies(cookie_header: &str) -> Option<String> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == USER_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[must_use]
pub fn header(active: NavItem, user: Option<&str>) -> String {
    let link = |item: NavItem, href: &str, label: &str| {
        let class = if item == active { "nav-link active" } else { "nav-link" };
        format!(r#"<a class="{class}" href="{href}">{label}</a>"#)
    };

    let session = user.map_or_else(String::new, |name| {
        format!(
            r#"<div class="session"><span>Signed in as {}</span><form method="post" action="/logout"><button type="submit">Log out</button></form></div>"#,
            escape(name)
        )
    });

    format!(
        r#"<header><h1>Smart Poultry House</h1><nav>{dashboard}{users}</nav>{session}</header>"#,
        dashboard = link(NavItem::Dashboard, "/", "Dashboard"),
        users = link(NavItem::Users, "/users", "Users"),
    )
}

#[must_use]
pub fn page(title: &str, active: NavItem, ctx: &PageContext, body: &str) -> String {
    let refresh = ctx
        .refresh_secs
        .map(|secs| format!(r#"<meta http-equiv="refresh" content="{secs}">"#))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
{refresh}
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
{header}
<main>{body}</main>
</body>
</html>"#,
        title = escape(title),
        header = header(active, ctx.user.as_deref()),
    )
}

const STYLE: &str = r#"
* { box-sizing: border-box; }
body { margin: 0; font-family: system-ui, sans-serif; background: #f3f4f6; color: #1e293b; }
header { background: #15803d; color: #fff; text-align: center; padding: 1rem; }
header h1 { margin: 0 0 .75rem; font-size: 1.5rem; }
nav { display: flex; justify-content: center; gap: 3rem; }
.nav-link { color: #fff; text-decoration: none; font-weight: 500; }
.nav-link.active { text-decoration: underline; }
.session { display: flex; justify-content: flex-end; align-items: center; gap: 1rem; margin-top: .75rem; }
main { max-width: 72rem; margin: 0 auto; padding: 1.5rem; }
.warning { background: #fef3c7; border: 1px solid #f59e0b; padding: .75rem 1rem; border-radius: .5rem; margin-bottom: 1rem; }
.notice { padding: .75rem 1rem; border-radius: .5rem; margin-bottom: 1rem; }
.notice.success { background: #dcfce7; }
.notice.error { background: #fee2e2; }
.cards { display: grid; grid-template-columns: repeat(auto-fit, minmax(12rem, 1fr)); gap: 1rem; }
.card { background: #fff; border-radius: .75rem; padding: 1.25rem; box-shadow: 0 1px 3px rgba(0,0,0,.1); border-left: 4px solid #22c55e; }
.card.alert { border-left-color: #ef4444; }
.card.cold { border-left-color: #3b82f6; }
.card-title { font-size: .875rem; color: #64748b; }
.card-value { font-size: 1.25rem; font-weight: 600; }
.card-hint { font-size: .75rem; color: #94a3b8; }
.charts { display: grid; grid-template-columns: repeat(auto-fit, minmax(22rem, 1fr)); gap: 1.5rem; margin-top: 1.5rem; }
.chart-panel { background: #fff; border-radius: .75rem; padding: 1rem; box-shadow: 0 1px 3px rgba(0,0,0,.1); }
.chart { width: 100%; height: auto; font-size: 10px; fill: #64748b; }
.chart-loading { padding: 3rem; text-align: center; color: #94a3b8; }
.ranges { display: flex; gap: .5rem; margin: 1.5rem 0 0; }
.ranges a { padding: .25rem .75rem; border: 1px solid #cbd5e1; border-radius: .375rem; text-decoration: none; color: inherit; }
.ranges a.active { background: #2563eb; border-color: #2563eb; color: #fff; }
.loading { text-align: center; margin-top: 2.5rem; color: #64748b; }
table { width: 100%; border-collapse: collapse; background: #fff; }
th, td { padding: .75rem 1rem; text-align: left; border-bottom: 1px solid #e5e7eb; }
.badge { padding: .125rem .5rem; border-radius: 9999px; font-size: .75rem; }
.badge.admin { background: #fee2e2; color: #991b1b; }
.badge.technician { background: #dbeafe; color: #1e40af; }
.badge.user { background: #dcfce7; color: #166534; }
.stats { display: grid; grid-template-columns: repeat(3, 1fr); gap: 1.5rem; margin-top: 2rem; }
form.user-form { background: #fff; padding: 1.5rem; border-radius: .5rem; margin-bottom: 1.5rem; display: grid; grid-template-columns: 1fr 1fr; gap: 1rem; }
"#;
