//! HTML for every page, built inline without a template engine.

use crate::alert::Alert;
use crate::database::models::user::User;

const STYLES: &str = r#"
    body {
        font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
        max-width: 900px;
        margin: 40px auto;
        padding: 0 20px;
        background: #f5f5f5;
    }
    nav {
        margin-bottom: 20px;
    }
    nav a {
        margin-right: 15px;
    }
    .container {
        background: white;
        padding: 30px;
        border-radius: 8px;
        box-shadow: 0 2px 4px rgba(0,0,0,0.1);
    }
    .alert {
        padding: 10px;
        border-radius: 4px;
        margin: 10px 0;
    }
    .alert-info {
        color: #31708f;
        background: #d9edf7;
    }
    .alert-danger {
        color: #a94442;
        background: #f2dede;
    }
    .form-group {
        margin: 15px 0;
    }
    label {
        display: block;
        font-weight: bold;
        margin-bottom: 5px;
    }
    input[type="text"],
    input[type="email"],
    input[type="password"] {
        width: 100%;
        padding: 8px;
        border: 1px solid #ddd;
        border-radius: 4px;
        box-sizing: border-box;
    }
    table {
        width: 100%;
        border-collapse: collapse;
    }
    th, td {
        text-align: left;
        padding: 10px;
        border-bottom: 1px solid #ddd;
    }
    form.inline {
        display: inline;
    }
"#;

/// Wrap page content with the shared layout, navigation and pending alerts
pub fn page(site_title: &str, title: &str, user: Option<&User>, alerts: &[Alert], content: &str) -> String {
    let nav = match user {
        Some(user) => {
            let admin_links = if user.is_admin {
                r#"<a href="/users">Users</a><a href="/settings">Settings</a>"#
            } else {
                ""
            };
            format!(
                r#"<a href="/">Home</a>{admin_links}<a href="/users/{id}/edit">Profile</a><form class="inline" method="POST" action="/logout"><button type="submit">Logout {name}</button></form>"#,
                id = user.id,
                name = html_escape(&user.username),
            )
        }
        None => r#"<a href="/login">Login</a>"#.to_string(),
    };

    let alerts: String = alerts
        .iter()
        .map(|alert| {
            format!(
                r#"<div class="alert alert-{}">{}</div>"#,
                alert.kind.as_str(),
                html_escape(&alert.body)
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title} - {site_title}</title>
    <style>{STYLES}</style>
</head>
<body>
    <nav>{nav}</nav>
    <div class="container">
        <h1>{title}</h1>
        {alerts}
        {content}
    </div>
</body>
</html>"#,
        title = html_escape(title),
        site_title = html_escape(site_title),
    )
}

pub fn install_form(username: &str, email: &str, site_title: &str) -> String {
    format!(
        r#"<p>Create the first administrator account to finish setting up.</p>
<form method="POST" action="/install">
    <div class="form-group">
        <label for="site_title">Site title</label>
        <input type="text" id="site_title" name="site_title" value="{site_title}">
    </div>
    <div class="form-group">
        <label for="admin_username">Admin username</label>
        <input type="text" id="admin_username" name="admin_username" value="{username}" required>
    </div>
    <div class="form-group">
        <label for="admin_password">Admin password</label>
        <input type="password" id="admin_password" name="admin_password" required>
    </div>
    <div class="form-group">
        <label for="admin_email">Admin email</label>
        <input type="email" id="admin_email" name="admin_email" value="{email}" required>
    </div>
    <button type="submit">Install</button>
</form>"#,
        site_title = html_escape(site_title),
        username = html_escape(username),
        email = html_escape(email),
    )
}

pub fn login_form(username: &str) -> String {
    format!(
        r#"<form method="POST" action="/login">
    <div class="form-group">
        <label for="username">Username</label>
        <input type="text" id="username" name="username" value="{username}" required autofocus>
    </div>
    <div class="form-group">
        <label for="password">Password</label>
        <input type="password" id="password" name="password">
    </div>
    <button type="submit">Login</button>
</form>"#,
        username = html_escape(username),
    )
}

pub fn home(user: &User) -> String {
    format!(
        r#"<p>Signed in as <strong>{}</strong>{}.</p>"#,
        html_escape(&user.username),
        if user.is_admin { " (administrator)" } else { "" },
    )
}

pub fn user_list(users: &[User], current_id: i64) -> String {
    let rows: String = users
        .iter()
        .map(|user| {
            let delete = if user.id == current_id {
                String::new()
            } else {
                format!(
                    r#"<form class="inline" method="POST" action="/users/{}/delete"><button type="submit">Delete</button></form>"#,
                    user.id
                )
            };
            format!(
                r#"<tr><td>{name}</td><td>{email}</td><td>{admin}</td><td>{disabled}</td><td><a href="/users/{id}/edit">Edit</a> {delete}</td></tr>"#,
                id = user.id,
                name = html_escape(&user.username),
                email = html_escape(&user.email),
                admin = if user.is_admin { "yes" } else { "no" },
                disabled = if user.is_disabled { "yes" } else { "no" },
            )
        })
        .collect();

    format!(
        r#"<p><a href="/users/new">Create user</a></p>
<table>
    <tr><th>Username</th><th>Email</th><th>Admin</th><th>Disabled</th><th></th></tr>
    {rows}
</table>"#
    )
}

/// Create or edit form. `show_flags` adds the admin-only checkboxes.
pub fn user_form(action: &str, user: &User, show_flags: bool) -> String {
    let flags = if show_flags {
        format!(
            r#"<div class="form-group">
        <label><input type="checkbox" name="is_admin"{admin}> Administrator</label>
        <label><input type="checkbox" name="is_disabled"{disabled}> Disabled</label>
    </div>"#,
            admin = if user.is_admin { " checked" } else { "" },
            disabled = if user.is_disabled { " checked" } else { "" },
        )
    } else {
        String::new()
    };

    format!(
        r#"<form method="POST" action="{action}">
    <div class="form-group">
        <label for="username">Username</label>
        <input type="text" id="username" name="username" value="{username}" required>
    </div>
    <div class="form-group">
        <label for="email">Email</label>
        <input type="email" id="email" name="email" value="{email}">
    </div>
    <div class="form-group">
        <label for="password">Password</label>
        <input type="password" id="password" name="password">
    </div>
    <div class="form-group">
        <label for="password2">Confirm password</label>
        <input type="password" id="password2" name="password2">
    </div>
    {flags}
    <button type="submit">Save</button>
</form>"#,
        action = html_escape(action),
        username = html_escape(&user.username),
        email = html_escape(&user.email),
    )
}

pub fn settings_form(site_title: &str) -> String {
    format!(
        r#"<form method="POST" action="/settings">
    <div class="form-group">
        <label for="site_title">Site title</label>
        <input type="text" id="site_title" name="site_title" value="{}" required>
    </div>
    <button type="submit">Save</button>
</form>"#,
        html_escape(site_title)
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
