//! Server-rendered HTML pages.

use axum::http::StatusCode;
use driveshelf_services::Breadcrumb;

/// One row of the dashboard file table.
#[derive(Debug, Clone)]
pub struct FileRow {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub modified: String,
    pub is_folder: bool,
}

pub struct DashboardView<'a> {
    pub folder_id: &'a str,
    pub breadcrumbs: &'a [Breadcrumb],
    pub files: &'a [FileRow],
    pub flash: Option<&'a str>,
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn dashboard_href(folder_id: &str) -> String {
    format!("/dashboard?folder_id={}", urlencoding::encode(folder_id))
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · Driveshelf</title>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape(title),
        body = body,
    )
}

pub fn landing() -> String {
    layout(
        "Welcome",
        r#"<main class="landing">
<h1>Driveshelf</h1>
<p>Browse, upload, download and delete the files in your Google Drive.</p>
<a class="button" href="/authorize">Sign in with Google</a>
</main>"#,
    )
}

pub fn dashboard(view: &DashboardView<'_>) -> String {
    let mut trail = format!(r#"<a href="{}">My Drive</a>"#, dashboard_href("root"));
    for crumb in view.breadcrumbs {
        trail.push_str(&format!(
            r#" / <a href="{}">{}</a>"#,
            escape(&dashboard_href(&crumb.id)),
            escape(&crumb.name)
        ));
    }

    let flash = view
        .flash
        .map(|msg| format!(r#"<p class="flash">{}</p>"#, escape(msg)))
        .unwrap_or_default();

    let rows = if view.files.is_empty() {
        r#"<tr><td colspan="4">This folder is empty.</td></tr>"#.to_string()
    } else {
        view.files
            .iter()
            .map(|f| file_row(f, view.folder_id))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let body = format!(
        r#"<header>
<nav class="breadcrumbs">{trail}</nav>
<a href="/logout">Sign out</a>
</header>
{flash}
<form class="upload" action="/upload" method="post" enctype="multipart/form-data">
<input type="hidden" name="folder_id" value="{folder_id}">
<input type="file" name="file" required>
<button type="submit">Upload</button>
</form>
<table class="files">
<thead><tr><th>Name</th><th>Type</th><th>Modified</th><th></th></tr></thead>
<tbody>
{rows}
</tbody>
</table>"#,
        trail = trail,
        flash = flash,
        folder_id = escape(view.folder_id),
        rows = rows,
    );

    layout("My Drive", &body)
}

fn file_row(file: &FileRow, folder_id: &str) -> String {
    let name = if file.is_folder {
        format!(
            r#"<a class="folder" href="{}">{}</a>"#,
            escape(&dashboard_href(&file.id)),
            escape(&file.name)
        )
    } else {
        escape(&file.name)
    };

    let download = if file.is_folder {
        String::new()
    } else {
        format!(
            r#"<a href="/download/{}">Download</a>"#,
            escape(&urlencoding::encode(&file.id))
        )
    };

    format!(
        r#"<tr>
<td>{name}</td>
<td>{mime}</td>
<td>{modified}</td>
<td>{download}
<form action="/delete/{id}" method="post">
<input type="hidden" name="folder_id" value="{folder_id}">
<button type="submit">Delete</button>
</form></td>
</tr>"#,
        name = name,
        mime = escape(&file.mime_type),
        modified = escape(&file.modified),
        download = download,
        id = escape(&urlencoding::encode(&file.id)),
        folder_id = escape(folder_id),
    )
}

pub fn error_page(status: StatusCode, message: &str, sign_in: bool) -> String {
    let action = if sign_in {
        r#"<a href="/">Sign in again</a>"#
    } else {
        r#"<a href="/dashboard">Back to My Drive</a>"#
    };

    let body = format!(
        r#"<main class="error">
<h1>{code} {reason}</h1>
<p>{message}</p>
{action}
</main>"#,
        code = status.as_u16(),
        reason = escape(status.canonical_reason().unwrap_or("Error")),
        message = escape(message),
        action = action,
    );

    layout("Error", &body)
}
