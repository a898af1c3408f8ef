//! HTML pages and static assets
//!
//! Pages are rendered server-side with `format!`; the admin console and
//! scanner behavior live in the static scripts under `src/ui/`.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;

use arlab_common::{LabKey, Laboratory};

use super::scene::{parse_lab, scene_for};
use crate::error::ApiResult;
use crate::session::renderer::{escape_html, render_markup};
use crate::session::{LibraryScript, SceneSpec};
use crate::AppState;

const ADMIN_JS: &str = include_str!("../ui/admin.js");
const SCAN_JS: &str = include_str!("../ui/scan.js");
const STYLE_CSS: &str = include_str!("../ui/style.css");

pub fn ui_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home_page))
        .route("/laboratorios", get(labs_page))
        .route("/admin", get(admin_page))
        .route("/escaneo", get(scan_page))
        .route("/escaneo/:lab", get(lab_scan_page))
        .route("/static/admin.js", get(serve_admin_js))
        .route("/static/scan.js", get(serve_scan_js))
        .route("/static/style.css", get(serve_style_css))
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="/static/style.css">
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape_html(title),
        body = body,
    )
}

/// GET /
pub async fn home_page() -> Html<String> {
    let body = r#"<main class="container">
    <h1>Realidad Aumentada en Laboratorios</h1>
    <p class="subtitle">Escanea los marcadores de cada laboratorio para ver su contenido.</p>
    <nav class="menu">
        <a class="button" href="/escaneo">Escáner universal</a>
        <a class="button" href="/laboratorios">Elegir laboratorio</a>
        <a class="button secondary" href="/admin">Administración</a>
    </nav>
</main>"#;
    Html(page("Realidad Aumentada", body))
}

/// Link target for a laboratory's scan page
pub fn lab_scan_href(lab: Laboratory) -> String {
    format!("/escaneo/{}", urlencoding::encode(lab.name()))
}

/// GET /laboratorios
pub async fn labs_page() -> Html<String> {
    let items: String = Laboratory::ALL
        .iter()
        .map(|lab| {
            format!(
                "        <li><a href=\"{}\">{}</a></li>\n",
                lab_scan_href(*lab),
                escape_html(lab.name())
            )
        })
        .collect();

    let body = format!(
        r#"<main class="container">
    <a href="/">&larr; Volver al inicio</a>
    <h1>Selecciona un Laboratorio</h1>
    <p class="subtitle">Cada laboratorio tiene sus propios marcadores de realidad aumentada.</p>
    <ul class="lab-list">
{items}    </ul>
</main>"#,
        items = items
    );
    Html(page("Laboratorios", &body))
}

/// GET /admin
pub async fn admin_page() -> Html<String> {
    let lab_options: String = Laboratory::ALL
        .iter()
        .map(|lab| {
            let name = escape_html(lab.name());
            format!("<option value=\"{name}\">{name}</option>", name = name)
        })
        .collect();
    let marker_keys: Vec<&str> = LabKey::all().map(|k| k.name()).collect();

    let body = format!(
        r#"<main class="container">
    <a href="/">&larr; Volver al inicio</a>
    <h1>Administración</h1>

    <section id="login-panel">
        <form id="login-form">
            <input type="password" id="password" placeholder="Contraseña" autocomplete="current-password" required>
            <button type="submit">Entrar</button>
        </form>
        <p id="login-error" class="error" hidden>Contraseña incorrecta</p>
    </section>

    <section id="admin-panel" hidden>
        <button id="logout" class="secondary">Cerrar sesión</button>

        <h2>Nuevo vínculo</h2>
        <form id="asset-form">
            <select name="lab">{lab_options}</select>
            <input name="title" placeholder="Título" required>
            <label>Foto <input type="file" name="image" accept="image/*"></label>
            <input name="imageUrl" placeholder="o URL de la foto">
            <label>Video <input type="file" name="video" accept="video/*"></label>
            <input name="videoUrl" placeholder="o URL del video">
            <button type="submit">Guardar</button>
        </form>

        <h2>Vínculos</h2>
        <ul id="asset-list"></ul>

        <h2>Marcadores (.mind)</h2>
        <ul id="marker-list"></ul>
    </section>
    <footer id="build-info"></footer>
</main>
<script id="admin-config" type="application/json">{config}</script>
<script src="/static/admin.js"></script>"#,
        lab_options = lab_options,
        config = script_json(&json!({ "markerKeys": marker_keys })),
    );
    Html(page("Administración", &body))
}

/// JSON safe to embed inside a `<script>` element
fn script_json(value: &serde_json::Value) -> String {
    value.to_string().replace("</", "<\\/")
}

/// The page only carries the scene markup; the browser mounts it on user start
fn render_scan_page(state: &AppState, heading: &str, scene: &SceneSpec) -> Html<String> {
    let markup = render_markup(scene);

    let scripts: Vec<_> = LibraryScript::SEQUENCE
        .iter()
        .map(|s| json!({ "url": s.url(), "global": s.global() }))
        .collect();
    let config = json!({
        "pollIntervalMs": state.scanner.poll_interval.as_millis() as u64,
        "readyTimeoutMs": state.scanner.ready_timeout.as_millis() as u64,
        "scripts": scripts,
        "targets": scene.targets,
    });

    let body = format!(
        r#"<div class="scanner">
    <header class="scanner-bar">
        <a class="icon" href="/laboratorios" aria-label="Cerrar">&times;</a>
        <span class="badge">{heading}</span>
        <a class="icon" href="" aria-label="Recargar">&#x21bb;</a>
    </header>

    <div id="ar-loading" class="overlay">
        <p class="pulse">Iniciando Cámara AR...</p>
        <p class="hint">Asegúrate de conceder permisos de cámara cuando se solicite.</p>
    </div>

    <div id="ar-start" class="overlay" hidden>
        <h2>¿Listo para Escanear?</h2>
        <p>Para ver el contenido AR, necesitamos activar la cámara y el audio. Apunta al marcador una vez iniciada.</p>
        <button id="ar-start-button">Iniciar Experiencia AR</button>
    </div>

    <div id="ar-failed" class="overlay" hidden>
        <h2>No se pudo iniciar la cámara AR</h2>
        <p>Las bibliotecas de realidad aumentada no cargaron a tiempo. Revisa tu conexión y recarga la página.</p>
    </div>

    <div id="ar-container"></div>
    <template id="ar-scene">{markup}</template>

    <div id="ar-guide" class="guide" hidden>
        <p>Apunta la cámara al marcador del laboratorio</p>
        <p class="hint">Escaneando Marcadores...</p>
    </div>
</div>
<script id="scan-config" type="application/json">{config}</script>
<script src="/static/scan.js"></script>"#,
        heading = escape_html(heading),
        markup = markup,
        config = script_json(&config),
    );
    Html(page(heading, &body))
}

/// GET /escaneo
pub async fn scan_page(State(state): State<AppState>) -> Html<String> {
    let scene = scene_for(&state, None).await;
    render_scan_page(&state, "Escáner universal", &scene)
}

/// GET /escaneo/:lab
pub async fn lab_scan_page(
    State(state): State<AppState>,
    Path(lab): Path<String>,
) -> ApiResult<Html<String>> {
    let lab = parse_lab(&lab)?;
    let scene = scene_for(&state, Some(lab)).await;
    Ok(render_scan_page(&state, lab.name(), &scene))
}

fn static_asset(content_type: &'static str, body: &'static str) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], body).into_response()
}

/// GET /static/admin.js
pub async fn serve_admin_js() -> Response {
    static_asset("application/javascript", ADMIN_JS)
}

/// GET /static/scan.js
pub async fn serve_scan_js() -> Response {
    static_asset("application/javascript", SCAN_JS)
}

/// GET /static/style.css
pub async fn serve_style_css() -> Response {
    static_asset("text/css", STYLE_CSS)
}
